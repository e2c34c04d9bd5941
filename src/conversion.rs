use image::codecs::jpeg::JpegEncoder;
use image::{ImageError, ImageReader, RgbImage};
use log::debug;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::category::CategoryMap;
use crate::error::{ConvertError, Result};
use crate::example::{Example, ExampleBuilder, FeatureValue};
use crate::types::{AnnotationRow, NormalizedBoxes};

/// Quality used when re-encoding images, matching common codec defaults
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Value of the `image/format` feature
pub const IMAGE_FORMAT: &str = "jpeg";

/// Feature keys of an encoded record
pub mod keys {
    pub const HEIGHT: &str = "image/height";
    pub const WIDTH: &str = "image/width";
    pub const FILENAME: &str = "image/filename";
    pub const SOURCE_ID: &str = "image/source_id";
    pub const SHA256: &str = "image/key/sha256";
    pub const ENCODED: &str = "image/encoded";
    pub const FORMAT: &str = "image/format";
    pub const BBOX_XMIN: &str = "image/object/bbox/xmin";
    pub const BBOX_YMIN: &str = "image/object/bbox/ymin";
    pub const BBOX_XMAX: &str = "image/object/bbox/xmax";
    pub const BBOX_YMAX: &str = "image/object/bbox/ymax";
    pub const CLASS_TEXT: &str = "image/object/class/text";
    pub const CLASS_LABEL: &str = "image/object/class/label";
}

/// Knobs of the per-image encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub jpeg_quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Load `image_dir/filename` and encode it together with its annotation rows
/// into one `tf.train.Example`
pub fn encode_image_group(
    filename: &str,
    rows: &[AnnotationRow],
    image_dir: &Path,
    categories: &CategoryMap,
    options: &EncodeOptions,
) -> Result<Example> {
    let image_path = image_dir.join(filename);
    let image = load_rgb_image(&image_path)?;
    debug!(
        "Loaded {} ({}x{}) with {} object(s)",
        image_path.display(),
        image.width(),
        image.height(),
        rows.len()
    );
    encode_rgb_image(filename, &image, rows, categories, options)
}

/// Decode an image file into 8-bit RGB.
///
/// The format is detected from the file contents, so the extension does not
/// have to match the encoding (or exist at all).
pub fn load_rgb_image(path: &Path) -> Result<RgbImage> {
    let image_error = |source| ConvertError::Image {
        path: path.to_path_buf(),
        source,
    };
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| image_error(ImageError::IoError(e)))?
        .decode()
        .map_err(image_error)?
        .into_rgb8();
    check_dimensions(&image, path)?;
    Ok(image)
}

/// Reject images with zero width or height, which cannot be normalized against
pub fn check_dimensions(image: &RgbImage, path: &Path) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ConvertError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Build the example for an already decoded image
pub fn encode_rgb_image(
    filename: &str,
    image: &RgbImage,
    rows: &[AnnotationRow],
    categories: &CategoryMap,
    options: &EncodeOptions,
) -> Result<Example> {
    check_dimensions(image, Path::new(filename))?;
    let (width, height) = image.dimensions();

    let class_labels = rows
        .iter()
        .map(|row| categories.label(&row.obj_name))
        .collect::<Result<Vec<_>>>()?;
    let class_text = rows
        .iter()
        .map(|row| row.obj_name.as_bytes().to_vec())
        .collect();

    let encoded = encode_jpeg(image, options.jpeg_quality)?;
    let key = sha256_hex(&encoded);
    let boxes = normalize_boxes(rows, width, height);

    Ok(ExampleBuilder::new()
        .insert(keys::HEIGHT, FeatureValue::Int(height.into()))
        .insert(keys::WIDTH, FeatureValue::Int(width.into()))
        .insert(keys::FILENAME, FeatureValue::Bytes(filename.as_bytes().to_vec()))
        .insert(keys::SOURCE_ID, FeatureValue::Bytes(filename.as_bytes().to_vec()))
        .insert(keys::SHA256, FeatureValue::Bytes(key.into_bytes()))
        .insert(keys::ENCODED, FeatureValue::Bytes(encoded))
        .insert(keys::FORMAT, FeatureValue::Bytes(IMAGE_FORMAT.as_bytes().to_vec()))
        .insert(keys::BBOX_XMIN, FeatureValue::FloatList(boxes.xmin))
        .insert(keys::BBOX_YMIN, FeatureValue::FloatList(boxes.ymin))
        .insert(keys::BBOX_XMAX, FeatureValue::FloatList(boxes.xmax))
        .insert(keys::BBOX_YMAX, FeatureValue::FloatList(boxes.ymax))
        .insert(keys::CLASS_TEXT, FeatureValue::BytesList(class_text))
        .insert(keys::CLASS_LABEL, FeatureValue::IntList(class_labels))
        .build())
}

/// Compress an RGB image as baseline JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(image)
        .map_err(ConvertError::Jpeg)?;
    Ok(buffer)
}

/// Lowercase hex SHA-256 digest
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Divide x coordinates by the image width and y coordinates by its height.
///
/// Values are not clamped: boxes reaching outside the image produce
/// fractions below 0 or above 1.
pub fn normalize_boxes(rows: &[AnnotationRow], width: u32, height: u32) -> NormalizedBoxes {
    let width = f64::from(width);
    let height = f64::from(height);

    let mut boxes = NormalizedBoxes {
        xmin: Vec::with_capacity(rows.len()),
        ymin: Vec::with_capacity(rows.len()),
        xmax: Vec::with_capacity(rows.len()),
        ymax: Vec::with_capacity(rows.len()),
    };
    for row in rows {
        boxes.xmin.push((row.xmin / width) as f32);
        boxes.ymin.push((row.ymin / height) as f32);
        boxes.xmax.push((row.xmax / width) as f32);
        boxes.ymax.push((row.ymax / height) as f32);
    }
    boxes
}
