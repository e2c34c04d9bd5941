use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::category::CategoryMap;
use crate::conversion::{EncodeOptions, DEFAULT_JPEG_QUALITY};
use crate::error::Result;

/// Command-line arguments for converting images and a bounding-box CSV to TFRecord.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory containing the images named in the CSV
    #[arg(long = "img_path")]
    pub img_path: PathBuf,

    /// CSV with columns filename, obj_name, xmin, ymin, xmax, ymax
    #[arg(long = "csv_path")]
    pub csv_path: PathBuf,

    /// Output TFRecord file
    #[arg(long = "out_path")]
    pub out_path: PathBuf,

    /// Ordered category names; labels are assigned from 1. Defaults to 'Stopsign'
    #[arg(long = "label_list", use_value_delimiter = true)]
    pub label_list: Vec<String>,

    /// JPEG quality used when re-encoding images
    #[arg(long = "quality", default_value_t = DEFAULT_JPEG_QUALITY, value_parser = validate_quality)]
    pub quality: u8,
}

impl Args {
    /// Category table from `--label_list`, or the default table when it is empty
    pub fn category_map(&self) -> Result<CategoryMap> {
        if self.label_list.is_empty() {
            Ok(CategoryMap::default())
        } else {
            CategoryMap::from_names(self.label_list.iter().cloned())
        }
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            jpeg_quality: self.quality,
        }
    }
}

// Validate that the quality is between 1 and 100
pub fn validate_quality(s: &str) -> std::result::Result<u8, String> {
    match u8::from_str(s) {
        Ok(val) if (1..=100).contains(&val) => Ok(val),
        _ => Err("QUALITY must be between 1 and 100".to_string()),
    }
}
