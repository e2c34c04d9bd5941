//! CSV + images to TFRecord converter
//!
//! This library reads a CSV of bounding-box annotations, groups it by image,
//! re-encodes every image and writes one `tf.train.Example` per image into a
//! TFRecord file for object-detection training.

pub mod category;
pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod example;
pub mod io;
pub mod tfrecord;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use category::CategoryMap;
pub use config::Args;
pub use conversion::{encode_image_group, EncodeOptions};
pub use dataset::{convert_groups, process_dataset};
pub use error::{ConvertError, Result};
pub use example::{Example, ExampleBuilder, FeatureValue};
pub use io::load_annotations;
pub use tfrecord::{read_examples, RecordReader, RecordWriter};
pub use types::{AnnotationRow, ConversionSummary, ImageGroups};
