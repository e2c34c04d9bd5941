//! Error type shared by every stage of the conversion pipeline.

use std::path::PathBuf;

/// Result type alias using ConvertError
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Everything that can abort a conversion run
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV header lacks one or more of the required columns
    #[error("CSV is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("failed to load image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Width or height of zero would make box normalization meaningless
    #[error("image {} has zero width or height", path.display())]
    EmptyImage { path: PathBuf },

    #[error("failed to encode JPEG: {0}")]
    Jpeg(#[source] image::ImageError),

    #[error("unknown object category '{0}'")]
    UnknownCategory(String),

    #[error("category '{0}' is listed more than once")]
    DuplicateCategory(String),

    #[error("corrupt TFRecord frame: {0}")]
    CorruptRecord(String),

    #[error("failed to decode tf.train.Example: {0}")]
    Decode(#[from] prost::DecodeError),
}
