use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// Columns every annotation CSV must provide
pub const REQUIRED_COLUMNS: &[&str] = &["filename", "obj_name", "xmin", "ymin", "xmax", "ymax"];

// One annotated object instance, i.e. one CSV row
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnnotationRow {
    pub filename: String,
    pub obj_name: String,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

// All rows of the CSV keyed by filename, in first-seen filename order
pub type ImageGroups = IndexMap<String, Vec<AnnotationRow>>;

// Bounding boxes of one image as fractions of its width and height.
// Every list has one entry per annotation row, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBoxes {
    pub xmin: Vec<f32>,
    pub ymin: Vec<f32>,
    pub xmax: Vec<f32>,
    pub ymax: Vec<f32>,
}

impl NormalizedBoxes {
    pub fn len(&self) -> usize {
        self.xmin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xmin.is_empty()
    }
}

// Totals reported once a conversion run finishes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub images: usize,
    pub objects: usize,
}

impl ConversionSummary {
    pub fn record_image(&mut self, objects: usize) {
        self.images += 1;
        self.objects += objects;
    }

    pub fn print_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("Images written: {}", self.images);
        log::info!("Objects written: {}", self.objects);
    }
}
