use log::info;
use std::io::Read;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::types::{AnnotationRow, ImageGroups, REQUIRED_COLUMNS};

/// Read the annotation CSV at `csv_path` and group its rows by filename
pub fn load_annotations(csv_path: &Path) -> Result<ImageGroups> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(csv_path)?;
    let groups = read_groups(reader)?;
    info!(
        "Read {} annotation(s) for {} image(s) from {}",
        groups.values().map(Vec::len).sum::<usize>(),
        groups.len(),
        csv_path.display()
    );
    Ok(groups)
}

/// Same as [`load_annotations`] for CSV text coming from any reader
pub fn read_annotations<R: Read>(input: R) -> Result<ImageGroups> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);
    read_groups(reader)
}

/// Group rows by filename.
///
/// Groups come out in the order their filename first appears; rows inside a
/// group keep their input order.
pub fn group_annotations<I>(rows: I) -> ImageGroups
where
    I: IntoIterator<Item = AnnotationRow>,
{
    let mut groups = ImageGroups::new();
    for row in rows {
        groups.entry(row.filename.clone()).or_default().push(row);
    }
    groups
}

fn read_groups<R: Read>(mut reader: csv::Reader<R>) -> Result<ImageGroups> {
    check_columns(reader.headers()?)?;
    let rows: Vec<AnnotationRow> = reader
        .deserialize()
        .collect::<std::result::Result<_, csv::Error>>()?;
    Ok(group_annotations(rows))
}

// Reports every missing column, not just the first
fn check_columns(headers: &csv::StringRecord) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConvertError::MissingColumns(missing))
    }
}
