use log::{debug, info};
use std::path::Path;

use crate::category::CategoryMap;
use crate::config::Args;
use crate::conversion::{encode_image_group, EncodeOptions};
use crate::error::Result;
use crate::io::load_annotations;
use crate::tfrecord::RecordWriter;
use crate::types::{ConversionSummary, ImageGroups};
use crate::utils::ProgressReporter;

/// Run the whole conversion described by the command-line arguments
pub fn process_dataset(args: &Args) -> Result<ConversionSummary> {
    let categories = args.category_map()?;
    info!(
        "Using {} categor{}: {}",
        categories.len(),
        if categories.len() == 1 { "y" } else { "ies" },
        categories
            .iter()
            .map(|(name, label)| format!("{}={}", name, label))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let groups = load_annotations(&args.csv_path)?;
    let summary = convert_groups(
        &groups,
        &args.img_path,
        &args.out_path,
        &categories,
        &args.encode_options(),
    )?;
    println!("\ndone!");
    summary.print_summary();
    Ok(summary)
}

/// Encode every image group and write one record per group to `out_path`.
///
/// Groups are written in iteration order. The first failure stops the run;
/// records written before it stay in the file.
pub fn convert_groups(
    groups: &ImageGroups,
    image_dir: &Path,
    out_path: &Path,
    categories: &CategoryMap,
    options: &EncodeOptions,
) -> Result<ConversionSummary> {
    let mut writer = RecordWriter::create(out_path)?;
    let mut progress = ProgressReporter::new(groups.len() as u64);
    let mut summary = ConversionSummary::default();

    for (filename, rows) in groups {
        let example = encode_image_group(filename, rows, image_dir, categories, options)?;
        writer.write_example(&example)?;
        debug!("Wrote record for {} ({} object(s))", filename, rows.len());

        summary.record_image(rows.len());
        progress.report()?;
    }

    writer.finish()?;
    progress.finish();
    info!(
        "Wrote {} record(s) to {}",
        summary.images,
        out_path.display()
    );
    Ok(summary)
}
