use clap::Parser;
use log::{error, info};

use csv2tfrecord::{process_dataset, Args};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.img_path.is_dir() {
        error!(
            "The specified img_path is not a directory: {}",
            args.img_path.display()
        );
        std::process::exit(1);
    }

    info!("Starting the conversion process...");

    if let Err(e) = process_dataset(&args) {
        error!("Failed to convert dataset: {}", e);
        std::process::exit(1);
    }
}
