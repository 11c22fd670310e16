use clap::Parser;
use log::{error, info};
use std::process;

use cvat2coco::{convert_file, Args};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let schema = match args.to_schema() {
        Ok(schema) => schema,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    info!(
        "Starting CVAT to COCO conversion for dataset '{}'...",
        args.dataset
    );

    match convert_file(&args.input, &args.output, &schema, args.output_options()) {
        Ok(stats) => {
            stats.print_summary();
            info!("COCO conversion process completed successfully.");
        }
        Err(e) => {
            error!("Failed to convert {}: {}", args.input.display(), e);
            process::exit(1);
        }
    }
}
