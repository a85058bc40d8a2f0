use clap::Parser;
use img_ark::cli::{Args, Commands};
use img_ark::error::Result;
use img_ark::{estimate, metadata, optimize, upload};

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("❌ Error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Optimize {
            input_dir,
            output_dir,
        } => optimize::optimize_directory(&input_dir, &output_dir, &optimize::OptimizeConfig::default()),

        Commands::Estimate {
            original_dir,
            optimized_dir,
        } => estimate::estimate_command(&estimate::EstimateConfig {
            original_dir,
            optimized_dir,
        }),

        Commands::Upload {
            input_dir,
            app_name,
            content_type,
            wallet,
        } => {
            let config = upload::UploadConfig::new(wallet, input_dir, app_name, content_type);
            if let Err(err) = upload::upload_command(&config) {
                eprintln!("❌ Error during upload: {}", err);
                for hint in upload::error_hints(&err) {
                    eprintln!("💡 {}", hint);
                }
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::UpdateMetadata {
            results_file,
            metadata_dir,
        } => match results_file {
            Some(results_file) => metadata::update_metadata(&metadata::MetadataConfig {
                results_file,
                metadata_dir,
            })
            .map(|_| ()),
            None => {
                println!("📝 Update Metadata Image URLs\n");
                println!("Updates metadata files with Arweave image URLs from upload results.\n");
                println!("Usage: img-ark update-metadata <upload-results.json> [METADATA_DIR]");
                println!(
                    "\nExample: img-ark update-metadata upload-results-2026-08-27T12-00-00-000Z.json ./metadata"
                );
                Ok(())
            }
        },
    }
}
