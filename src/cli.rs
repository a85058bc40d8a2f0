use crate::constants::{
    DEFAULT_APP_NAME, DEFAULT_CONTENT_TYPE, DEFAULT_INPUT_DIR, DEFAULT_METADATA_DIR,
    DEFAULT_OPTIMIZED_DIR, DEFAULT_WALLET_PATH,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-ark",
    about = "Image optimization and Arweave publishing toolkit",
    long_about = "img-ark is a content-upload workflow in four steps: optimize a directory of \
                  images for the web, estimate the Arweave upload cost via the Turbo payment \
                  service, upload the folder through the Turbo upload service, and patch JSON \
                  metadata files with the resulting content URLs.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    img-ark optimize ./images ./images-optimized\n  \
    img-ark estimate ./images ./images-optimized\n  \
    img-ark upload ./images-optimized MyCollection\n  \
    img-ark update-metadata upload-results-2026-08-27T12-00-00-000Z.json ./metadata"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Resize and recompress a directory of images to JPEG",
        long_about = "Optimize every supported image in the input directory: fit within \
                      2048x2048 preserving aspect ratio (never upscaling) and re-encode as \
                      JPEG at quality 92. Output files are always named <baseName>.jpg."
    )]
    Optimize {
        #[arg(help = "Directory of original images", default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        #[arg(help = "Directory for optimized images", default_value = DEFAULT_OPTIMIZED_DIR)]
        output_dir: PathBuf,
    },

    #[command(
        about = "Estimate the Arweave upload cost for original vs. optimized images",
        long_about = "Sum the byte sizes of the original (and, when present, optimized) image \
                      sets and query the Turbo payment service for a price quote in winc. \
                      No wallet is required."
    )]
    Estimate {
        #[arg(help = "Directory of original images", default_value = DEFAULT_INPUT_DIR)]
        original_dir: PathBuf,

        #[arg(help = "Directory of optimized images", default_value = DEFAULT_OPTIMIZED_DIR)]
        optimized_dir: PathBuf,
    },

    #[command(
        about = "Upload a folder of images to Arweave via the Turbo upload service",
        long_about = "Upload every file in the input directory (falling back to ./images when \
                      the optimized directory is absent), generate the folder manifest, and \
                      write a timestamped upload-results JSON file."
    )]
    Upload {
        #[arg(help = "Directory to upload", default_value = DEFAULT_OPTIMIZED_DIR)]
        input_dir: PathBuf,

        #[arg(help = "App-Name tag attached to every item", default_value = DEFAULT_APP_NAME)]
        app_name: String,

        #[arg(help = "Fallback content type for untyped files", default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,

        #[arg(
            short = 'w',
            long,
            env = "ARWEAVE_WALLET",
            default_value = DEFAULT_WALLET_PATH,
            help = "Path to the Arweave wallet (JWK) JSON file"
        )]
        wallet: PathBuf,
    },

    #[command(
        about = "Patch metadata files with uploaded image URLs",
        long_about = "Read an upload-results JSON file and set the 'image' field of each \
                      matching metadata file to its uploaded URL. Files already pointing at \
                      the right URL are left untouched."
    )]
    UpdateMetadata {
        #[arg(help = "Path to an upload-results JSON file")]
        results_file: Option<PathBuf>,

        #[arg(help = "Directory of metadata files", default_value = DEFAULT_METADATA_DIR)]
        metadata_dir: PathBuf,
    },
}
