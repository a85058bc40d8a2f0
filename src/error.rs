use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Wallet file not found: {0}")]
    WalletNotFound(PathBuf),

    #[error("Wallet file is not valid JSON: {0}")]
    InvalidWallet(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Invalid results file: {0}")]
    InvalidResultsFile(String),

    #[error("Invalid JSON in {0}: {1}")]
    InvalidMetadata(PathBuf, String),

    #[error("Price query failed: {0}")]
    PriceQuery(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
