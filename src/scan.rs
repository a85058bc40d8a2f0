use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check if a file path has one of the supported image extensions.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// Lists supported image files directly inside `dir`, in directory listing
/// order. Does not recurse. An unreadable directory is reported to stderr
/// and yields an empty set so callers can keep going.
pub fn image_files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_image_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                eprintln!("⚠️  Error reading directory {:?}: {}", dir, err);
                return Vec::new();
            }
        }
    }

    files
}

/// Sum of the byte sizes of the given files.
pub fn total_size(files: &[PathBuf]) -> Result<u64> {
    let mut total_bytes = 0u64;
    for path in files {
        total_bytes += fs::metadata(path)?.len();
    }
    Ok(total_bytes)
}

/// Strips only the final extension segment of a file name.
///
/// This is the join key linking an original image, its optimized counterpart,
/// its upload record, and its metadata item: `"cat.final.jpg"` -> `"cat.final"`.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => file_name,
    }
}

/// Percentage saved by shrinking `original_size` bytes down to
/// `optimized_size` bytes: `(1 - optimized/original) * 100`.
pub fn savings_percent(original_size: u64, optimized_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    (1.0 - optimized_size as f64 / original_size as f64) * 100.0
}
