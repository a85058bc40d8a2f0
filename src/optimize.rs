use crate::constants::{JPEG_QUALITY, MAX_IMAGE_DIMENSION, SUPPORTED_IMAGE_EXTENSIONS};
use crate::error::{PipelineError, Result};
use crate::scan::{base_name, image_files_in, savings_percent};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Fixed transform profile applied to every image in a batch.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_width: MAX_IMAGE_DIMENSION,
            max_height: MAX_IMAGE_DIMENSION,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

/// Loads one image, fits it within the configured bounds, and re-encodes
/// it as JPEG. Returns the encoded bytes.
pub fn optimize_image(input_path: &Path, config: &OptimizeConfig) -> Result<Vec<u8>> {
    let img = ImageReader::open(input_path)?.decode()?;
    let img = fit_within(img, config.max_width, config.max_height);
    encode_jpeg(&img, config.jpeg_quality)
}

/// Downscales to fit within the bounds preserving aspect ratio. Images
/// already inside the bounds are returned untouched (never upscaled).
fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_width && height <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::Lanczos3)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder.encode_image(&rgb)?;
    Ok(buffer)
}

/// Optimizes every supported image in `input_dir` into
/// `<output_dir>/<baseName>.jpg`. A single file failure is logged and
/// counted, never fatal to the batch.
pub fn optimize_directory(
    input_dir: &Path,
    output_dir: &Path,
    config: &OptimizeConfig,
) -> Result<()> {
    println!("🗜️  Image Optimizer\n");
    println!("📁 Input:  {:?}", input_dir);
    println!("📁 Output: {:?}\n", output_dir);

    let image_files = image_files_in(input_dir);
    if image_files.is_empty() {
        println!("⚠️  No images found.");
        println!("Supported formats: {}", SUPPORTED_IMAGE_EXTENSIONS.join(", "));
        println!("\nUsage: img-ark optimize [INPUT_DIR] [OUTPUT_DIR]");
        return Ok(());
    }

    if !output_dir.exists() {
        fs::create_dir_all(output_dir)
            .map_err(|_| PipelineError::DirectoryCreationFailed(output_dir.to_path_buf()))?;
        println!("📁 Created output directory: {:?}\n", output_dir);
    }

    let total_files = image_files.len();
    println!("📊 Found {} image(s) to optimize\n", total_files);

    let progress = ProgressBar::new(total_files as u64);
    progress.set_style(ProgressStyle::default_bar());

    let mut success_count = 0usize;
    let mut fail_count = 0usize;
    let mut total_original_size = 0u64;
    let mut total_optimized_size = 0u64;

    for (index, input_path) in image_files.iter().enumerate() {
        let file_name = input_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let output_path = output_dir.join(format!("{}.jpg", base_name(file_name)));

        progress.println(format!("[{}/{}] {}", index + 1, total_files, file_name));

        match optimize_one(input_path, &output_path, config) {
            Ok((original_size, optimized_size)) => {
                progress.println(format!(
                    "  {:.2} KB -> {:.2} KB ({:.2}% saved)",
                    original_size as f64 / 1024.0,
                    optimized_size as f64 / 1024.0,
                    savings_percent(original_size, optimized_size)
                ));
                total_original_size += original_size;
                total_optimized_size += optimized_size;
                success_count += 1;
            }
            Err(err) => {
                progress.println(format!("  ❌ Failed to optimize: {}", err));
                fail_count += 1;
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();

    println!("\n📊 Summary:");
    println!(
        "  Total: {} | Success: {} | Failed: {}",
        total_files, success_count, fail_count
    );
    println!(
        "  Original: {:.2} MB -> Optimized: {:.2} MB",
        total_original_size as f64 / (1024.0 * 1024.0),
        total_optimized_size as f64 / (1024.0 * 1024.0)
    );
    println!(
        "  Space saved: {:.2}%",
        savings_percent(total_original_size, total_optimized_size)
    );
    println!("\n📁 Output: {:?}", output_dir);

    Ok(())
}

fn optimize_one(input_path: &Path, output_path: &Path, config: &OptimizeConfig) -> Result<(u64, u64)> {
    let original_size = fs::metadata(input_path)?.len();
    let optimized = optimize_image(input_path, config)?;
    let optimized_size = optimized.len() as u64;
    fs::write(output_path, &optimized)?;
    Ok((original_size, optimized_size))
}
