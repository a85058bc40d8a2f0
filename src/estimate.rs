use crate::error::{PipelineError, Result};
use crate::scan::{image_files_in, savings_percent, total_size};
use crate::turbo::{winc_to_credits, CostQuote, StorageService, TurboClient};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct EstimateConfig {
    pub original_dir: PathBuf,
    pub optimized_dir: PathBuf,
}

/// Entry point for `img-ark estimate`. Builds a runtime and an
/// unauthenticated client; no key material is needed for price quotes.
pub fn estimate_command(config: &EstimateConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().map_err(PipelineError::Io)?;
    let client = TurboClient::unauthenticated();
    runtime.block_on(estimate_costs(&client, config))
}

/// Signed credit difference between two winc quotes, six decimal places.
pub fn credit_delta(original_winc: u128, optimized_winc: u128) -> String {
    if optimized_winc <= original_winc {
        winc_to_credits(original_winc - optimized_winc)
    } else {
        format!("-{}", winc_to_credits(optimized_winc - original_winc))
    }
}

pub async fn estimate_costs<S: StorageService + Sync>(
    service: &S,
    config: &EstimateConfig,
) -> Result<()> {
    println!("💰 Arweave Upload Cost Estimator\n");
    println!("Note: no private key required for cost estimation!\n");

    println!("🔍 Scanning original images: {:?}\n", config.original_dir);
    let original_files = image_files_in(&config.original_dir);

    if original_files.is_empty() {
        println!("⚠️  No images found in original directory.");
        println!(
            "Supported formats: {}",
            crate::constants::SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        );
        println!("\nUsage: img-ark estimate [ORIGINAL_DIR] [OPTIMIZED_DIR]");
        return Ok(());
    }

    println!("📊 Found {} original image(s)", original_files.len());
    let original_total_bytes = total_size(&original_files)?;
    print_byte_total(original_total_bytes);

    let mut optimized_total_bytes = 0u64;
    let mut has_optimized = false;

    if config.optimized_dir.exists() {
        println!("🔍 Scanning optimized images: {:?}\n", config.optimized_dir);
        let optimized_files = image_files_in(&config.optimized_dir);
        if !optimized_files.is_empty() {
            has_optimized = true;
            println!("📊 Found {} optimized image(s)", optimized_files.len());
            optimized_total_bytes = total_size(&optimized_files)?;
            print_byte_total(optimized_total_bytes);
        }
    }

    println!("⏳ Fetching upload cost estimates...\n");

    let original_quote = first_quote(service.upload_costs(&[original_total_bytes]).await?)?;
    println!("ORIGINAL images upload cost:");
    print_quote(original_total_bytes, &original_quote);

    if has_optimized {
        let optimized_quote = first_quote(service.upload_costs(&[optimized_total_bytes]).await?)?;
        println!("\nOPTIMIZED images upload cost:");
        print_quote(optimized_total_bytes, &optimized_quote);

        println!("\n📊 Savings comparison:");
        println!(
            "  Size reduction: {:.2}%",
            savings_percent(original_total_bytes, optimized_total_bytes)
        );
        println!(
            "    Original:  {:.2} MB",
            original_total_bytes as f64 / (1024.0 * 1024.0)
        );
        println!(
            "    Optimized: {:.2} MB",
            optimized_total_bytes as f64 / (1024.0 * 1024.0)
        );
        println!(
            "  Cost savings: {} Credits",
            credit_delta(original_quote.winc, optimized_quote.winc)
        );
    }

    println!("\nNext steps:");
    if !has_optimized {
        println!("  1. Run: img-ark optimize (to create optimized images)");
        println!("  2. Run: img-ark estimate (to compare costs)");
    }
    println!("  3. Run: img-ark upload (to upload images)");

    Ok(())
}

fn first_quote(quotes: Vec<CostQuote>) -> Result<CostQuote> {
    quotes
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::PriceQuery("empty quote list".to_string()))
}

fn print_byte_total(total_bytes: u64) {
    println!(
        "📊 Total size: {:.2} KB ({:.2} MB)\n",
        total_bytes as f64 / 1024.0,
        total_bytes as f64 / (1024.0 * 1024.0)
    );
}

fn print_quote(total_bytes: u64, quote: &CostQuote) {
    println!("  Data size: {} bytes", total_bytes);
    println!("  Cost in winc: {}", quote.winc);
    println!("  Cost in Credits: {}", winc_to_credits(quote.winc));
}
