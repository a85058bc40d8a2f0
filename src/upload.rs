use crate::constants::{
    APP_VERSION_TAG, ARWEAVE_GATEWAY_URL, DEFAULT_INPUT_DIR, MAX_CONCURRENT_UPLOADS,
};
use crate::error::{PipelineError, Result};
use crate::turbo::{
    ConsoleEvents, FolderUploadRequest, JwkWallet, StorageService, Tag, TurboClient, UploadEvents,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: String,
    pub url: String,
    pub id: String,
}

/// Persisted results of one uploader invocation. Never mutated after
/// creation; the timestamped file name keeps runs from overwriting
/// each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResults {
    pub manifest_id: String,
    pub folder_url: String,
    pub uploaded_at: String,
    pub total_files: usize,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub wallet_path: PathBuf,
    pub input_dir: PathBuf,
    pub app_name: String,
    pub content_type: String,
    /// Directory tried when `input_dir` is absent. `None` disables the
    /// fallback entirely.
    pub fallback_dir: Option<PathBuf>,
    /// Where the results file is written.
    pub results_dir: PathBuf,
}

impl UploadConfig {
    pub fn new(wallet_path: PathBuf, input_dir: PathBuf, app_name: String, content_type: String) -> Self {
        Self {
            wallet_path,
            input_dir,
            app_name,
            content_type,
            fallback_dir: Some(PathBuf::from(DEFAULT_INPUT_DIR)),
            results_dir: PathBuf::from("."),
        }
    }
}

/// Entry point for `img-ark upload`. Both preconditions (readable wallet
/// JSON, existing input directory) are fatal before any network traffic.
pub fn upload_command(config: &UploadConfig) -> Result<()> {
    let wallet = JwkWallet::from_file(&config.wallet_path)?;
    let input_dir = resolve_input_dir(&config.input_dir, config.fallback_dir.as_deref())?;

    println!("📤 Arweave Folder Uploader\n");
    println!("📁 Directory: {:?}", input_dir);
    println!("🏷️  App Name:  {}\n", config.app_name);

    let client = TurboClient::authenticated(wallet);
    let runtime = tokio::runtime::Runtime::new().map_err(PipelineError::Io)?;
    let results_path =
        runtime.block_on(upload_folder_flow(&client, &ConsoleEvents, &input_dir, config))?;

    println!("💾 Results saved to: {:?}", results_path);
    Ok(())
}

/// Picks the upload directory, taking the configured fallback (with a log
/// line) when the preferred directory is missing.
pub fn resolve_input_dir(preferred: &Path, fallback: Option<&Path>) -> Result<PathBuf> {
    if preferred.is_dir() {
        return Ok(preferred.to_path_buf());
    }
    if let Some(fallback) = fallback {
        if fallback.is_dir() {
            println!("⚠️  {:?} not found, using {:?}\n", preferred, fallback);
            return Ok(fallback.to_path_buf());
        }
    }
    Err(PipelineError::DirectoryNotFound(preferred.to_path_buf()))
}

pub async fn upload_folder_flow<S: StorageService + Sync>(
    service: &S,
    events: &(dyn UploadEvents + Sync),
    input_dir: &Path,
    config: &UploadConfig,
) -> Result<PathBuf> {
    let request = FolderUploadRequest {
        folder_path: input_dir.to_path_buf(),
        max_concurrent_uploads: MAX_CONCURRENT_UPLOADS,
        tags: vec![
            Tag::new("App-Name", &config.app_name),
            Tag::new("App-Version", APP_VERSION_TAG),
        ],
        default_content_type: config.content_type.clone(),
    };

    let result = service.upload_folder(&request, events).await?;
    let folder_url = format!("{}/{}", ARWEAVE_GATEWAY_URL, result.manifest_id);

    println!("\n✅ Upload successful!\n");
    println!("🆔 Manifest ID: {}", result.manifest_id);
    println!("🌐 Folder URL:  {}", folder_url);
    println!("📊 Total Files: {}\n", result.file_count);

    let files: Vec<UploadedFile> = result
        .paths
        .iter()
        .map(|path| UploadedFile {
            file_name: path.file_name.clone(),
            url: format!("{}/{}", folder_url, path.file_name),
            id: path.id.clone(),
        })
        .collect();

    let uploaded_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let results = UploadResults {
        manifest_id: result.manifest_id.clone(),
        folder_url,
        uploaded_at: uploaded_at.clone(),
        total_files: result.file_count,
        files,
    };

    let results_path = config
        .results_dir
        .join(format!("upload-results-{}.json", sanitize_timestamp(&uploaded_at)));
    let body = serde_json::to_string_pretty(&results)
        .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;
    fs::write(&results_path, body)?;

    Ok(results_path)
}

/// Makes an ISO-8601 timestamp safe for file names by replacing `:` and
/// `.` with `-`.
pub fn sanitize_timestamp(iso: &str) -> String {
    iso.replace([':', '.'], "-")
}

/// Best-effort remediation hints matched against the error text, printed
/// after an upload failure.
pub fn error_hints(error: &PipelineError) -> Vec<&'static str> {
    let message = error.to_string();
    let mut hints = Vec::new();
    if message.contains("JSON") {
        hints.push("Make sure the wallet file is a valid Arweave wallet (JWK) JSON file");
    }
    if message.contains("insufficient") {
        hints.push("Insufficient balance. Add credits to your Turbo account.");
    }
    hints
}
