use crate::constants::{
    ArkImageFormat, DEFAULT_PAYMENT_SERVICE_URL, DEFAULT_UPLOAD_SERVICE_URL, WINC_PER_CREDIT,
};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A name/value tag attached to every uploaded item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// A single price quote from the payment service, in winc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostQuote {
    pub winc: u128,
}

/// Converts an integer winc amount to a credit string with exactly six
/// decimal places. 10^12 winc = 1 credit.
pub fn winc_to_credits(winc: u128) -> String {
    let whole = winc / WINC_PER_CREDIT;
    let fraction = (winc % WINC_PER_CREDIT) / 1_000_000;
    format!("{}.{:06}", whole, fraction)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Files,
    Manifest,
}

/// Observer for folder upload progress. Implementations must not block
/// beyond synchronous console output.
pub trait UploadEvents: Sync {
    fn on_file_start(&self, file_name: &str, file_index: usize, total_files: usize);
    fn on_file_complete(&self, file_name: &str, file_index: usize, total_files: usize, id: &str);
    fn on_folder_progress(&self, phase: UploadPhase);
    fn on_folder_error(&self, error: &PipelineError);
}

/// Console implementation matching the uploader's reporting format.
pub struct ConsoleEvents;

impl UploadEvents for ConsoleEvents {
    fn on_file_start(&self, file_name: &str, file_index: usize, total_files: usize) {
        println!("[{}/{}] Uploading: {}", file_index + 1, total_files, file_name);
    }

    fn on_file_complete(&self, file_name: &str, file_index: usize, total_files: usize, id: &str) {
        println!(
            "[{}/{}] Done: {} -> {}",
            file_index + 1,
            total_files,
            file_name,
            id
        );
    }

    fn on_folder_progress(&self, phase: UploadPhase) {
        if phase == UploadPhase::Manifest {
            println!("\n📦 Uploading manifest...");
        }
    }

    fn on_folder_error(&self, error: &PipelineError) {
        eprintln!("❌ Upload error: {}", error);
    }
}

#[derive(Debug, Clone)]
pub struct FolderUploadRequest {
    pub folder_path: PathBuf,
    pub max_concurrent_uploads: usize,
    pub tags: Vec<Tag>,
    /// Content type used when a file's extension gives no better answer.
    pub default_content_type: String,
}

/// One entry of the folder manifest: relative file name to content id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPath {
    pub file_name: String,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct FolderUploadResult {
    /// Path mapping in directory listing order.
    pub paths: Vec<ManifestPath>,
    pub file_count: usize,
    /// Identifier of the manifest itself.
    pub manifest_id: String,
}

/// Arweave wallet key material. The key format is opaque to this crate
/// beyond being valid JSON.
#[derive(Debug, Clone)]
pub struct JwkWallet {
    raw: Value,
}

impl JwkWallet {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::WalletNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let raw: Value =
            serde_json::from_str(&contents).map_err(|e| PipelineError::InvalidWallet(e.to_string()))?;
        Ok(Self { raw })
    }

    pub fn public_key(&self) -> Option<&str> {
        self.raw.get("n").and_then(Value::as_str)
    }
}

/// Storage-network capability: unauthenticated price quotes and
/// authenticated folder uploads with manifest generation.
#[async_trait]
pub trait StorageService {
    async fn upload_costs(&self, byte_counts: &[u64]) -> Result<Vec<CostQuote>>;

    async fn upload_folder(
        &self,
        request: &FolderUploadRequest,
        events: &(dyn UploadEvents + Sync),
    ) -> Result<FolderUploadResult>;
}

/// HTTP client for the Turbo upload and payment services.
pub struct TurboClient {
    http: reqwest::Client,
    payment_service_url: String,
    upload_service_url: String,
    wallet: Option<JwkWallet>,
}

impl TurboClient {
    /// Client for price queries only. No key material required.
    pub fn unauthenticated() -> Self {
        Self::with_wallet(None)
    }

    /// Client able to upload, signing with the given wallet.
    pub fn authenticated(wallet: JwkWallet) -> Self {
        Self::with_wallet(Some(wallet))
    }

    fn with_wallet(wallet: Option<JwkWallet>) -> Self {
        Self {
            http: reqwest::Client::new(),
            payment_service_url: DEFAULT_PAYMENT_SERVICE_URL.to_string(),
            upload_service_url: DEFAULT_UPLOAD_SERVICE_URL.to_string(),
            wallet,
        }
    }

    async fn upload_file(
        &self,
        path: &Path,
        file_name: &str,
        tags: &[Tag],
        default_content_type: &str,
    ) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let content_type = path
            .extension()
            .and_then(|s| s.to_str())
            .and_then(ArkImageFormat::from_extension)
            .map(|format| format.mime_type().to_string())
            .unwrap_or_else(|| default_content_type.to_string());

        let tags_json = serde_json::to_string(tags)
            .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(&content_type)?;
        let form = reqwest::multipart::Form::new()
            .text("tags", tags_json)
            .part("file", part);

        let mut request = self
            .http
            .post(format!("{}/v1/tx", self.upload_service_url))
            .multipart(form);
        if let Some(public_key) = self.wallet.as_ref().and_then(JwkWallet::public_key) {
            request = request.header("x-public-key", public_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PipelineError::UploadFailed(format!(
                "{}: service returned {}: {}",
                file_name, status, body
            )));
        }
        parse_tx_id(&body)
    }

    async fn upload_manifest(&self, paths: &[ManifestPath]) -> Result<String> {
        let manifest = build_manifest_json(paths);
        let body = serde_json::to_vec(&manifest)
            .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;

        let mut request = self
            .http
            .post(format!("{}/v1/tx", self.upload_service_url))
            .header("content-type", "application/x.arweave-manifest+json")
            .body(body);
        if let Some(public_key) = self.wallet.as_ref().and_then(JwkWallet::public_key) {
            request = request.header("x-public-key", public_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PipelineError::UploadFailed(format!(
                "manifest: service returned {}: {}",
                status, body
            )));
        }
        parse_tx_id(&body)
    }
}

#[async_trait]
impl StorageService for TurboClient {
    async fn upload_costs(&self, byte_counts: &[u64]) -> Result<Vec<CostQuote>> {
        let mut quotes = Vec::with_capacity(byte_counts.len());
        for &bytes in byte_counts {
            let url = format!("{}/v1/price/bytes/{}", self.payment_service_url, bytes);
            let response = self.http.get(&url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(PipelineError::PriceQuery(format!(
                    "service returned {}: {}",
                    status, body
                )));
            }
            let value: Value = serde_json::from_str(&body)
                .map_err(|e| PipelineError::PriceQuery(e.to_string()))?;
            let winc = parse_winc(&value)?;
            quotes.push(CostQuote { winc });
        }
        Ok(quotes)
    }

    async fn upload_folder(
        &self,
        request: &FolderUploadRequest,
        events: &(dyn UploadEvents + Sync),
    ) -> Result<FolderUploadResult> {
        if self.wallet.is_none() {
            return Err(PipelineError::UploadFailed(
                "no wallet configured for authenticated upload".to_string(),
            ));
        }

        let files = folder_files(&request.folder_path)?;
        let total_files = files.len();
        events.on_folder_progress(UploadPhase::Files);

        let concurrency = request.max_concurrent_uploads.max(1);
        let outcomes = stream::iter(files.iter().cloned().enumerate().map(|(file_index, path)| {
            async move {
                let file_name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                events.on_file_start(&file_name, file_index, total_files);
                match self
                    .upload_file(&path, &file_name, &request.tags, &request.default_content_type)
                    .await
                {
                    Ok(id) => {
                        events.on_file_complete(&file_name, file_index, total_files, &id);
                        Ok((file_index, ManifestPath { file_name, id }))
                    }
                    Err(err) => {
                        events.on_folder_error(&err);
                        Err(err)
                    }
                }
            }
        }))
        .buffer_unordered(concurrency)
        .collect::<Vec<_>>()
        .await;

        // Restore directory listing order after the concurrent fan-out.
        let mut indexed = Vec::with_capacity(total_files);
        for outcome in outcomes {
            indexed.push(outcome?);
        }
        indexed.sort_by_key(|(file_index, _)| *file_index);
        let paths: Vec<ManifestPath> = indexed.into_iter().map(|(_, path)| path).collect();

        events.on_folder_progress(UploadPhase::Manifest);
        let manifest_id = self.upload_manifest(&paths).await?;

        Ok(FolderUploadResult {
            paths,
            file_count: total_files,
            manifest_id,
        })
    }
}

/// Every regular file directly inside the folder, in listing order.
fn folder_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Arweave path manifest document for the uploaded files.
pub fn build_manifest_json(paths: &[ManifestPath]) -> Value {
    let mut path_map = serde_json::Map::new();
    for entry in paths {
        path_map.insert(entry.file_name.clone(), json!({ "id": entry.id }));
    }
    json!({
        "manifest": "arweave/paths",
        "version": "0.1.0",
        "paths": path_map,
    })
}

fn parse_tx_id(body: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| PipelineError::UploadFailed(e.to_string()))?;
    value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PipelineError::UploadFailed(format!("missing id in response: {}", body)))
}

fn parse_winc(value: &Value) -> Result<u128> {
    let winc = value
        .get("winc")
        .ok_or_else(|| PipelineError::PriceQuery("missing winc in response".to_string()))?;
    match winc {
        Value::String(s) => s.parse::<u128>().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
    .ok_or_else(|| PipelineError::PriceQuery(format!("invalid winc amount: {}", winc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_winc_to_credits_exact() {
        assert_eq!(winc_to_credits(1_234_560_000_000), "1.234560");
        assert_eq!(winc_to_credits(0), "0.000000");
        assert_eq!(winc_to_credits(WINC_PER_CREDIT), "1.000000");
        assert_eq!(winc_to_credits(999_999_999_999), "0.999999");
        assert_eq!(winc_to_credits(500_000), "0.000000");
    }

    #[test]
    fn test_tag_serialization() {
        let tag = Tag::new("App-Name", "ArweaveUploader");
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["name"], "App-Name");
        assert_eq!(json["value"], "ArweaveUploader");
    }

    #[test]
    fn test_build_manifest_json() {
        let paths = vec![
            ManifestPath {
                file_name: "a.jpg".to_string(),
                id: "id-a".to_string(),
            },
            ManifestPath {
                file_name: "b.jpg".to_string(),
                id: "id-b".to_string(),
            },
        ];
        let manifest = build_manifest_json(&paths);
        assert_eq!(manifest["manifest"], "arweave/paths");
        assert_eq!(manifest["version"], "0.1.0");
        assert_eq!(manifest["paths"]["a.jpg"]["id"], "id-a");
        assert_eq!(manifest["paths"]["b.jpg"]["id"], "id-b");
    }

    #[test]
    fn test_parse_tx_id() {
        assert_eq!(parse_tx_id(r#"{"id":"abc123"}"#).unwrap(), "abc123");
        assert!(parse_tx_id(r#"{"other":"x"}"#).is_err());
        assert!(parse_tx_id("not json").is_err());
    }

    #[test]
    fn test_parse_winc_string_and_number() {
        let quoted: Value = serde_json::from_str(r#"{"winc":"1234560000000"}"#).unwrap();
        assert_eq!(parse_winc(&quoted).unwrap(), 1_234_560_000_000);

        let bare: Value = serde_json::from_str(r#"{"winc":42}"#).unwrap();
        assert_eq!(parse_winc(&bare).unwrap(), 42);

        let bad: Value = serde_json::from_str(r#"{"winc":true}"#).unwrap();
        assert!(parse_winc(&bad).is_err());
    }

    #[test]
    fn test_folder_files_lists_all_regular_files() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        std::fs::create_dir(temp_dir.path().join("sub")).unwrap();
        File::create(temp_dir.path().join("sub/nested.jpg")).unwrap();

        let files = folder_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_wallet_from_file_not_found() {
        let result = JwkWallet::from_file(Path::new("/nonexistent/wallet.json"));
        assert!(matches!(result, Err(PipelineError::WalletNotFound(_))));
    }

    #[test]
    fn test_wallet_from_file_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let wallet_path = temp_dir.path().join("wallet.json");
        File::create(&wallet_path)
            .unwrap()
            .write_all(b"not valid json")
            .unwrap();

        let result = JwkWallet::from_file(&wallet_path);
        assert!(matches!(result, Err(PipelineError::InvalidWallet(_))));
        // Keeps the word "JSON" in the message for the uploader's hint matching.
        assert!(result.unwrap_err().to_string().contains("JSON"));
    }

    #[test]
    fn test_wallet_public_key() {
        let temp_dir = TempDir::new().unwrap();
        let wallet_path = temp_dir.path().join("wallet.json");
        File::create(&wallet_path)
            .unwrap()
            .write_all(br#"{"kty":"RSA","n":"public-modulus","d":"secret"}"#)
            .unwrap();

        let wallet = JwkWallet::from_file(&wallet_path).unwrap();
        assert_eq!(wallet.public_key(), Some("public-modulus"));
    }

    #[tokio::test]
    async fn test_upload_folder_requires_wallet() {
        let temp_dir = TempDir::new().unwrap();
        let client = TurboClient::unauthenticated();
        let request = FolderUploadRequest {
            folder_path: temp_dir.path().to_path_buf(),
            max_concurrent_uploads: 5,
            tags: Vec::new(),
            default_content_type: "image/*".to_string(),
        };
        let result = client.upload_folder(&request, &ConsoleEvents).await;
        assert!(matches!(result, Err(PipelineError::UploadFailed(_))));
    }
}
