use crate::error::{PipelineError, Result};
use crate::scan::base_name;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub results_file: PathBuf,
    pub metadata_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub updated: usize,
    pub skipped: usize,
    pub up_to_date: usize,
}

/// Patches the `image` field of every metadata file that has a matching
/// upload URL. Unlike the optimizer there is no per-file recovery here:
/// a malformed metadata file fails the whole run.
pub fn update_metadata(config: &MetadataConfig) -> Result<ReconcileSummary> {
    let results_raw = fs::read_to_string(&config.results_file)?;
    let results: Value = serde_json::from_str(&results_raw)
        .map_err(|e| PipelineError::InvalidResultsFile(e.to_string()))?;
    let url_map = build_url_map(&results)?;

    let mut updated = 0usize;
    let mut skipped = 0usize;
    let mut up_to_date = 0usize;

    for (file_name, path) in metadata_entries(&config.metadata_dir)? {
        let Some(url) = lookup_url(&url_map, &file_name) else {
            eprintln!("⚠️  [SKIP] No URL found for: {}", file_name);
            skipped += 1;
            continue;
        };

        let metadata_raw = fs::read_to_string(&path)?;
        let mut metadata: Value = serde_json::from_str(&metadata_raw)
            .map_err(|e| PipelineError::InvalidMetadata(path.clone(), e.to_string()))?;

        if metadata.get("image").and_then(Value::as_str) == Some(url) {
            println!("✅ [OK] {} (already up to date)", file_name);
            up_to_date += 1;
            continue;
        }

        match metadata.as_object_mut() {
            Some(object) => {
                object.insert("image".to_string(), Value::String(url.to_string()));
            }
            None => {
                return Err(PipelineError::InvalidMetadata(
                    path.clone(),
                    "not a JSON object".to_string(),
                ));
            }
        }

        // Whole-object re-serialization keeps every other field verbatim.
        let body = serde_json::to_string_pretty(&metadata)
            .map_err(|e| PipelineError::InvalidMetadata(path.clone(), e.to_string()))?;
        fs::write(&path, body)?;
        println!("📝 [UPDATED] {}", file_name);
        updated += 1;
    }

    println!("\n✅ Done. Updated: {}, Skipped: {}", updated, skipped);

    Ok(ReconcileSummary {
        updated,
        skipped,
        up_to_date,
    })
}

/// Builds the lookup from stripped base file name to upload URL. Accepts
/// either a `files` or an `images` array; colliding names are
/// last-write-wins.
pub fn build_url_map(results: &Value) -> Result<HashMap<String, String>> {
    let files = results
        .get("files")
        .or_else(|| results.get("images"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PipelineError::InvalidResultsFile("missing 'files' or 'images' array".to_string())
        })?;

    let mut map = HashMap::new();
    for entry in files {
        let (Some(file_name), Some(url)) = (
            entry.get("fileName").and_then(Value::as_str),
            entry.get("url").and_then(Value::as_str),
        ) else {
            continue;
        };
        map.insert(base_name(file_name).to_string(), url.to_string());
    }
    Ok(map)
}

/// Matches a metadata entry against the URL map: first by its exact file
/// name, then by its own base name (so `cat.json` finds the record for
/// `cat.jpg`).
fn lookup_url<'a>(map: &'a HashMap<String, String>, metadata_file_name: &str) -> Option<&'a str> {
    map.get(metadata_file_name)
        .or_else(|| map.get(base_name(metadata_file_name)))
        .map(String::as_str)
}

/// Every file directly inside the metadata directory, in listing order.
/// A missing or unreadable directory is fatal here.
fn metadata_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            entries.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_results(dir: &Path, files: Value) -> PathBuf {
        let path = dir.join("upload-results.json");
        fs::write(&path, serde_json::to_string_pretty(&json!({ "files": files })).unwrap())
            .unwrap();
        path
    }

    #[test]
    fn test_build_url_map_from_files_field() {
        let results = json!({
            "files": [
                { "fileName": "cat.jpg", "url": "https://arweave.net/m/cat.jpg", "id": "a" },
                { "fileName": "dog.final.png", "url": "https://arweave.net/m/dog.final.png", "id": "b" }
            ]
        });
        let map = build_url_map(&results).unwrap();
        assert_eq!(map.get("cat").unwrap(), "https://arweave.net/m/cat.jpg");
        // Only the final extension segment is stripped.
        assert_eq!(map.get("dog.final").unwrap(), "https://arweave.net/m/dog.final.png");
    }

    #[test]
    fn test_build_url_map_accepts_images_field() {
        let results = json!({
            "images": [{ "fileName": "cat.jpg", "url": "u", "id": "a" }]
        });
        assert_eq!(build_url_map(&results).unwrap().get("cat").unwrap(), "u");
    }

    #[test]
    fn test_build_url_map_missing_arrays_is_error() {
        let results = json!({ "manifestId": "m" });
        assert!(matches!(
            build_url_map(&results),
            Err(PipelineError::InvalidResultsFile(_))
        ));
    }

    #[test]
    fn test_build_url_map_last_write_wins() {
        let results = json!({
            "files": [
                { "fileName": "cat.jpg", "url": "first", "id": "a" },
                { "fileName": "cat.png", "url": "second", "id": "b" }
            ]
        });
        assert_eq!(build_url_map(&results).unwrap().get("cat").unwrap(), "second");
    }

    #[test]
    fn test_lookup_url_exact_then_base_name() {
        let mut map = HashMap::new();
        map.insert("cat.final".to_string(), "u1".to_string());
        map.insert("dog".to_string(), "u2".to_string());

        // Metadata file named exactly like the stripped key.
        assert_eq!(lookup_url(&map, "cat.final"), Some("u1"));
        // Metadata file with its own extension falls back to its base name.
        assert_eq!(lookup_url(&map, "dog.json"), Some("u2"));
        assert_eq!(lookup_url(&map, "bird.json"), None);
    }

    #[test]
    fn test_update_metadata_patches_image_field() {
        let temp_dir = TempDir::new().unwrap();
        let metadata_dir = temp_dir.path().join("metadata");
        fs::create_dir(&metadata_dir).unwrap();
        fs::write(
            metadata_dir.join("cat.json"),
            r#"{"name":"Cat #1","image":"ipfs://old","attributes":[{"trait_type":"fur","value":"orange"}]}"#,
        )
        .unwrap();

        let results_file = write_results(
            temp_dir.path(),
            json!([{ "fileName": "cat.jpg", "url": "https://arweave.net/m/cat.jpg", "id": "a" }]),
        );

        let summary = update_metadata(&MetadataConfig {
            results_file,
            metadata_dir: metadata_dir.clone(),
        })
        .unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped, 0);

        let patched: Value =
            serde_json::from_str(&fs::read_to_string(metadata_dir.join("cat.json")).unwrap())
                .unwrap();
        assert_eq!(patched["image"], "https://arweave.net/m/cat.jpg");
        // Other fields survive the rewrite.
        assert_eq!(patched["name"], "Cat #1");
        assert_eq!(patched["attributes"][0]["value"], "orange");
    }

    #[test]
    fn test_update_metadata_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let metadata_dir = temp_dir.path().join("metadata");
        fs::create_dir(&metadata_dir).unwrap();
        fs::write(metadata_dir.join("cat.json"), r#"{"image":"old"}"#).unwrap();

        let results_file = write_results(
            temp_dir.path(),
            json!([{ "fileName": "cat.jpg", "url": "new-url", "id": "a" }]),
        );
        let config = MetadataConfig {
            results_file,
            metadata_dir: metadata_dir.clone(),
        };

        let first = update_metadata(&config).unwrap();
        assert_eq!(first.updated, 1);
        let after_first = fs::read(metadata_dir.join("cat.json")).unwrap();

        let second = update_metadata(&config).unwrap();
        assert_eq!(second.updated, 0);
        assert_eq!(second.up_to_date, 1);
        let after_second = fs::read(metadata_dir.join("cat.json")).unwrap();

        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_update_metadata_skips_unmatched_entries() {
        let temp_dir = TempDir::new().unwrap();
        let metadata_dir = temp_dir.path().join("metadata");
        fs::create_dir(&metadata_dir).unwrap();
        fs::write(metadata_dir.join("stranger.json"), r#"{"image":"x"}"#).unwrap();

        let results_file = write_results(
            temp_dir.path(),
            json!([{ "fileName": "cat.jpg", "url": "u", "id": "a" }]),
        );

        let summary = update_metadata(&MetadataConfig {
            results_file,
            metadata_dir,
        })
        .unwrap();
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_update_metadata_malformed_metadata_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let metadata_dir = temp_dir.path().join("metadata");
        fs::create_dir(&metadata_dir).unwrap();
        fs::write(metadata_dir.join("cat.json"), "{ not json").unwrap();

        let results_file = write_results(
            temp_dir.path(),
            json!([{ "fileName": "cat.jpg", "url": "u", "id": "a" }]),
        );

        let result = update_metadata(&MetadataConfig {
            results_file,
            metadata_dir,
        });
        assert!(matches!(result, Err(PipelineError::InvalidMetadata(_, _))));
    }

    #[test]
    fn test_update_metadata_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let results_file = write_results(temp_dir.path(), json!([]));

        let result = update_metadata(&MetadataConfig {
            results_file,
            metadata_dir: temp_dir.path().join("no-such-dir"),
        });
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }
}
