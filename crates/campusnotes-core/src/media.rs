//! Media storage for uploaded note files
//!
//! Uploads either go to an external media host over HTTP or, when no host is
//! configured, onto the local filesystem. Both backends enforce the size cap
//! and hand back a public URL plus a content hash used for duplicate
//! detection.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::{Error, Result};

/// Request timeout for the media host
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Outcome of a successful upload
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Public URL where the file can be downloaded
    pub url: String,
    /// Hex-encoded SHA-256 of the file contents
    pub hash: String,
    /// Size in bytes
    pub size: u64,
}

/// Hex-encoded SHA-256 of a byte buffer
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Abstraction over where uploaded files end up
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store a file and return its public URL and content hash
    async fn store(&self, filename: &str, data: Vec<u8>) -> Result<StoredFile>;
}

fn check_size(len: usize, max_bytes: u64) -> Result<()> {
    if len as u64 > max_bytes {
        return Err(Error::UploadRejected(format!(
            "File is {} bytes, maximum is {}",
            len, max_bytes
        )));
    }
    Ok(())
}

fn check_not_empty(len: usize) -> Result<()> {
    if len == 0 {
        return Err(Error::UploadRejected("File is empty".to_string()));
    }
    Ok(())
}

/// Media store backed by an external upload API
pub struct RemoteMediaStore {
    http_client: HttpClient,
    upload_url: String,
    api_key: Option<String>,
    max_bytes: u64,
}

impl RemoteMediaStore {
    pub fn new(upload_url: String, api_key: Option<String>, max_bytes: u64) -> Self {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            upload_url,
            api_key,
            max_bytes,
        }
    }
}

#[async_trait]
impl MediaStore for RemoteMediaStore {
    async fn store(&self, filename: &str, data: Vec<u8>) -> Result<StoredFile> {
        check_not_empty(data.len())?;
        check_size(data.len(), self.max_bytes)?;

        let hash = content_hash(&data);
        let size = data.len() as u64;

        let part = Part::bytes(data).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let mut request = self.http_client.post(&self.upload_url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::MediaHost(format!(
                "Upload failed with {}: {}",
                status, body
            )));
        }

        let payload: serde_json::Value = response.json().await?;
        let url = payload
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::MediaHost("Upload response missing file URL".to_string()))?
            .to_string();

        info!(%url, size, "File uploaded to media host");
        Ok(StoredFile { url, hash, size })
    }
}

/// Media store writing to a local directory; files are served under `/files/`
pub struct LocalMediaStore {
    dir: PathBuf,
    max_bytes: u64,
}

impl LocalMediaStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Directory files are written into
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, filename: &str, data: Vec<u8>) -> Result<StoredFile> {
        check_not_empty(data.len())?;
        check_size(data.len(), self.max_bytes)?;

        let hash = content_hash(&data);
        let size = data.len() as u64;

        // Prefix with a UUID so uploads with the same name never collide
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, &data).await?;

        debug!(path = %path.display(), size, "File stored locally");
        Ok(StoredFile {
            url: format!("/files/{}", stored_name),
            hash,
            size,
        })
    }
}

/// Build the media store selected by configuration
pub fn media_store_from_config(config: &MediaConfig) -> anyhow::Result<Box<dyn MediaStore>> {
    if config.upload_url.is_empty() {
        Ok(Box::new(LocalMediaStore::new(
            &config.local_dir,
            config.max_upload_bytes,
        )))
    } else {
        Ok(Box::new(RemoteMediaStore::new(
            config.upload_url.clone(),
            config.resolved_api_key()?,
            config.max_upload_bytes,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash(b"lecture notes");
        let b = content_hash(b"lecture notes");
        let c = content_hash(b"different notes");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_local_store_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalMediaStore::new(dir.path(), 1024);

        let stored = store
            .store("calculus.pdf", b"pdf bytes".to_vec())
            .await
            .unwrap();

        assert!(stored.url.starts_with("/files/"));
        assert!(stored.url.ends_with(".pdf"));
        assert_eq!(stored.size, 9);

        let name = stored.url.strip_prefix("/files/").unwrap();
        let on_disk = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(on_disk, b"pdf bytes");
    }

    #[tokio::test]
    async fn test_local_store_unique_names() {
        let dir = TempDir::new().unwrap();
        let store = LocalMediaStore::new(dir.path(), 1024);

        let first = store.store("notes.pdf", b"one".to_vec()).await.unwrap();
        let second = store.store("notes.pdf", b"two".to_vec()).await.unwrap();
        assert_ne!(first.url, second.url);
    }

    #[tokio::test]
    async fn test_size_cap_enforced() {
        let dir = TempDir::new().unwrap();
        let store = LocalMediaStore::new(dir.path(), 4);

        let result = store.store("big.pdf", vec![0u8; 5]).await;
        assert!(matches!(result, Err(Error::UploadRejected(_))));
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let dir = TempDir::new().unwrap();
        let store = LocalMediaStore::new(dir.path(), 1024);

        let result = store.store("empty.pdf", Vec::new()).await;
        assert!(matches!(result, Err(Error::UploadRejected(_))));
    }

    #[tokio::test]
    async fn test_remote_store_uploads_multipart() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/upload")
                .header("authorization", "Bearer media-key");
            then.status(200)
                .json_body(serde_json::json!({ "url": "https://cdn.example.com/abc.pdf" }));
        });

        let store = RemoteMediaStore::new(
            server.url("/upload"),
            Some("media-key".to_string()),
            1024,
        );
        let stored = store
            .store("algebra.pdf", b"pdf bytes".to_vec())
            .await
            .unwrap();

        assert_eq!(stored.url, "https://cdn.example.com/abc.pdf");
        assert_eq!(stored.hash, content_hash(b"pdf bytes"));
        mock.assert();
    }

    #[tokio::test]
    async fn test_remote_store_host_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(500).body("storage full");
        });

        let store = RemoteMediaStore::new(server.url("/upload"), None, 1024);
        let result = store.store("a.pdf", b"data".to_vec()).await;
        assert!(matches!(result, Err(Error::MediaHost(_))));
    }

    #[tokio::test]
    async fn test_remote_store_missing_url_in_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(200).json_body(serde_json::json!({ "ok": true }));
        });

        let store = RemoteMediaStore::new(server.url("/upload"), None, 1024);
        let result = store.store("a.pdf", b"data".to_vec()).await;
        assert!(matches!(result, Err(Error::MediaHost(_))));
    }
}
