use std::path::PathBuf;

use async_trait::async_trait;

use crate::services::normalizer::MediaType;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Store for captured raw-content payloads.
///
/// Storage is optional and best-effort: a put failure is logged by the
/// caller and the snapshot is persisted without a blob reference.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store raw bytes under the given name, returning the stored path.
    async fn put(&self, name: &str, bytes: &[u8], media_type: MediaType)
        -> Result<String, BlobError>;
}

/// Filesystem-backed blob store.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn extension_for(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Html => "html",
        MediaType::Pdf => "pdf",
        MediaType::Text => "txt",
        MediaType::Other => "bin",
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        name: &str,
        bytes: &[u8],
        media_type: MediaType,
    ) -> Result<String, BlobError> {
        let path = self
            .root
            .join(format!("{}.{}", name, extension_for(media_type)));

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_file_and_returns_path() {
        let root = std::env::temp_dir().join("sitewatch-blob-test");
        let store = FsBlobStore::new(&root);

        let path = store
            .put("target-1/snap-1", b"<html>hi</html>", MediaType::Html)
            .await
            .unwrap();

        assert!(path.ends_with("snap-1.html"));
        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, b"<html>hi</html>");

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
