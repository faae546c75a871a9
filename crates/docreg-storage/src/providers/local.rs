//! Local filesystem storage provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use docreg_core::error::{AppError, ErrorKind};
use docreg_core::result::AppResult;
use docreg_core::traits::storage::StorageProvider;

use super::validate_path;

/// Stores blobs as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a provider rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        Ok(self.root.join(validate_path(path)?))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn io_error(e: std::io::Error, action: &str, path: &str) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("File not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {path}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| io_error(e, "read file", path))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        // Write to a sibling temp file and rename, so readers never observe
        // a partially written blob.
        let tmp_path = full_path.with_extension("partial");
        fs::write(&tmp_path, &data)
            .await
            .map_err(|e| io_error(e, "write file", path))?;
        fs::rename(&tmp_path, &full_path)
            .await
            .map_err(|e| io_error(e, "move file into place", path))?;

        debug!(path, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e, "delete file", path)),
        }
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path)
            .await
            .map_err(|e| io_error(e, "stat file", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider() -> (tempfile::TempDir, LocalStorageProvider) {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        (dir, provider)
    }

    #[tokio::test]
    async fn test_write_read_delete() {
        let (_dir, provider) = provider().await;

        let data = Bytes::from("%PDF-1.4 test");
        provider
            .write("documents/generated/abc.pdf", data.clone())
            .await
            .unwrap();
        assert!(provider.exists("documents/generated/abc.pdf").await.unwrap());

        let read_back = provider
            .read_bytes("documents/generated/abc.pdf")
            .await
            .unwrap();
        assert_eq!(read_back, data);

        provider.delete("documents/generated/abc.pdf").await.unwrap();
        assert!(!provider.exists("documents/generated/abc.pdf").await.unwrap());
        provider.delete("documents/generated/abc.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_dir, provider) = provider().await;
        let err = provider.read_bytes("nope.pdf").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let (_dir, provider) = provider().await;
        let err = provider
            .write("../outside.pdf", Bytes::from("x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_health_check_tracks_root() {
        let (dir, provider) = provider().await;
        assert!(provider.health_check().await.unwrap());

        drop(dir);
        assert!(!provider.health_check().await.unwrap());
    }
}
