//! In-process storage provider.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::traits::storage::StorageProvider;

use super::validate_path;

/// Keeps blobs in a concurrent map. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageProvider {
    blobs: Arc<DashMap<String, Bytes>>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blob is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let key = validate_path(path)?;
        self.blobs
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("File not found: {path}")))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let key = validate_path(path)?;
        self.blobs.insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let key = validate_path(path)?;
        self.blobs.remove(key);
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let key = validate_path(path)?;
        Ok(self.blobs.contains_key(key))
    }
}
