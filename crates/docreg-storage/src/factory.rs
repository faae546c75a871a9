//! Provider selection from configuration.

use std::sync::Arc;

use tracing::info;

use docreg_core::config::StorageConfig;
use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::traits::storage::StorageProvider;

use crate::providers::{LocalStorageProvider, MemoryStorageProvider};

/// Build the provider named by `config.provider` and check that it is
/// reachable.
pub async fn build_provider(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    let provider: Arc<dyn StorageProvider> = match config.provider.as_str() {
        "local" => Arc::new(LocalStorageProvider::new(&config.local.root_path).await?),
        "memory" => Arc::new(MemoryStorageProvider::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown storage provider '{other}'"
            )));
        }
    };
    if !provider.health_check().await? {
        return Err(AppError::storage(format!(
            "Storage provider '{}' is not reachable",
            provider.provider_type()
        )));
    }
    info!(provider = provider.provider_type(), "Storage provider ready");
    Ok(provider)
}
