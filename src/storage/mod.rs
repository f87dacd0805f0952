//! Whole-object storage for the questionnaire workbook.

pub mod memory;
pub mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::utils::AppError;
use async_trait::async_trait;
use std::sync::Arc;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads the whole object. `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Replaces the whole object.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), AppError>;
}

pub async fn from_config(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match &config.backend {
        StorageBackend::S3 { region, bucket } => {
            log::info!("🪣 Object storage: s3://{}/{} ({})", bucket, config.file_key, region);
            Arc::new(S3ObjectStore::new(region, bucket).await)
        }
        StorageBackend::Memory => {
            log::warn!("⚠️  Object storage: in-memory backend, responses are lost on restart");
            Arc::new(MemoryObjectStore::new())
        }
    }
}
