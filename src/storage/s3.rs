use super::ObjectStore;
use crate::utils::AppError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// S3 bucket holding the workbook. Credentials come from the default AWS
/// provider chain (env vars, profile, instance role).
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub async fn new(region: &str, bucket: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            client: Client::new(&sdk_config),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        log::debug!("📥 GET s3://{}/{}", self.bucket, key);

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::info!("ℹ️  s3://{}/{} does not exist yet", self.bucket, key);
                    return Ok(None);
                }
                return Err(AppError::StorageError(format!(
                    "Failed to fetch s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&service_err)
                )));
            }
        };

        let body = output.body.collect().await.map_err(|e| {
            AppError::StorageError(format!("Failed to read s3://{}/{}: {}", self.bucket, key, e))
        })?;

        Ok(Some(body.into_bytes().to_vec()))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        log::debug!("📤 PUT s3://{}/{} ({} bytes)", self.bucket, key, body.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                AppError::StorageError(format!(
                    "Failed to upload s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}
