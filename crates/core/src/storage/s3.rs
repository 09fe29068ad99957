//! S3 uploader implementation using Apache OpenDAL.

use std::io;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use opendal::{Operator, Writer, services};
use tracing::{info, warn};
use upgate_shared::S3Config;

use super::bucket;
use super::error::StorageError;
use super::uploader::Uploader;

/// Content type stored with every object.
const OCTET_STREAM: &str = "application/octet-stream";

/// Bytes buffered per write to the backend. S3 multipart parts other than the
/// last must be at least 5 MiB.
const WRITE_CHUNK: usize = 8 * 1024 * 1024;

/// Uploader writing into a single S3 bucket.
pub struct S3Uploader {
    operator: Operator,
    bucket: String,
    endpoint: String,
}

impl S3Uploader {
    /// Connects to the configured backend and provisions the upload bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built, or the bucket can be
    /// neither found nor created. The caller should not serve traffic then.
    pub async fn connect(config: &S3Config) -> Result<Self, StorageError> {
        info!(endpoint = %config.endpoint, secure = config.secure, "initializing object storage client");
        let operator = Self::create_operator(config)?;

        bucket::ensure_bucket(config).await?;

        Ok(Self::new(operator, &config.upload_bucket, &config.endpoint))
    }

    /// Wraps an existing operator rooted at `bucket`.
    #[must_use]
    pub fn new(operator: Operator, bucket: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            operator,
            bucket: bucket.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Create OpenDAL operator from storage config.
    fn create_operator(config: &S3Config) -> Result<Operator, StorageError> {
        let builder = services::S3::default()
            .endpoint(&config.endpoint_url())
            .bucket(&config.upload_bucket)
            .access_key_id(&config.access_key)
            .secret_access_key(&config.secret_key)
            .region(&config.region);

        Ok(Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish())
    }

    /// Display URL for an object.
    ///
    /// Built locally from bucket and endpoint; it only resolves where the
    /// backend serves virtual-hosted buckets over TLS.
    #[must_use]
    pub fn object_url(&self, name: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.endpoint, name)
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl Uploader for S3Uploader {
    async fn upload<S>(&self, name: &str, content: S, size: u64) -> Result<String, StorageError>
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Unpin,
    {
        let url = self.object_url(name);
        info!("uploading to {url}");

        let mut writer = self
            .operator
            .writer_with(name)
            .content_type(OCTET_STREAM)
            .chunk(WRITE_CHUNK)
            .await?;

        match write_exact(&mut writer, content, size).await {
            Ok(written) => {
                writer.close().await?;
                info!(size = written, "successfully uploaded {url} of size {written}");
                Ok(url)
            }
            Err(err) => {
                if let Err(abort_err) = writer.abort().await {
                    warn!(error = %abort_err, object = name, "failed to abort partial upload");
                }
                Err(err)
            }
        }
    }
}

/// Copies exactly `size` bytes from `content` into `writer`.
///
/// Bytes past `size` are not written.
async fn write_exact<S>(writer: &mut Writer, mut content: S, size: u64) -> Result<u64, StorageError>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    let mut written: u64 = 0;

    while written < size {
        let Some(chunk) = content.next().await else {
            return Err(StorageError::size_mismatch(size, written));
        };
        let mut chunk = chunk?;

        let remaining = size - written;
        if let Ok(remaining) = usize::try_from(remaining) {
            chunk.truncate(remaining);
        }
        if chunk.is_empty() {
            continue;
        }

        written += chunk.len() as u64;
        writer.write(chunk).await?;
    }

    Ok(written)
}
