//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage client could not be built from configuration.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Existence check for the upload bucket failed.
    #[error("error checking existence of bucket '{bucket}': {message}")]
    BucketCheck {
        /// Bucket that was checked.
        bucket: String,
        /// Backend error text.
        message: String,
    },

    /// Creating the missing upload bucket failed.
    #[error("error creating bucket '{bucket}': {message}")]
    BucketCreate {
        /// Bucket that could not be created.
        bucket: String,
        /// Backend error text.
        message: String,
    },

    /// The content ended before the declared size was reached.
    #[error("upload content ended after {actual} of {expected} bytes")]
    SizeMismatch {
        /// Declared size.
        expected: u64,
        /// Bytes actually received.
        actual: u64,
    },

    /// Reading the upload content failed.
    #[error("failed to read upload content: {0}")]
    Read(#[from] std::io::Error),

    /// OpenDAL operation error, passed through unchanged.
    #[error("storage operation failed: {0}")]
    Operation(#[from] opendal::Error),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a bucket check error.
    #[must_use]
    pub fn bucket_check(bucket: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BucketCheck {
            bucket: bucket.into(),
            message: message.into(),
        }
    }

    /// Create a bucket creation error.
    #[must_use]
    pub fn bucket_create(bucket: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BucketCreate {
            bucket: bucket.into(),
            message: message.into(),
        }
    }

    /// Create a size mismatch error.
    #[must_use]
    pub fn size_mismatch(expected: u64, actual: u64) -> Self {
        Self::SizeMismatch { expected, actual }
    }
}
