//! The uploader capability.

use std::future::Future;
use std::io;

use bytes::Bytes;
use futures::Stream;

use super::error::StorageError;

/// Something that can store a named byte stream and say where it went.
///
/// The HTTP layer only ever sees this trait, so tests and alternative
/// backends can stand in for S3.
pub trait Uploader: Send + Sync + 'static {
    /// Stores exactly `size` bytes of `content` under `name`.
    ///
    /// Returns the URL of the stored object.
    fn upload<S>(
        &self,
        name: &str,
        content: S,
        size: u64,
    ) -> impl Future<Output = Result<String, StorageError>> + Send
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Unpin;
}
