//! Object storage for uploads.
//!
//! The HTTP layer depends only on the [`Uploader`] capability. The production
//! implementation, [`S3Uploader`], writes through Apache OpenDAL's S3 service:
//!
//! ```text
//! ┌──────────────┐ upload(name, stream, size) ┌────────────┐ PUT object ┌────────────┐
//! │ HTTP handler │ ─────────────────────────▶ │ S3Uploader │ ─────────▶ │ S3 / MinIO │
//! └──────────────┘ ◀───────────────────────── └────────────┘            └────────────┘
//!                         object URL
//! ```

mod bucket;
mod error;
mod naming;
mod s3;
mod uploader;

pub use error::StorageError;
pub use naming::ObjectName;
pub use s3::S3Uploader;
pub use uploader::Uploader;
