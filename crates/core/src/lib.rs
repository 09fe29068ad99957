//! Upload storage for Upgate.
//!
//! This crate holds everything between an accepted upload and the object
//! store, with ZERO web dependencies:
//!
//! - `storage` - the uploader capability, its S3 implementation, bucket
//!   provisioning, and object naming

pub mod storage;
