//! Shared configuration, errors, and telemetry for Upgate.
//!
//! This crate provides what every other crate leans on:
//! - Configuration resolution from secret files, environment, and defaults
//! - Application-wide error types
//! - Tracing setup, including the Seq log sink

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{AppConfig, S3Config, SeqConfig};
pub use error::{AppError, AppResult};
