//! Application configuration management.
//!
//! Each setting resolves through three layers, highest precedence first:
//!
//! 1. a mounted secret file at `<SECRET_DIR>/<namespace>/<key>`
//! 2. an environment variable
//! 3. a hard-coded default
//!
//! Loading never fails. Unreadable secrets, unset variables and values that
//! do not parse all degrade to the next layer down.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use config::{Config, Environment, Map};

/// Default HTTP listen port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default request body limit for uploads: 32 MiB.
pub const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Port that is left out of the assembled storage endpoint.
const IMPLICIT_HTTP_PORT: &str = "80";

/// Environment variables consulted by the loader.
const ENV_VARS: &[&str] = &[
    "DEBUG",
    "SERVER_PORT",
    "UPLOAD_LIMIT_BYTES",
    "SECRET_DIR",
    "S3_SCHEME",
    "S3_HOST",
    "S3_PORT",
    "S3_ACCESS_KEY",
    "S3_SECRET_KEY",
    "S3_UPLOAD_BUCKET",
    "S3_REGION",
    "SEQ_SCHEME",
    "SEQ_HOST",
    "SEQ_PORT",
];

/// Settings that a secret file may supply, as `(namespace, file, setting)`.
const SECRET_SETTINGS: &[(&str, &str, &str)] = &[
    ("s3", "scheme", "s3_scheme"),
    ("s3", "host", "s3_host"),
    ("s3", "port", "s3_port"),
    ("s3", "access-key", "s3_access_key"),
    ("s3", "secret-key", "s3_secret_key"),
    ("s3", "upload-bucket", "s3_upload_bucket"),
    ("s3", "region", "s3_region"),
    ("seq", "scheme", "seq_scheme"),
    ("seq", "host", "seq_host"),
    ("seq", "port", "seq_port"),
];

/// Application configuration.
///
/// Built once at startup and shared read-only for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Verbose logging requested.
    pub debug: bool,
    /// Port the HTTP server listens on.
    pub server_port: u16,
    /// Maximum accepted request body for `/upload`, in bytes.
    pub upload_limit_bytes: usize,
    /// Object storage configuration.
    pub s3: S3Config,
    /// Log sink configuration.
    pub seq: SeqConfig,
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// `host` or `host:port`.
    pub endpoint: String,
    /// Whether the endpoint speaks TLS.
    pub secure: bool,
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Bucket receiving uploads.
    pub upload_bucket: String,
    /// Signing region.
    pub region: String,
}

impl S3Config {
    /// Endpoint with its scheme, as S3 clients expect it.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}", self.endpoint)
    }
}

/// Seq log sink configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqConfig {
    /// Base URL of the Seq server, e.g. `http://localhost:5341`.
    pub url: String,
}

impl AppConfig {
    /// Loads configuration from the process environment and secret files.
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = environment_map(lookup);
        let secret_dir = env.get("secret_dir").cloned().unwrap_or_default();
        let secrets = secret_map(Path::new(&secret_dir));

        let layers = Layers(
            Config::builder()
                .add_source(Environment::default().source(Some(env)))
                .add_source(Environment::default().source(Some(secrets)))
                .build()
                .unwrap_or_default(),
        );

        let s3_port = layers.string("s3_port", "9000");
        let s3 = S3Config {
            endpoint: s3_endpoint(&layers.string("s3_host", "localhost"), &s3_port),
            secure: layers.string("s3_scheme", "http") == "https",
            access_key: layers.string("s3_access_key", "TEST"),
            secret_key: layers.string("s3_secret_key", "TEST"),
            upload_bucket: layers.string("s3_upload_bucket", "upload"),
            region: layers.string("s3_region", "us-east-1"),
        };

        let seq = SeqConfig {
            url: format!(
                "{}://{}:{}",
                layers.string("seq_scheme", "http"),
                layers.string("seq_host", "localhost"),
                layers.string("seq_port", "5341"),
            ),
        };

        Self {
            debug: layers.string("debug", "false").to_lowercase() == "true",
            server_port: layers.parsed("server_port", DEFAULT_SERVER_PORT),
            upload_limit_bytes: layers.parsed("upload_limit_bytes", DEFAULT_UPLOAD_LIMIT_BYTES),
            s3,
            seq,
        }
    }
}

/// Joins a storage host and port, leaving the port out when it is empty or 80.
#[must_use]
pub fn s3_endpoint(host: &str, port: &str) -> String {
    if port.is_empty() || port == IMPLICIT_HTTP_PORT {
        host.to_string()
    } else {
        format!("{host}:{port}")
    }
}

/// Resolved settings with per-key defaults.
struct Layers(Config);

impl Layers {
    fn string(&self, key: &str, default: &str) -> String {
        self.0
            .get_string(key)
            .unwrap_or_else(|_| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        self.0
            .get_string(key)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }
}

/// Collects the known environment variables. Empty values count as unset.
fn environment_map<F>(lookup: F) -> Map<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VARS
        .iter()
        .filter_map(|name| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .map(|value| (name.to_lowercase(), value))
        })
        .collect()
}

/// Reads every secret file present under `root`.
fn secret_map(root: &Path) -> Map<String, String> {
    SECRET_SETTINGS
        .iter()
        .filter_map(|(namespace, file, setting)| {
            read_secret(root, namespace, file).map(|value| ((*setting).to_string(), value))
        })
        .collect()
}

/// Reads one secret, stripping a single trailing line terminator.
fn read_secret(root: &Path, namespace: &str, file: &str) -> Option<String> {
    let contents = fs::read_to_string(root.join(namespace).join(file)).ok()?;
    let trimmed = contents
        .strip_suffix('\n')
        .map_or(contents.as_str(), |s| s.strip_suffix('\r').unwrap_or(s));
    Some(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
