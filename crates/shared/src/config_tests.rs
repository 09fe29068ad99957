use std::collections::HashMap;
use std::fs;

use proptest::prelude::*;
use rstest::rstest;

use super::*;

fn config_with(vars: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
}

fn write_secret(root: &Path, namespace: &str, file: &str, contents: &str) {
    let dir = root.join(namespace);
    fs::create_dir_all(&dir).expect("create secret namespace");
    fs::write(dir.join(file), contents).expect("write secret");
}

#[test]
fn test_defaults_when_nothing_is_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    let secret_dir = dir.path().to_str().expect("utf-8 path");
    let config = config_with(&[("SECRET_DIR", secret_dir)]);

    assert!(!config.debug);
    assert_eq!(config.server_port, 8080);
    assert_eq!(config.upload_limit_bytes, DEFAULT_UPLOAD_LIMIT_BYTES);
    assert_eq!(config.s3.endpoint, "localhost:9000");
    assert!(!config.s3.secure);
    assert_eq!(config.s3.access_key, "TEST");
    assert_eq!(config.s3.secret_key, "TEST");
    assert_eq!(config.s3.upload_bucket, "upload");
    assert_eq!(config.s3.region, "us-east-1");
    assert_eq!(config.seq.url, "http://localhost:5341");
}

#[test]
fn test_environment_overrides_defaults() {
    let config = config_with(&[
        ("DEBUG", "TRUE"),
        ("SERVER_PORT", "9090"),
        ("S3_SCHEME", "https"),
        ("S3_HOST", "minio.internal"),
        ("S3_PORT", "9443"),
        ("S3_ACCESS_KEY", "AKIA"),
        ("S3_SECRET_KEY", "shh"),
        ("S3_UPLOAD_BUCKET", "incoming"),
        ("SEQ_SCHEME", "https"),
        ("SEQ_HOST", "seq.internal"),
        ("SEQ_PORT", "443"),
    ]);

    assert!(config.debug);
    assert_eq!(config.server_port, 9090);
    assert_eq!(config.s3.endpoint, "minio.internal:9443");
    assert!(config.s3.secure);
    assert_eq!(config.s3.endpoint_url(), "https://minio.internal:9443");
    assert_eq!(config.s3.access_key, "AKIA");
    assert_eq!(config.s3.secret_key, "shh");
    assert_eq!(config.s3.upload_bucket, "incoming");
    assert_eq!(config.seq.url, "https://seq.internal:443");
}

#[test]
fn test_empty_environment_variable_counts_as_unset() {
    let config = config_with(&[("S3_HOST", ""), ("S3_UPLOAD_BUCKET", "")]);
    assert_eq!(config.s3.endpoint, "localhost:9000");
    assert_eq!(config.s3.upload_bucket, "upload");
}

#[test]
fn test_secret_file_overrides_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_secret(dir.path(), "s3", "access-key", "from-secret\n");
    write_secret(dir.path(), "s3", "upload-bucket", "secret-bucket");
    write_secret(dir.path(), "seq", "host", "seq.secret\r\n");

    let secret_dir = dir.path().to_str().expect("utf-8 path");
    let config = config_with(&[
        ("SECRET_DIR", secret_dir),
        ("S3_ACCESS_KEY", "from-env"),
        ("S3_SECRET_KEY", "env-secret"),
    ]);

    assert_eq!(config.s3.access_key, "from-secret");
    assert_eq!(config.s3.upload_bucket, "secret-bucket");
    assert_eq!(config.s3.secret_key, "env-secret");
    assert_eq!(config.seq.url, "http://seq.secret:5341");
}

#[test]
fn test_unreadable_secret_falls_back_to_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    // A directory where the secret file should be cannot be read as a string.
    fs::create_dir_all(dir.path().join("s3").join("host")).expect("create dir");

    let secret_dir = dir.path().to_str().expect("utf-8 path");
    let config = config_with(&[("SECRET_DIR", secret_dir), ("S3_HOST", "env-host")]);

    assert_eq!(config.s3.endpoint, "env-host:9000");
}

#[test]
fn test_secret_port_80_is_omitted_from_endpoint() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_secret(dir.path(), "s3", "host", "storage.example.com");
    write_secret(dir.path(), "s3", "port", "80");

    let secret_dir = dir.path().to_str().expect("utf-8 path");
    let config = config_with(&[("SECRET_DIR", secret_dir), ("S3_PORT", "9000")]);

    assert_eq!(config.s3.endpoint, "storage.example.com");
}

#[rstest]
#[case("abc")]
#[case("80.5")]
#[case("70000")]
#[case("-1")]
#[case(" 8081")]
fn test_invalid_server_port_falls_back(#[case] raw: &str) {
    let config = config_with(&[("SERVER_PORT", raw)]);
    assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
}

#[test]
fn test_invalid_upload_limit_falls_back() {
    let config = config_with(&[("UPLOAD_LIMIT_BYTES", "lots")]);
    assert_eq!(config.upload_limit_bytes, DEFAULT_UPLOAD_LIMIT_BYTES);

    let config = config_with(&[("UPLOAD_LIMIT_BYTES", "1024")]);
    assert_eq!(config.upload_limit_bytes, 1024);
}

#[rstest]
#[case("true", true)]
#[case("True", true)]
#[case("TRUE", true)]
#[case("false", false)]
#[case("1", false)]
#[case("yes", false)]
fn test_debug_flag(#[case] raw: &str, #[case] expected: bool) {
    assert_eq!(config_with(&[("DEBUG", raw)]).debug, expected);
}

#[rstest]
#[case("localhost", "9000", "localhost:9000")]
#[case("localhost", "80", "localhost")]
#[case("localhost", "", "localhost")]
#[case("s3.amazonaws.com", "443", "s3.amazonaws.com:443")]
#[case("10.0.0.1", "8080", "10.0.0.1:8080")]
fn test_s3_endpoint(#[case] host: &str, #[case] port: &str, #[case] expected: &str) {
    assert_eq!(s3_endpoint(host, port), expected);
}

#[test]
fn test_loading_twice_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_secret(dir.path(), "s3", "secret-key", "stable");
    let secret_dir = dir.path().to_str().expect("utf-8 path");
    let vars = [("SECRET_DIR", secret_dir), ("S3_HOST", "minio"), ("DEBUG", "true")];

    assert_eq!(config_with(&vars), config_with(&vars));
}

#[test]
fn test_load_reads_process_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let secret_dir = dir.path().to_str().expect("utf-8 path");

    temp_env::with_vars(
        [
            ("SECRET_DIR", Some(secret_dir)),
            ("SERVER_PORT", Some("not-a-port")),
            ("S3_HOST", Some("minio")),
            ("S3_PORT", Some("80")),
            ("S3_UPLOAD_BUCKET", None),
        ],
        || {
            let config = AppConfig::load();
            assert_eq!(config.server_port, 8080);
            assert_eq!(config.s3.endpoint, "minio");
            assert_eq!(config.s3.upload_bucket, "upload");
        },
    );
}

proptest! {
    #[test]
    fn prop_endpoint_port_suffix(host in "[a-z][a-z0-9.-]{0,30}", port in "[0-9]{0,5}") {
        let endpoint = s3_endpoint(&host, &port);
        if port.is_empty() || port == "80" {
            prop_assert_eq!(endpoint, host);
        } else {
            prop_assert_eq!(endpoint, format!("{host}:{port}"));
        }
    }
}
