//! Configuration loading.

use photoferry::{FailureClass, PhotoferryConfig, QualityTier};

#[test]
fn test_file_overrides_bundled_defaults_key_by_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photoferry.toml");
    std::fs::write(
        &path,
        r#"
[upload]
threads = 8
quality = "saver"
max_retries = 5

[filter]
expression = "*.tmp"

[cache]
path = "/var/cache/photoferry/ids.json"
autosave = false

[service]
api_endpoint = "http://localhost:8080"
"#,
    )
    .unwrap();

    let config = PhotoferryConfig::from_file(&path).unwrap();

    assert_eq!(*config.upload().threads(), 8);
    assert_eq!(*config.upload().quality(), QualityTier::Saver);
    assert_eq!(*config.upload().retry_policy().max_retries(), 5);
    assert_eq!(*config.upload().retry_policy().initial_backoff_ms(), 500);
    assert_eq!(*config.upload().transfer_config().chunk_size(), 4 * 1024 * 1024);
    assert_eq!(config.filter().expression().as_deref(), Some("*.tmp"));
    assert!(*config.filter().exclude());
    assert!(!config.cache().autosave());
    assert!(config.cache().resolved_path().ends_with("ids.json"));
    assert_eq!(config.service().api_endpoint(), "http://localhost:8080");
    assert_eq!(config.service().language(), "en_US");
    config.validate().unwrap();
}

#[test]
fn test_missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = PhotoferryConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(error.class(), FailureClass::Config);
}

#[test]
fn test_unknown_quality_is_rejected() {
    let error = PhotoferryConfig::from_toml_str("[upload]\nquality = \"lossless\"\n").unwrap_err();
    assert_eq!(error.class(), FailureClass::Config);
}

#[test]
fn test_empty_document_uses_type_defaults() {
    let config = PhotoferryConfig::from_toml_str("").unwrap();
    assert_eq!(config, PhotoferryConfig::default());
    assert_eq!(*config.upload().threads(), 1);
    assert!(config.cache().autosave());
}

#[test]
fn test_validation_rejects_unusable_values() {
    let no_workers = PhotoferryConfig::from_toml_str("[upload]\nthreads = 0\n").unwrap();
    assert_eq!(no_workers.validate().unwrap_err().class(), FailureClass::Config);

    let no_chunks = PhotoferryConfig::from_toml_str("[upload]\nchunk_size = 0\n").unwrap();
    assert_eq!(no_chunks.validate().unwrap_err().class(), FailureClass::Config);
}
