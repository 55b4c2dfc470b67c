//! End-to-end validation and URL scenarios against the public API.

use dataset_config::{DatasetConfig, InvalidConfig, build_connection_url};
use std::error::Error;

#[test]
fn defaulted_mount_path_and_tcp_url() -> Result<(), Box<dyn Error>> {
    let mut config = DatasetConfig::new("test-dataset", "default").with_replicas(1);
    config.validate_and_normalize()?;

    assert_eq!(config.mount_path, "/mnt/data");
    assert_eq!(
        build_connection_url(&config),
        "tcp://test-dataset.default:8080"
    );
    Ok(())
}

#[test]
fn empty_name_fails() {
    let mut config = DatasetConfig::new("", "").with_replicas(1);
    let error = config.validate_and_normalize().err();

    assert!(
        error
            .map(|error| error.to_string())
            .is_some_and(|message| message.contains("name cannot be empty"))
    );
}

#[test]
fn temporary_storage_with_two_replicas_fails() {
    let mut config = DatasetConfig::new("x", "")
        .with_replicas(2)
        .with_option("storage", "temporary");
    let error = config.validate_and_normalize().err();

    assert_eq!(
        error,
        Some(InvalidConfig::TemporaryStorageReplicas { replicas: 2 })
    );
    assert!(error.is_some_and(|error| {
        error
            .to_string()
            .contains("temporary storage does not support replicas > 1")
    }));
}

#[test]
fn temporary_storage_with_one_replica_succeeds() -> Result<(), Box<dyn Error>> {
    let mut config = DatasetConfig::new("x", "")
        .with_replicas(1)
        .with_option("storage", "temporary");
    config.validate_and_normalize()?;
    Ok(())
}

#[test]
fn ssl_url_with_empty_namespace() {
    let config = DatasetConfig::new("ginkgo-test", "").with_option("ssl", "true");
    assert_eq!(build_connection_url(&config), "ssl://ginkgo-test.:8080");
}

#[test]
fn double_slash_mount_path_is_collapsed() -> Result<(), Box<dyn Error>> {
    let mut config = DatasetConfig::new("x", "").with_mount_path("//data/path");
    config.validate_and_normalize()?;

    assert_eq!(config.mount_path, "/data/path");
    Ok(())
}

// Only the first `//` is rewritten. Kept as-is until owners decide whether
// leading slashes should collapse fully.
#[test]
fn triple_slash_mount_path_keeps_a_double_slash() -> Result<(), Box<dyn Error>> {
    let config = DatasetConfig::new("x", "")
        .with_mount_path("///a")
        .into_validated()?;

    assert_eq!(config.mount_path, "//a");
    Ok(())
}

#[test]
fn url_builder_is_independent_of_validation() {
    let unvalidated = DatasetConfig::new("x", "ns").with_replicas(-9);
    let mut validated = unvalidated.clone();
    let _ = validated.validate_and_normalize();

    assert_eq!(
        build_connection_url(&unvalidated),
        build_connection_url(&validated)
    );
}
