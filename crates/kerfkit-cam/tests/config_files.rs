use kerfkit_cam::{CamError, CompilerConfig};
use kerfkit_core::MeasurementSystem;

#[test]
fn test_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kerfkit.toml");

    let mut config = CompilerConfig::new();
    config.measurement_system = MeasurementSystem::Imperial;
    config.offset.max_extension = 0.2;
    config.offset.snap_threshold = 0.002;
    config.save_to_file(&path).unwrap();

    let loaded = CompilerConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kerfkit.json");
    std::fs::write(&path, r#"{ "tessellation_tolerance": 0.0 }"#).unwrap();

    match CompilerConfig::load_from_file(&path) {
        Err(CamError::InvalidConfig { key, .. }) => assert_eq!(key, "tessellation_tolerance"),
        other => panic!("expected invalid config, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = CompilerConfig::load_from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(CamError::IoError(_))));
}
