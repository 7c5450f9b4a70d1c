use pretty_assertions::assert_eq;
use scov_analysis::{AnalysisConfig, ConfigError, CoverageMatcher, DuplicateClusterer};
use std::io::Write as _;

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[matching]\nbase_threshold = 0.65\nfeature_toggle_adjustment = 0.0\n\n[clustering]\nhigh_threshold = 0.9\n\n[parallel]\nenabled = false"
    )
    .unwrap();

    let config = AnalysisConfig::from_file(file.path()).unwrap();
    assert!((config.matching.base_threshold - 0.65).abs() < f64::EPSILON);
    assert!((config.clustering.high_threshold - 0.9).abs() < f64::EPSILON);
    assert!(!config.parallel.enabled);
    assert_eq!(config.parallel.min_pairs, 10_000);

    assert!(CoverageMatcher::new(config.clone()).is_ok());
    assert!(DuplicateClusterer::new(&config).is_ok());
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = AnalysisConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = AnalysisConfig::from_toml_str("[matching\nbase_threshold = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = AnalysisConfig::from_toml_str("[matching]\nbase_threshold = \"high\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn out_of_range_values_fail_fast() {
    let err = AnalysisConfig::from_toml_str("[matching]\nmin_threshold = -0.2").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidThreshold { .. }));

    let err = AnalysisConfig::from_toml_str("[matching]\nsparse_ratio = -1.0").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRatio { .. }));

    let err = AnalysisConfig::from_toml_str("[clustering]\nmedium_steps_threshold = 1.5").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid threshold `clustering.medium_steps_threshold`: 1.5 is outside [0, 1]"
    );
}

#[test]
fn empty_text_is_default() {
    assert_eq!(AnalysisConfig::from_toml_str("").unwrap(), AnalysisConfig::default());
}
