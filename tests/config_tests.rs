//! Config file layering and validation through the public API.

use std::path::PathBuf;

use inventory_enrich::config::{
    generate_example_config, load_config_file, OutputFormat, Validatable,
};
use inventory_enrich::AppConfig;

#[test]
fn test_example_config_loads_and_validates() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(".inventory-enrich.yaml");
    std::fs::write(&path, generate_example_config()).unwrap();

    let config = load_config_file(&path).unwrap();
    assert_eq!(config, AppConfig::default());
    assert!(config.is_valid());
}

#[test]
fn test_cli_overrides_win_over_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("enrich.yaml");
    std::fs::write(
        &path,
        "baselines:\n  index_url: https://baselines.example.com/index.json\ngraph:\n  max_depth: 3\n",
    )
    .unwrap();

    let overrides = AppConfig::builder()
        .baseline_directory("./baseline-sboms")
        .build();
    let (config, loaded_from) = AppConfig::from_file_with_overrides(Some(&path), &overrides);

    assert_eq!(loaded_from, Some(path));
    assert_eq!(config.baselines.directory, Some(PathBuf::from("./baseline-sboms")));
    assert_eq!(config.baselines.index_url, None);
    // Defaults in the override leave file values alone
    assert_eq!(config.graph.max_depth, 3);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(config.is_valid());
}

#[test]
fn test_invalid_file_reports_every_problem() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("enrich.yaml");
    std::fs::write(
        &path,
        "classification:\n  high_ratio: 2.0\ndiscovery:\n  max_candidates: 0\nbaselines:\n  timeout_secs: 0\n",
    )
    .unwrap();

    let config = load_config_file(&path).unwrap();
    let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
    assert!(fields.contains(&"classification.high_ratio".to_string()));
    assert!(fields.contains(&"discovery.max_candidates".to_string()));
    assert!(fields.iter().any(|f| f.starts_with("baselines")));
}
