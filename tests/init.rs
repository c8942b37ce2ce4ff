use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_covreport"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "covreport init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".covreport.toml");
    assert!(config_path.exists(), ".covreport.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[thresholds]"));
    assert!(content.contains("[comment]"));

    // The template must parse back into the defaults
    let config = covreport_core::CovConfig::from_toml(&content).unwrap();
    assert_eq!(config.thresholds.overall, 0.8);
    assert!(config.comment.enabled);
    let _raw: toml::Value = toml::from_str(&content).unwrap();
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".covreport.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_covreport"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".covreport.toml")).unwrap(),
        "# existing"
    );
}
