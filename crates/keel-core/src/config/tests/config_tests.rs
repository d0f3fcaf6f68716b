// crates/keel-core/src/config/tests/config_tests.rs
#![cfg(test)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::config::{Config, ConfigError, ConfigFormat};

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("keel.json")).unwrap(), ConfigFormat::Json);
    assert_eq!(ConfigFormat::from_path(Path::new("keel.ini")).unwrap(), ConfigFormat::Ini);
    assert_eq!(ConfigFormat::from_path(Path::new("keel.conf")).unwrap(), ConfigFormat::Ini);
    assert_eq!(ConfigFormat::from_path(Path::new("keel")).unwrap(), ConfigFormat::Ini);
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("KEEL.TOML")).unwrap(), ConfigFormat::Toml);
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("keel.yml")).unwrap(), ConfigFormat::Yaml);
}

#[test]
fn test_section_queries() {
    let mut config = Config::new();
    config.set("core", "database.name", "keel");
    config.add_section("empty");

    assert!(config.has_section("core"));
    assert!(config.has_section("empty"));
    assert!(!config.has_section("missing"));
    assert_eq!(config.sections().collect::<Vec<_>>(), vec!["core", "empty"]);
    assert_eq!(config.get("core", "database.name"), Some("keel"));
    assert_eq!(config.items("core").map(|items| items.len()), Some(1));
    assert!(config.items("missing").is_none());
    assert!(config.settings("missing").is_empty());
    assert_eq!(config.settings("core").get("database.name"), Some("keel"));
}

#[test]
fn test_interpolation_substitutes_environment_variables() {
    let mut config = Config::parse(
        "[core]\ndatabase.host = %(DB_HOST)s\ndatabase.name = %(DB_NAME)s_%(STAGE)s\nratio = 50%%\nplain = untouched\n",
        ConfigFormat::Ini,
    )
    .unwrap();

    config
        .interpolate(&vars(&[("DB_HOST", "db.internal"), ("DB_NAME", "keel"), ("STAGE", "test")]))
        .unwrap();

    assert_eq!(config.get("core", "database.host"), Some("db.internal"));
    assert_eq!(config.get("core", "database.name"), Some("keel_test"));
    assert_eq!(config.get("core", "ratio"), Some("50%"));
    assert_eq!(config.get("core", "plain"), Some("untouched"));
}

#[test]
fn test_interpolation_of_undefined_variable_fails() {
    let mut config = Config::parse("[web]\nroot = %(NOPE)s/static\n", ConfigFormat::Ini).unwrap();
    let err = config.interpolate(&vars(&[])).unwrap_err();
    match err {
        ConfigError::UndefinedVariable { section, key, variable } => {
            assert_eq!(section, "web");
            assert_eq!(key, "root");
            assert_eq!(variable, "NOPE");
        }
        other => panic!("Expected undefined variable, got {:?}", other),
    }
}

#[test]
fn test_interpolation_rejects_stray_percent() {
    let mut config = Config::parse("[web]\nlabel = 100% sure\nfmt = %(X)d\n", ConfigFormat::Ini).unwrap();
    let err = config.interpolate(&vars(&[("X", "1")])).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedInterpolation { offset: 3, .. }));
}

#[test]
fn test_json_sections_are_flattened() {
    let text = r#"{
        "core": {
            "database": { "host": "db", "port": 5432 },
            "components.ignore": ["audit", "legacy"],
            "debug": true
        },
        "web": {}
    }"#;
    let config = Config::parse(text, ConfigFormat::Json).unwrap();

    assert_eq!(config.sections().collect::<Vec<_>>(), vec!["core", "web"]);
    assert_eq!(config.get("core", "database.host"), Some("db"));
    assert_eq!(config.get("core", "database.port"), Some("5432"));
    assert_eq!(config.get("core", "components.ignore"), Some("audit, legacy"));
    assert_eq!(config.get("core", "debug"), Some("true"));
    assert!(config.has_section("web"));
}

#[test]
fn test_json_top_level_must_be_sections() {
    assert!(matches!(
        Config::parse("[1, 2]", ConfigFormat::Json),
        Err(ConfigError::Parse { .. })
    ));
    assert!(matches!(
        Config::parse(r#"{"core": 1}"#, ConfigFormat::Json),
        Err(ConfigError::Parse { .. })
    ));
    assert!(matches!(
        Config::parse("{not json", ConfigFormat::Json),
        Err(ConfigError::Deserialization { .. })
    ));
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_sections() {
    let text = "[core]\ndebug = false\n\n[core.database]\nname = \"keel\"\nport = 5433\n";
    let config = Config::parse(text, ConfigFormat::Toml).unwrap();
    assert_eq!(config.get("core", "debug"), Some("false"));
    assert_eq!(config.get("core", "database.name"), Some("keel"));
    assert_eq!(config.get("core", "database.port"), Some("5433"));
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_sections() {
    let text = "core:\n  database:\n    host: yaml-host\n  packages.ignore: demo\n";
    let config = Config::parse(text, ConfigFormat::Yaml).unwrap();
    assert_eq!(config.get("core", "database.host"), Some("yaml-host"));
    assert_eq!(config.get("core", "packages.ignore"), Some("demo"));
}

#[test]
fn test_load_reads_file_by_extension() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let ini_path = dir.path().join("keel.ini");
    fs::write(&ini_path, "[core]\ndatabase.name = from_ini\n").unwrap();
    let json_path = dir.path().join("keel.json");
    fs::write(&json_path, r#"{"core": {"database.name": "from_json"}}"#).unwrap();

    assert_eq!(Config::load(&ini_path).unwrap().get("core", "database.name"), Some("from_ini"));
    assert_eq!(Config::load(&json_path).unwrap().get("core", "database.name"), Some("from_json"));
}

#[test]
fn test_load_missing_file_fails_with_path() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let missing = dir.path().join("absent.ini");
    match Config::load(&missing) {
        Err(ConfigError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("Expected I/O error, got {:?}", other),
    }
}
