use scout_common::observability::LogFormat;
use scout_config::{BrowserStealth, LlmConfig, ScoutConfigLoader, SearchDepth};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
version: "0.1"
coordinator:
  max_steps: 4
  llm:
    provider: gemini
    api_key: "${SCOUT_TEST_GOOGLE_KEY}"
search:
  api_key: "${SCOUT_TEST_TAVILY_KEY}"
  max_results: 8
  search_depth: basic
extractor:
  timeout_secs: 10
  browser:
    enabled: false
    stealth: maximum
    humanize: false
logging:
  format: json
  emit_stderr: true
"#;

#[test]
#[serial]
fn loads_file_and_expands_placeholders() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "scout.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("SCOUT_TEST_GOOGLE_KEY", Some("g-key")),
            ("SCOUT_TEST_TAVILY_KEY", Some("tvly-key")),
        ],
        || {
            let config = ScoutConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load scout config");

            assert_eq!(config.version.as_deref(), Some("0.1"));
            assert_eq!(config.coordinator.max_steps, 4);
            assert_eq!(config.coordinator.llm.resolved_api_key().as_deref(), Some("g-key"));
            assert!(matches!(config.coordinator.llm, LlmConfig::Gemini { .. }));
            assert_eq!(config.search.resolved_api_key().as_deref(), Some("tvly-key"));
            assert_eq!(config.search.max_results, 8);
            assert_eq!(config.search.search_depth, SearchDepth::Basic);
            assert!(config.search.include_answer);
            assert_eq!(config.extractor.timeout_secs, 10);
            assert_eq!(config.extractor.preview_chars, 500);
            assert!(!config.extractor.browser.enabled);
            assert_eq!(config.extractor.browser.stealth, BrowserStealth::Maximum);
            assert!(!config.extractor.browser.humanize);
            assert_eq!(config.logging.format, LogFormat::Json);
            assert!(config.logging.emit_stderr);
        },
    );
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "scout.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("SCOUT__SEARCH__MAX_RESULTS", Some("3")),
            ("SCOUT__EXTRACTOR__TIMEOUT_SECS", Some("45")),
        ],
        || {
            let config = ScoutConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.search.max_results, 3);
            assert_eq!(config.extractor.timeout_secs, 45);
        },
    );
}

#[test]
#[serial]
fn optional_file_may_be_missing() {
    let tmp = TempDir::new().unwrap();
    let config = ScoutConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults apply");
    assert_eq!(config.coordinator.max_steps, 6);
    assert!(config.extractor.browser.enabled);
    assert!(config.extractor.browser.humanize);
    assert_eq!(config.extractor.browser.webdriver_url, "http://localhost:9515");
}

#[test]
#[serial]
fn required_file_must_exist() {
    let tmp = TempDir::new().unwrap();
    let result = ScoutConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn unknown_provider_is_rejected() {
    let result = ScoutConfigLoader::new()
        .with_yaml_str("coordinator:\n  llm:\n    provider: carrier-pigeon\n")
        .load();
    assert!(result.is_err());
}
