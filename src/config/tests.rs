//! Tests for config module.

use super::*;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

// ==================== Duration parsing tests ====================

#[test]
fn test_parse_duration_seconds() {
    let d = duration::parse_duration("3s").unwrap();
    assert_eq!(d, Duration::from_secs(3));
}

#[test]
fn test_parse_duration_minutes() {
    let d = duration::parse_duration("2m").unwrap();
    assert_eq!(d, Duration::from_secs(120));
}

#[test]
fn test_parse_duration_milliseconds() {
    let d = duration::parse_duration("500ms").unwrap();
    assert_eq!(d, Duration::from_millis(500));
}

#[test]
fn test_parse_duration_hours() {
    let d = duration::parse_duration("1h").unwrap();
    assert_eq!(d, Duration::from_secs(3600));
}

#[test]
fn test_parse_duration_bare_number_is_seconds() {
    let d = duration::parse_duration("10").unwrap();
    assert_eq!(d, Duration::from_secs(10));
}

#[test]
fn test_parse_duration_fractional() {
    let d = duration::parse_duration("1.5s").unwrap();
    assert_eq!(d, Duration::from_millis(1500));
}

#[test]
fn test_parse_duration_empty() {
    let d = duration::parse_duration("").unwrap();
    assert_eq!(d, Duration::ZERO);
}

#[test]
fn test_parse_duration_invalid_unit() {
    let result = duration::parse_duration("10x");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("unknown duration unit"));
}

// ==================== YAML field loading tests ====================

const VALID_YAML: &str = r#"
app:
  name: dealscout
  env: development
  log_level: info

marketplaces:
  ebay:
    enabled: true
    rate_limit: 120
    request_timeout: 2s
  facebook:
    enabled: false

gateway:
  max_concurrent_calls: 2
  per_source_timeout: 2s
  overall_timeout: 3s

discovery:
  min_profit_margin: "20"
  listings_per_product: 10
  max_search_terms: 8

storage:
  enabled: true
  path: deals.db

search_terms:
  - "iphone 15"
  - "nintendo switch"
"#;

/// Parse config from YAML string (for testing).
fn from_yaml(yaml: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

#[test]
fn test_parse_full_config() {
    let config = from_yaml(VALID_YAML).unwrap();

    assert_eq!(config.app.name, "dealscout");
    assert_eq!(config.app.env, "development");
    assert_eq!(config.app.log_level.as_deref(), Some("info"));

    let ebay = config.marketplaces.get("ebay").unwrap();
    assert!(ebay.enabled);
    assert_eq!(ebay.rate_limit, Some(120));
    assert_eq!(ebay.request_timeout, Duration::from_secs(2));

    let facebook = config.marketplaces.get("facebook").unwrap();
    assert!(!facebook.enabled);

    let gateway = config.gateway.unwrap();
    assert_eq!(gateway.max_concurrent_calls, Some(2));
    assert_eq!(gateway.per_source_timeout, Duration::from_secs(2));
    assert_eq!(gateway.overall_timeout, Duration::from_secs(3));

    let discovery = config.discovery.unwrap();
    assert_eq!(discovery.min_profit_margin.as_deref(), Some("20"));
    assert_eq!(discovery.listings_per_product, Some(10));

    let storage = config.storage.unwrap();
    assert!(storage.enabled);
    assert_eq!(storage.path.as_deref(), Some("deals.db"));

    assert_eq!(config.search_terms.len(), 2);
}

#[test]
fn test_optional_sections_default() {
    let yaml = r#"
app:
  name: dealscout
  env: development
marketplaces:
  ebay:
    enabled: true
"#;
    let config = from_yaml(yaml).unwrap();
    assert!(config.gateway.is_none());
    assert!(config.discovery.is_none());
    assert!(config.storage.is_none());
    assert!(config.search_terms.is_empty());
}

#[test]
fn test_api_key_is_never_read_from_yaml() {
    let yaml = r#"
app:
  name: dealscout
  env: development
marketplaces:
  ebay:
    enabled: true
    api_key: leaked-in-yaml
"#;
    // serde(skip) means an inline key is ignored, not an error
    let config = from_yaml(yaml).unwrap();
    assert!(config.marketplaces.get("ebay").unwrap().api_key.is_empty());
}

// ==================== Validation tests ====================

#[test]
fn test_validate_requires_app_name() {
    let yaml = r#"
app:
  name: ""
  env: development
marketplaces:
  ebay:
    enabled: true
"#;
    let config = from_yaml(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("app.name"));
}

#[test]
fn test_validate_requires_enabled_marketplace() {
    let yaml = r#"
app:
  name: dealscout
  env: development
marketplaces:
  ebay:
    enabled: false
"#;
    let config = from_yaml(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("at least one marketplace"));
}

#[test]
fn test_validate_rejects_zero_concurrency() {
    let yaml = r#"
app:
  name: dealscout
  env: development
marketplaces:
  ebay:
    enabled: true
gateway:
  max_concurrent_calls: 0
"#;
    let config = from_yaml(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("max_concurrent_calls"));
}

#[test]
fn test_validate_rejects_nonpositive_rate_limit() {
    let yaml = r#"
app:
  name: dealscout
  env: development
marketplaces:
  ebay:
    enabled: true
    rate_limit: 0
"#;
    let config = from_yaml(yaml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_production_requires_credentials() {
    let yaml = r#"
app:
  name: dealscout
  env: production
marketplaces:
  ebay:
    enabled: true
"#;
    let config = from_yaml(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("EBAY_API_KEY"));
}

// ==================== File loading tests ====================

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(VALID_YAML.as_bytes()).unwrap();

    let config = Config::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.app.name, "dealscout");
}

#[test]
fn test_load_missing_file() {
    let result = Config::load("/nonexistent/config.yaml");
    assert!(matches!(result, Err(ConfigError::ReadFile(_))));
}

#[test]
fn test_load_invalid_yaml() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"app: [not a mapping").unwrap();

    let result = Config::load(file.path().to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
