// Config loading and validation tests

use hostconsole::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[probing]
timeout_ms = 1000

[[probing.targets]]
name = "google"
host = "google.com"
port = 443

[[probing.targets]]
name = "cloudflare"
host = "1.1.1.1"
port = 443

[lookup]
endpoint = "http://ip-api.com"
timeout_ms = 2000
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.probing.timeout_ms, 1000);
    assert_eq!(config.probing.targets.len(), 2);
    assert_eq!(config.probing.targets[0].name, "google");
    assert_eq!(config.probing.targets[1].host, "1.1.1.1");
    assert_eq!(config.lookup.endpoint, "http://ip-api.com");
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_probe_timeout_zero() {
    let bad = VALID_CONFIG.replace("timeout_ms = 1000", "timeout_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("probing.timeout_ms"));
}

#[test]
fn test_config_validation_rejects_unnamed_target() {
    let bad = VALID_CONFIG.replace("name = \"google\"", "name = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("probing.targets"));
}

#[test]
fn test_config_validation_rejects_target_port_zero() {
    let bad = VALID_CONFIG.replacen("port = 443", "port = 0", 1);
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("google"));
}

#[test]
fn test_config_validation_rejects_empty_lookup_endpoint() {
    let bad = VALID_CONFIG.replace("endpoint = \"http://ip-api.com\"", "endpoint = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("lookup.endpoint"));
}

#[test]
fn test_config_defaults_when_optional_fields_omitted() {
    let minimal = r#"
[server]
port = 8080
host = "127.0.0.1"

[probing]

[lookup]
"#;
    let config = AppConfig::load_from_str(minimal).expect("minimal config");
    assert_eq!(config.probing.timeout_ms, 1000);
    assert!(config.probing.targets.is_empty());
    assert_eq!(config.lookup.endpoint, "http://ip-api.com");
    assert_eq!(config.lookup.timeout_ms, 2000);
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let path = std::env::temp_dir().join(format!("hostconsole-test-{}.toml", std::process::id()));
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let _ = std::fs::remove_file(&path);
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.probing.targets.len(), 2);
}
