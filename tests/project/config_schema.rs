use recallchat::config::Config;
use tracing::Level;

#[test]
fn minimal_config_deserializes_with_defaults() {
    let toml = r#"
[api]
base_url = "https://memory.example.com/api"
"#;

    let parsed: Config = toml::from_str(toml).expect("minimal config should deserialize");

    assert_eq!(parsed.api.base_url, "https://memory.example.com/api");
    assert_eq!(parsed.api.timeout_secs, 30);
    assert_eq!(parsed.api.connect_timeout_secs, 10);
    assert_eq!(parsed.storage.data_dir, "~/.recallchat");
    assert_eq!(parsed.logging.max_level(), Level::WARN);
    assert!(parsed.validate().is_ok());
}

#[test]
fn empty_file_is_a_valid_config() {
    let parsed: Config = toml::from_str("").expect("empty config should deserialize");

    assert_eq!(parsed.api.base_url, "http://localhost:8000");
    assert!(parsed.validate().is_ok());
}

#[test]
fn non_http_base_url_is_rejected() {
    let toml = r#"
[api]
base_url = "ftp://memory.example.com"
"#;
    let parsed: Config = toml::from_str(toml).unwrap();

    let err = parsed.validate().unwrap_err();
    assert!(err.to_string().contains("http or https"));
}

#[test]
fn zero_timeout_is_rejected() {
    let toml = r"
[api]
timeout_secs = 0
";
    let parsed: Config = toml::from_str(toml).unwrap();

    assert!(parsed.validate().is_err());
}

#[test]
fn unknown_log_level_falls_back_to_warn() {
    let toml = r#"
[logging]
level = "chatty"
"#;
    let parsed: Config = toml::from_str(toml).unwrap();

    assert_eq!(parsed.logging.max_level(), Level::WARN);
}
