//! Unit tests for configuration parsing and validation.

use std::io::Write;
use std::time::Duration;

use crewcall::config::GlobalConfig;

const MINIMAL: &str = r#"
db_path = "crewcall.db"
operator_id = 42
default_country_code = "+7"

[telegram]
"#;

#[test]
fn minimal_config_parses_with_defaults() {
    let config = GlobalConfig::from_toml_str(MINIMAL).expect("parse");
    assert_eq!(config.operator_id, 42);
    assert_eq!(config.default_locale, "en");
    assert_eq!(config.utc_offset_hours, 3);
    assert_eq!(config.send_spacing(), Duration::from_millis(50));
    assert_eq!(config.reminder.sweep_interval_seconds, 60);
    assert_eq!(config.reminder.lookahead_minutes, 30);
    assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    assert_eq!(config.telegram.poll_timeout_seconds, 30);
    assert!(config.telegram.bot_token.is_empty());
}

#[test]
fn operator_check_matches_configured_id() {
    let config = GlobalConfig::from_toml_str(MINIMAL).expect("parse");
    assert!(config.is_operator(42));
    assert!(!config.is_operator(7));
}

#[test]
fn overrides_are_honored() {
    let config = GlobalConfig::from_toml_str(
        r#"
db_path = "crewcall.db"
operator_id = 42
default_country_code = "+44"
default_locale = "ru"
utc_offset_hours = 0
send_spacing_ms = 10

[telegram]
api_base = "http://localhost:8081"
poll_timeout_seconds = 5

[reminder]
sweep_interval_seconds = 5
lookahead_minutes = 10
"#,
    )
    .expect("parse");
    assert_eq!(config.default_locale, "ru");
    assert_eq!(config.send_spacing(), Duration::from_millis(10));
    assert_eq!(config.reminder.sweep_interval_seconds, 5);
    assert_eq!(config.telegram.api_base, "http://localhost:8081");
}

#[test]
fn invalid_country_code_is_rejected() {
    for bad in ["7", "+", "+7a"] {
        let raw = MINIMAL.replace("\"+7\"", &format!("\"{bad}\""));
        assert!(GlobalConfig::from_toml_str(&raw).is_err(), "accepted {bad}");
    }
}

#[test]
fn zero_operator_id_is_rejected() {
    let raw = MINIMAL.replace("operator_id = 42", "operator_id = 0");
    assert!(GlobalConfig::from_toml_str(&raw).is_err());
}

#[test]
fn zero_sweep_interval_is_rejected() {
    let raw = format!("{MINIMAL}\n[reminder]\nsweep_interval_seconds = 0\n");
    assert!(GlobalConfig::from_toml_str(&raw).is_err());
}

#[test]
fn load_from_path_reads_a_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(MINIMAL.as_bytes()).expect("write");
    let config = GlobalConfig::load_from_path(file.path()).expect("load");
    assert_eq!(config.operator_id, 42);
}

#[test]
fn missing_file_is_a_config_error() {
    assert!(GlobalConfig::load_from_path("/nonexistent/crewcall.toml").is_err());
}
