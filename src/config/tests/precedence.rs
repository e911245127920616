//! Tests for configuration layer precedence.

use ortho_config::OrthoConfig;
use rstest::rstest;
use serde_json::{Value, json};

use super::helpers::build_config_from_layers;
use crate::ReviewDeckConfig;

#[rstest]
#[case::file_overrides_defaults(
    vec![
        ("defaults", json!({"frontend_url": "http://default"})),
        ("file", json!({"frontend_url": "http://file"}))
    ],
    "http://file",
    "file should override default"
)]
#[case::environment_overrides_file(
    vec![
        ("file", json!({"frontend_url": "http://file"})),
        ("environment", json!({"frontend_url": "http://env"}))
    ],
    "http://env",
    "environment should override file"
)]
#[case::cli_overrides_environment(
    vec![
        ("environment", json!({"frontend_url": "http://env"})),
        ("cli", json!({"frontend_url": "http://cli"}))
    ],
    "http://cli",
    "CLI should override environment"
)]
fn frontend_url_follows_layer_precedence(
    #[case] layers: Vec<(&str, Value)>,
    #[case] expected: &str,
    #[case] message: &str,
) {
    let config = build_config_from_layers(&layers);

    assert_eq!(config.frontend_url, expected, "{message}");
}

#[rstest]
fn unset_fields_keep_built_in_defaults() {
    let config = build_config_from_layers(&[("file", json!({"port": 8080}))]);

    assert_eq!(config.port, Some(8080));
    assert_eq!(config.bind_address, "0.0.0.0");
    assert_eq!(config.github_api_base, "https://api.github.com");
    assert_eq!(config.github_oauth_base, "https://github.com");
    assert_eq!(config.static_dir, "client-dist");
    assert_eq!(config.ai_review_marker, "ai-powered review");
    assert_eq!(config.max_repositories, 20);
    assert_eq!(config.session_cookie_name, "reviewdeck.sid");
    assert!(!config.cookie_secure, "cookie_secure should default to false");
}

#[rstest]
fn full_precedence_chain() {
    let config = build_config_from_layers(&[
        (
            "defaults",
            json!({"port": 5000, "max_repositories": 20, "static_dir": "default-dist"}),
        ),
        (
            "file",
            json!({"port": 6000, "max_repositories": 10, "static_dir": "file-dist"}),
        ),
        ("environment", json!({"port": 7000, "static_dir": "env-dist"})),
        ("cli", json!({"port": 8000})),
    ]);

    assert_eq!(config.port, Some(8000), "CLI wins for port");
    assert_eq!(
        config.max_repositories, 10,
        "file wins for max_repositories (no env/cli override)"
    );
    assert_eq!(config.static_dir, "env-dist", "environment wins for static_dir");
}

#[rstest]
fn cookie_secure_is_read_from_a_file_layer() {
    let config = build_config_from_layers(&[("file", json!({"cookie_secure": true}))]);

    assert!(config.cookie_secure);
}

#[rstest]
fn environment_prefix_is_applied_when_loading() {
    let temp_dir = tempfile::TempDir::new().expect("temp dir should be created");
    let home = temp_dir.path().to_string_lossy().to_string();
    let _guard = env_lock::lock_env([
        ("REVIEWDECK_MAX_REPOSITORIES", Some("7")),
        ("REVIEWDECK_FRONTEND_URL", Some("https://dash.example")),
        ("HOME", Some(home.as_str())),
        ("XDG_CONFIG_HOME", Some(home.as_str())),
    ]);

    let config = ReviewDeckConfig::load_from_iter([std::ffi::OsString::from("reviewdeck")])
        .expect("config should load");

    assert_eq!(config.max_repositories, 7);
    assert_eq!(config.frontend_url, "https://dash.example");
}

#[rstest]
fn cli_flags_override_the_environment_when_loading() {
    let temp_dir = tempfile::TempDir::new().expect("temp dir should be created");
    let home = temp_dir.path().to_string_lossy().to_string();
    let _guard = env_lock::lock_env([
        ("REVIEWDECK_PORT", Some("6000")),
        ("HOME", Some(home.as_str())),
        ("XDG_CONFIG_HOME", Some(home.as_str())),
    ]);

    let args = ["reviewdeck", "--port", "9000"].map(std::ffi::OsString::from);
    let config = ReviewDeckConfig::load_from_iter(args).expect("config should load");

    assert_eq!(config.port, Some(9000));
}
