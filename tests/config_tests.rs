use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

use spotify_pkce_login::config::Config;

fn valid_config() -> Config {
    Config {
        client_id: "abc".into(),
        ..Config::default()
    }
}

#[test]
fn config_from_path_parses_toml() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("cfg.toml");
    let mut f = File::create(&cfg_path).unwrap();
    let toml = r#"
client_id = "my-client"
redirect_uri = "http://127.0.0.1:5000/auth/callback"
scope = "user-read-private playlist-modify-public"
db_path = "/tmp/test.db"
log_dir = "/tmp"
"#;
    f.write_all(toml.as_bytes()).unwrap();
    let cfg = Config::from_path(&cfg_path).expect("parse config");
    assert_eq!(cfg.client_id, "my-client");
    assert_eq!(cfg.redirect_uri, "http://127.0.0.1:5000/auth/callback");
    assert_eq!(cfg.scope, "user-read-private playlist-modify-public");
    assert_eq!(cfg.db_path.to_str().unwrap(), "/tmp/test.db");
    // untouched fields keep their defaults
    assert_eq!(cfg.authorize_url, "https://accounts.spotify.com/authorize");
    assert_eq!(cfg.verifier_length, 64);
}

#[test]
fn defaults_match_spotify_endpoint() {
    let cfg = Config::default();
    assert!(cfg.client_id.is_empty());
    assert_eq!(cfg.redirect_uri, "http://localhost:5000/callback");
    assert_eq!(cfg.scope, "user-read-private user-read-email");
    assert_eq!(cfg.authorize_url, "https://accounts.spotify.com/authorize");
    assert_eq!(cfg.verifier_length, 64);
    assert_eq!(cfg.verifier_max_age_secs, 3600);
}

#[test]
fn validate_rejects_zero_verifier_max_age() {
    let cfg = Config {
        verifier_max_age_secs: 0,
        ..valid_config()
    };
    let err = cfg.validate().unwrap_err().to_string();
    assert!(err.contains("verifier_max_age_secs"), "{}", err);
}

#[test]
fn overrides_replace_fields_and_skip_empty_values() {
    let vars: HashMap<&str, &str> = [
        ("SPOTIFY_CLIENT_ID", "env-client"),
        ("SPOTIFY_REDIRECT_URI", "https://example.com/cb"),
        ("SPOTIFY_SCOPE", "  "),
    ]
    .into_iter()
    .collect();
    let mut cfg = Config::default();
    cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
    assert_eq!(cfg.client_id, "env-client");
    assert_eq!(cfg.redirect_uri, "https://example.com/cb");
    assert_eq!(cfg.scope, "user-read-private user-read-email");
    assert_eq!(cfg.authorize_url, "https://accounts.spotify.com/authorize");
}

#[test]
fn load_reads_file_when_given() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("cfg.toml");
    std::fs::write(&cfg_path, "client_id = \"from-file\"\nverifier_length = 100\n").unwrap();
    let cfg = Config::load(Some(cfg_path.as_path())).expect("load");
    assert_eq!(cfg.verifier_length, 100);
    assert!(!cfg.client_id.is_empty());
}

#[test]
fn load_fails_on_missing_file() {
    let td = tempdir().unwrap();
    assert!(Config::load(Some(td.path().join("nope.toml").as_path())).is_err());
}

#[test]
fn validate_accepts_complete_config() {
    valid_config().validate().expect("valid");
}

#[test]
fn validate_rejects_missing_client_id() {
    let err = Config::default().validate().unwrap_err().to_string();
    assert!(err.contains("client_id"), "{}", err);
}

#[test]
fn validate_rejects_relative_redirect_uri() {
    let cfg = Config {
        redirect_uri: "/callback".into(),
        ..valid_config()
    };
    let err = cfg.validate().unwrap_err().to_string();
    assert!(err.contains("redirect_uri"), "{}", err);
}

#[test]
fn validate_rejects_bad_authorize_url() {
    let cfg = Config {
        authorize_url: "accounts.spotify.com/authorize".into(),
        ..valid_config()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_enforces_verifier_length_bounds() {
    for (len, ok) in [(42usize, false), (43, true), (64, true), (128, true), (129, false)] {
        let cfg = Config {
            verifier_length: len,
            ..valid_config()
        };
        assert_eq!(cfg.validate().is_ok(), ok, "length {}", len);
    }
}
