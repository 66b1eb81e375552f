//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use tempfile::NamedTempFile;

use keysession::cli::parse_args_from;
use keysession::config::Config;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("keysession")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-H",
        "0.0.0.0",
        "-p",
        "8080",
        "-n",
        "sid",
        "-l",
        "debug",
    ]))
    .unwrap();

    assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
    assert_eq!(result.port, Some(8080));
    assert_eq!(result.cookie_name, Some("sid".to_string()));
    assert_eq!(result.log_level, Some("debug".to_string()));
}

#[test]
fn test_cli_invalid_host() {
    assert!(parse_args_from(args(&["-H", "not-an-ip"])).is_err());
}

#[test]
fn test_config_file_then_args() {
    let json = r#"{
        "server": { "port": 4000 },
        "session": { "cookie_name": "file-cookie", "id_length": 48 }
    }"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let parsed = parse_args_from(args(&["-c", &path, "-n", "cli-cookie"])).unwrap();
    let config = Config::load(&parsed).unwrap();

    assert_eq!(config.server.port, 4000);
    assert_eq!(config.session.id_length, 48);
    // CLI wins over the file
    assert_eq!(config.session.cookie_name, "cli-cookie");

    let session = config.to_session_config().unwrap();
    assert_eq!(session.cookie_name, "cli-cookie");
    assert_eq!(session.id_length, 48);
}

#[test]
fn test_config_missing_file() {
    let parsed = parse_args_from(args(&["-c", "/nonexistent/keysession.json"])).unwrap();
    let err = Config::load(&parsed).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}
