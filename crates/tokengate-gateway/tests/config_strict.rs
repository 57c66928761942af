#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::PathBuf;

use tokengate_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
auth:
  token_list_file: "./data/tokens.json"
  debounce: 3000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:8076");
    assert_eq!(cfg.auth.token_header, "authorization");
    assert_eq!(cfg.auth.token_valid_header, "token-valid");
    assert_eq!(cfg.auth.watch_dir(), PathBuf::from("./data"));
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn debounce_out_of_range() {
    let bad = r#"
version: 1
auth:
  debounce_ms: 10
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("debounce_ms"));
}

#[test]
fn poll_interval_must_not_exceed_debounce() {
    let bad = r#"
version: 1
auth:
  debounce_ms: 1000
  poll_interval_ms: 2000
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("poll_interval_ms"));
}

#[test]
fn invalid_header_name() {
    let bad = r#"
version: 1
auth:
  token_valid_header: "token valid"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn explicit_watch_dir_wins() {
    let ok = r#"
version: 1
auth:
  token_list_file: "/srv/tokens/list.json"
  watch_dir: "/srv"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.auth.watch_dir(), PathBuf::from("/srv"));
}

#[test]
fn bare_file_name_watches_current_dir() {
    let cfg = config::load_from_str("version: 1\nauth:\n  token_list_file: tokens.json\n").unwrap();
    assert_eq!(cfg.auth.watch_dir(), PathBuf::from("."));
}
