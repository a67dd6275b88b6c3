use super::*;

#[test]
fn client_uses_configured_endpoint() {
    let config = ChimeraxConfig {
        host: "127.0.0.1".to_string(),
        port: 63269,
    };
    let client = ChimeraxClient::new(&config).expect("should create client");

    assert_eq!(client.base_url.host_str(), Some("127.0.0.1"));
    assert_eq!(client.base_url.port(), Some(63269));
}

#[test]
fn run_url_percent_encodes_commands() {
    let config = ChimeraxConfig::default();
    let client = ChimeraxClient::new(&config).expect("should create client");

    let url = client
        .run_url("color #1 sky blue")
        .expect("should build url");
    assert_eq!(url.path(), "/run");
    assert_eq!(
        url.query(),
        Some("command=color+%231+sky+blue"),
        "spaces and # must not break the query string"
    );
}

#[test]
fn json_mode_response_is_parsed() {
    let body = r#"{
        "python values": [null],
        "json values": [null],
        "log messages": {
            "info": ["UCSF ChimeraX version: 1.8"],
            "warning": ["something minor"]
        },
        "error": null
    }"#;

    let result = parse_response(body);
    assert_eq!(result.output(), "UCSF ChimeraX version: 1.8");
    assert_eq!(result.warnings(), ["something minor".to_string()]);
    assert!(result.error.is_none());
}

#[test]
fn note_level_messages_are_included_in_output() {
    let body = r#"{
        "log messages": {
            "info": ["first"],
            "note": ["second"]
        }
    }"#;

    let result = parse_response(body);
    assert_eq!(result.output(), "first\nsecond");
}

#[test]
fn chimerax_error_field_is_surfaced() {
    let body = r#"{
        "log messages": {},
        "error": {"type": "UserError", "message": "No atoms specified"}
    }"#;

    let result = parse_response(body);
    let error = result.error.expect("error should be present");
    assert_eq!(error.error_type, "UserError");
    assert_eq!(error.message, "No atoms specified");
}

#[test]
fn plain_text_response_normalizes_to_info() {
    let result = parse_response("UCSF ChimeraX version: 1.8\n");
    assert_eq!(result.output(), "UCSF ChimeraX version: 1.8");
    assert!(result.json_values.is_empty());
    assert!(result.error.is_none());
}

#[test]
fn empty_plain_text_response_has_no_output() {
    let result = parse_response("   \n");
    assert_eq!(result.output(), "");
    assert!(result.warnings().is_empty());
}
