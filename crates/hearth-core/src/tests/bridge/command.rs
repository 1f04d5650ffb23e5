use crate::{BridgeCommand, CoreError};

use serde_json::json;

/// WHAT: Positional arguments parse into the typed command
/// WHY: The UI sends commands as a method name plus an argument array
#[test]
#[allow(clippy::unwrap_used)]
fn given_method_and_args_when_parsing_then_typed_command() {
    // Given: A moveWindowToWorkspace call
    let args = vec![json!("hwnd-1"), json!("dev")];

    // When: Parsing
    let command = BridgeCommand::parse("moveWindowToWorkspace", &args).unwrap();

    // Then: Fields are bound in order
    assert_eq!(
        command,
        BridgeCommand::MoveWindowToWorkspace {
            handle: "hwnd-1".to_string(),
            workspace_id: "dev".to_string(),
        }
    );
}

/// WHAT: Unknown method names are rejected
/// WHY: A typo in the UI must surface as an error, not a silent no-op
#[test]
fn given_unknown_method_when_parsing_then_unknown_method_error() {
    // Given/When: Parsing a method that does not exist
    let result = BridgeCommand::parse("formatDisk", &[]);

    // Then: UnknownMethod
    assert!(matches!(result, Err(CoreError::UnknownMethod { .. })));
}

/// WHAT: Missing required arguments are rejected with the method name
/// WHY: The failure response must tell the UI what it got wrong
#[test]
fn given_missing_handle_when_parsing_focus_window_then_invalid_arguments() {
    // Given/When: focusWindow with no arguments
    let result = BridgeCommand::parse("focusWindow", &[]);

    // Then: InvalidArguments for focusWindow
    assert!(matches!(
        result,
        Err(CoreError::InvalidArguments { ref method, .. }) if method == "focusWindow"
    ));
}

/// WHAT: Volume accepts numbers or numeric strings and is clamped
/// WHY: Slider widgets send floats and sometimes strings
#[test]
#[allow(clippy::unwrap_used)]
fn given_out_of_range_volumes_when_parsing_then_clamped() {
    // Given/When: Values above, below and inside the range
    let high = BridgeCommand::parse("setSystemVolume", &[json!(150)]).unwrap();
    let low = BridgeCommand::parse("setSystemVolume", &[json!(-3)]).unwrap();
    let text = BridgeCommand::parse("setSystemVolume", &[json!("42.6")]).unwrap();

    // Then: Clamped and rounded
    assert_eq!(high, BridgeCommand::SetSystemVolume { percent: 100 });
    assert_eq!(low, BridgeCommand::SetSystemVolume { percent: 0 });
    assert_eq!(text, BridgeCommand::SetSystemVolume { percent: 43 });
}

/// WHAT: Optional arguments fall back to their defaults
/// WHY: Older UIs omit the workspace name and the click kind
#[test]
#[allow(clippy::unwrap_used)]
fn given_omitted_optional_args_when_parsing_then_defaults_applied() {
    // Given/When: createWorkspace without a name, trayIconClick without a kind
    let create = BridgeCommand::parse("createWorkspace", &[json!("dev")]).unwrap();
    let click = BridgeCommand::parse("trayIconClick", &[json!("vol")]).unwrap();

    // Then: Name defaults to the id, kind to left
    assert_eq!(
        create,
        BridgeCommand::CreateWorkspace {
            id: "dev".to_string(),
            name: "dev".to_string(),
        }
    );
    assert_eq!(
        click,
        BridgeCommand::TrayIconClick {
            id: "vol".to_string(),
            kind: "left".to_string(),
        }
    );
}

/// WHAT: A command's own method and args parse back to itself
/// WHY: The client builds calls from typed commands and the host parses them
#[test]
#[allow(clippy::unwrap_used)]
fn given_typed_command_when_sent_and_parsed_then_identical() {
    // Given: A command with two arguments
    let command = BridgeCommand::RegisterHotkey {
        id: "toggle-launcher".to_string(),
        shortcut: "super+Space".to_string(),
    };

    // When: Going through its wire form
    let parsed = BridgeCommand::parse(command.method(), &command.args()).unwrap();

    // Then: Same command
    assert_eq!(parsed, command);
}
