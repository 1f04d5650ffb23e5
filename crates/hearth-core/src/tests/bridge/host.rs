use crate::{
    BridgeClient, BridgeHost, CommandRequest, DesktopTracker, MirrorSettings, ShellCoreService,
    ShellMirror, TrackerEvent, WindowRecord,
    tests::support::{FakeTracker, call_log, environment},
};

use std::{sync::Arc, time::Duration};

use serde_json::json;

fn host_with_tracker() -> (BridgeHost, Arc<FakeTracker>) {
    let log = call_log();
    let tracker = FakeTracker::new("windows", Arc::clone(&log));
    let trackers: Vec<Arc<dyn DesktopTracker>> = vec![tracker.clone()];
    let shell = Arc::new(ShellCoreService::new(environment(trackers, None, &log)));
    (BridgeHost::new(shell), tracker)
}

fn request(id: u64, method: &str, args: Vec<serde_json::Value>) -> CommandRequest {
    CommandRequest {
        id,
        method: method.to_string(),
        args,
    }
}

/// WHAT: Unknown methods come back as a failure response with the request id
/// WHY: The UI correlates replies by id and must see why a call failed
#[tokio::test]
async fn given_unknown_method_when_handling_request_then_failure_with_same_id() {
    // Given: A host
    let (host, _tracker) = host_with_tracker();

    // When: Sending a bogus method
    let response = host.handle_request(request(7, "formatDisk", Vec::new())).await;

    // Then: Not ok, id echoed, error text present
    assert_eq!(response.id, 7);
    assert!(!response.ok);
    assert!(response.error.is_some_and(|e| e.contains("formatDisk")));
}

/// WHAT: Bulk queries answer with JSON arrays, not JSON-in-a-string
/// WHY: The UI decodes results directly as lists
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_shell_with_window_when_listing_windows_then_json_array() {
    // Given: A running shell that has observed a window
    let (host, tracker) = host_with_tracker();
    let mut events = host.subscribe();
    host.shell().start().await.unwrap();
    tracker.emit(TrackerEvent::WindowObserved(WindowRecord::new(
        "hwnd-1", "Editor",
    )));
    tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();

    // When: listWindows
    let response = host.handle_request(request(1, "listWindows", Vec::new())).await;

    // Then: An array holding the window
    assert!(response.ok);
    let result = response.result.unwrap();
    assert_eq!(result.as_array().map(Vec::len), Some(1));
    assert_eq!(result[0]["handle"], json!("hwnd-1"));
}

/// WHAT: Commands against a stopped shell fail instead of acting
/// WHY: Native side effects only happen while the shell runs
#[tokio::test]
async fn given_stopped_shell_when_focusing_then_failure_response() {
    // Given: A host over a stopped shell
    let (host, _tracker) = host_with_tracker();

    // When: focusWindow
    let response = host
        .handle_request(request(2, "focusWindow", vec![json!("hwnd-1")]))
        .await;

    // Then: Failure
    assert!(!response.ok);
    assert!(response.result.is_none());
}

/// WHAT: Hotkeys can be registered, listed and released over the bridge
/// WHY: The UI owns which shortcuts the shell listens for
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_shell_when_registering_hotkey_over_bridge_then_listed_and_released() {
    // Given: A running shell
    let (host, _tracker) = host_with_tracker();
    host.shell().start().await.unwrap();

    // When: Registering, listing, unregistering twice
    let registered = host
        .handle_request(request(
            1,
            "registerHotkey",
            vec![json!("toggle-launcher"), json!("super+Space")],
        ))
        .await;
    let listed = host.handle_request(request(2, "listHotkeys", Vec::new())).await;
    let released = host
        .handle_request(request(3, "unregisterHotkey", vec![json!("toggle-launcher")]))
        .await;
    let released_again = host
        .handle_request(request(4, "unregisterHotkey", vec![json!("toggle-launcher")]))
        .await;

    // Then: true, one entry, true, false
    assert_eq!(registered.result, Some(json!(true)));
    assert_eq!(listed.result.unwrap()[0]["id"], json!("toggle-launcher"));
    assert_eq!(released.result, Some(json!(true)));
    assert_eq!(released_again.result, Some(json!(false)));
}

/// WHAT: An in-process client receives the handshake and live events through a mirror
/// WHY: This is the full path from OS observation to UI projection
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_local_client_when_tracker_reports_window_then_mirror_projection_updates() {
    // Given: A running shell, a mirror, and a local connection
    let (host, tracker) = host_with_tracker();
    host.shell().start().await.unwrap();
    let client = Arc::new(BridgeClient::new());
    let mirror = ShellMirror::new(Arc::clone(&client), MirrorSettings::default());
    let mut projection = mirror.subscribe();
    let _pump = host.connect_local(Arc::clone(&client));

    mirror.initialize().await.unwrap();
    assert!(!mirror.snapshot().bootstrapping);
    assert_eq!(mirror.snapshot().workspaces.len(), 1);

    // When: The tracker observes a window
    tracker.emit(TrackerEvent::WindowObserved(WindowRecord::new(
        "hwnd-1", "Editor",
    )));

    // Then: The mirror picks it up
    tokio::time::timeout(
        Duration::from_secs(1),
        projection.wait_for(|p| p.windows.len() == 1),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(mirror.snapshot().windows[0].workspace_id, "ws-main");
}
