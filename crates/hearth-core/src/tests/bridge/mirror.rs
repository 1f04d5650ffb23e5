use crate::{
    BridgeClient, Envelope, MirrorSettings, NO_WINDOW, STATUS_CONNECTED, STATUS_DISCONNECTED,
    ServiceState, ShellEvent, ShellMirror, ShellSnapshot, TrayIconRecord, WindowRecord,
    WorkspaceRecord, tests::support::ScriptedEndpoint,
};

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use serde_json::json;

struct Fixture {
    client: Arc<BridgeClient>,
    endpoint: Arc<ScriptedEndpoint>,
    mirror: Arc<ShellMirror>,
}

#[allow(clippy::unwrap_used)]
fn fixture(delay: Duration) -> Fixture {
    let endpoint = ScriptedEndpoint::new(delay);

    let mut main = WorkspaceRecord::new("ws-main", "Main");
    main.is_active = true;
    main.windows = vec!["hwnd-1".to_string()];
    let dev = WorkspaceRecord::new("dev", "Dev");
    let window = WindowRecord::new("hwnd-1", "Editor").in_workspace("ws-main");
    let snapshot = ShellSnapshot {
        service_state: ServiceState::Running,
        active_workspace_id: Some("ws-main".to_string()),
        focused_window: "hwnd-1".to_string(),
        window_count: 1,
        workspace_count: 2,
        tray_icon_count: 3,
    };

    endpoint.respond("listWindows", serde_json::to_value(vec![window]).unwrap());
    endpoint.respond(
        "listWorkspaces",
        serde_json::to_value(vec![main, dev]).unwrap(),
    );
    endpoint.respond(
        "getTrayIcons",
        serde_json::to_value(vec![
            TrayIconRecord::new("a", "Alpha"),
            TrayIconRecord::new("b", "Beta"),
            TrayIconRecord::new("c", "Gamma"),
        ])
        .unwrap(),
    );
    endpoint.respond("getLauncherApps", json!([]));
    endpoint.respond("getShellState", serde_json::to_value(snapshot).unwrap());

    let client = Arc::new(BridgeClient::new());
    client.attach(endpoint.clone());
    let mirror = ShellMirror::new(
        Arc::clone(&client),
        MirrorSettings {
            connect_timeout: Duration::from_millis(100),
            ..MirrorSettings::default()
        },
    );

    Fixture {
        client,
        endpoint,
        mirror,
    }
}

#[allow(clippy::unwrap_used)]
fn deliver(client: &BridgeClient, event: ShellEvent) {
    assert_eq!(client.dispatch(&Envelope::from_event(&event).unwrap()), 0);
}

#[allow(clippy::unwrap_used)]
async fn synced(delay: Duration) -> Fixture {
    let f = fixture(delay);
    deliver(&f.client, ShellEvent::connected());
    f.mirror.initialize().await.unwrap();
    f
}

/// WHAT: Concurrent initialize calls share one bulk fetch
/// WHY: Several views mount at once and must not multiply native load
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_connected_client_when_initializing_concurrently_then_single_fetch() {
    // Given: A connected mirror over a slow endpoint
    let f = fixture(Duration::from_millis(20));
    deliver(&f.client, ShellEvent::connected());

    // When: Five callers initialize at once
    let results = join_all((0..5).map(|_| f.mirror.initialize())).await;

    // Then: All succeed and each list was fetched exactly once
    assert!(results.iter().all(Result::is_ok));
    for method in [
        "listWindows",
        "listWorkspaces",
        "getTrayIcons",
        "getLauncherApps",
        "getShellState",
    ] {
        assert_eq!(f.endpoint.calls(method), 1, "{method} fetched more than once");
    }

    // And: A later call reuses the memoized result
    f.mirror.initialize().await.unwrap();
    assert_eq!(f.endpoint.calls("listWindows"), 1);
}

/// WHAT: Bulk sync fills the projection and derives active workspace and focus
/// WHY: A freshly mounted UI must render the full desktop at once
#[tokio::test]
async fn given_native_state_when_synced_then_projection_complete() {
    // Given/When: A synced mirror
    let f = synced(Duration::ZERO).await;

    // Then: Everything populated
    let p = f.mirror.snapshot();
    assert_eq!(p.windows.len(), 1);
    assert_eq!(p.workspaces.len(), 2);
    assert_eq!(p.tray_icons.len(), 3);
    assert_eq!(p.active_workspace_id.as_deref(), Some("ws-main"));
    assert_eq!(p.focused_window.as_deref(), Some("hwnd-1"));
    assert_eq!(p.status_text, STATUS_CONNECTED);
    assert!(!p.bootstrapping);
}

/// WHAT: Without a handshake sync fails, reports Disconnected, and can be retried
/// WHY: A failed attempt must not be memoized forever
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_handshake_when_initializing_then_disconnected_and_retry_succeeds() {
    // Given: A mirror whose client never saw the handshake
    let f = fixture(Duration::ZERO);

    // When: Initializing
    let first = f.mirror.initialize().await;

    // Then: Failure, Disconnected, nothing fetched
    assert!(first.is_err());
    assert_eq!(f.mirror.snapshot().status_text, STATUS_DISCONNECTED);
    assert_eq!(f.endpoint.calls("listWindows"), 0);

    // And: After the handshake a retry succeeds
    deliver(&f.client, ShellEvent::connected());
    f.mirror.initialize().await.unwrap();
    assert_eq!(f.mirror.snapshot().status_text, STATUS_CONNECTED);
}

/// WHAT: Created/updated windows upsert by handle
/// WHY: Duplicate records would render a window twice
#[tokio::test]
async fn given_synced_mirror_when_windows_created_and_updated_then_upserted_by_handle() {
    // Given: A synced mirror holding hwnd-1
    let f = synced(Duration::ZERO).await;

    // When: hwnd-2 is created, then hwnd-1 is updated
    deliver(
        &f.client,
        ShellEvent::WindowCreated(WindowRecord::new("hwnd-2", "Terminal").in_workspace("ws-main")),
    );
    deliver(
        &f.client,
        ShellEvent::WindowUpdated(
            WindowRecord::new("hwnd-1", "Editor - main.rs").in_workspace("ws-main"),
        ),
    );

    // Then: Two windows, hwnd-1 retitled in place
    let p = f.mirror.snapshot();
    assert_eq!(p.windows.len(), 2);
    assert_eq!(p.windows[0].handle, "hwnd-1");
    assert_eq!(p.windows[0].title, "Editor - main.rs");
    assert_eq!(p.workspaces[0].windows, vec!["hwnd-1", "hwnd-2"]);
}

/// WHAT: Switching workspace marks exactly one active, even when native is unreachable
/// WHY: The UI stays responsive while the bridge is down
#[tokio::test]
async fn given_synced_mirror_when_switching_to_dev_then_dev_is_sole_active() {
    // Given: A synced mirror with ws-main active
    let f = synced(Duration::ZERO).await;

    // When: Switching to "dev" with native reachable, then back with it gone
    let accepted = f.mirror.switch_workspace("dev").await;
    let p = f.mirror.snapshot();

    // Then: dev active alone
    assert!(accepted);
    assert_eq!(p.active_workspace_id.as_deref(), Some("dev"));
    assert_eq!(
        p.workspaces
            .iter()
            .filter(|ws| ws.is_active)
            .map(|ws| ws.id.as_str())
            .collect::<Vec<_>>(),
        vec!["dev"]
    );

    f.client.detach();
    let accepted = f.mirror.switch_workspace("ws-main").await;
    assert!(!accepted);
    assert_eq!(
        f.mirror.snapshot().active_workspace_id.as_deref(),
        Some("ws-main")
    );
}

/// WHAT: Removing one tray icon keeps the others in their order
/// WHY: Tray layout must not jump when an icon disappears
#[tokio::test]
async fn given_three_tray_icons_when_middle_removed_then_order_preserved() {
    // Given: Icons a, b, c
    let f = synced(Duration::ZERO).await;

    // When: b is removed
    deliver(&f.client, ShellEvent::TrayIconRemoved { id: "b".to_string() });

    // Then: a, c
    let ids: Vec<String> = f
        .mirror
        .snapshot()
        .tray_icons
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

/// WHAT: workspaceCreated triggers a refetch of the workspace list
/// WHY: Native ordering of workspaces is authoritative
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_synced_mirror_when_workspace_created_then_list_refetched() {
    // Given: A synced mirror and a native list that now has three workspaces
    let f = synced(Duration::ZERO).await;
    let mut projection = f.mirror.subscribe();
    let mut main = WorkspaceRecord::new("ws-main", "Main");
    main.is_active = true;
    f.endpoint.respond(
        "listWorkspaces",
        serde_json::to_value(vec![
            main,
            WorkspaceRecord::new("dev", "Dev"),
            WorkspaceRecord::new("chat", "Chat"),
        ])
        .unwrap(),
    );

    // When: workspaceCreated arrives
    deliver(
        &f.client,
        ShellEvent::WorkspaceCreated(WorkspaceRecord::new("chat", "Chat")),
    );

    // Then: The list is refetched
    tokio::time::timeout(
        Duration::from_secs(1),
        projection.wait_for(|p| p.workspaces.len() == 3),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(f.endpoint.calls("listWorkspaces"), 2);
}

/// WHAT: A slow refetch answered after a newer one is discarded
/// WHY: Back-to-back workspaceCreated events must leave the latest list in place
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_two_workspace_refetches_when_older_answers_last_then_newer_list_kept() {
    // Given: A synced mirror whose first refetch is slow and stale
    let f = synced(Duration::ZERO).await;
    let mut projection = f.mirror.subscribe();
    let mut main = WorkspaceRecord::new("ws-main", "Main");
    main.is_active = true;
    f.endpoint.enqueue(
        "listWorkspaces",
        Duration::from_millis(40),
        serde_json::to_value(vec![main.clone()]).unwrap(),
    );
    f.endpoint.enqueue(
        "listWorkspaces",
        Duration::ZERO,
        serde_json::to_value(vec![
            main,
            WorkspaceRecord::new("dev", "Dev"),
            WorkspaceRecord::new("chat", "Chat"),
        ])
        .unwrap(),
    );

    // When: Two workspaceCreated events arrive back to back
    deliver(
        &f.client,
        ShellEvent::WorkspaceCreated(WorkspaceRecord::new("dev", "Dev")),
    );
    deliver(
        &f.client,
        ShellEvent::WorkspaceCreated(WorkspaceRecord::new("chat", "Chat")),
    );

    // Then: The newer list lands and the late stale answer does not replace it
    tokio::time::timeout(
        Duration::from_secs(1),
        projection.wait_for(|p| p.workspaces.len() == 3),
    )
    .await
    .unwrap()
    .unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(f.endpoint.calls("listWorkspaces"), 3);
    assert_eq!(f.mirror.snapshot().workspaces.len(), 3);
}

/// WHAT: The "no window" sentinel clears focus; a real handle sets it
/// WHY: The sentinel must never be shown as a focused window
#[tokio::test]
async fn given_synced_mirror_when_focus_moves_to_sentinel_then_cleared() {
    // Given: A synced mirror with hwnd-1 focused
    let f = synced(Duration::ZERO).await;

    // When: Focus moves to no window, then back
    deliver(
        &f.client,
        ShellEvent::WindowFocusChanged {
            handle: NO_WINDOW.to_string(),
        },
    );
    let cleared = f.mirror.snapshot().focused_window;
    deliver(
        &f.client,
        ShellEvent::WindowFocusChanged {
            handle: "hwnd-1".to_string(),
        },
    );

    // Then: None, then hwnd-1
    assert_eq!(cleared, None);
    assert_eq!(
        f.mirror.snapshot().focused_window.as_deref(),
        Some("hwnd-1")
    );
}

/// WHAT: The launcher hotkey toggles the launcher and launching closes it
/// WHY: One shortcut opens and dismisses the launcher
#[tokio::test]
async fn given_launcher_hotkey_when_pressed_then_launcher_toggles_and_launch_closes() {
    // Given: A synced mirror, launcher closed
    let f = synced(Duration::ZERO).await;
    let press = || ShellEvent::HotkeyPressed {
        id: "toggle-launcher".to_string(),
    };

    // When: Pressed once
    deliver(&f.client, press());
    let opened = f.mirror.snapshot().launcher_open;

    // And: An unrelated hotkey is pressed, then an app is launched
    deliver(
        &f.client,
        ShellEvent::HotkeyPressed {
            id: "screenshot".to_string(),
        },
    );
    let still_open = f.mirror.snapshot().launcher_open;
    f.mirror.launch_app("terminal").await;

    // Then: open, open, closed
    assert!(opened);
    assert!(still_open);
    assert!(!f.mirror.snapshot().launcher_open);
    assert_eq!(f.endpoint.calls("launchApp"), 1);
}

/// WHAT: A handshake after the first sync triggers a full resync
/// WHY: Events missed while disconnected are otherwise lost
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_synced_mirror_when_handshake_repeats_then_resynced() {
    // Given: A synced mirror
    let f = synced(Duration::ZERO).await;
    assert_eq!(f.endpoint.calls("getShellState"), 1);

    // When: The bridge reconnects
    deliver(&f.client, ShellEvent::connected());

    // Then: The bulk fetch runs again
    tokio::time::timeout(Duration::from_secs(1), async {
        while f.endpoint.calls("getShellState") < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}
