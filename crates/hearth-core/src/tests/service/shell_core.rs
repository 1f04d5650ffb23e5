use crate::{
    CoreError, DesktopTracker, HotkeyBackend, RegisterOutcome, ServiceState, ShellCoreService,
    ShellEvent, TrackerEvent, WindowRecord,
    service::ObserverError,
    tests::support::{CallLog, FakeHotkeyBackend, FakeTracker, call_log, environment},
};

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::sync::broadcast;

struct Harness {
    shell: ShellCoreService,
    log: CallLog,
    tracker: Arc<FakeTracker>,
    backend: Arc<FakeHotkeyBackend>,
}

fn harness() -> Harness {
    let log = call_log();
    let tracker = FakeTracker::new("windows", Arc::clone(&log));
    let backend = FakeHotkeyBackend::new(Arc::clone(&log));
    let trackers: Vec<Arc<dyn DesktopTracker>> = vec![tracker.clone()];
    let hotkeys: Arc<dyn HotkeyBackend> = backend.clone();
    let shell = ShellCoreService::new(environment(trackers, Some(hotkeys), &log));
    Harness {
        shell,
        log,
        tracker,
        backend,
    }
}

fn record_states(shell: &ShellCoreService) -> Arc<Mutex<Vec<ServiceState>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    shell.on_state_changed(Box::new(move |state: ServiceState| {
        sink.lock().push(state);
        Ok(())
    }));
    seen
}

#[allow(clippy::unwrap_used)]
async fn next_event(rx: &mut broadcast::Receiver<ShellEvent>) -> ShellEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap()
}

/// WHAT: Start then stop walks the full lifecycle in order
/// WHY: Observers drive the splash screen and the supervisor
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stopped_service_when_started_and_stopped_then_observers_see_full_lifecycle() {
    // Given: A stopped service with a recording observer
    let h = harness();
    let seen = record_states(&h.shell);

    // When: Starting and stopping
    h.shell.start().await.unwrap();
    h.shell.stop().await.unwrap();

    // Then: Every transition was observed in order
    assert_eq!(
        *seen.lock(),
        vec![
            ServiceState::Starting,
            ServiceState::Running,
            ServiceState::Stopping,
            ServiceState::Stopped,
        ]
    );
}

/// WHAT: Starting a running service is rejected
/// WHY: A second start would install duplicate OS hooks
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_service_when_started_again_then_invalid_operation() {
    // Given: A running service
    let h = harness();
    h.shell.start().await.unwrap();

    // When: Starting again
    let result = h.shell.start().await;

    // Then: InvalidOperation, still running
    assert!(matches!(
        result,
        Err(CoreError::InvalidOperation {
            state: ServiceState::Running,
            ..
        })
    ));
    assert_eq!(h.shell.state(), ServiceState::Running);
}

/// WHAT: A failing tracker unwinds the trackers already started and leaves the service Failed
/// WHY: Partial acquisition must never leak OS hooks
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_second_tracker_fails_when_starting_then_first_stopped_and_state_failed() {
    // Given: Two trackers, the second of which fails
    let log = call_log();
    let trackers: Vec<Arc<dyn DesktopTracker>> = vec![
        FakeTracker::new("windows", Arc::clone(&log)),
        FakeTracker::failing("tray", Arc::clone(&log)),
    ];
    let shell = ShellCoreService::new(environment(trackers, None, &log));

    // When: Starting
    let result = shell.start().await;

    // Then: Failed, and the first tracker was stopped
    assert!(matches!(result, Err(CoreError::TrackerFailed { .. })));
    assert_eq!(shell.state(), ServiceState::Failed);
    assert_eq!(
        *log.lock(),
        vec!["start:windows", "start:tray", "stop:windows"]
    );

    // And: Stop clears the failure
    shell.stop().await.unwrap();
    assert_eq!(shell.state(), ServiceState::Stopped);
}

/// WHAT: Queries return empty results and commands are rejected before Running
/// WHY: Callers must never observe half-initialized state
#[tokio::test]
async fn given_stopped_service_when_querying_and_commanding_then_empty_and_rejected() {
    // Given: A stopped service
    let h = harness();

    // When: Querying and issuing a command
    let windows = h.shell.list_windows();
    let workspaces = h.shell.list_workspaces();
    let apps = h.shell.launcher_apps().await;
    let snapshot = h.shell.shell_state();
    let focus = h.shell.focus_window("hwnd-1").await;

    // Then: Empty, default, rejected
    assert!(windows.is_empty());
    assert!(workspaces.is_empty());
    assert!(apps.is_empty());
    assert_eq!(snapshot.service_state, ServiceState::Stopped);
    assert!(matches!(focus, Err(CoreError::InvalidOperation { .. })));
    assert!(h.log.lock().iter().all(|c| !c.starts_with("focus")));
}

/// WHAT: Stopping a stopped service is a silent no-op
/// WHY: Shutdown paths call stop unconditionally
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stopped_service_when_stopping_then_no_transition() {
    // Given: A stopped service with an observer
    let h = harness();
    let seen = record_states(&h.shell);

    // When: Stopping twice
    h.shell.stop().await.unwrap();
    h.shell.stop().await.unwrap();

    // Then: No transitions were published
    assert!(seen.lock().is_empty());
}

/// WHAT: A panicking or failing observer does not block later observers or the transition
/// WHY: Observer code is outside the service's control
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_misbehaving_observers_when_starting_then_later_observers_still_notified() {
    // Given: A panicking observer, a failing one, then a recording one
    let h = harness();
    h.shell.on_state_changed(Box::new(
        |_: ServiceState| -> Result<(), ObserverError> { std::panic::panic_any("observer bug") },
    ));
    h.shell.on_state_changed(Box::new(
        |_: ServiceState| -> Result<(), ObserverError> { Err("observer refused".into()) },
    ));
    let seen = record_states(&h.shell);

    // When: Starting
    h.shell.start().await.unwrap();

    // Then: Running, and the recording observer saw both transitions
    assert_eq!(h.shell.state(), ServiceState::Running);
    assert_eq!(
        *seen.lock(),
        vec![ServiceState::Starting, ServiceState::Running]
    );
}

/// WHAT: Tracker observations reach subscribers as shell events
/// WHY: The bridge forwards exactly this broadcast to the UI
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_service_when_tracker_reports_window_then_window_created_broadcast() {
    // Given: A running service and a subscriber
    let h = harness();
    let mut rx = h.shell.subscribe();
    h.shell.start().await.unwrap();

    // When: The tracker observes a window
    assert!(
        h.tracker
            .emit(TrackerEvent::WindowObserved(WindowRecord::new("hwnd-1", "Editor")))
    );

    // Then: WindowCreated arrives and the window is listed
    let event = next_event(&mut rx).await;
    assert!(matches!(event, ShellEvent::WindowCreated(ref w) if w.handle == "hwnd-1"));
    assert_eq!(h.shell.list_windows().len(), 1);
    assert_eq!(h.shell.shell_state().window_count, 1);
}

/// WHAT: An OS hotkey press is broadcast as hotkeyPressed with the logical id
/// WHY: The UI toggles the launcher from this event
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_registered_hotkey_when_pressed_then_hotkey_pressed_broadcast() {
    // Given: A running service with "toggle-launcher" registered
    let h = harness();
    let mut rx = h.shell.subscribe();
    h.shell.start().await.unwrap();
    let outcome = h
        .shell
        .register_hotkey("toggle-launcher", "super+Space")
        .await
        .unwrap();
    let RegisterOutcome::Registered { atom } = outcome else {
        unreachable!("fake backend accepts every registration");
    };

    // When: The OS reports the press
    assert!(h.backend.press(atom));

    // Then: hotkeyPressed with the logical id
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::HotkeyPressed {
            id: "toggle-launcher".to_string()
        }
    );
}

/// WHAT: Stop releases hotkeys before stopping trackers
/// WHY: Teardown runs in reverse acquisition order
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_service_with_hotkey_when_stopping_then_hotkeys_released_before_trackers() {
    // Given: A running service with one hotkey
    let h = harness();
    h.shell.start().await.unwrap();
    h.shell
        .register_hotkey("toggle-launcher", "super+Space")
        .await
        .unwrap();

    // When: Stopping
    h.shell.stop().await.unwrap();

    // Then: unregister, close_sink, then tracker stop
    let log = h.log.lock().clone();
    let tail: Vec<&str> = log.iter().rev().take(3).rev().map(String::as_str).collect();
    assert_eq!(tail, vec!["unregister:1", "close_sink", "stop:windows"]);
    assert!(h.shell.hotkeys().is_empty());
    assert!(h.backend.active.lock().is_empty());
}

/// WHAT: Workspace commands mutate state and broadcast their events
/// WHY: The UI patches its projection from these events
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_service_when_creating_and_switching_workspace_then_events_broadcast() {
    // Given: A running service
    let h = harness();
    let mut rx = h.shell.subscribe();
    h.shell.start().await.unwrap();

    // When: Creating "dev", creating it again, and switching to it
    let created = h.shell.create_workspace("dev", "Dev").unwrap();
    let duplicate = h.shell.create_workspace("dev", "Dev").unwrap();
    let switched = h.shell.switch_workspace("dev").unwrap();

    // Then: Two events, in order
    assert!(created);
    assert!(!duplicate);
    assert!(switched);
    assert!(matches!(
        next_event(&mut rx).await,
        ShellEvent::WorkspaceCreated(ref ws) if ws.id == "dev"
    ));
    assert!(matches!(
        next_event(&mut rx).await,
        ShellEvent::WorkspaceSwitched { ref new_workspace_id, .. } if new_workspace_id == "dev"
    ));
    assert_eq!(h.shell.shell_state().active_workspace_id.as_deref(), Some("dev"));
}

/// WHAT: Escaping to the default shell works even when the service is not running
/// WHY: A broken session must always have a way out
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stopped_service_when_restoring_default_shell_then_action_runs() {
    // Given: A stopped service
    let h = harness();

    // When: Restoring the default shell
    let ok = h.shell.restore_default_shell().await.unwrap();

    // Then: The system action ran
    assert!(ok);
    assert!(h.log.lock().iter().any(|c| c == "restore_shell"));
}

/// WHAT: System status reports hotkey availability from the registry
/// WHY: The UI hides hotkey hints when hooks are unavailable
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_service_with_backend_when_reading_status_then_hotkeys_available() {
    // Given: A running service with an OS hotkey backend
    let h = harness();
    h.shell.start().await.unwrap();

    // When: Reading status
    let status = h.shell.system_status().await;

    // Then: Hotkeys available, collaborator fields passed through
    assert!(status.hotkeys_available);
    assert_eq!(status.volume_percent, Some(40));
}

/// WHAT: A hotkey sink failure unwinds the started trackers
/// WHY: The registry is acquired after trackers and must release them on failure
#[tokio::test]
async fn given_hotkey_sink_fails_when_starting_then_trackers_stopped_and_failed() {
    // Given: A backend that cannot open its sink
    let h = harness();
    h.backend
        .fail_open
        .store(true, std::sync::atomic::Ordering::SeqCst);

    // When: Starting
    let result = h.shell.start().await;

    // Then: Failed, and the tracker was stopped after the sink attempt
    assert!(matches!(result, Err(CoreError::HotkeySinkFailed { .. })));
    assert_eq!(h.shell.state(), ServiceState::Failed);
    assert_eq!(
        *h.log.lock(),
        vec!["start:windows", "open_sink", "stop:windows"]
    );
}

/// WHAT: Start and stop fail fast while a start is still acquiring
/// WHY: Only one lifecycle transition may run at a time
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_start_in_flight_when_starting_or_stopping_then_transition_in_progress() {
    // Given: A start parked inside tracker acquisition
    let log = call_log();
    let tracker = FakeTracker::gated("windows", Arc::clone(&log));
    let trackers: Vec<Arc<dyn DesktopTracker>> = vec![tracker.clone()];
    let shell = Arc::new(ShellCoreService::new(environment(trackers, None, &log)));
    let first = tokio::spawn({
        let shell = Arc::clone(&shell);
        async move { shell.start().await }
    });
    tracker.entered.notified().await;

    // When: Another start and a stop arrive concurrently
    let second = shell.start().await;
    let stop = shell.stop().await;

    // Then: Both are refused and the first start is undisturbed
    assert!(matches!(second, Err(CoreError::TransitionInProgress { .. })));
    assert!(matches!(stop, Err(CoreError::TransitionInProgress { .. })));
    assert_eq!(shell.state(), ServiceState::Starting);

    tracker.release.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(shell.state(), ServiceState::Running);
    assert_eq!(*log.lock(), vec!["start:windows".to_string()]);
}

/// WHAT: An observer may register another observer during a transition
/// WHY: Registering from a callback must not deadlock the state machine
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_observer_registering_observer_when_starting_then_no_deadlock_and_next_transition_seen() {
    // Given: An observer that adds a recording observer on Starting
    let log = call_log();
    let shell = Arc::new(ShellCoreService::new(environment(Vec::new(), None, &log)));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let weak = Arc::downgrade(&shell);
    let sink = Arc::clone(&seen);
    shell.on_state_changed(Box::new(move |state: ServiceState| {
        if state == ServiceState::Starting
            && let Some(shell) = weak.upgrade()
        {
            let sink = Arc::clone(&sink);
            shell.on_state_changed(Box::new(move |state: ServiceState| {
                sink.lock().push(state);
                Ok(())
            }));
        }
        Ok(())
    }));

    // When: Starting
    shell.start().await.unwrap();

    // Then: The late observer saw the transition after its registration
    assert_eq!(*seen.lock(), vec![ServiceState::Running]);
}
