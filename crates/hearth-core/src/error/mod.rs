use crate::ServiceState;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Shell core errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A lifecycle operation was requested in a state that does not allow it.
    #[error("Invalid operation: cannot {operation} while {state} {location}")]
    InvalidOperation {
        /// The rejected operation.
        operation: &'static str,
        /// Service state at the time of the request.
        state: ServiceState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Another start/stop transition is already in flight.
    #[error("A lifecycle transition is already in progress {location}")]
    TransitionInProgress {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A desktop tracker could not be acquired.
    #[error("Tracker '{tracker}' failed: {reason} {location}")]
    TrackerFailed {
        /// Name of the failing tracker.
        tracker: String,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Hotkey ids must be non-empty.
    #[error("Hotkey id must not be empty {location}")]
    EmptyHotkeyId {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The hotkey notification sink could not be opened.
    #[error("Hotkey notification sink failed: {reason} {location}")]
    HotkeySinkFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A shortcut string could not be parsed.
    #[error("Invalid shortcut '{shortcut}': {reason} {location}")]
    InvalidShortcut {
        /// The rejected shortcut text.
        shortcut: String,
        /// Parser message.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The native bridge endpoint is not attached.
    #[error("Method unavailable: {method} {location}")]
    MethodUnavailable {
        /// Command name that was invoked.
        method: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The native side does not know the requested command.
    #[error("Unknown bridge method: {method} {location}")]
    UnknownMethod {
        /// Command name that was invoked.
        method: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Positional command arguments did not match the command signature.
    #[error("Invalid arguments for {method}: {reason} {location}")]
    InvalidArguments {
        /// Command name that was invoked.
        method: String,
        /// Description of the mismatch.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A command failed on the remote side of the bridge.
    #[error("Remote call {method} failed: {reason} {location}")]
    RemoteCall {
        /// Command name that was invoked.
        method: String,
        /// Error text reported by the remote side.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The bridge handshake did not complete in time.
    #[error("Bridge connection timed out after {timeout_ms}ms {location}")]
    ConnectionTimeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No workspace with the given id exists.
    #[error("Workspace not found: {id} {location}")]
    WorkspaceNotFound {
        /// The unknown workspace id.
        id: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No window with the given handle is tracked.
    #[error("Window not found: {handle} {location}")]
    WindowNotFound {
        /// The unknown window handle.
        handle: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An external collaborator (window ops, system actions) failed.
    #[error("Action {action} failed: {reason} {location}")]
    ActionFailed {
        /// Name of the action.
        action: String,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {source} {location}")]
    Serialization {
        /// The underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CoreError {
    /// Build a [`CoreError::MethodUnavailable`] at the caller's location.
    #[track_caller]
    pub fn method_unavailable(method: impl Into<String>) -> Self {
        CoreError::MethodUnavailable {
            method: method.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`CoreError::ActionFailed`] at the caller's location.
    #[track_caller]
    pub fn action_failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::ActionFailed {
            action: action.into(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

// Manual From<serde_json::Error> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<serde_json::Error> for CoreError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        CoreError::Serialization {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = StdResult<T, CoreError>;
