use hearth_core::hotkey::AtomSink;

use global_hotkey::hotkey::{Code, Modifiers};
use tokio::sync::oneshot;

/// Reply channel for a main-thread hotkey request.
pub type HotkeyReply = oneshot::Sender<Result<(), String>>;

/// Commands sent to the main-thread event loop.
#[derive(Debug)]
pub enum ShellLoopCommand {
    /// Hotkey work that must run on the thread owning the OS manager.
    Hotkey(HotkeyRequest),
    /// Leave the event loop with this exit code.
    Exit {
        /// Process exit code.
        code: i32,
    },
}

/// A hotkey operation executed by [`crate::HotkeyHost`].
#[derive(Debug)]
pub enum HotkeyRequest {
    /// Register a chord under a registry atom.
    Register {
        /// Registry atom.
        atom: u32,
        /// Modifier mask.
        modifiers: Modifiers,
        /// Key code.
        key: Code,
        /// Outcome.
        reply: HotkeyReply,
    },
    /// Release the chord registered under an atom.
    Unregister {
        /// Registry atom.
        atom: u32,
        /// Outcome.
        reply: HotkeyReply,
    },
    /// Start delivering presses to `sink`.
    OpenSink {
        /// Receiver of pressed atoms.
        sink: AtomSink,
        /// Outcome.
        reply: HotkeyReply,
    },
    /// Stop delivering presses.
    CloseSink {
        /// Acknowledgement.
        reply: oneshot::Sender<()>,
    },
}

impl HotkeyRequest {
    /// Answer without touching the OS.
    pub fn reject(self, reason: &str) {
        let reply = match self {
            HotkeyRequest::Register { reply, .. }
            | HotkeyRequest::Unregister { reply, .. }
            | HotkeyRequest::OpenSink { reply, .. } => reply,
            HotkeyRequest::CloseSink { reply } => {
                let _ = reply.send(());
                return;
            }
        };
        let _ = reply.send(Err(reason.to_string()));
    }
}
