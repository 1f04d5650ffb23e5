use async_trait::async_trait;
use global_hotkey::hotkey::{Code, Modifiers};
use tokio::sync::mpsc;

/// Channel on which a backend reports presses, keyed by atom id.
pub type AtomSink = mpsc::UnboundedSender<u32>;

/// Narrow adapter over the OS keyboard-hook facility.
///
/// Implementations own every unsafe or thread-affine detail. Failures are
/// reported as plain reasons; the registry decides what they mean.
#[async_trait]
pub trait HotkeyBackend: Send + Sync {
    /// Register `modifiers + key` with the OS under `atom`.
    async fn register(&self, atom: u32, modifiers: Modifiers, key: Code) -> Result<(), String>;

    /// Release the OS registration for `atom`.
    async fn unregister(&self, atom: u32) -> Result<(), String>;

    /// Start delivering presses for registered atoms into `sink`.
    async fn open_sink(&self, sink: AtomSink) -> Result<(), String>;

    /// Stop delivering presses. Must be safe to call more than once.
    async fn close_sink(&self);
}
