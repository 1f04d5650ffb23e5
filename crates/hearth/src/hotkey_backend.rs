use crate::{HotkeyRequest, ShellLoopCommand};

use hearth_core::{HotkeyBackend, hotkey::AtomSink};

use async_trait::async_trait;
use global_hotkey::hotkey::{Code, Modifiers};
use parking_lot::Mutex;
use tao::event_loop::EventLoopProxy;
use tokio::sync::oneshot;

/// [`HotkeyBackend`] that runs every OS call on the main thread.
pub struct EventLoopHotkeyBackend {
    proxy: Mutex<EventLoopProxy<ShellLoopCommand>>,
}

impl EventLoopHotkeyBackend {
    /// Backend posting to the event loop behind `proxy`.
    pub fn new(proxy: EventLoopProxy<ShellLoopCommand>) -> Self {
        Self {
            proxy: Mutex::new(proxy),
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HotkeyRequest,
    ) -> Result<T, String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.proxy
            .lock()
            .send_event(ShellLoopCommand::Hotkey(build(reply_tx)))
            .map_err(|_| "main event loop has exited".to_string())?;
        reply_rx
            .await
            .map_err(|_| "main event loop dropped the request".to_string())
    }
}

#[async_trait]
impl HotkeyBackend for EventLoopHotkeyBackend {
    async fn register(&self, atom: u32, modifiers: Modifiers, key: Code) -> Result<(), String> {
        self.request(|reply| HotkeyRequest::Register {
            atom,
            modifiers,
            key,
            reply,
        })
        .await?
    }

    async fn unregister(&self, atom: u32) -> Result<(), String> {
        self.request(|reply| HotkeyRequest::Unregister { atom, reply })
            .await?
    }

    async fn open_sink(&self, sink: AtomSink) -> Result<(), String> {
        self.request(|reply| HotkeyRequest::OpenSink { sink, reply })
            .await?
    }

    async fn close_sink(&self) {
        let _ = self
            .request(|reply| HotkeyRequest::CloseSink { reply })
            .await;
    }
}
