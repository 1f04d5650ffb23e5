//! UI end of the bridge: command calls, event fan-out and the handshake.

use crate::{BridgeCommand, BridgeEndpoint, CoreError, CoreResult, Envelope, EventKind, ShellEvent};

use std::{
    collections::HashMap,
    error::Error as StdError,
    panic::{AssertUnwindSafe, Location, catch_unwind},
    sync::Arc,
    time::Duration,
};

use error_location::ErrorLocation;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, instrument, trace, warn};

/// Error type event handlers may return.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

/// Handler for a known event kind.
pub type EventHandler = Arc<dyn Fn(&ShellEvent) -> Result<(), HandlerError> + Send + Sync>;

/// Handler keyed by raw type name, for event types without a typed variant.
pub type RawHandler = Arc<dyn Fn(&Envelope) -> Result<(), HandlerError> + Send + Sync>;

/// Explicitly constructed bridge client, owned by the composition root.
pub struct BridgeClient {
    endpoint: RwLock<Option<Arc<dyn BridgeEndpoint>>>,
    handlers: RwLock<HashMap<EventKind, Vec<EventHandler>>>,
    raw_handlers: RwLock<HashMap<String, Vec<RawHandler>>>,
    connected: watch::Sender<bool>,
}

impl Default for BridgeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeClient {
    /// Create a detached, disconnected client.
    pub fn new() -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            endpoint: RwLock::new(None),
            handlers: RwLock::new(HashMap::new()),
            raw_handlers: RwLock::new(HashMap::new()),
            connected,
        }
    }

    /// Attach the native endpoint commands are sent to.
    pub fn attach(&self, endpoint: Arc<dyn BridgeEndpoint>) {
        *self.endpoint.write() = Some(endpoint);
        debug!("Bridge endpoint attached");
    }

    /// Drop the endpoint and mark the bridge disconnected.
    pub fn detach(&self) {
        *self.endpoint.write() = None;
        self.connected.send_replace(false);
        debug!("Bridge endpoint detached");
    }

    /// Whether a native endpoint is attached.
    pub fn is_attached(&self) -> bool {
        self.endpoint.read().is_some()
    }

    /// Whether the `connected` handshake has been seen since the last detach.
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Invoke a command by name.
    ///
    /// # Errors
    ///
    /// [`CoreError::MethodUnavailable`] when no endpoint is attached, or the
    /// endpoint's own error.
    #[track_caller]
    pub async fn call(&self, method: &str, args: Vec<Value>) -> CoreResult<Value> {
        let location = ErrorLocation::from(Location::caller());
        let endpoint = self.endpoint.read().clone();
        match endpoint {
            Some(endpoint) => endpoint.invoke(method, args).await,
            None => Err(CoreError::MethodUnavailable {
                method: method.to_string(),
                location,
            }),
        }
    }

    /// Invoke a typed command.
    pub async fn send(&self, command: BridgeCommand) -> CoreResult<Value> {
        self.call(command.method(), command.args()).await
    }

    /// Invoke a typed command and decode its result, falling back to
    /// `T::default()` on any failure.
    #[instrument(skip(self), fields(method = command.method()))]
    pub async fn send_or_default<T>(&self, command: BridgeCommand) -> T
    where
        T: DeserializeOwned + Default,
    {
        let method = command.method();
        match self.send(command).await {
            Ok(value) => match serde_json::from_value(value) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(method, error = %e, "Bridge result did not decode, using default");
                    T::default()
                }
            },
            Err(e) => {
                warn!(method, error = %e, "Bridge call failed, using default");
                T::default()
            }
        }
    }

    /// Register a handler for a known event kind.
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&ShellEvent) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Register a handler by raw type name.
    pub fn on_raw<F>(&self, type_name: &str, handler: F)
    where
        F: Fn(&Envelope) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.raw_handlers
            .write()
            .entry(type_name.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Fan an envelope out to its handlers.
    ///
    /// Each handler is isolated: an error or panic in one is logged and the
    /// rest still run. Returns the number of handlers that failed.
    pub fn dispatch(&self, envelope: &Envelope) -> usize {
        let kind = envelope.event_kind();
        if kind == Some(EventKind::Connected) {
            self.connected.send_replace(true);
        }

        let mut failures = 0;

        if let Some(kind) = kind {
            let handlers = self.handlers.read().get(&kind).cloned().unwrap_or_default();
            if !handlers.is_empty() {
                match envelope.decode() {
                    Ok(event) => {
                        for handler in &handlers {
                            failures += usize::from(!run_isolated(&envelope.kind, || handler(&event)));
                        }
                    }
                    Err(e) => {
                        warn!(kind = %kind, error = %e, "Dropping undecodable event");
                        failures += handlers.len();
                    }
                }
            }
        } else {
            trace!(kind = %envelope.kind, "Event type has no typed variant");
        }

        let raw = self
            .raw_handlers
            .read()
            .get(&envelope.kind)
            .cloned()
            .unwrap_or_default();
        for handler in &raw {
            failures += usize::from(!run_isolated(&envelope.kind, || handler(envelope)));
        }

        failures
    }

    /// Wait for the `connected` handshake.
    ///
    /// Resolves immediately if already connected.
    ///
    /// # Errors
    ///
    /// [`CoreError::ConnectionTimeout`] if no handshake arrives in time.
    #[track_caller]
    pub async fn wait_for_connection(&self, timeout: Duration) -> CoreResult<()> {
        let location = ErrorLocation::from(Location::caller());
        let mut connected = self.connected.subscribe();
        if *connected.borrow_and_update() {
            return Ok(());
        }

        let waited = tokio::time::timeout(timeout, connected.wait_for(|c| *c)).await;
        match waited {
            Ok(Ok(_)) => Ok(()),
            _ => Err(CoreError::ConnectionTimeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                location,
            }),
        }
    }
}

/// Run one handler, containing errors and panics. Returns `true` on success.
fn run_isolated<F>(kind: &str, handler: F) -> bool
where
    F: FnOnce() -> Result<(), HandlerError>,
{
    match catch_unwind(AssertUnwindSafe(handler)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(kind, error = %e, "Event handler failed");
            false
        }
        Err(_) => {
            warn!(kind, "Event handler panicked");
            false
        }
    }
}
