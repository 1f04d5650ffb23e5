//! WebSocket transport for the bridge.
//!
//! Serves `ws://127.0.0.1:<port>/bridge`. Each connection gets a `connected`
//! envelope, then every shell event as a JSON text frame. Text frames from
//! the UI are command requests and are answered in order.

use crate::{AppError, AppResult, config::BridgeConfig};

use hearth_core::{BridgeHost, CommandRequest, CommandResponse, Envelope, ShellEvent};

use std::{
    net::{Ipv4Addr, SocketAddr},
    panic::Location,
};

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use error_location::ErrorLocation;
use serde::Serialize;
use tokio::{
    net::TcpListener,
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

/// Path the UI connects to.
pub const BRIDGE_PATH: &str = "/bridge";

#[derive(Clone)]
struct BridgeState {
    host: BridgeHost,
    stopping: watch::Receiver<bool>,
}

/// A running bridge server.
pub struct BridgeServer {
    local_addr: SocketAddr,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl BridgeServer {
    /// Bind the loopback port and start serving.
    #[track_caller]
    #[instrument(skip(host))]
    pub async fn start(host: BridgeHost, config: &BridgeConfig) -> AppResult<Self> {
        let location = ErrorLocation::from(Location::caller());
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, config.port));

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::BridgeServer {
                reason: format!("Failed to bind {addr}: {e}"),
                location,
            })?;
        let local_addr = listener.local_addr()?;

        let (stop, stopping) = watch::channel(false);
        let router = Router::new()
            .route(BRIDGE_PATH, get(upgrade))
            .with_state(BridgeState {
                host,
                stopping: stopping.clone(),
            });

        let mut shutdown = stopping;
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stopped| *stopped).await;
            });
            if let Err(e) = server.await {
                error!(error = %e, "Bridge server failed");
            }
        });

        info!(%local_addr, "Bridge server listening");
        Ok(Self {
            local_addr,
            stop,
            task,
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Close every connection and stop accepting new ones.
    #[instrument(skip(self))]
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Bridge server task ended abnormally");
        }
        info!("Bridge server stopped");
    }
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<BridgeState>) -> Response {
    ws.on_upgrade(move |socket| serve_connection(socket, state))
}

async fn serve_connection(mut socket: WebSocket, state: BridgeState) {
    let BridgeState { host, mut stopping } = state;
    let mut events = host.subscribe();

    if send_event(&mut socket, &ShellEvent::connected()).await.is_err() {
        return;
    }
    info!("UI connected to bridge");

    loop {
        tokio::select! {
            frame = socket.recv() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let response = match serde_json::from_str::<CommandRequest>(text.as_str()) {
                        Ok(request) => host.handle_request(request).await,
                        Err(e) => {
                            warn!(error = %e, "Malformed bridge request");
                            CommandResponse::failure(0, format!("malformed request: {e}"))
                        }
                    };
                    if send_json(&mut socket, &response).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "Bridge socket error");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if send_event(&mut socket, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Bridge connection lagged behind events");
                }
                Err(RecvError::Closed) => break,
            },
            _ = async { let _ = stopping.wait_for(|stopped| *stopped).await; } => break,
        }
    }

    let _ = socket.send(Message::Close(None)).await;
    info!("UI disconnected from bridge");
}

async fn send_event(socket: &mut WebSocket, event: &ShellEvent) -> Result<(), axum::Error> {
    match Envelope::from_event(event) {
        Ok(envelope) => send_json(socket, &envelope).await,
        Err(e) => {
            warn!(error = ?e, "Failed to encode event");
            Ok(())
        }
    }
}

async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), axum::Error> {
    match serde_json::to_string(value) {
        Ok(text) => socket.send(Message::Text(text.into())).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize bridge frame");
            Ok(())
        }
    }
}
