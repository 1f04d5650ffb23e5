use crate::config::{default_connect_timeout_ms, default_port};

use serde::{Deserialize, Serialize};

/// Environment variable carrying the bridge URL to the UI host.
const BRIDGE_URL_ENV: &str = "HEARTH_BRIDGE_URL";
/// Environment variable carrying the handshake timeout to the UI host.
const CONNECT_TIMEOUT_ENV: &str = "HEARTH_CONNECT_TIMEOUT_MS";

/// WebSocket bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Loopback port the bridge listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// How long a UI-side mirror waits for the handshake.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl BridgeConfig {
    /// URL the UI host connects to.
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}/bridge", self.port)
    }

    /// Environment handed to the UI host so it can find the bridge.
    pub fn ui_environment(&self) -> Vec<(String, String)> {
        vec![
            (BRIDGE_URL_ENV.to_string(), self.url()),
            (
                CONNECT_TIMEOUT_ENV.to_string(),
                self.connect_timeout_ms.to_string(),
            ),
        ]
    }
}
