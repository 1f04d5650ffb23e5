use crate::CoreResult;

use async_trait::async_trait;
use serde_json::Value;

/// The native side of the bridge as seen by a client.
///
/// Implemented in-process by [`BridgeHost`](crate::BridgeHost); remote
/// transports implement it by forwarding the call over their connection.
#[async_trait]
pub trait BridgeEndpoint: Send + Sync {
    /// Invoke `method` with positional `args`.
    async fn invoke(&self, method: &str, args: Vec<Value>) -> CoreResult<Value>;
}
