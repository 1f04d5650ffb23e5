mod client;
mod command;
mod endpoint;
mod event;
mod host;
mod mirror;
mod wire;

pub use {
    client::{BridgeClient, EventHandler, HandlerError, RawHandler},
    command::BridgeCommand,
    endpoint::BridgeEndpoint,
    event::{Envelope, EventKind, PROTOCOL_VERSION, ShellEvent},
    host::BridgeHost,
    mirror::{
        MirrorSettings, Projection, STATUS_CONNECTED, STATUS_CONNECTING, STATUS_DISCONNECTED,
        ShellMirror, SyncResult,
    },
    wire::{CommandRequest, CommandResponse},
};
