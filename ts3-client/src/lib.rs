//! Safe Rust bindings for the TeamSpeak 3 Client SDK.
//!
//! The closed-source client library is loaded at runtime (see [`native::NativeLib`]) and
//! driven through the [`ClientLib`] seam. Events the library raises on its own threads are
//! delivered through a fixed table of `extern "C"` trampolines into a process-wide
//! [`HandlerRegistry`], which calls the handlers registered with
//! [`Client::set_client_callbacks`].

pub mod bridge;
pub mod client;
pub mod config;
pub mod definitions;
pub mod error;
pub mod event;
pub mod ids;
pub mod native;

pub use bridge::abi::ClientUiFunctions;
pub use bridge::callback::{ClientCallbacks, Handler};
pub use bridge::envelope::EventEnvelope;
pub use bridge::registry::HandlerRegistry;
pub use client::Client;
pub use config::{ClientConfig, ConnectOptions, InitOptions};
pub use definitions::{
    ChannelProperties, CodecEncryptionMode, CodecType, ConnectStatus, HardwareInputStatus,
    HardwareOutputStatus, InputDeactivationStatus, LogLevel, LogTypes, MoveReason,
    MuteInputStatus, MuteOutputStatus, TalkStatus, TextMessageTargetMode, Visibility,
};
pub use error::{Error, ErrorCode, ErrorLookup, Result};
pub use event::{ClientEvent, EventKind};
pub use ids::{AnyId, ChannelId, ClientId, ConnectionHandlerId};
pub use native::ClientLib;
