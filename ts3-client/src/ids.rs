//! Opaque identifiers handed out by the client library.
//!
//! None of these carry a validity guarantee. A [`ConnectionHandlerId`] must not be used after
//! its handler was destroyed, and a [`ChannelId`] or [`ClientId`] must not be used after the
//! server deleted the entity it names. The binding forwards the values and never checks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The native `anyID` type: the width of client IDs on the wire.
pub type AnyId = u16;

/// One server connection session inside the client library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionHandlerId(pub u64);

/// A channel in one connection's channel tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

/// A client in one connection's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub AnyId);

impl ConnectionHandlerId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl ChannelId {
    /// The virtual root every top-level channel hangs off.
    pub const ROOT: ChannelId = ChannelId(0);

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl ClientId {
    pub const fn raw(self) -> AnyId {
        self.0
    }
}

impl From<u64> for ConnectionHandlerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<u64> for ChannelId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<AnyId> for ClientId {
    fn from(raw: AnyId) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionHandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
