//! Event kinds and the owned payloads handed to handlers.

use std::fmt;

use serde::Serialize;

use crate::definitions::{ConnectStatus, TalkStatus, TextMessageTargetMode, Visibility};
use crate::error::ErrorCode;
use crate::ids::{AnyId, ChannelId, ClientId};

/// The fourteen notifications the client library delivers through the trampoline table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ConnectStatusChange,
    ServerProtocolVersion,
    NewChannel,
    NewChannelCreated,
    DelChannel,
    ChannelMove,
    UpdateChannel,
    UpdateChannelEdited,
    UpdateClient,
    ClientMove,
    ClientMoveSubscription,
    ClientMoveTimeout,
    TalkStatusChange,
    TextMessage,
}

impl EventKind {
    /// Every bridged kind.
    pub const ALL: [EventKind; 14] = [
        EventKind::ConnectStatusChange,
        EventKind::ServerProtocolVersion,
        EventKind::NewChannel,
        EventKind::NewChannelCreated,
        EventKind::DelChannel,
        EventKind::ChannelMove,
        EventKind::UpdateChannel,
        EventKind::UpdateChannelEdited,
        EventKind::UpdateClient,
        EventKind::ClientMove,
        EventKind::ClientMoveSubscription,
        EventKind::ClientMoveTimeout,
        EventKind::TalkStatusChange,
        EventKind::TextMessage,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::ConnectStatusChange => "connect_status_change",
            EventKind::ServerProtocolVersion => "server_protocol_version",
            EventKind::NewChannel => "new_channel",
            EventKind::NewChannelCreated => "new_channel_created",
            EventKind::DelChannel => "del_channel",
            EventKind::ChannelMove => "channel_move",
            EventKind::UpdateChannel => "update_channel",
            EventKind::UpdateChannelEdited => "update_channel_edited",
            EventKind::UpdateClient => "update_client",
            EventKind::ClientMove => "client_move",
            EventKind::ClientMoveSubscription => "client_move_subscription",
            EventKind::ClientMoveTimeout => "client_move_timeout",
            EventKind::TalkStatusChange => "talk_status_change",
            EventKind::TextMessage => "text_message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client that caused a server-side change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoker {
    pub id: ClientId,
    pub name: String,
    pub unique_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectStatusChange {
    pub new_status: ConnectStatus,
    /// Zero when connecting or disconnecting on request; the cause when the connection was lost.
    pub error: ErrorCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerProtocolVersion {
    pub protocol_version: i32,
}

/// A channel announced while the channel list is received after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewChannel {
    pub channel_id: ChannelId,
    pub parent_id: ChannelId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewChannelCreated {
    pub channel_id: ChannelId,
    pub parent_id: ChannelId,
    pub invoker: Invoker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelChannel {
    pub channel_id: ChannelId,
    pub invoker: Invoker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelMove {
    pub channel_id: ChannelId,
    pub new_parent_id: ChannelId,
    pub invoker: Invoker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateChannel {
    pub channel_id: ChannelId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateChannelEdited {
    pub channel_id: ChannelId,
    pub invoker: Invoker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateClient {
    pub client_id: ClientId,
    pub invoker: Invoker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientMove {
    pub client_id: ClientId,
    pub old_channel_id: ChannelId,
    pub new_channel_id: ChannelId,
    pub visibility: Visibility,
    pub move_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientMoveSubscription {
    pub client_id: ClientId,
    pub old_channel_id: ChannelId,
    pub new_channel_id: ChannelId,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientMoveTimeout {
    pub client_id: ClientId,
    pub old_channel_id: ChannelId,
    pub new_channel_id: ChannelId,
    pub visibility: Visibility,
    pub timeout_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TalkStatusChange {
    pub status: TalkStatus,
    pub is_received_whisper: bool,
    pub client_id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMessage {
    pub target_mode: TextMessageTargetMode,
    /// Raw `anyID` target as the library reports it. The recipient client for private messages.
    pub to_id: AnyId,
    pub from: Invoker,
    pub message: String,
}

/// Any event payload, tagged with its kind.
///
/// Serialized with `#[serde(tag = "type", content = "data")]` so consumers can switch on
/// `type` and read `data` accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    ConnectStatusChange(ConnectStatusChange),
    ServerProtocolVersion(ServerProtocolVersion),
    NewChannel(NewChannel),
    NewChannelCreated(NewChannelCreated),
    DelChannel(DelChannel),
    ChannelMove(ChannelMove),
    UpdateChannel(UpdateChannel),
    UpdateChannelEdited(UpdateChannelEdited),
    UpdateClient(UpdateClient),
    ClientMove(ClientMove),
    ClientMoveSubscription(ClientMoveSubscription),
    ClientMoveTimeout(ClientMoveTimeout),
    TalkStatusChange(TalkStatusChange),
    TextMessage(TextMessage),
}

impl ClientEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ClientEvent::ConnectStatusChange(_) => EventKind::ConnectStatusChange,
            ClientEvent::ServerProtocolVersion(_) => EventKind::ServerProtocolVersion,
            ClientEvent::NewChannel(_) => EventKind::NewChannel,
            ClientEvent::NewChannelCreated(_) => EventKind::NewChannelCreated,
            ClientEvent::DelChannel(_) => EventKind::DelChannel,
            ClientEvent::ChannelMove(_) => EventKind::ChannelMove,
            ClientEvent::UpdateChannel(_) => EventKind::UpdateChannel,
            ClientEvent::UpdateChannelEdited(_) => EventKind::UpdateChannelEdited,
            ClientEvent::UpdateClient(_) => EventKind::UpdateClient,
            ClientEvent::ClientMove(_) => EventKind::ClientMove,
            ClientEvent::ClientMoveSubscription(_) => EventKind::ClientMoveSubscription,
            ClientEvent::ClientMoveTimeout(_) => EventKind::ClientMoveTimeout,
            ClientEvent::TalkStatusChange(_) => EventKind::TalkStatusChange,
            ClientEvent::TextMessage(_) => EventKind::TextMessage,
        }
    }
}
