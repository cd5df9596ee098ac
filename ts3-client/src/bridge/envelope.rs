//! EventEnvelope: events copied off the library's threads into a channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::bridge::callback::ClientCallbacks;
use crate::event::ClientEvent;
use crate::ids::ConnectionHandlerId;

/// Versioned wrapper around a forwarded [`ClientEvent`].
///
/// Fields:
/// - `version`: Schema version (always 1 for now).
/// - `seq`: Increasing sequence number per forwarding set, starting at 1.
/// - `timestamp_ms`: UTC milliseconds when the envelope was created.
/// - `connection`: The connection handler the event belongs to.
/// - `event`: The event payload.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub version: u32,
    pub seq: u64,
    pub timestamp_ms: i64,
    pub connection: ConnectionHandlerId,
    pub event: ClientEvent,
}

impl EventEnvelope {
    pub fn new(seq: u64, connection: ConnectionHandlerId, event: ClientEvent) -> Self {
        Self {
            version: 1,
            seq,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            connection,
            event,
        }
    }
}

struct Forwarder {
    seq: AtomicU64,
    tx: UnboundedSender<EventEnvelope>,
}

impl Forwarder {
    fn send(&self, connection: ConnectionHandlerId, event: ClientEvent) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        if self.tx.send(EventEnvelope::new(seq, connection, event)).is_err() {
            tracing::trace!(seq, "event receiver closed, dropping event");
        }
    }
}

fn forward<E: Clone>(
    forwarder: &Arc<Forwarder>,
    wrap: fn(E) -> ClientEvent,
) -> impl Fn(ConnectionHandlerId, &E) + Send + Sync + 'static
where
    E: 'static,
{
    let forwarder = Arc::clone(forwarder);
    move |connection: ConnectionHandlerId, event: &E| {
        forwarder.send(connection, wrap(event.clone()))
    }
}

impl ClientCallbacks {
    /// A set that copies every event into an [`EventEnvelope`] and sends it to `tx`.
    ///
    /// Sending on an unbounded channel never blocks, so the library's threads are released
    /// immediately. Events raised after the receiver is dropped are discarded.
    pub fn forward_to(tx: UnboundedSender<EventEnvelope>) -> Self {
        let forwarder = Arc::new(Forwarder {
            seq: AtomicU64::new(0),
            tx,
        });
        ClientCallbacks::new()
            .on_connect_status_change(forward(&forwarder, ClientEvent::ConnectStatusChange))
            .on_server_protocol_version(forward(&forwarder, ClientEvent::ServerProtocolVersion))
            .on_new_channel(forward(&forwarder, ClientEvent::NewChannel))
            .on_new_channel_created(forward(&forwarder, ClientEvent::NewChannelCreated))
            .on_del_channel(forward(&forwarder, ClientEvent::DelChannel))
            .on_channel_move(forward(&forwarder, ClientEvent::ChannelMove))
            .on_update_channel(forward(&forwarder, ClientEvent::UpdateChannel))
            .on_update_channel_edited(forward(&forwarder, ClientEvent::UpdateChannelEdited))
            .on_update_client(forward(&forwarder, ClientEvent::UpdateClient))
            .on_client_move(forward(&forwarder, ClientEvent::ClientMove))
            .on_client_move_subscription(forward(&forwarder, ClientEvent::ClientMoveSubscription))
            .on_client_move_timeout(forward(&forwarder, ClientEvent::ClientMoveTimeout))
            .on_talk_status_change(forward(&forwarder, ClientEvent::TalkStatusChange))
            .on_text_message(forward(&forwarder, ClientEvent::TextMessage))
    }
}
