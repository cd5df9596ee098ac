//! The set of user handlers, one optional slot per event kind.

use std::fmt;
use std::sync::Arc;

use crate::event::{
    ChannelMove, ClientMove, ClientMoveSubscription, ClientMoveTimeout, ConnectStatusChange,
    DelChannel, EventKind, NewChannel, NewChannelCreated, ServerProtocolVersion,
    TalkStatusChange, TextMessage, UpdateChannel, UpdateChannelEdited, UpdateClient,
};
use crate::ids::ConnectionHandlerId;

/// A handler for one event kind.
///
/// Runs synchronously on whichever library thread raised the event, and blocks that thread
/// until it returns. Long-running work belongs on the caller's own threads or tasks.
pub type Handler<E> = Arc<dyn Fn(ConnectionHandlerId, &E) + Send + Sync>;

/// Receives the event kind and panic message when a handler panics.
pub type PanicSink = Arc<dyn Fn(EventKind, &str) + Send + Sync>;

macro_rules! handler_set {
    ($( $(#[$doc:meta])* $field:ident, $setter:ident: $event:ty => $kind:ident; )*) => {
        /// Handlers to install with [`Client::set_client_callbacks`](crate::Client::set_client_callbacks).
        ///
        /// Kinds left unset are ignored when the library raises them. Registration always
        /// replaces the whole set, so a changed set is built anew (or cloned and extended).
        #[derive(Clone, Default)]
        pub struct ClientCallbacks {
            $( pub(crate) $field: Option<Handler<$event>>, )*
            pub(crate) handler_panic: Option<PanicSink>,
        }

        impl ClientCallbacks {
            $(
                $(#[$doc])*
                pub fn $setter<F>(mut self, handler: F) -> Self
                where
                    F: Fn(ConnectionHandlerId, &$event) + Send + Sync + 'static,
                {
                    self.$field = Some(Arc::new(handler));
                    self
                }
            )*

            /// Whether a handler is present for `kind`.
            pub fn is_set(&self, kind: EventKind) -> bool {
                match kind {
                    $( EventKind::$kind => self.$field.is_some(), )*
                }
            }
        }
    };
}

handler_set! {
    /// Connection state changed. `error` is nonzero when the connection was lost.
    connect_status_change, on_connect_status_change: ConnectStatusChange => ConnectStatusChange;
    server_protocol_version, on_server_protocol_version: ServerProtocolVersion => ServerProtocolVersion;
    /// A channel was announced while the channel list arrives after connecting.
    new_channel, on_new_channel: NewChannel => NewChannel;
    new_channel_created, on_new_channel_created: NewChannelCreated => NewChannelCreated;
    del_channel, on_del_channel: DelChannel => DelChannel;
    channel_move, on_channel_move: ChannelMove => ChannelMove;
    /// Channel variables changed.
    update_channel, on_update_channel: UpdateChannel => UpdateChannel;
    update_channel_edited, on_update_channel_edited: UpdateChannelEdited => UpdateChannelEdited;
    update_client, on_update_client: UpdateClient => UpdateClient;
    client_move, on_client_move: ClientMove => ClientMove;
    /// A client became visible or invisible through a channel (un)subscription.
    client_move_subscription, on_client_move_subscription: ClientMoveSubscription => ClientMoveSubscription;
    client_move_timeout, on_client_move_timeout: ClientMoveTimeout => ClientMoveTimeout;
    talk_status_change, on_talk_status_change: TalkStatusChange => TalkStatusChange;
    text_message, on_text_message: TextMessage => TextMessage;
}

impl ClientCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the kind and message when one of the other handlers panics.
    ///
    /// The panic is always logged and never reaches the library's stack. A panic inside this
    /// sink is swallowed.
    pub fn on_handler_panic<F>(mut self, sink: F) -> Self
    where
        F: Fn(EventKind, &str) + Send + Sync + 'static,
    {
        self.handler_panic = Some(Arc::new(sink));
        self
    }

    /// The kinds with a handler present, in [`EventKind::ALL`] order.
    pub fn registered(&self) -> impl Iterator<Item = EventKind> + '_ {
        EventKind::ALL.into_iter().filter(|kind| self.is_set(*kind))
    }
}

impl fmt::Debug for ClientCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCallbacks")
            .field("registered", &self.registered().collect::<Vec<_>>())
            .field("handler_panic", &self.handler_panic.is_some())
            .finish()
    }
}
