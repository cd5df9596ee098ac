//! The native side of the bridge: the `ClientUIFunctions` table and its trampolines.
//!
//! The library keeps the table's raw function pointers for the life of the process, so every
//! slot points at a plain `extern "C"` function rather than a closure. Each of those reads the
//! process-wide [`REGISTRY`], which is the only state they share.
//!
//! Argument widths follow the SDK headers: connection handler and channel IDs are `uint64`,
//! client IDs are `anyID` (`u16`), strings are borrowed `const char*` that stay owned by the
//! library and are copied before the handler runs.

use std::ffi::{c_char, c_float, c_int, c_short, c_uint, CStr};

use once_cell::sync::Lazy;

use crate::bridge::registry::HandlerRegistry;
use crate::definitions::{ConnectStatus, TalkStatus, TextMessageTargetMode, Visibility};
use crate::error::ErrorCode;
use crate::event::{
    ChannelMove, ClientMove, ClientMoveSubscription, ClientMoveTimeout, ConnectStatusChange,
    DelChannel, EventKind, Invoker, NewChannel, NewChannelCreated, ServerProtocolVersion,
    TalkStatusChange, TextMessage, UpdateChannel, UpdateChannelEdited, UpdateClient,
};
use crate::ids::{AnyId, ChannelId, ClientId, ConnectionHandlerId};

/// The registry every trampoline in [`ClientUiFunctions::TRAMPOLINES`] reads.
pub static REGISTRY: Lazy<HandlerRegistry> = Lazy::new(HandlerRegistry::new);

pub type ConnectStatusChangeFn =
    unsafe extern "C" fn(sch: u64, new_status: c_int, error_number: c_uint);
pub type ServerProtocolVersionFn = unsafe extern "C" fn(sch: u64, protocol_version: c_int);
pub type NewChannelFn = unsafe extern "C" fn(sch: u64, channel_id: u64, channel_parent_id: u64);
pub type NewChannelCreatedFn = unsafe extern "C" fn(
    sch: u64,
    channel_id: u64,
    channel_parent_id: u64,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
);
pub type DelChannelFn = unsafe extern "C" fn(
    sch: u64,
    channel_id: u64,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
);
pub type ChannelMoveFn = unsafe extern "C" fn(
    sch: u64,
    channel_id: u64,
    new_channel_parent_id: u64,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
);
pub type UpdateChannelFn = unsafe extern "C" fn(sch: u64, channel_id: u64);
pub type UpdateChannelEditedFn = unsafe extern "C" fn(
    sch: u64,
    channel_id: u64,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
);
pub type UpdateClientFn = unsafe extern "C" fn(
    sch: u64,
    client_id: AnyId,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
);
pub type ClientMoveFn = unsafe extern "C" fn(
    sch: u64,
    client_id: AnyId,
    old_channel_id: u64,
    new_channel_id: u64,
    visibility: c_int,
    move_message: *const c_char,
);
pub type ClientMoveSubscriptionFn = unsafe extern "C" fn(
    sch: u64,
    client_id: AnyId,
    old_channel_id: u64,
    new_channel_id: u64,
    visibility: c_int,
);
pub type ClientMoveTimeoutFn = unsafe extern "C" fn(
    sch: u64,
    client_id: AnyId,
    old_channel_id: u64,
    new_channel_id: u64,
    visibility: c_int,
    timeout_message: *const c_char,
);
pub type TalkStatusChangeFn =
    unsafe extern "C" fn(sch: u64, status: c_int, is_received_whisper: c_int, client_id: AnyId);
pub type TextMessageFn = unsafe extern "C" fn(
    sch: u64,
    target_mode: AnyId,
    to_id: AnyId,
    from_id: AnyId,
    from_name: *const c_char,
    from_unique_identifier: *const c_char,
    message: *const c_char,
);

/// `struct ClientUIFunctions` from `clientlib.h`: every slot, in header order.
///
/// The library reads the whole struct, so slots the binding does not bridge are still laid
/// out and stay null. The default value is the all-null table (the library ignores null slots).
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct ClientUiFunctions {
    pub on_connect_status_change_event: Option<ConnectStatusChangeFn>,
    pub on_server_protocol_version_event: Option<ServerProtocolVersionFn>,
    pub on_new_channel_event: Option<NewChannelFn>,
    pub on_new_channel_created_event: Option<NewChannelCreatedFn>,
    pub on_del_channel_event: Option<DelChannelFn>,
    pub on_channel_move_event: Option<ChannelMoveFn>,
    pub on_update_channel_event: Option<UpdateChannelFn>,
    pub on_update_channel_edited_event: Option<UpdateChannelEditedFn>,
    pub on_update_client_event: Option<UpdateClientFn>,
    pub on_client_move_event: Option<ClientMoveFn>,
    pub on_client_move_subscription_event: Option<ClientMoveSubscriptionFn>,
    pub on_client_move_timeout_event: Option<ClientMoveTimeoutFn>,
    pub on_client_move_moved_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            client_id: AnyId,
            old_channel_id: u64,
            new_channel_id: u64,
            visibility: c_int,
            mover_id: AnyId,
            mover_name: *const c_char,
            mover_unique_identifier: *const c_char,
            move_message: *const c_char,
        ),
    >,
    pub on_client_kick_from_channel_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            client_id: AnyId,
            old_channel_id: u64,
            new_channel_id: u64,
            visibility: c_int,
            kicker_id: AnyId,
            kicker_name: *const c_char,
            kicker_unique_identifier: *const c_char,
            kick_message: *const c_char,
        ),
    >,
    pub on_client_kick_from_server_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            client_id: AnyId,
            old_channel_id: u64,
            new_channel_id: u64,
            visibility: c_int,
            kicker_id: AnyId,
            kicker_name: *const c_char,
            kicker_unique_identifier: *const c_char,
            kick_message: *const c_char,
        ),
    >,
    pub on_client_ids_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            unique_client_identifier: *const c_char,
            client_id: AnyId,
            client_name: *const c_char,
        ),
    >,
    pub on_client_ids_finished_event: Option<unsafe extern "C" fn(sch: u64)>,
    pub on_server_edited_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            editer_id: AnyId,
            editer_name: *const c_char,
            editer_unique_identifier: *const c_char,
        ),
    >,
    pub on_server_updated_event: Option<unsafe extern "C" fn(sch: u64)>,
    pub on_server_error_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            error_message: *const c_char,
            error: c_uint,
            return_code: *const c_char,
            extra_message: *const c_char,
        ),
    >,
    pub on_server_stop_event:
        Option<unsafe extern "C" fn(sch: u64, shutdown_message: *const c_char)>,
    pub on_text_message_event: Option<TextMessageFn>,
    pub on_talk_status_change_event: Option<TalkStatusChangeFn>,
    pub on_ignored_whisper_event: Option<unsafe extern "C" fn(sch: u64, client_id: AnyId)>,
    pub on_connection_info_event: Option<unsafe extern "C" fn(sch: u64, client_id: AnyId)>,
    pub on_server_connection_info_event: Option<unsafe extern "C" fn(sch: u64)>,
    pub on_channel_subscribe_event: Option<unsafe extern "C" fn(sch: u64, channel_id: u64)>,
    pub on_channel_subscribe_finished_event: Option<unsafe extern "C" fn(sch: u64)>,
    pub on_channel_unsubscribe_event: Option<unsafe extern "C" fn(sch: u64, channel_id: u64)>,
    pub on_channel_unsubscribe_finished_event: Option<unsafe extern "C" fn(sch: u64)>,
    pub on_channel_description_update_event:
        Option<unsafe extern "C" fn(sch: u64, channel_id: u64)>,
    pub on_channel_password_changed_event:
        Option<unsafe extern "C" fn(sch: u64, channel_id: u64)>,
    pub on_playback_shutdown_complete_event: Option<unsafe extern "C" fn(sch: u64)>,
    pub on_sound_device_list_changed_event:
        Option<unsafe extern "C" fn(mode_id: *const c_char, play_or_cap: c_int)>,
    pub on_edit_playback_voice_data_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            client_id: AnyId,
            samples: *mut c_short,
            sample_count: c_int,
            channels: c_int,
        ),
    >,
    pub on_edit_post_process_voice_data_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            client_id: AnyId,
            samples: *mut c_short,
            sample_count: c_int,
            channels: c_int,
            channel_speaker_array: *const c_uint,
            channel_fill_mask: *mut c_uint,
        ),
    >,
    pub on_edit_mixed_playback_voice_data_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            samples: *mut c_short,
            sample_count: c_int,
            channels: c_int,
            channel_speaker_array: *const c_uint,
            channel_fill_mask: *mut c_uint,
        ),
    >,
    pub on_edit_captured_voice_data_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            samples: *mut c_short,
            sample_count: c_int,
            channels: c_int,
            edited: *mut c_int,
        ),
    >,
    pub on_custom_3d_rolloff_calculation_client_event: Option<
        unsafe extern "C" fn(sch: u64, client_id: AnyId, distance: c_float, volume: *mut c_float),
    >,
    pub on_custom_3d_rolloff_calculation_wave_event: Option<
        unsafe extern "C" fn(sch: u64, wave_handle: u64, distance: c_float, volume: *mut c_float),
    >,
    pub on_user_logging_message_event: Option<
        unsafe extern "C" fn(
            log_message: *const c_char,
            log_level: c_int,
            log_channel: *const c_char,
            log_id: u64,
            log_time: *const c_char,
            complete_log_string: *const c_char,
        ),
    >,
    pub on_custom_packet_encrypt_event:
        Option<unsafe extern "C" fn(data_to_send: *mut *mut c_char, size_of_data: *mut c_uint)>,
    pub on_custom_packet_decrypt_event: Option<
        unsafe extern "C" fn(data_received: *mut *mut c_char, data_received_size: *mut c_uint),
    >,
    pub on_provisioning_slot_request_result_event: Option<
        unsafe extern "C" fn(error: c_uint, request_handle: u64, connection_key: *const c_char),
    >,
    pub on_check_server_unique_identifier_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            server_unique_identifier: *const c_char,
            cancel_connect: *mut c_int,
        ),
    >,
    pub on_client_password_encrypt: Option<
        unsafe extern "C" fn(
            sch: u64,
            plaintext: *const c_char,
            encrypted_text: *mut c_char,
            encrypted_text_byte_size: c_int,
        ),
    >,
    pub on_file_transfer_status_event: Option<
        unsafe extern "C" fn(
            transfer_id: AnyId,
            status: c_uint,
            status_message: *const c_char,
            remote_file_size: u64,
            sch: u64,
        ),
    >,
    pub on_file_list_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            channel_id: u64,
            path: *const c_char,
            name: *const c_char,
            size: u64,
            datetime: u64,
            kind: c_int,
            incomplete_size: u64,
            return_code: *const c_char,
        ),
    >,
    pub on_file_list_finished_event:
        Option<unsafe extern "C" fn(sch: u64, channel_id: u64, path: *const c_char)>,
    pub on_file_info_event: Option<
        unsafe extern "C" fn(
            sch: u64,
            channel_id: u64,
            name: *const c_char,
            size: u64,
            datetime: u64,
        ),
    >,
}

impl ClientUiFunctions {
    /// Number of slots in the native struct.
    pub const SLOT_COUNT: usize = 50;

    /// The all-null table.
    pub const EMPTY: ClientUiFunctions = ClientUiFunctions {
        on_connect_status_change_event: None,
        on_server_protocol_version_event: None,
        on_new_channel_event: None,
        on_new_channel_created_event: None,
        on_del_channel_event: None,
        on_channel_move_event: None,
        on_update_channel_event: None,
        on_update_channel_edited_event: None,
        on_update_client_event: None,
        on_client_move_event: None,
        on_client_move_subscription_event: None,
        on_client_move_timeout_event: None,
        on_client_move_moved_event: None,
        on_client_kick_from_channel_event: None,
        on_client_kick_from_server_event: None,
        on_client_ids_event: None,
        on_client_ids_finished_event: None,
        on_server_edited_event: None,
        on_server_updated_event: None,
        on_server_error_event: None,
        on_server_stop_event: None,
        on_text_message_event: None,
        on_talk_status_change_event: None,
        on_ignored_whisper_event: None,
        on_connection_info_event: None,
        on_server_connection_info_event: None,
        on_channel_subscribe_event: None,
        on_channel_subscribe_finished_event: None,
        on_channel_unsubscribe_event: None,
        on_channel_unsubscribe_finished_event: None,
        on_channel_description_update_event: None,
        on_channel_password_changed_event: None,
        on_playback_shutdown_complete_event: None,
        on_sound_device_list_changed_event: None,
        on_edit_playback_voice_data_event: None,
        on_edit_post_process_voice_data_event: None,
        on_edit_mixed_playback_voice_data_event: None,
        on_edit_captured_voice_data_event: None,
        on_custom_3d_rolloff_calculation_client_event: None,
        on_custom_3d_rolloff_calculation_wave_event: None,
        on_user_logging_message_event: None,
        on_custom_packet_encrypt_event: None,
        on_custom_packet_decrypt_event: None,
        on_provisioning_slot_request_result_event: None,
        on_check_server_unique_identifier_event: None,
        on_client_password_encrypt: None,
        on_file_transfer_status_event: None,
        on_file_list_event: None,
        on_file_list_finished_event: None,
        on_file_info_event: None,
    };

    /// Every bridged slot bound to its trampoline into [`REGISTRY`]; the rest stay null.
    pub const TRAMPOLINES: ClientUiFunctions = ClientUiFunctions {
        on_connect_status_change_event: Some(on_connect_status_change_event),
        on_server_protocol_version_event: Some(on_server_protocol_version_event),
        on_new_channel_event: Some(on_new_channel_event),
        on_new_channel_created_event: Some(on_new_channel_created_event),
        on_del_channel_event: Some(on_del_channel_event),
        on_channel_move_event: Some(on_channel_move_event),
        on_update_channel_event: Some(on_update_channel_event),
        on_update_channel_edited_event: Some(on_update_channel_edited_event),
        on_update_client_event: Some(on_update_client_event),
        on_client_move_event: Some(on_client_move_event),
        on_client_move_subscription_event: Some(on_client_move_subscription_event),
        on_client_move_timeout_event: Some(on_client_move_timeout_event),
        on_text_message_event: Some(on_text_message_event),
        on_talk_status_change_event: Some(on_talk_status_change_event),
        ..Self::EMPTY
    };

    /// Whether the slot for `kind` is non-null.
    pub fn has_slot(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::ConnectStatusChange => self.on_connect_status_change_event.is_some(),
            EventKind::ServerProtocolVersion => self.on_server_protocol_version_event.is_some(),
            EventKind::NewChannel => self.on_new_channel_event.is_some(),
            EventKind::NewChannelCreated => self.on_new_channel_created_event.is_some(),
            EventKind::DelChannel => self.on_del_channel_event.is_some(),
            EventKind::ChannelMove => self.on_channel_move_event.is_some(),
            EventKind::UpdateChannel => self.on_update_channel_event.is_some(),
            EventKind::UpdateChannelEdited => self.on_update_channel_edited_event.is_some(),
            EventKind::UpdateClient => self.on_update_client_event.is_some(),
            EventKind::ClientMove => self.on_client_move_event.is_some(),
            EventKind::ClientMoveSubscription => {
                self.on_client_move_subscription_event.is_some()
            }
            EventKind::ClientMoveTimeout => self.on_client_move_timeout_event.is_some(),
            EventKind::TalkStatusChange => self.on_talk_status_change_event.is_some(),
            EventKind::TextMessage => self.on_text_message_event.is_some(),
        }
    }

    /// Number of non-null slots, bridged or not.
    pub fn bound_slots(&self) -> usize {
        // Each slot is one nullable code pointer; null is the zero word.
        let words: [usize; Self::SLOT_COUNT] = unsafe { std::mem::transmute(*self) };
        words.iter().filter(|word| **word != 0).count()
    }
}

impl std::fmt::Debug for ClientUiFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bridged: Vec<EventKind> = EventKind::ALL
            .into_iter()
            .filter(|kind| self.has_slot(*kind))
            .collect();
        f.debug_struct("ClientUiFunctions")
            .field("bridged", &bridged)
            .field("bound_slots", &self.bound_slots())
            .finish()
    }
}

/// Copy a library-owned string. Null becomes empty, invalid UTF-8 is replaced lossily.
unsafe fn copy_c_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

unsafe fn invoker(id: AnyId, name: *const c_char, unique_identifier: *const c_char) -> Invoker {
    Invoker {
        id: ClientId(id),
        name: unsafe { copy_c_str(name) },
        unique_identifier: unsafe { copy_c_str(unique_identifier) },
    }
}

// ─── Deliveries ──────────────────────────────────────────────────────
//
// Trampoline bodies, taking arguments exactly as the library passes them. Every string
// pointer must be null or a NUL-terminated string valid for the duration of the call.

impl HandlerRegistry {
    pub fn deliver_connect_status_change(&self, sch: u64, new_status: c_int, error_number: c_uint) {
        self.dispatch(
            EventKind::ConnectStatusChange,
            ConnectionHandlerId(sch),
            |cb| cb.connect_status_change.as_ref(),
            || ConnectStatusChange {
                new_status: ConnectStatus::from_raw(new_status),
                error: ErrorCode::new(error_number),
            },
        );
    }

    pub fn deliver_server_protocol_version(&self, sch: u64, protocol_version: c_int) {
        self.dispatch(
            EventKind::ServerProtocolVersion,
            ConnectionHandlerId(sch),
            |cb| cb.server_protocol_version.as_ref(),
            || ServerProtocolVersion { protocol_version },
        );
    }

    pub fn deliver_new_channel(&self, sch: u64, channel_id: u64, channel_parent_id: u64) {
        self.dispatch(
            EventKind::NewChannel,
            ConnectionHandlerId(sch),
            |cb| cb.new_channel.as_ref(),
            || NewChannel {
                channel_id: ChannelId(channel_id),
                parent_id: ChannelId(channel_parent_id),
            },
        );
    }

    /// # Safety
    ///
    /// String pointers must be null or valid NUL-terminated strings for the whole call.
    pub unsafe fn deliver_new_channel_created(
        &self,
        sch: u64,
        channel_id: u64,
        channel_parent_id: u64,
        invoker_id: AnyId,
        invoker_name: *const c_char,
        invoker_unique_identifier: *const c_char,
    ) {
        self.dispatch(
            EventKind::NewChannelCreated,
            ConnectionHandlerId(sch),
            |cb| cb.new_channel_created.as_ref(),
            || NewChannelCreated {
                channel_id: ChannelId(channel_id),
                parent_id: ChannelId(channel_parent_id),
                invoker: unsafe { invoker(invoker_id, invoker_name, invoker_unique_identifier) },
            },
        );
    }

    /// # Safety
    ///
    /// String pointers must be null or valid NUL-terminated strings for the whole call.
    pub unsafe fn deliver_del_channel(
        &self,
        sch: u64,
        channel_id: u64,
        invoker_id: AnyId,
        invoker_name: *const c_char,
        invoker_unique_identifier: *const c_char,
    ) {
        self.dispatch(
            EventKind::DelChannel,
            ConnectionHandlerId(sch),
            |cb| cb.del_channel.as_ref(),
            || DelChannel {
                channel_id: ChannelId(channel_id),
                invoker: unsafe { invoker(invoker_id, invoker_name, invoker_unique_identifier) },
            },
        );
    }

    /// # Safety
    ///
    /// String pointers must be null or valid NUL-terminated strings for the whole call.
    pub unsafe fn deliver_channel_move(
        &self,
        sch: u64,
        channel_id: u64,
        new_channel_parent_id: u64,
        invoker_id: AnyId,
        invoker_name: *const c_char,
        invoker_unique_identifier: *const c_char,
    ) {
        self.dispatch(
            EventKind::ChannelMove,
            ConnectionHandlerId(sch),
            |cb| cb.channel_move.as_ref(),
            || ChannelMove {
                channel_id: ChannelId(channel_id),
                new_parent_id: ChannelId(new_channel_parent_id),
                invoker: unsafe { invoker(invoker_id, invoker_name, invoker_unique_identifier) },
            },
        );
    }

    pub fn deliver_update_channel(&self, sch: u64, channel_id: u64) {
        self.dispatch(
            EventKind::UpdateChannel,
            ConnectionHandlerId(sch),
            |cb| cb.update_channel.as_ref(),
            || UpdateChannel {
                channel_id: ChannelId(channel_id),
            },
        );
    }

    /// # Safety
    ///
    /// String pointers must be null or valid NUL-terminated strings for the whole call.
    pub unsafe fn deliver_update_channel_edited(
        &self,
        sch: u64,
        channel_id: u64,
        invoker_id: AnyId,
        invoker_name: *const c_char,
        invoker_unique_identifier: *const c_char,
    ) {
        self.dispatch(
            EventKind::UpdateChannelEdited,
            ConnectionHandlerId(sch),
            |cb| cb.update_channel_edited.as_ref(),
            || UpdateChannelEdited {
                channel_id: ChannelId(channel_id),
                invoker: unsafe { invoker(invoker_id, invoker_name, invoker_unique_identifier) },
            },
        );
    }

    /// # Safety
    ///
    /// String pointers must be null or valid NUL-terminated strings for the whole call.
    pub unsafe fn deliver_update_client(
        &self,
        sch: u64,
        client_id: AnyId,
        invoker_id: AnyId,
        invoker_name: *const c_char,
        invoker_unique_identifier: *const c_char,
    ) {
        self.dispatch(
            EventKind::UpdateClient,
            ConnectionHandlerId(sch),
            |cb| cb.update_client.as_ref(),
            || UpdateClient {
                client_id: ClientId(client_id),
                invoker: unsafe { invoker(invoker_id, invoker_name, invoker_unique_identifier) },
            },
        );
    }

    /// # Safety
    ///
    /// `move_message` must be null or a valid NUL-terminated string for the whole call.
    pub unsafe fn deliver_client_move(
        &self,
        sch: u64,
        client_id: AnyId,
        old_channel_id: u64,
        new_channel_id: u64,
        visibility: c_int,
        move_message: *const c_char,
    ) {
        self.dispatch(
            EventKind::ClientMove,
            ConnectionHandlerId(sch),
            |cb| cb.client_move.as_ref(),
            || ClientMove {
                client_id: ClientId(client_id),
                old_channel_id: ChannelId(old_channel_id),
                new_channel_id: ChannelId(new_channel_id),
                visibility: Visibility::from_raw(visibility),
                move_message: unsafe { copy_c_str(move_message) },
            },
        );
    }

    pub fn deliver_client_move_subscription(
        &self,
        sch: u64,
        client_id: AnyId,
        old_channel_id: u64,
        new_channel_id: u64,
        visibility: c_int,
    ) {
        self.dispatch(
            EventKind::ClientMoveSubscription,
            ConnectionHandlerId(sch),
            |cb| cb.client_move_subscription.as_ref(),
            || ClientMoveSubscription {
                client_id: ClientId(client_id),
                old_channel_id: ChannelId(old_channel_id),
                new_channel_id: ChannelId(new_channel_id),
                visibility: Visibility::from_raw(visibility),
            },
        );
    }

    /// # Safety
    ///
    /// `timeout_message` must be null or a valid NUL-terminated string for the whole call.
    pub unsafe fn deliver_client_move_timeout(
        &self,
        sch: u64,
        client_id: AnyId,
        old_channel_id: u64,
        new_channel_id: u64,
        visibility: c_int,
        timeout_message: *const c_char,
    ) {
        self.dispatch(
            EventKind::ClientMoveTimeout,
            ConnectionHandlerId(sch),
            |cb| cb.client_move_timeout.as_ref(),
            || ClientMoveTimeout {
                client_id: ClientId(client_id),
                old_channel_id: ChannelId(old_channel_id),
                new_channel_id: ChannelId(new_channel_id),
                visibility: Visibility::from_raw(visibility),
                timeout_message: unsafe { copy_c_str(timeout_message) },
            },
        );
    }

    pub fn deliver_talk_status_change(
        &self,
        sch: u64,
        status: c_int,
        is_received_whisper: c_int,
        client_id: AnyId,
    ) {
        self.dispatch(
            EventKind::TalkStatusChange,
            ConnectionHandlerId(sch),
            |cb| cb.talk_status_change.as_ref(),
            || TalkStatusChange {
                status: TalkStatus::from_raw(status),
                is_received_whisper: is_received_whisper != 0,
                client_id: ClientId(client_id),
            },
        );
    }

    /// # Safety
    ///
    /// String pointers must be null or valid NUL-terminated strings for the whole call.
    pub unsafe fn deliver_text_message(
        &self,
        sch: u64,
        target_mode: AnyId,
        to_id: AnyId,
        from_id: AnyId,
        from_name: *const c_char,
        from_unique_identifier: *const c_char,
        message: *const c_char,
    ) {
        self.dispatch(
            EventKind::TextMessage,
            ConnectionHandlerId(sch),
            |cb| cb.text_message.as_ref(),
            || TextMessage {
                target_mode: TextMessageTargetMode::from_raw(c_int::from(target_mode)),
                to_id,
                from: unsafe { invoker(from_id, from_name, from_unique_identifier) },
                message: unsafe { copy_c_str(message) },
            },
        );
    }
}

// ─── Trampolines ─────────────────────────────────────────────────────

unsafe extern "C" fn on_connect_status_change_event(
    sch: u64,
    new_status: c_int,
    error_number: c_uint,
) {
    REGISTRY.deliver_connect_status_change(sch, new_status, error_number);
}

unsafe extern "C" fn on_server_protocol_version_event(sch: u64, protocol_version: c_int) {
    REGISTRY.deliver_server_protocol_version(sch, protocol_version);
}

unsafe extern "C" fn on_new_channel_event(sch: u64, channel_id: u64, channel_parent_id: u64) {
    REGISTRY.deliver_new_channel(sch, channel_id, channel_parent_id);
}

unsafe extern "C" fn on_new_channel_created_event(
    sch: u64,
    channel_id: u64,
    channel_parent_id: u64,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
) {
    unsafe {
        REGISTRY.deliver_new_channel_created(
            sch,
            channel_id,
            channel_parent_id,
            invoker_id,
            invoker_name,
            invoker_unique_identifier,
        );
    }
}

unsafe extern "C" fn on_del_channel_event(
    sch: u64,
    channel_id: u64,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
) {
    unsafe {
        REGISTRY.deliver_del_channel(
            sch,
            channel_id,
            invoker_id,
            invoker_name,
            invoker_unique_identifier,
        );
    }
}

unsafe extern "C" fn on_channel_move_event(
    sch: u64,
    channel_id: u64,
    new_channel_parent_id: u64,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
) {
    unsafe {
        REGISTRY.deliver_channel_move(
            sch,
            channel_id,
            new_channel_parent_id,
            invoker_id,
            invoker_name,
            invoker_unique_identifier,
        );
    }
}

unsafe extern "C" fn on_update_channel_event(sch: u64, channel_id: u64) {
    REGISTRY.deliver_update_channel(sch, channel_id);
}

unsafe extern "C" fn on_update_channel_edited_event(
    sch: u64,
    channel_id: u64,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
) {
    unsafe {
        REGISTRY.deliver_update_channel_edited(
            sch,
            channel_id,
            invoker_id,
            invoker_name,
            invoker_unique_identifier,
        );
    }
}

unsafe extern "C" fn on_update_client_event(
    sch: u64,
    client_id: AnyId,
    invoker_id: AnyId,
    invoker_name: *const c_char,
    invoker_unique_identifier: *const c_char,
) {
    unsafe {
        REGISTRY.deliver_update_client(
            sch,
            client_id,
            invoker_id,
            invoker_name,
            invoker_unique_identifier,
        );
    }
}

unsafe extern "C" fn on_client_move_event(
    sch: u64,
    client_id: AnyId,
    old_channel_id: u64,
    new_channel_id: u64,
    visibility: c_int,
    move_message: *const c_char,
) {
    unsafe {
        REGISTRY.deliver_client_move(
            sch,
            client_id,
            old_channel_id,
            new_channel_id,
            visibility,
            move_message,
        );
    }
}

unsafe extern "C" fn on_client_move_subscription_event(
    sch: u64,
    client_id: AnyId,
    old_channel_id: u64,
    new_channel_id: u64,
    visibility: c_int,
) {
    REGISTRY.deliver_client_move_subscription(
        sch,
        client_id,
        old_channel_id,
        new_channel_id,
        visibility,
    );
}

unsafe extern "C" fn on_client_move_timeout_event(
    sch: u64,
    client_id: AnyId,
    old_channel_id: u64,
    new_channel_id: u64,
    visibility: c_int,
    timeout_message: *const c_char,
) {
    unsafe {
        REGISTRY.deliver_client_move_timeout(
            sch,
            client_id,
            old_channel_id,
            new_channel_id,
            visibility,
            timeout_message,
        );
    }
}

unsafe extern "C" fn on_talk_status_change_event(
    sch: u64,
    status: c_int,
    is_received_whisper: c_int,
    client_id: AnyId,
) {
    REGISTRY.deliver_talk_status_change(sch, status, is_received_whisper, client_id);
}

unsafe extern "C" fn on_text_message_event(
    sch: u64,
    target_mode: AnyId,
    to_id: AnyId,
    from_id: AnyId,
    from_name: *const c_char,
    from_unique_identifier: *const c_char,
    message: *const c_char,
) {
    unsafe {
        REGISTRY.deliver_text_message(
            sch,
            target_mode,
            to_id,
            from_id,
            from_name,
            from_unique_identifier,
            message,
        );
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
//
// These only use private registries. Anything touching REGISTRY lives in tests/.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::callback::ClientCallbacks;
    use parking_lot::Mutex;
    use std::ffi::CString;
    use std::ptr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn armed(callbacks: ClientCallbacks) -> HandlerRegistry {
        let registry = HandlerRegistry::new();
        registry.replace(callbacks, || Ok(())).unwrap();
        registry
    }

    fn slot_offset(index: usize) -> usize {
        index * std::mem::size_of::<usize>()
    }

    #[test]
    fn test_table_layout_matches_native_struct() {
        use std::mem::offset_of;

        assert_eq!(
            std::mem::size_of::<ClientUiFunctions>(),
            ClientUiFunctions::SLOT_COUNT * std::mem::size_of::<usize>()
        );
        assert_eq!(
            std::mem::align_of::<ClientUiFunctions>(),
            std::mem::align_of::<usize>()
        );

        assert_eq!(offset_of!(ClientUiFunctions, on_connect_status_change_event), slot_offset(0));
        assert_eq!(offset_of!(ClientUiFunctions, on_client_move_timeout_event), slot_offset(11));
        assert_eq!(offset_of!(ClientUiFunctions, on_client_move_moved_event), slot_offset(12));
        assert_eq!(offset_of!(ClientUiFunctions, on_server_stop_event), slot_offset(20));
        assert_eq!(offset_of!(ClientUiFunctions, on_text_message_event), slot_offset(21));
        assert_eq!(offset_of!(ClientUiFunctions, on_talk_status_change_event), slot_offset(22));
        assert_eq!(offset_of!(ClientUiFunctions, on_sound_device_list_changed_event), slot_offset(33));
        assert_eq!(offset_of!(ClientUiFunctions, on_user_logging_message_event), slot_offset(40));
        assert_eq!(offset_of!(ClientUiFunctions, on_client_password_encrypt), slot_offset(45));
        assert_eq!(offset_of!(ClientUiFunctions, on_file_info_event), slot_offset(49));
    }

    #[test]
    fn test_unbridged_slots_stay_null() {
        assert_eq!(ClientUiFunctions::EMPTY.bound_slots(), 0);
        assert_eq!(ClientUiFunctions::default().bound_slots(), 0);

        let table = ClientUiFunctions::TRAMPOLINES;
        assert_eq!(table.bound_slots(), EventKind::ALL.len());
        assert!(table.on_client_move_moved_event.is_none());
        assert!(table.on_server_error_event.is_none());
        assert!(table.on_user_logging_message_event.is_none());
        assert!(table.on_custom_packet_encrypt_event.is_none());
        assert!(table.on_file_info_event.is_none());
    }

    #[test]
    fn test_text_message_target_is_any_id_wide() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let registry = armed(ClientCallbacks::new().on_text_message(move |_, ev| {
            *sink.lock() = Some(ev.clone());
        }));

        let text = CString::new("psst").unwrap();
        unsafe {
            registry.deliver_text_message(1, 1, u16::MAX, 4, ptr::null(), ptr::null(), text.as_ptr());
        }

        let event = seen.lock().take().unwrap();
        assert_eq!(event.target_mode, TextMessageTargetMode::Client);
        assert_eq!(event.to_id, u16::MAX);
        assert_eq!(event.from.id, ClientId(4));
    }

    #[test]
    fn test_trampoline_table_is_complete() {
        let table = ClientUiFunctions::TRAMPOLINES;
        assert!(EventKind::ALL.iter().all(|kind| table.has_slot(*kind)));

        let empty = ClientUiFunctions::default();
        assert!(EventKind::ALL.iter().all(|kind| !empty.has_slot(*kind)));
    }

    #[test]
    fn test_argument_fidelity() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let registry = armed(ClientCallbacks::new().on_new_channel_created(move |conn, ev| {
            *sink.lock() = Some((conn, ev.clone()));
        }));

        let name = CString::new("Alice").unwrap();
        let uid = CString::new("uid-123").unwrap();
        unsafe {
            registry.deliver_new_channel_created(42, 7, 0, 3, name.as_ptr(), uid.as_ptr());
        }

        let (conn, event) = seen.lock().take().unwrap();
        assert_eq!(conn, ConnectionHandlerId(42));
        assert_eq!(event.channel_id, ChannelId(7));
        assert_eq!(event.parent_id, ChannelId::ROOT);
        assert_eq!(event.invoker.id, ClientId(3));
        assert_eq!(event.invoker.name, "Alice");
        assert_eq!(event.invoker.unique_identifier, "uid-123");
    }

    #[test]
    fn test_full_width_ids_are_not_truncated() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let registry = armed(ClientCallbacks::new().on_client_move_subscription(move |conn, ev| {
            *sink.lock() = Some((conn, ev.clone()));
        }));

        registry.deliver_client_move_subscription(u64::MAX, u16::MAX, u64::MAX - 1, 1 << 40, 2);

        let (conn, event) = seen.lock().take().unwrap();
        assert_eq!(conn.raw(), u64::MAX);
        assert_eq!(event.client_id.raw(), u16::MAX);
        assert_eq!(event.old_channel_id.raw(), u64::MAX - 1);
        assert_eq!(event.new_channel_id.raw(), 1 << 40);
        assert_eq!(event.visibility, Visibility::Leave);
    }

    #[test]
    fn test_null_strings_become_empty() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let text_sink = Arc::clone(&seen);
        let move_sink = Arc::clone(&seen);
        let registry = armed(
            ClientCallbacks::new()
                .on_text_message(move |_, ev| {
                    let mut seen = text_sink.lock();
                    seen.push(ev.from.name.clone());
                    seen.push(ev.from.unique_identifier.clone());
                    seen.push(ev.message.clone());
                })
                .on_client_move_timeout(move |_, ev| {
                    move_sink.lock().push(ev.timeout_message.clone());
                }),
        );

        unsafe {
            registry.deliver_text_message(1, 2, 5, 9, ptr::null(), ptr::null(), ptr::null());
            registry.deliver_client_move_timeout(1, 9, 5, 0, 2, ptr::null());
        }

        assert_eq!(*seen.lock(), vec![String::new(); 4]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        let registry = armed(ClientCallbacks::new().on_client_move(move |_, ev| {
            *sink.lock() = ev.move_message.clone();
        }));

        let bytes = CString::new(vec![b'o', b'k', 0xff]).unwrap();
        unsafe {
            registry.deliver_client_move(1, 2, 3, 4, 0, bytes.as_ptr());
        }
        assert_eq!(*seen.lock(), "ok\u{fffd}");
    }

    #[test]
    fn test_raw_enums_are_converted() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let status_sink = Arc::clone(&seen);
        let talk_sink = Arc::clone(&seen);
        let registry = armed(
            ClientCallbacks::new()
                .on_connect_status_change(move |_, ev| {
                    status_sink.lock().push(format!("{:?}/{}", ev.new_status, ev.error.code()));
                })
                .on_talk_status_change(move |_, ev| {
                    talk_sink
                        .lock()
                        .push(format!("{:?}/{}/{}", ev.status, ev.is_received_whisper, ev.client_id));
                }),
        );

        registry.deliver_connect_status_change(1, 4, 0);
        registry.deliver_connect_status_change(1, 0, 1797);
        registry.deliver_talk_status_change(1, 1, 1, 12);
        registry.deliver_talk_status_change(1, 0, 0, 12);

        assert_eq!(
            *seen.lock(),
            vec![
                "ConnectionEstablished/0",
                "Disconnected/1797",
                "Talking/true/12",
                "NotTalking/false/12",
            ]
        );
    }

    #[test]
    fn test_only_the_matching_handler_runs() {
        let text_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&text_calls);
        let registry = armed(ClientCallbacks::new().on_text_message(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.deliver_server_protocol_version(1, 22);
        registry.deliver_new_channel(1, 2, 0);
        registry.deliver_update_channel(1, 2);
        unsafe {
            registry.deliver_del_channel(1, 2, 3, ptr::null(), ptr::null());
            registry.deliver_update_client(1, 2, 3, ptr::null(), ptr::null());
        }
        assert_eq!(text_calls.load(Ordering::SeqCst), 0);

        let message = CString::new("hi").unwrap();
        unsafe {
            registry.deliver_text_message(1, 3, 0, 9, ptr::null(), ptr::null(), message.as_ptr());
        }
        assert_eq!(text_calls.load(Ordering::SeqCst), 1);
    }
}
