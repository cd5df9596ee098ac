//! The seam between this crate and the client library.
//!
//! [`ClientLib`] has one method per `ts3client_*` entry point the binding uses, at C-ABI
//! level: borrowed C strings in, raw IDs and codes out. [`NativeLib`] forwards to the real
//! library; tests and other hosts provide their own implementation.

mod library;

use std::ffi::{c_int, c_uint, CStr};

use crate::bridge::abi::ClientUiFunctions;
use crate::error::{ErrorCode, ErrorLookup};
use crate::ids::AnyId;

pub use library::{default_library_name, NativeLib};

/// Native entry points, each returning the library's error code as `Err` when nonzero.
///
/// [`ErrorLookup::error_message`] maps to `ts3client_getErrorMessage`.
pub trait ClientLib: ErrorLookup {
    /// `ts3client_initClientLib`.
    fn init_client_lib(
        &self,
        log_types: c_int,
        client_lib_path: &CStr,
        resource_path: &CStr,
    ) -> Result<(), ErrorCode>;

    /// `ts3client_destroyClientLib`.
    fn destroy_client_lib(&self) -> Result<(), ErrorCode>;

    /// `ts3client_registerClientUIFunctions`. The library keeps the pointers, not the table.
    fn register_client_ui_functions(&self, functions: &ClientUiFunctions)
        -> Result<(), ErrorCode>;

    /// `ts3client_getClientLibVersion`, copied out of library memory.
    fn client_lib_version(&self) -> Result<String, ErrorCode>;

    /// `ts3client_spawnNewServerConnectionHandler`. Port 0 picks a free local port.
    fn spawn_new_server_connection_handler(&self, port: c_int) -> Result<u64, ErrorCode>;

    fn destroy_server_connection_handler(&self, sch: u64) -> Result<(), ErrorCode>;

    /// `ts3client_startConnection` with no default channel path.
    #[allow(clippy::too_many_arguments)]
    fn start_connection(
        &self,
        sch: u64,
        identity: &CStr,
        ip: &CStr,
        port: c_uint,
        nickname: &CStr,
        default_channel_password: &CStr,
        server_password: &CStr,
    ) -> Result<(), ErrorCode>;

    fn stop_connection(&self, sch: u64, quit_message: &CStr) -> Result<(), ErrorCode>;

    fn connection_status(&self, sch: u64) -> Result<c_int, ErrorCode>;

    fn request_client_move(
        &self,
        sch: u64,
        client_id: AnyId,
        new_channel_id: u64,
        password: &CStr,
    ) -> Result<(), ErrorCode>;

    fn request_send_private_text_msg(
        &self,
        sch: u64,
        message: &CStr,
        target_client_id: AnyId,
    ) -> Result<(), ErrorCode>;

    fn request_send_channel_text_msg(
        &self,
        sch: u64,
        message: &CStr,
        target_channel_id: u64,
    ) -> Result<(), ErrorCode>;

    fn request_send_server_text_msg(&self, sch: u64, message: &CStr) -> Result<(), ErrorCode>;

    /// `ts3client_getClientID`: the local client's ID on this connection.
    fn client_id(&self, sch: u64) -> Result<AnyId, ErrorCode>;
}
