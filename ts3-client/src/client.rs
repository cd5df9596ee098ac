//! The SDK lifecycle over one loaded client library.

use std::ffi::{c_int, c_uint, CString};
use std::sync::Arc;

use crate::bridge::abi::{ClientUiFunctions, REGISTRY};
use crate::bridge::callback::ClientCallbacks;
use crate::config::{ConnectOptions, InitOptions};
use crate::definitions::ConnectStatus;
use crate::error::{self, Error, ErrorCode, ErrorLookup, Result};
use crate::ids::{ChannelId, ClientId, ConnectionHandlerId};
use crate::native::ClientLib;

/// An initialized client library.
///
/// Cloning shares the same library. The library is process-global on the native side, so one
/// `Client` per process is the normal shape; [`shutdown`](Self::shutdown) ends it.
pub struct Client<L: ClientLib + 'static> {
    lib: Arc<L>,
}

impl<L: ClientLib + 'static> Clone for Client<L> {
    fn clone(&self) -> Self {
        Self {
            lib: Arc::clone(&self.lib),
        }
    }
}

impl<L: ClientLib + 'static> Client<L> {
    /// Initialize the library and install it as the process-wide error message lookup.
    pub fn initialize(lib: L, options: &InitOptions) -> Result<Self> {
        let client_lib_path = CString::new(options.client_lib_path.as_str())?;
        let resource_path = CString::new(options.resource_path.as_str())?;
        let client = Self { lib: Arc::new(lib) };
        client.check(
            "init_client_lib",
            client.lib.init_client_lib(
                options.log_types.bits(),
                &client_lib_path,
                &resource_path,
            ),
        )?;
        error::install_lookup(Arc::clone(&client.lib) as Arc<dyn ErrorLookup>);
        tracing::info!(log_types = ?options.log_types, "client library initialized");
        Ok(client)
    }

    /// Shut the library down. Connection handlers should be destroyed first.
    pub fn shutdown(&self) -> Result<()> {
        self.check("destroy_client_lib", self.lib.destroy_client_lib())?;
        error::clear_lookup();
        tracing::info!("client library shut down");
        Ok(())
    }

    pub fn lib(&self) -> &L {
        &self.lib
    }

    pub fn lib_version(&self) -> Result<String> {
        self.check("client_lib_version", self.lib.client_lib_version())
    }

    /// Create a connection handler. `port` 0 lets the library choose the local port.
    pub fn spawn_connection_handler(&self, port: u16) -> Result<ConnectionHandlerId> {
        let sch = self.check(
            "spawn_new_server_connection_handler",
            self.lib.spawn_new_server_connection_handler(c_int::from(port)),
        )?;
        tracing::debug!(connection = sch, "connection handler spawned");
        Ok(ConnectionHandlerId(sch))
    }

    pub fn destroy_connection_handler(&self, connection: ConnectionHandlerId) -> Result<()> {
        self.check(
            "destroy_server_connection_handler",
            self.lib.destroy_server_connection_handler(connection.raw()),
        )
    }

    /// Start connecting. Progress arrives as `connect_status_change` events.
    pub fn start_connection(
        &self,
        connection: ConnectionHandlerId,
        options: &ConnectOptions,
    ) -> Result<()> {
        let identity = CString::new(options.identity.as_str())?;
        let address = CString::new(options.address.as_str())?;
        let nickname = CString::new(options.nickname.as_str())?;
        let default_channel_password = CString::new(options.default_channel_password.as_str())?;
        let server_password = CString::new(options.server_password.as_str())?;
        tracing::debug!(%connection, endpoint = %options.endpoint(), "starting connection");
        self.check(
            "start_connection",
            self.lib.start_connection(
                connection.raw(),
                &identity,
                &address,
                c_uint::from(options.port),
                &nickname,
                &default_channel_password,
                &server_password,
            ),
        )
    }

    pub fn stop_connection(&self, connection: ConnectionHandlerId, quit_message: &str) -> Result<()> {
        let quit_message = CString::new(quit_message)?;
        self.check(
            "stop_connection",
            self.lib.stop_connection(connection.raw(), &quit_message),
        )
    }

    pub fn connection_status(&self, connection: ConnectionHandlerId) -> Result<ConnectStatus> {
        let raw = self.check(
            "connection_status",
            self.lib.connection_status(connection.raw()),
        )?;
        Ok(ConnectStatus::from_raw(raw))
    }

    /// Ask the server to move `client` into `channel`. `password` may be empty.
    pub fn request_client_move(
        &self,
        connection: ConnectionHandlerId,
        client: ClientId,
        channel: ChannelId,
        password: &str,
    ) -> Result<()> {
        let password = CString::new(password)?;
        self.check(
            "request_client_move",
            self.lib
                .request_client_move(connection.raw(), client.raw(), channel.raw(), &password),
        )
    }

    pub fn send_private_text(
        &self,
        connection: ConnectionHandlerId,
        message: &str,
        target: ClientId,
    ) -> Result<()> {
        let message = CString::new(message)?;
        self.check(
            "request_send_private_text_msg",
            self.lib
                .request_send_private_text_msg(connection.raw(), &message, target.raw()),
        )
    }

    pub fn send_channel_text(
        &self,
        connection: ConnectionHandlerId,
        message: &str,
        target: ChannelId,
    ) -> Result<()> {
        let message = CString::new(message)?;
        self.check(
            "request_send_channel_text_msg",
            self.lib
                .request_send_channel_text_msg(connection.raw(), &message, target.raw()),
        )
    }

    pub fn send_server_text(&self, connection: ConnectionHandlerId, message: &str) -> Result<()> {
        let message = CString::new(message)?;
        self.check(
            "request_send_server_text_msg",
            self.lib.request_send_server_text_msg(connection.raw(), &message),
        )
    }

    /// The local client's ID on `connection`. Only valid once connected.
    pub fn own_client_id(&self, connection: ConnectionHandlerId) -> Result<ClientId> {
        let id = self.check("client_id", self.lib.client_id(connection.raw()))?;
        Ok(ClientId(id))
    }

    /// Install `callbacks` as the process-wide handler set and arm the library with the
    /// trampoline table.
    ///
    /// The swap and the arm call happen under one write lock: no event is delivered to a
    /// mix of old and new handlers. If arming fails the previous set stays installed.
    /// Calling this from inside a handler deadlocks.
    pub fn set_client_callbacks(&self, callbacks: ClientCallbacks) -> Result<()> {
        tracing::debug!(?callbacks, "registering client callbacks");
        REGISTRY.replace(callbacks, || {
            self.check(
                "register_client_ui_functions",
                self.lib
                    .register_client_ui_functions(&ClientUiFunctions::TRAMPOLINES),
            )
        })
    }

    /// Render `code` with this library's messages, independent of the installed lookup.
    pub fn describe(&self, code: ErrorCode) -> String {
        code.describe_with(&*self.lib)
    }

    fn check<T>(&self, call: &'static str, result: std::result::Result<T, ErrorCode>) -> Result<T> {
        result.map_err(|code| {
            tracing::debug!(call, code = code.code(), "native call failed: {}", self.describe(code));
            Error::Native(code)
        })
    }
}

impl<L: ClientLib + std::fmt::Debug + 'static> std::fmt::Debug for Client<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("lib", &self.lib).finish()
    }
}
