//! In-process stand-in for the client library.

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::{c_int, c_uint, CStr};

use parking_lot::Mutex;
use ts3_client::{AnyId, ClientLib, ClientUiFunctions, ErrorCode, ErrorLookup};

/// One recorded native call, with string arguments copied out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init {
        log_types: c_int,
        client_lib_path: String,
        resource_path: String,
    },
    Destroy,
    Register,
    Version,
    Spawn { port: c_int },
    DestroyHandler { sch: u64 },
    Start {
        sch: u64,
        identity: String,
        ip: String,
        port: c_uint,
        nickname: String,
        server_password: String,
    },
    Stop { sch: u64, quit_message: String },
    Status { sch: u64 },
    Move {
        sch: u64,
        client: AnyId,
        channel: u64,
        password: String,
    },
    PrivateText { sch: u64, message: String, target: AnyId },
    ChannelText { sch: u64, message: String, target: u64 },
    ServerText { sch: u64, message: String },
    ClientId { sch: u64 },
}

#[derive(Debug, Default)]
pub struct MockLib {
    pub calls: Mutex<Vec<Call>>,
    /// Entry point name -> error code it returns.
    pub failures: Mutex<HashMap<&'static str, u32>>,
    pub registered: Mutex<Option<ClientUiFunctions>>,
    pub status: Mutex<c_int>,
    pub next_handler: Mutex<u64>,
}

impl MockLib {
    pub fn new() -> Self {
        Self {
            next_handler: Mutex::new(1),
            ..Self::default()
        }
    }

    pub fn failing(self, entry: &'static str, code: u32) -> Self {
        self.failures.lock().insert(entry, code);
        self
    }

    pub fn fail(&self, entry: &'static str, code: u32) {
        self.failures.lock().insert(entry, code);
    }

    pub fn succeed(&self, entry: &'static str) {
        self.failures.lock().remove(entry);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, entry: &'static str, call: Call) -> Result<(), ErrorCode> {
        self.calls.lock().push(call);
        match self.failures.lock().get(entry) {
            Some(code) => Err(ErrorCode::new(*code)),
            None => Ok(()),
        }
    }
}

fn text(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}

impl ErrorLookup for MockLib {
    fn error_message(&self, code: u32) -> Result<String, ErrorCode> {
        if self.failures.lock().contains_key("get_error_message") {
            return Err(ErrorCode::UNDEFINED);
        }
        Ok(format!("mock error {code}"))
    }
}

impl ClientLib for MockLib {
    fn init_client_lib(
        &self,
        log_types: c_int,
        client_lib_path: &CStr,
        resource_path: &CStr,
    ) -> Result<(), ErrorCode> {
        self.record(
            "init_client_lib",
            Call::Init {
                log_types,
                client_lib_path: text(client_lib_path),
                resource_path: text(resource_path),
            },
        )
    }

    fn destroy_client_lib(&self) -> Result<(), ErrorCode> {
        self.record("destroy_client_lib", Call::Destroy)
    }

    fn register_client_ui_functions(&self, functions: &ClientUiFunctions) -> Result<(), ErrorCode> {
        self.record("register_client_ui_functions", Call::Register)?;
        *self.registered.lock() = Some(*functions);
        Ok(())
    }

    fn client_lib_version(&self) -> Result<String, ErrorCode> {
        self.record("client_lib_version", Call::Version)?;
        Ok("3.3.1 [Build: mock]".to_string())
    }

    fn spawn_new_server_connection_handler(&self, port: c_int) -> Result<u64, ErrorCode> {
        self.record("spawn_new_server_connection_handler", Call::Spawn { port })?;
        let mut next = self.next_handler.lock();
        let sch = *next;
        *next += 1;
        Ok(sch)
    }

    fn destroy_server_connection_handler(&self, sch: u64) -> Result<(), ErrorCode> {
        self.record("destroy_server_connection_handler", Call::DestroyHandler { sch })
    }

    fn start_connection(
        &self,
        sch: u64,
        identity: &CStr,
        ip: &CStr,
        port: c_uint,
        nickname: &CStr,
        _default_channel_password: &CStr,
        server_password: &CStr,
    ) -> Result<(), ErrorCode> {
        self.record(
            "start_connection",
            Call::Start {
                sch,
                identity: text(identity),
                ip: text(ip),
                port,
                nickname: text(nickname),
                server_password: text(server_password),
            },
        )
    }

    fn stop_connection(&self, sch: u64, quit_message: &CStr) -> Result<(), ErrorCode> {
        self.record(
            "stop_connection",
            Call::Stop {
                sch,
                quit_message: text(quit_message),
            },
        )
    }

    fn connection_status(&self, sch: u64) -> Result<c_int, ErrorCode> {
        self.record("connection_status", Call::Status { sch })?;
        Ok(*self.status.lock())
    }

    fn request_client_move(
        &self,
        sch: u64,
        client_id: AnyId,
        new_channel_id: u64,
        password: &CStr,
    ) -> Result<(), ErrorCode> {
        self.record(
            "request_client_move",
            Call::Move {
                sch,
                client: client_id,
                channel: new_channel_id,
                password: text(password),
            },
        )
    }

    fn request_send_private_text_msg(
        &self,
        sch: u64,
        message: &CStr,
        target_client_id: AnyId,
    ) -> Result<(), ErrorCode> {
        self.record(
            "request_send_private_text_msg",
            Call::PrivateText {
                sch,
                message: text(message),
                target: target_client_id,
            },
        )
    }

    fn request_send_channel_text_msg(
        &self,
        sch: u64,
        message: &CStr,
        target_channel_id: u64,
    ) -> Result<(), ErrorCode> {
        self.record(
            "request_send_channel_text_msg",
            Call::ChannelText {
                sch,
                message: text(message),
                target: target_channel_id,
            },
        )
    }

    fn request_send_server_text_msg(&self, sch: u64, message: &CStr) -> Result<(), ErrorCode> {
        self.record(
            "request_send_server_text_msg",
            Call::ServerText {
                sch,
                message: text(message),
            },
        )
    }

    fn client_id(&self, sch: u64) -> Result<AnyId, ErrorCode> {
        self.record("client_id", Call::ClientId { sch })?;
        Ok(7)
    }
}

/// Call every non-null slot of `table` once, the way the library would.
pub fn fire_all(table: &ClientUiFunctions, sch: u64) {
    let name = c"Alice";
    let uid = c"uid-1";
    let text = c"hello";
    let (name, uid, text) = (name.as_ptr(), uid.as_ptr(), text.as_ptr());
    // SAFETY: every string argument is a live NUL-terminated literal.
    unsafe {
        if let Some(f) = table.on_connect_status_change_event {
            f(sch, 4, 0);
        }
        if let Some(f) = table.on_server_protocol_version_event {
            f(sch, 22);
        }
        if let Some(f) = table.on_new_channel_event {
            f(sch, 1, 0);
        }
        if let Some(f) = table.on_new_channel_created_event {
            f(sch, 2, 0, 3, name, uid);
        }
        if let Some(f) = table.on_del_channel_event {
            f(sch, 2, 3, name, uid);
        }
        if let Some(f) = table.on_channel_move_event {
            f(sch, 2, 1, 3, name, uid);
        }
        if let Some(f) = table.on_update_channel_event {
            f(sch, 1);
        }
        if let Some(f) = table.on_update_channel_edited_event {
            f(sch, 1, 3, name, uid);
        }
        if let Some(f) = table.on_update_client_event {
            f(sch, 5, 3, name, uid);
        }
        if let Some(f) = table.on_client_move_event {
            f(sch, 5, 1, 2, 0, text);
        }
        if let Some(f) = table.on_client_move_subscription_event {
            f(sch, 5, 1, 2, 1);
        }
        if let Some(f) = table.on_client_move_timeout_event {
            f(sch, 5, 2, 0, 2, text);
        }
        if let Some(f) = table.on_talk_status_change_event {
            f(sch, 1, 0, 5);
        }
        if let Some(f) = table.on_text_message_event {
            f(sch, 2, 1, 3, name, uid, text);
        }
    }
}
