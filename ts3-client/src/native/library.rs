//! Runtime-loaded client library.

use std::ffi::{c_char, c_int, c_uint, c_void, CStr, OsStr};
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::Library;

use crate::bridge::abi::ClientUiFunctions;
use crate::error::{Error, ErrorCode, ErrorLookup, Result};
use crate::ids::AnyId;
use crate::native::ClientLib;

type InitClientLibFn = unsafe extern "C" fn(
    log_types: c_int,
    lib_path: *const c_char,
    resource_path: *const c_char,
) -> c_uint;
type DestroyClientLibFn = unsafe extern "C" fn() -> c_uint;
type RegisterClientUiFunctionsFn =
    unsafe extern "C" fn(functions: *const ClientUiFunctions, reserved: *const c_void) -> c_uint;
type GetErrorMessageFn = unsafe extern "C" fn(code: c_uint, out: *mut *mut c_char) -> c_uint;
type FreeMemoryFn = unsafe extern "C" fn(pointer: *mut c_void) -> c_uint;
type GetClientLibVersionFn = unsafe extern "C" fn(out: *mut *mut c_char) -> c_uint;
type SpawnNewServerConnectionHandlerFn =
    unsafe extern "C" fn(port: c_int, out: *mut u64) -> c_uint;
type DestroyServerConnectionHandlerFn = unsafe extern "C" fn(sch: u64) -> c_uint;
type StartConnectionFn = unsafe extern "C" fn(
    sch: u64,
    identity: *const c_char,
    ip: *const c_char,
    port: c_uint,
    nickname: *const c_char,
    default_channel_array: *const *const c_char,
    default_channel_password: *const c_char,
    server_password: *const c_char,
) -> c_uint;
type StopConnectionFn = unsafe extern "C" fn(sch: u64, quit_message: *const c_char) -> c_uint;
type GetConnectionStatusFn = unsafe extern "C" fn(sch: u64, out: *mut c_int) -> c_uint;
type RequestClientMoveFn = unsafe extern "C" fn(
    sch: u64,
    client_id: AnyId,
    new_channel_id: u64,
    password: *const c_char,
    return_code: *const c_char,
) -> c_uint;
type RequestSendPrivateTextMsgFn = unsafe extern "C" fn(
    sch: u64,
    message: *const c_char,
    target_client_id: AnyId,
    return_code: *const c_char,
) -> c_uint;
type RequestSendChannelTextMsgFn = unsafe extern "C" fn(
    sch: u64,
    message: *const c_char,
    target_channel_id: u64,
    return_code: *const c_char,
) -> c_uint;
type RequestSendServerTextMsgFn =
    unsafe extern "C" fn(sch: u64, message: *const c_char, return_code: *const c_char) -> c_uint;
type GetClientIdFn = unsafe extern "C" fn(sch: u64, out: *mut AnyId) -> c_uint;

struct Api {
    init_client_lib: InitClientLibFn,
    destroy_client_lib: DestroyClientLibFn,
    register_client_ui_functions: RegisterClientUiFunctionsFn,
    get_error_message: GetErrorMessageFn,
    free_memory: FreeMemoryFn,
    get_client_lib_version: GetClientLibVersionFn,
    spawn_new_server_connection_handler: SpawnNewServerConnectionHandlerFn,
    destroy_server_connection_handler: DestroyServerConnectionHandlerFn,
    start_connection: StartConnectionFn,
    stop_connection: StopConnectionFn,
    get_connection_status: GetConnectionStatusFn,
    request_client_move: RequestClientMoveFn,
    request_send_private_text_msg: RequestSendPrivateTextMsgFn,
    request_send_channel_text_msg: RequestSendChannelTextMsgFn,
    request_send_server_text_msg: RequestSendServerTextMsgFn,
    get_client_id: GetClientIdFn,
}

/// Resolve one export into a plain function pointer.
///
/// # Safety
///
/// `T` must match the export's real signature.
unsafe fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T> {
    let mut raw = Vec::with_capacity(name.len() + 1);
    raw.extend_from_slice(name.as_bytes());
    raw.push(0);
    unsafe { library.get::<T>(&raw) }
        .map(|symbol| *symbol)
        .map_err(|source| Error::MissingSymbol { symbol: name, source })
}

macro_rules! resolve {
    ($library:expr, { $($field:ident => $name:literal),* $(,)? }) => {
        Api {
            $( $field: unsafe { symbol($library, $name)? }, )*
        }
    };
}

impl Api {
    /// # Safety
    ///
    /// `library` must be the TeamSpeak 3 client library.
    unsafe fn resolve(library: &Library) -> Result<Self> {
        Ok(resolve!(library, {
            init_client_lib => "ts3client_initClientLib",
            destroy_client_lib => "ts3client_destroyClientLib",
            register_client_ui_functions => "ts3client_registerClientUIFunctions",
            get_error_message => "ts3client_getErrorMessage",
            free_memory => "ts3client_freeMemory",
            get_client_lib_version => "ts3client_getClientLibVersion",
            spawn_new_server_connection_handler => "ts3client_spawnNewServerConnectionHandler",
            destroy_server_connection_handler => "ts3client_destroyServerConnectionHandler",
            start_connection => "ts3client_startConnection",
            stop_connection => "ts3client_stopConnection",
            get_connection_status => "ts3client_getConnectionStatus",
            request_client_move => "ts3client_requestClientMove",
            request_send_private_text_msg => "ts3client_requestSendPrivateTextMsg",
            request_send_channel_text_msg => "ts3client_requestSendChannelTextMsg",
            request_send_server_text_msg => "ts3client_requestSendServerTextMsg",
            get_client_id => "ts3client_getClientID",
        }))
    }
}

fn check(code: c_uint) -> std::result::Result<(), ErrorCode> {
    let code = ErrorCode::new(code);
    if code.is_ok() {
        Ok(())
    } else {
        Err(code)
    }
}

/// The client library, loaded from a shared object at runtime.
///
/// Every export is resolved once in [`load`](Self::load). The library stays mapped until the
/// value is dropped; since the registered trampolines must outlive any native thread that can
/// still call them, keep it alive until after `destroy_client_lib`.
pub struct NativeLib {
    api: Api,
    path: PathBuf,
    _library: Library,
}

impl NativeLib {
    /// Load the library at `path` and resolve every export the binding uses.
    pub fn load(path: impl AsRef<OsStr>) -> Result<Self> {
        let path = PathBuf::from(path.as_ref());
        // SAFETY: loading runs the library's initializers; the TeamSpeak client library has
        // no requirements on the loading thread.
        let library = unsafe { Library::new(&path) }.map_err(|source| Error::Load {
            path: path.clone(),
            source,
        })?;
        // SAFETY: the signatures above follow the SDK's clientlib.h.
        let api = unsafe { Api::resolve(&library)? };
        tracing::debug!(path = %path.display(), "client library loaded");
        Ok(Self {
            api,
            path,
            _library: library,
        })
    }

    /// Load the platform's default library name through the system search path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_library_name())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy a library-owned string and release it.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a string allocated by the library.
    unsafe fn take_string(&self, raw: *mut c_char) -> String {
        if raw.is_null() {
            return String::new();
        }
        unsafe {
            let text = CStr::from_ptr(raw).to_string_lossy().into_owned();
            (self.api.free_memory)(raw.cast());
            text
        }
    }
}

/// File name of the client library shipped for the current platform.
pub fn default_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "ts3client_win64.dll"
    } else if cfg!(target_os = "macos") {
        "libts3client_mac.dylib"
    } else {
        "libts3client_linux_amd64.so"
    }
}

impl std::fmt::Debug for NativeLib {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLib").field("path", &self.path).finish()
    }
}

impl ErrorLookup for NativeLib {
    fn error_message(&self, code: u32) -> std::result::Result<String, ErrorCode> {
        let mut raw: *mut c_char = ptr::null_mut();
        // SAFETY: `raw` is a valid out pointer; on success it owns a library string.
        unsafe {
            check((self.api.get_error_message)(code, &mut raw))?;
            Ok(self.take_string(raw))
        }
    }
}

// SAFETY (all methods): arguments are valid NUL-terminated strings or plain values, out
// pointers point at live locals, and every function pointer was resolved with the
// signature declared above.
impl ClientLib for NativeLib {
    fn init_client_lib(
        &self,
        log_types: c_int,
        client_lib_path: &CStr,
        resource_path: &CStr,
    ) -> std::result::Result<(), ErrorCode> {
        check(unsafe {
            (self.api.init_client_lib)(log_types, client_lib_path.as_ptr(), resource_path.as_ptr())
        })
    }

    fn destroy_client_lib(&self) -> std::result::Result<(), ErrorCode> {
        check(unsafe { (self.api.destroy_client_lib)() })
    }

    fn register_client_ui_functions(
        &self,
        functions: &ClientUiFunctions,
    ) -> std::result::Result<(), ErrorCode> {
        check(unsafe { (self.api.register_client_ui_functions)(functions, ptr::null()) })
    }

    fn client_lib_version(&self) -> std::result::Result<String, ErrorCode> {
        let mut raw: *mut c_char = ptr::null_mut();
        unsafe {
            check((self.api.get_client_lib_version)(&mut raw))?;
            Ok(self.take_string(raw))
        }
    }

    fn spawn_new_server_connection_handler(
        &self,
        port: c_int,
    ) -> std::result::Result<u64, ErrorCode> {
        let mut sch = 0u64;
        check(unsafe { (self.api.spawn_new_server_connection_handler)(port, &mut sch) })?;
        Ok(sch)
    }

    fn destroy_server_connection_handler(&self, sch: u64) -> std::result::Result<(), ErrorCode> {
        check(unsafe { (self.api.destroy_server_connection_handler)(sch) })
    }

    fn start_connection(
        &self,
        sch: u64,
        identity: &CStr,
        ip: &CStr,
        port: c_uint,
        nickname: &CStr,
        default_channel_password: &CStr,
        server_password: &CStr,
    ) -> std::result::Result<(), ErrorCode> {
        check(unsafe {
            (self.api.start_connection)(
                sch,
                identity.as_ptr(),
                ip.as_ptr(),
                port,
                nickname.as_ptr(),
                ptr::null(),
                default_channel_password.as_ptr(),
                server_password.as_ptr(),
            )
        })
    }

    fn stop_connection(&self, sch: u64, quit_message: &CStr) -> std::result::Result<(), ErrorCode> {
        check(unsafe { (self.api.stop_connection)(sch, quit_message.as_ptr()) })
    }

    fn connection_status(&self, sch: u64) -> std::result::Result<c_int, ErrorCode> {
        let mut status: c_int = 0;
        check(unsafe { (self.api.get_connection_status)(sch, &mut status) })?;
        Ok(status)
    }

    fn request_client_move(
        &self,
        sch: u64,
        client_id: AnyId,
        new_channel_id: u64,
        password: &CStr,
    ) -> std::result::Result<(), ErrorCode> {
        check(unsafe {
            (self.api.request_client_move)(
                sch,
                client_id,
                new_channel_id,
                password.as_ptr(),
                ptr::null(),
            )
        })
    }

    fn request_send_private_text_msg(
        &self,
        sch: u64,
        message: &CStr,
        target_client_id: AnyId,
    ) -> std::result::Result<(), ErrorCode> {
        check(unsafe {
            (self.api.request_send_private_text_msg)(
                sch,
                message.as_ptr(),
                target_client_id,
                ptr::null(),
            )
        })
    }

    fn request_send_channel_text_msg(
        &self,
        sch: u64,
        message: &CStr,
        target_channel_id: u64,
    ) -> std::result::Result<(), ErrorCode> {
        check(unsafe {
            (self.api.request_send_channel_text_msg)(
                sch,
                message.as_ptr(),
                target_channel_id,
                ptr::null(),
            )
        })
    }

    fn request_send_server_text_msg(
        &self,
        sch: u64,
        message: &CStr,
    ) -> std::result::Result<(), ErrorCode> {
        check(unsafe {
            (self.api.request_send_server_text_msg)(sch, message.as_ptr(), ptr::null())
        })
    }

    fn client_id(&self, sch: u64) -> std::result::Result<AnyId, ErrorCode> {
        let mut id: AnyId = 0;
        check(unsafe { (self.api.get_client_id)(sch, &mut id) })?;
        Ok(id)
    }
}
