//! Options for library initialization and for opening a connection.
//!
//! Both structs deserialize from JSON with every field optional; missing fields take the
//! defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::definitions::LogTypes;
use crate::error::Result;

/// Default voice server port.
pub const DEFAULT_PORT: u16 = 9987;
/// Nickname used when none is configured.
pub const DEFAULT_NICKNAME: &str = "RustClient";

/// Arguments to [`Client::initialize`](crate::Client::initialize).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    /// Folder the library writes its log file to. Empty for the working directory.
    pub client_lib_path: String,
    /// Folder holding the library's `soundbackends`. Empty for the working directory.
    pub resource_path: String,
    /// Log sinks, e.g. `"FILE | CONSOLE"`.
    pub log_types: LogTypes,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            client_lib_path: String::new(),
            resource_path: String::new(),
            log_types: LogTypes::CONSOLE,
        }
    }
}

/// Arguments to [`Client::start_connection`](crate::Client::start_connection).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOptions {
    /// Exported identity string. Empty lets the server reject or the caller create one first.
    pub identity: String,
    /// Server hostname or IP.
    pub address: String,
    pub port: u16,
    pub nickname: String,
    pub default_channel_password: String,
    pub server_password: String,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            identity: String::new(),
            address: "localhost".to_string(),
            port: DEFAULT_PORT,
            nickname: DEFAULT_NICKNAME.to_string(),
            default_channel_password: String::new(),
            server_password: String::new(),
        }
    }
}

impl InitOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ConnectOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `address:port`, for logging.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

// Identity and passwords stay out of logs.
impl std::fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("identity", &redacted(&self.identity))
            .field("address", &self.address)
            .field("port", &self.port)
            .field("nickname", &self.nickname)
            .field("default_channel_password", &redacted(&self.default_channel_password))
            .field("server_password", &redacted(&self.server_password))
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "<redacted>" }
}

/// Combined file layout read by the command-line client.
///
/// ```json
/// {
///   "init": { "log_types": "FILE | CONSOLE" },
///   "connect": { "address": "voice.example.com", "nickname": "bot" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub init: InitOptions,
    pub connect: ConnectOptions,
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse `path`. A missing file is an error, not a default config.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
