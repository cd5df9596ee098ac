//! Error codes reported by the client library, and the crate's error type.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A raw error code from the client library. Zero is success.
///
/// Comparing codes never touches the library. Only [`describe`](Self::describe) and the
/// `Display` impl resolve the text, and they do it on every call.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(u32);

impl ErrorCode {
    pub const OK: ErrorCode = ErrorCode(0x0000);
    pub const UNDEFINED: ErrorCode = ErrorCode(0x0001);
    pub const NOT_IMPLEMENTED: ErrorCode = ErrorCode(0x0002);
    pub const OK_NO_UPDATE: ErrorCode = ErrorCode(0x0003);
    pub const DONT_NOTIFY: ErrorCode = ErrorCode(0x0004);
    pub const LIB_TIME_LIMIT_REACHED: ErrorCode = ErrorCode(0x0005);
    pub const OUT_OF_MEMORY: ErrorCode = ErrorCode(0x0006);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> u32 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// `Ok(())` for zero, otherwise [`Error::Native`].
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::Native(self))
        }
    }

    /// Human-readable text, resolved through the process-wide lookup installed by
    /// [`Client::initialize`](crate::Client::initialize).
    pub fn describe(self) -> String {
        if self.is_ok() {
            return "ok".to_string();
        }
        let lookup = LOOKUP.read().clone();
        match lookup {
            Some(lookup) => self.describe_with(&*lookup),
            None => self.numeric(),
        }
    }

    /// Like [`describe`](Self::describe), but asks `lookup` instead of the installed one.
    pub fn describe_with(self, lookup: &dyn ErrorLookup) -> String {
        if self.is_ok() {
            return "ok".to_string();
        }
        match lookup.error_message(self.0) {
            Ok(message) if !message.trim().is_empty() => {
                format!("TeamSpeak error {}: {message}", self.0)
            }
            _ => self.numeric(),
        }
    }

    fn numeric(self) -> String {
        format!("TeamSpeak error {}", self.0)
    }
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode({:#06x})", self.0)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Source of error message text, normally the client library's `getErrorMessage`.
pub trait ErrorLookup: Send + Sync {
    /// Message for a nonzero `code`, or the code the lookup itself failed with.
    fn error_message(&self, code: u32) -> std::result::Result<String, ErrorCode>;
}

static LOOKUP: Lazy<RwLock<Option<Arc<dyn ErrorLookup>>>> = Lazy::new(|| RwLock::new(None));

/// Install the lookup used by [`ErrorCode::describe`], replacing any previous one.
pub fn install_lookup(lookup: Arc<dyn ErrorLookup>) {
    *LOOKUP.write() = Some(lookup);
}

/// Remove the installed lookup. Later descriptions render the numeric code only.
pub fn clear_lookup() {
    *LOOKUP.write() = None;
}

/// Errors returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client library returned a nonzero code.
    #[error("{0}")]
    Native(ErrorCode),

    /// A string argument could not be passed to the library.
    #[error("string argument contains an interior NUL byte")]
    InteriorNul(#[from] std::ffi::NulError),

    #[error("failed to load client library {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("client library does not export `{symbol}`: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The native code, when this error came from the library.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Native(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Error::Native(code)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLookup {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ErrorLookup for CountingLookup {
        fn error_message(&self, code: u32) -> std::result::Result<String, ErrorCode> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ErrorCode::UNDEFINED)
            } else {
                Ok(format!("message for {code}"))
            }
        }
    }

    fn lookup(fail: bool) -> CountingLookup {
        CountingLookup {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    #[test]
    fn test_ok_describes_without_lookup() {
        let lookup = lookup(false);
        assert_eq!(ErrorCode::OK.describe_with(&lookup), "ok");
        assert_eq!(ErrorCode::new(0).describe(), "ok");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_nonzero_uses_lookup_every_time() {
        let lookup = lookup(false);
        let code = ErrorCode::new(0x0201);
        assert_eq!(code.describe_with(&lookup), "TeamSpeak error 513: message for 513");
        code.describe_with(&lookup);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_lookup_falls_back_to_number() {
        let lookup = lookup(true);
        assert_eq!(ErrorCode::new(5).describe_with(&lookup), "TeamSpeak error 5");
    }

    #[test]
    fn test_blank_message_falls_back_to_number() {
        struct Blank(&'static str);
        impl ErrorLookup for Blank {
            fn error_message(&self, _code: u32) -> std::result::Result<String, ErrorCode> {
                Ok(self.0.to_string())
            }
        }

        assert_eq!(ErrorCode::new(5).describe_with(&Blank("")), "TeamSpeak error 5");
        assert_eq!(ErrorCode::new(5).describe_with(&Blank("  ")), "TeamSpeak error 5");
    }

    #[test]
    fn test_describe_contains_code() {
        // Holds with or without an installed lookup.
        assert!(ErrorCode::new(1797).describe().contains("1797"));
        assert!(ErrorCode::OUT_OF_MEMORY.to_string().contains('6'));
    }

    #[test]
    fn test_into_result() {
        assert!(ErrorCode::OK.into_result().is_ok());
        let err = ErrorCode::UNDEFINED.into_result().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UNDEFINED));
    }

    #[test]
    fn test_debug_is_numeric() {
        assert_eq!(format!("{:?}", ErrorCode::new(0x0700)), "ErrorCode(0x0700)");
    }
}
