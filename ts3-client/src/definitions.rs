//! Typed views of the integer enums in the SDK's public definitions.
//!
//! The library may report values newer than this crate knows about. Those are kept as
//! `Unknown(raw)` instead of being rejected, so converting an event argument never fails.

use serde::{Deserialize, Serialize};

macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            Unknown(i32),
        }

        impl $name {
            pub const fn from_raw(raw: i32) -> Self {
                match raw {
                    $( $value => $name::$variant, )*
                    other => $name::Unknown(other),
                }
            }

            pub const fn raw(self) -> i32 {
                match self {
                    $( $name::$variant => $value, )*
                    $name::Unknown(other) => other,
                }
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self::from_raw(raw)
            }
        }
    };
}

native_enum! {
    /// Connection state of a server connection handler.
    ///
    /// A successful connect walks `Disconnected → Connecting → Connected →
    /// ConnectionEstablishing → ConnectionEstablished`.
    pub enum ConnectStatus {
        Disconnected = 0,
        Connecting = 1,
        Connected = 2,
        /// Connected, channel and client lists still being received.
        ConnectionEstablishing = 3,
        ConnectionEstablished = 4,
    }
}

native_enum! {
    pub enum TalkStatus {
        NotTalking = 0,
        Talking = 1,
        TalkingWhileDisabled = 2,
    }
}

native_enum! {
    /// Whether a moved client entered, stayed in, or left the local client's view.
    pub enum Visibility {
        Enter = 0,
        Retain = 1,
        Leave = 2,
    }
}

native_enum! {
    pub enum TextMessageTargetMode {
        Client = 1,
        Channel = 2,
        Server = 3,
    }
}

impl TextMessageTargetMode {
    /// `TextMessageTarget_MAX`: one past the last valid mode.
    pub const MAX: i32 = 4;
}

native_enum! {
    /// Severity passed to `logMessage` and reported by user logging events.
    pub enum LogLevel {
        Critical = 0,
        Error = 1,
        Warning = 2,
        Debug = 3,
        Info = 4,
        Devel = 5,
    }
}

native_enum! {
    pub enum CodecType {
        SpeexNarrowband = 0,
        SpeexWideband = 1,
        SpeexUltrawideband = 2,
        CeltMono = 3,
        OpusVoice = 4,
        OpusMusic = 5,
    }
}

native_enum! {
    /// Server-wide voice encryption setting.
    pub enum CodecEncryptionMode {
        PerChannel = 0,
        ForcedOff = 1,
        ForcedOn = 2,
    }
}

native_enum! {
    pub enum MuteInputStatus {
        None = 0,
        Muted = 1,
    }
}

native_enum! {
    pub enum MuteOutputStatus {
        None = 0,
        Muted = 1,
    }
}

native_enum! {
    pub enum HardwareInputStatus {
        Disabled = 0,
        Enabled = 1,
    }
}

native_enum! {
    pub enum HardwareOutputStatus {
        Disabled = 0,
        Enabled = 1,
    }
}

native_enum! {
    pub enum InputDeactivationStatus {
        Active = 0,
        Deactivated = 1,
    }
}

native_enum! {
    /// `ReasonIdentifier`: why a client moved or left.
    pub enum MoveReason {
        None = 0,
        Moved = 1,
        Subscription = 2,
        LostConnection = 3,
        KickChannel = 4,
        KickServer = 5,
        KickServerBan = 6,
        ServerStop = 7,
        ClientDisconnect = 8,
        ChannelUpdate = 9,
        ChannelEdit = 10,
        ClientDisconnectServerShutdown = 11,
    }
}

native_enum! {
    /// Channel variable flags for the channel property getters and setters.
    pub enum ChannelProperties {
        Name = 0,
        Topic = 1,
        Description = 2,
        Password = 3,
        Codec = 4,
        CodecQuality = 5,
        MaxClients = 6,
        MaxFamilyClients = 7,
        Order = 8,
        FlagPermanent = 9,
        FlagSemiPermanent = 10,
        FlagDefault = 11,
        FlagPassword = 12,
        CodecLatencyFactor = 13,
        CodecIsUnencrypted = 14,
        SecuritySalt = 15,
        DeleteDelay = 16,
    }
}

bitflags::bitflags! {
    /// Log sinks passed to `initClientLib`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct LogTypes: i32 {
        const NONE = 0x0000;
        const FILE = 0x0001;
        const CONSOLE = 0x0002;
        const USERLOGGING = 0x0004;
        const NO_NETLOGGING = 0x0008;
        const DATABASE = 0x0010;
        const SYSLOG = 0x0020;
    }
}

impl Default for LogTypes {
    fn default() -> Self {
        LogTypes::CONSOLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_status_from_raw() {
        assert_eq!(ConnectStatus::from_raw(0), ConnectStatus::Disconnected);
        assert_eq!(ConnectStatus::from_raw(4), ConnectStatus::ConnectionEstablished);
        assert_eq!(ConnectStatus::ConnectionEstablishing.raw(), 3);
    }

    #[test]
    fn test_unknown_values_survive() {
        let status = ConnectStatus::from_raw(17);
        assert_eq!(status, ConnectStatus::Unknown(17));
        assert_eq!(status.raw(), 17);
        assert_eq!(TextMessageTargetMode::from_raw(0), TextMessageTargetMode::Unknown(0));
        assert_eq!(Visibility::from(-1), Visibility::Unknown(-1));
    }

    #[test]
    fn test_enum_serialization() {
        let json = serde_json::to_value(TalkStatus::TalkingWhileDisabled).unwrap();
        assert_eq!(json, "talking_while_disabled");
        let json = serde_json::to_value(TalkStatus::Unknown(9)).unwrap();
        assert_eq!(json["unknown"], 9);
    }

    #[test]
    fn test_log_types_combine() {
        let types = LogTypes::FILE | LogTypes::CONSOLE | LogTypes::USERLOGGING;
        assert_eq!(types.bits(), 7);
        assert_eq!(LogTypes::default(), LogTypes::CONSOLE);
    }

    #[test]
    fn test_sdk_constants() {
        assert_eq!(LogLevel::from_raw(0), LogLevel::Critical);
        assert_eq!(LogLevel::Devel.raw(), 5);
        assert_eq!(CodecType::OpusMusic.raw(), 5);
        assert_eq!(CodecType::from_raw(3), CodecType::CeltMono);
        assert_eq!(CodecEncryptionMode::ForcedOn.raw(), 2);
        assert_eq!(MuteInputStatus::from_raw(1), MuteInputStatus::Muted);
        assert_eq!(MuteOutputStatus::None.raw(), 0);
        assert_eq!(HardwareInputStatus::Enabled.raw(), 1);
        assert_eq!(HardwareOutputStatus::from_raw(0), HardwareOutputStatus::Disabled);
        assert_eq!(InputDeactivationStatus::Deactivated.raw(), 1);
        assert_eq!(TextMessageTargetMode::MAX, TextMessageTargetMode::Server.raw() + 1);
    }

    #[test]
    fn test_move_reasons_skip_nothing() {
        assert_eq!(MoveReason::from_raw(7), MoveReason::ServerStop);
        assert_eq!(MoveReason::ClientDisconnectServerShutdown.raw(), 11);
        assert_eq!(MoveReason::from_raw(12), MoveReason::Unknown(12));
        assert_eq!(ChannelProperties::from_raw(0), ChannelProperties::Name);
        assert_eq!(ChannelProperties::DeleteDelay.raw(), 16);
        assert_eq!(ChannelProperties::from_raw(17), ChannelProperties::Unknown(17));
        assert_eq!(serde_json::to_value(MoveReason::KickServerBan).unwrap(), "kick_server_ban");
    }
}
