/// A 16-bit status value exchanged while closing a connection.
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CloseCode {
    /// The purpose of the connection has been fulfilled.
    Normal,
    /// The endpoint is going away (server shutdown, page navigation).
    Away,
    /// The endpoint received a frame that breaks the wire protocol.
    Protocol,
    /// The endpoint received a type of data it cannot accept.
    Unsupported,
    /// No status code was present in the close frame. Never sent on the wire.
    Status,
    /// The transport went away without a close frame. Never sent on the wire.
    Abnormal,
    /// The payload was inconsistent with the message type.
    Invalid,
    /// A generic policy violation.
    Policy,
    /// A frame or message exceeded the configured limits.
    Size,
    /// The client expected an extension the server did not negotiate.
    Extension,
    /// The server hit an unexpected condition.
    Error,
    /// The server is restarting.
    Restart,
    /// The server is overloaded.
    Again,
    #[doc(hidden)]
    Tls,
    /// 1016-2999.
    Reserved(u16),
    /// 3000-3999, registered with IANA.
    Iana(u16),
    /// 4000-4999, private use.
    Library(u16),
    /// Anything outside the ranges above.
    Bad(u16),
}

impl CloseCode {
    /// Whether an endpoint may put this code in a close frame.
    pub const fn is_sendable(self) -> bool {
        !matches!(
            self,
            CloseCode::Bad(_)
                | CloseCode::Reserved(_)
                | CloseCode::Status
                | CloseCode::Abnormal
                | CloseCode::Tls
        )
    }

    /// Maps a wire value to its code.
    pub const fn from_u16(code: u16) -> Self {
        match code {
            1000 => Self::Normal,
            1001 => Self::Away,
            1002 => Self::Protocol,
            1003 => Self::Unsupported,
            1005 => Self::Status,
            1006 => Self::Abnormal,
            1007 => Self::Invalid,
            1008 => Self::Policy,
            1009 => Self::Size,
            1010 => Self::Extension,
            1011 => Self::Error,
            1012 => Self::Restart,
            1013 => Self::Again,
            1015 => Self::Tls,
            1016..=2999 => Self::Reserved(code),
            3000..=3999 => Self::Iana(code),
            4000..=4999 => Self::Library(code),
            _ => Self::Bad(code),
        }
    }

    /// The wire value of this code.
    pub const fn into_u16(self) -> u16 {
        match self {
            Self::Normal => 1000,
            Self::Away => 1001,
            Self::Protocol => 1002,
            Self::Unsupported => 1003,
            Self::Status => 1005,
            Self::Abnormal => 1006,
            Self::Invalid => 1007,
            Self::Policy => 1008,
            Self::Size => 1009,
            Self::Extension => 1010,
            Self::Error => 1011,
            Self::Restart => 1012,
            Self::Again => 1013,
            Self::Tls => 1015,
            Self::Reserved(code) | Self::Iana(code) | Self::Library(code) | Self::Bad(code) => {
                code
            }
        }
    }
}

impl From<u16> for CloseCode {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.into_u16()
    }
}

impl core::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.into_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges() {
        assert_eq!(CloseCode::from_u16(1000), CloseCode::Normal);
        assert_eq!(CloseCode::from_u16(1009), CloseCode::Size);
        assert_eq!(CloseCode::from_u16(2000), CloseCode::Reserved(2000));
        assert_eq!(CloseCode::from_u16(3001), CloseCode::Iana(3001));
        assert_eq!(CloseCode::from_u16(4001), CloseCode::Library(4001));
        assert_eq!(CloseCode::from_u16(999), CloseCode::Bad(999));
        assert_eq!(CloseCode::from_u16(5000), CloseCode::Bad(5000));
    }

    #[test]
    fn wire_values_survive_conversion() {
        for code in [1000, 1001, 1002, 1003, 1007, 1008, 1009, 1010, 1011, 3000, 4999] {
            assert_eq!(u16::from(CloseCode::from(code)), code);
        }
    }

    #[test]
    fn reserved_codes_are_not_sendable() {
        assert!(!CloseCode::Status.is_sendable());
        assert!(!CloseCode::Abnormal.is_sendable());
        assert!(!CloseCode::Tls.is_sendable());
        assert!(!CloseCode::from_u16(1004).is_sendable());
        assert!(CloseCode::Normal.is_sendable());
        assert!(CloseCode::Library(4000).is_sendable());
    }
}
