//! Error types.

use crate::CloseCode;

/// A wire-level violation that forces the connection to close.
///
/// The `Display` output is the reason sent in the close frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// RSV1, RSV2 or RSV3 is set.
    #[error("non zero reserved bits")]
    ReservedBitsNotZero,
    /// The opcode is not one of the six defined ones.
    #[error("unknown opcode")]
    UnknownOpCode,
    /// A client frame arrived without a mask.
    #[error("no masking")]
    Unmasked,
    /// A control frame has FIN cleared.
    #[error("fragmented control")]
    FragmentedControl,
    /// A control frame announced more than 125 bytes.
    #[error("control frame is too big")]
    ControlFrameTooBig,
    /// A continuation frame arrived with no message in progress.
    #[error("unexpected continuation")]
    UnexpectedContinuation,
    /// A new message started before the previous one finished.
    #[error("incomplete message")]
    IncompleteMessage,
    /// A close payload is malformed or carries a code that may not be sent.
    #[error("invalid close frame")]
    InvalidCloseFrame,
    /// A frame announced more than the frame limit.
    #[error("frame is too big")]
    FrameTooBig,
    /// A message grew past the message limit.
    #[error("message is too big")]
    MessageTooBig,
}

impl ProtocolError {
    /// The close code this violation is reported with.
    pub const fn close_code(self) -> CloseCode {
        match self {
            ProtocolError::FrameTooBig | ProtocolError::MessageTooBig => CloseCode::Size,
            _ => CloseCode::Protocol,
        }
    }
}

/// Why an upgrade request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HandshakeError {
    /// The `Upgrade` header is missing or is not `websocket`.
    #[error("Non websocket upgrade")]
    NonWebsocketUpgrade,
    /// The `Connection` header does not contain `upgrade`.
    #[error("Non upgrade connection")]
    NonUpgradeConnection,
    /// `Sec-WebSocket-Version` is not `13`.
    #[error("Bad version")]
    BadVersion,
    /// `Sec-WebSocket-Key` is missing or does not decode to 16 bytes.
    #[error("Bad key length")]
    BadKeyLength,
}

/// Failure to read an HTTP request head.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The bytes are not an HTTP/1.x request.
    #[error("Malformed request: {0}")]
    Parse(
        #[source]
        #[from]
        httparse::Error,
    ),
    /// The head grew past the configured limit.
    #[error("Request head exceeds {limit} bytes")]
    HeadTooLarge {
        /// The limit in bytes.
        limit: usize,
    },
    /// The peer hung up mid-head.
    #[error("Connection closed before the request head was complete")]
    ConnectionClosed,
}

/// Returned by application HTTP handlers. Rendered as a 500 response.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl HandlerError {
    /// Creates a new [`HandlerError`].
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything that can end a single client connection.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Reading from or writing to the socket failed.
    #[error("I/O error: {0}")]
    Io(
        #[source]
        #[from]
        std::io::Error,
    ),
    /// The request head could not be read.
    #[error("HTTP error: {0}")]
    Http(
        #[source]
        #[from]
        HttpError,
    ),
}

/// An invalid [`Config`](crate::Config).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A limit is zero.
    #[error("{name} must be greater than zero")]
    Zero {
        /// The offending setting.
        name: &'static str,
    },
    /// A single frame may be larger than a whole message.
    #[error("max frame ({max_frame}) must not exceed max message ({max_message})")]
    FrameExceedsMessage {
        /// The frame limit.
        max_frame: u64,
        /// The message limit.
        max_message: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_machine_readable() {
        assert_eq!(ProtocolError::Unmasked.to_string(), "no masking");
        assert_eq!(
            ProtocolError::ReservedBitsNotZero.to_string(),
            "non zero reserved bits"
        );
        assert_eq!(ProtocolError::MessageTooBig.to_string(), "message is too big");
        assert_eq!(HandshakeError::BadVersion.to_string(), "Bad version");
    }

    #[test]
    fn serialization_failure_becomes_handler_error() {
        let map = std::collections::BTreeMap::from([((1u8, 2u8), 3u8)]);
        let err = serde_json::to_vec(&map).unwrap_err();

        let err = HandlerError::from(err);

        assert!(err.to_string().contains("key must be a string"));
    }

    #[test]
    fn size_violations_use_1009() {
        assert_eq!(ProtocolError::FrameTooBig.close_code(), CloseCode::Size);
        assert_eq!(ProtocolError::MessageTooBig.close_code(), CloseCode::Size);
        assert_eq!(ProtocolError::Unmasked.close_code(), CloseCode::Protocol);
        assert_eq!(
            ProtocolError::UnexpectedContinuation.close_code(),
            CloseCode::Protocol
        );
    }
}
