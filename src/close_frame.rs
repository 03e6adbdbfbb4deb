use crate::{CloseCode, error::ProtocolError};

/// Largest reason that fits a control payload next to the 2-byte code.
pub const MAX_REASON_LEN: usize = 125 - 2;

/// The body of a close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// The reason as a code.
    code: CloseCode,
    /// The reason as text string.
    reason: String,
}

impl CloseFrame {
    /// Creates a new [`CloseFrame`], truncating `reason` to [`MAX_REASON_LEN`] bytes.
    pub fn new(code: CloseCode, reason: &str) -> Self {
        Self {
            code,
            reason: truncate_reason(reason).to_owned(),
        }
    }

    /// Creates a new [`CloseFrame`] with an empty reason.
    pub fn no_reason(code: CloseCode) -> Self {
        Self::new(code, "")
    }

    /// Returns the close code.
    pub const fn code(&self) -> CloseCode {
        self.code
    }

    /// Returns the reason as a string slice.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Parses a received close payload.
    ///
    /// An empty payload carries no status and yields `None`.
    pub fn parse(payload: &[u8]) -> Result<Option<Self>, ProtocolError> {
        match payload.len() {
            0 => Ok(None),
            1 => Err(ProtocolError::InvalidCloseFrame),
            _ => {
                let code = CloseCode::from_u16(u16::from_be_bytes([payload[0], payload[1]]));

                if !code.is_sendable() {
                    return Err(ProtocolError::InvalidCloseFrame);
                }

                let reason = core::str::from_utf8(&payload[2..])
                    .map_err(|_| ProtocolError::InvalidCloseFrame)?;

                Ok(Some(Self {
                    code,
                    reason: reason.to_owned(),
                }))
            }
        }
    }

    /// Encodes the code and reason into a control payload.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(2 + self.reason.len());

        payload.extend_from_slice(&self.code.into_u16().to_be_bytes());
        payload.extend_from_slice(self.reason.as_bytes());

        payload
    }
}

/// Cuts `reason` down to [`MAX_REASON_LEN`] bytes without splitting a character.
pub fn truncate_reason(reason: &str) -> &str {
    if reason.len() <= MAX_REASON_LEN {
        return reason;
    }

    let mut end = MAX_REASON_LEN;

    while !reason.is_char_boundary(end) {
        end -= 1;
    }

    &reason[..end]
}
