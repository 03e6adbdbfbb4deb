use crate::{FrameHead, OpCode, error::ProtocolError};

/// A complete data message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The opcode of the first frame of the message.
    opcode: OpCode,
    payload: Vec<u8>,
}

impl Message {
    /// Creates a new [`Message`].
    pub fn new(opcode: OpCode, payload: Vec<u8>) -> Self {
        Self { opcode, payload }
    }

    /// Returns the opcode of the message.
    pub const fn opcode(&self) -> OpCode {
        self.opcode
    }

    /// Indicates whether a message is a text message.
    pub fn is_text(&self) -> bool {
        self.opcode == OpCode::Text
    }

    /// Indicates whether a message is a binary message.
    pub fn is_binary(&self) -> bool {
        self.opcode == OpCode::Binary
    }

    /// Returns the payload of the message.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }

    /// Consumes the message and returns its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

#[derive(Debug)]
struct Partial {
    opcode: OpCode,
    payload: Vec<u8>,
}

/// Joins data frames into messages.
///
/// At most one message is in progress at a time. Size limits are enforced by the
/// decoder before payload bytes reach the assembler.
#[derive(Debug, Default)]
pub struct MessageAssembler {
    partial: Option<Partial>,
    /// FIN bit of the frame currently being appended.
    fin: bool,
}

impl MessageAssembler {
    /// Creates an assembler with no message in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a message has started and not yet received its final frame.
    pub const fn in_progress(&self) -> bool {
        self.partial.is_some()
    }

    /// Checks a data frame header against the message in progress.
    ///
    /// Returns the opcode of the message the frame belongs to.
    pub fn begin_frame(&mut self, head: &FrameHead) -> Result<OpCode, ProtocolError> {
        let opcode = match (head.opcode, &self.partial) {
            (OpCode::Continuation, None) => return Err(ProtocolError::UnexpectedContinuation),
            (OpCode::Continuation, Some(partial)) => partial.opcode,
            (_, Some(_)) => return Err(ProtocolError::IncompleteMessage),
            (opcode, None) => {
                self.partial = Some(Partial {
                    opcode,
                    payload: Vec::new(),
                });

                opcode
            }
        };

        self.fin = head.fin;

        Ok(opcode)
    }

    /// Appends payload bytes of the current frame.
    pub fn push(&mut self, chunk: &[u8]) {
        if let Some(partial) = self.partial.as_mut() {
            partial.payload.extend_from_slice(chunk);
        }
    }

    /// Closes the current frame and yields the message if that frame was final.
    pub fn end_frame(&mut self) -> Option<Message> {
        if !self.fin {
            return None;
        }

        self.fin = false;

        self.partial
            .take()
            .map(|partial| Message::new(partial.opcode, partial.payload))
    }
}
