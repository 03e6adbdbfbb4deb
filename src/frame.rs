use crate::OpCode;

/// The decoded fixed part of a frame header together with its resolved length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHead {
    /// Indicates if this is the final frame in a message.
    pub fin: bool,
    /// The opcode of the frame.
    pub opcode: OpCode,
    /// The payload length announced by the header.
    pub payload_len: u64,
}

/// A complete frame with an already unmasked payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    fin: bool,
    opcode: OpCode,
    payload: Vec<u8>,
}

impl Frame {
    /// Creates a new [`Frame`].
    pub fn new(fin: bool, opcode: OpCode, payload: Vec<u8>) -> Self {
        Self {
            fin,
            opcode,
            payload,
        }
    }

    /// Returns whether this is the final frame in a message.
    pub const fn is_final(&self) -> bool {
        self.fin
    }

    /// Returns the opcode of the frame.
    pub const fn opcode(&self) -> OpCode {
        self.opcode
    }

    /// Returns the unmasked payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Longest header the server ever writes: 2 bytes + 8 byte extended length.
pub const MAX_HEADER_LEN: usize = 10;

/// An outbound frame header.
#[derive(Debug)]
pub struct Header {
    fin: bool,
    opcode: OpCode,
    payload_len: u64,
}

impl Header {
    /// Creates a new [`Header`].
    pub const fn new(fin: bool, opcode: OpCode, payload_len: u64) -> Self {
        Self {
            fin,
            opcode,
            payload_len,
        }
    }

    /// Writes the header into `dst` and returns the number of bytes used.
    ///
    /// The mask bit is left clear.
    pub fn write(&self, dst: &mut [u8; MAX_HEADER_LEN]) -> usize {
        dst[0] = (self.fin as u8) << 7 | self.opcode as u8;

        let len = self.payload_len;

        if len < 126 {
            dst[1] = len as u8;

            2
        } else if len < 65536 {
            dst[1] = 126;
            dst[2..4].copy_from_slice(&(len as u16).to_be_bytes());

            4
        } else {
            dst[1] = 127;
            dst[2..6].copy_from_slice(&((len >> 32) as u32).to_be_bytes());
            dst[6..10].copy_from_slice(&(len as u32).to_be_bytes());

            10
        }
    }
}
