use rand::Rng;
use rand_core::RngCore;

use crate::{
    OpCode,
    frame::{Header, MAX_HEADER_LEN},
    mask,
    transport::Transport,
};

/// Builds server-to-client frames.
///
/// Server frames are never masked, so the payload goes to the transport untouched
/// right after the header.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameEncoder;

impl FrameEncoder {
    /// Creates a new [`FrameEncoder`].
    pub const fn new() -> Self {
        Self
    }

    /// Writes header and payload as two writes.
    pub fn write<T: Transport + ?Sized>(
        &self,
        fin: bool,
        opcode: OpCode,
        payload: &[u8],
        transport: &mut T,
    ) {
        let mut header = [0; MAX_HEADER_LEN];
        let len = Header::new(fin, opcode, payload.len() as u64).write(&mut header);

        transport.write(&header[..len]);

        if !payload.is_empty() {
            transport.write(payload);
        }
    }

    /// Encodes a frame into a fresh buffer.
    pub fn encode(&self, fin: bool, opcode: OpCode, payload: &[u8]) -> Vec<u8> {
        let mut header = [0; MAX_HEADER_LEN];
        let len = Header::new(fin, opcode, payload.len() as u64).write(&mut header);

        let mut dst = Vec::with_capacity(len + payload.len());
        dst.extend_from_slice(&header[..len]);
        dst.extend_from_slice(payload);

        dst
    }
}

/// Builds client-to-server frames, each masked with a fresh key from `rng`.
#[derive(Debug)]
pub struct ClientEncoder<R> {
    rng: R,
}

impl<R: RngCore> ClientEncoder<R> {
    /// Creates a new [`ClientEncoder`] drawing mask keys from `rng`.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Encodes a masked frame with a fresh key.
    pub fn encode(&mut self, fin: bool, opcode: OpCode, payload: &[u8]) -> Vec<u8> {
        let mask: [u8; 4] = self.rng.random();

        Self::encode_with_mask(fin, opcode, payload, mask)
    }

    /// Encodes a frame masked with `mask`.
    pub fn encode_with_mask(fin: bool, opcode: OpCode, payload: &[u8], mask: [u8; 4]) -> Vec<u8> {
        let mut header = [0; MAX_HEADER_LEN];
        let len = Header::new(fin, opcode, payload.len() as u64).write(&mut header);

        let mut dst = Vec::with_capacity(len + 4 + payload.len());
        dst.extend_from_slice(&header[..len]);
        dst[1] |= 0x80;
        dst.extend_from_slice(&mask);

        let start = dst.len();
        dst.extend_from_slice(payload);
        mask::apply(&mut dst[start..], mask, 0);

        dst
    }
}
