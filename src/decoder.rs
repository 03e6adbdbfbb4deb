//! Incremental frame decoding.
//!
//! [`FrameDecoder::feed`] accepts bytes in arbitrarily sized chunks: a header, an
//! extended length, a mask key or a payload may be split anywhere. Data payloads are
//! unmasked and handed out as they arrive, control payloads are buffered whole.

use crate::{Frame, FrameHead, OpCode, error::ProtocolError, mask, options::Limits};

const HEAD_LEN: usize = 2;
const MASK_LEN: usize = 4;

/// Output of the decoder, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The header of a data frame. Its payload follows as [`Decoded::DataChunk`]s.
    DataHead(FrameHead),
    /// Unmasked payload bytes of the current data frame.
    ///
    /// A frame with an empty payload yields a single empty chunk.
    DataChunk {
        /// The unmasked bytes.
        chunk: Vec<u8>,
        /// Set on the chunk that completes the frame.
        last: bool,
    },
    /// A complete control frame.
    Control(Frame),
}

/// Fixed-size buffer for the bytes the current state needs.
#[derive(Debug)]
struct Scratch {
    buf: Vec<u8>,
    filled: usize,
}

impl Scratch {
    fn with_len(len: usize) -> Self {
        Self {
            buf: vec![0; len],
            filled: 0,
        }
    }

    /// Moves bytes from the front of `src` until full. Returns `true` once full.
    fn fill(&mut self, src: &mut &[u8]) -> bool {
        let n = (self.buf.len() - self.filled).min(src.len());

        self.buf[self.filled..self.filled + n].copy_from_slice(&src[..n]);
        self.filled += n;
        *src = &src[n..];

        self.filled == self.buf.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Head,
    Length {
        fin: bool,
        opcode: OpCode,
        length_code: u8,
        extra: usize,
    },
    Data {
        head: FrameHead,
        mask: [u8; 4],
        offset: u64,
    },
    Control {
        fin: bool,
        opcode: OpCode,
        mask: [u8; 4],
        len: usize,
    },
    Failed(ProtocolError),
}

/// Turns client bytes into frames.
#[derive(Debug)]
pub struct FrameDecoder {
    limits: Limits,
    state: State,
    scratch: Scratch,
    /// Payload announced so far by the frames of the message in progress.
    message_len: u64,
}

impl FrameDecoder {
    /// Creates a decoder waiting for a frame header.
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            state: State::Head,
            scratch: Scratch::with_len(HEAD_LEN),
            message_len: 0,
        }
    }

    /// The violation that stopped this decoder, if any.
    pub const fn failure(&self) -> Option<ProtocolError> {
        match self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Decodes as much of `src` as possible, appending events to `dst`.
    ///
    /// On a violation the events decoded before it stay in `dst`, the error is returned
    /// and every later call returns the same error without reading.
    pub fn feed(&mut self, mut src: &[u8], dst: &mut Vec<Decoded>) -> Result<(), ProtocolError> {
        loop {
            match self.state {
                State::Failed(err) => return Err(err),
                State::Head => {
                    if src.is_empty() || !self.scratch.fill(&mut src) {
                        return Ok(());
                    }

                    let (b0, b1) = (self.scratch.buf[0], self.scratch.buf[1]);

                    match Self::decode_head(b0, b1) {
                        Ok(next) => self.enter(next),
                        Err(err) => return Err(self.fail(err)),
                    }
                }
                State::Length {
                    fin,
                    opcode,
                    length_code,
                    extra,
                } => {
                    if !self.scratch.fill(&mut src) {
                        return Ok(());
                    }

                    if let Err(err) = self.on_length(fin, opcode, length_code, extra, dst) {
                        return Err(self.fail(err));
                    }
                }
                State::Data { head, mask, offset } => {
                    if src.is_empty() {
                        return Ok(());
                    }

                    let remaining = head.payload_len - offset;
                    let n = remaining.min(src.len() as u64) as usize;

                    let mut chunk = src[..n].to_vec();
                    mask::apply(&mut chunk, mask, (offset & 3) as usize);
                    src = &src[n..];

                    let offset = offset + n as u64;
                    let last = offset == head.payload_len;

                    tracing::trace!(len = n, last, "data chunk");

                    dst.push(Decoded::DataChunk { chunk, last });

                    if last {
                        self.end_data_frame(head.fin);
                    } else {
                        self.state = State::Data { head, mask, offset };
                    }
                }
                State::Control { fin, opcode, mask, .. } => {
                    if !self.scratch.fill(&mut src) {
                        return Ok(());
                    }

                    let mut payload = core::mem::take(&mut self.scratch.buf);
                    mask::apply(&mut payload, mask, 0);

                    tracing::trace!(?opcode, len = payload.len(), "control frame");

                    dst.push(Decoded::Control(Frame::new(fin, opcode, payload)));

                    self.enter(State::Head);
                }
            }
        }
    }

    fn decode_head(b0: u8, b1: u8) -> Result<State, ProtocolError> {
        let fin = b0 & 0b1000_0000 != 0;

        if b0 & 0b0111_0000 != 0 {
            return Err(ProtocolError::ReservedBitsNotZero);
        }

        let opcode = OpCode::try_from(b0 & 0b0000_1111)?;

        if b1 & 0b1000_0000 == 0 {
            return Err(ProtocolError::Unmasked);
        }

        let length_code = b1 & 0x7F;

        if opcode.is_control() {
            if !fin {
                return Err(ProtocolError::FragmentedControl);
            }

            if length_code > 125 {
                return Err(ProtocolError::ControlFrameTooBig);
            }
        }

        let extra = match length_code {
            126 => 2,
            127 => 8,
            _ => 0,
        };

        Ok(State::Length {
            fin,
            opcode,
            length_code,
            extra,
        })
    }

    fn on_length(
        &mut self,
        fin: bool,
        opcode: OpCode,
        length_code: u8,
        extra: usize,
        dst: &mut Vec<Decoded>,
    ) -> Result<(), ProtocolError> {
        let buf = &self.scratch.buf;

        let payload_len = match extra {
            0 => u64::from(length_code),
            2 => u64::from(u16::from_be_bytes([buf[0], buf[1]])),
            _ => {
                let mut bytes = [0; 8];
                bytes.copy_from_slice(&buf[..8]);

                u64::from_be_bytes(bytes)
            }
        };

        let mask = [buf[extra], buf[extra + 1], buf[extra + 2], buf[extra + 3]];

        if payload_len > self.limits.max_frame {
            return Err(ProtocolError::FrameTooBig);
        }

        if opcode.is_control() {
            if payload_len == 0 {
                dst.push(Decoded::Control(Frame::new(fin, opcode, Vec::new())));

                self.enter(State::Head);
            } else {
                self.enter(State::Control {
                    fin,
                    opcode,
                    mask,
                    len: payload_len as usize,
                });
            }

            return Ok(());
        }

        let message_len = match opcode {
            OpCode::Continuation => self.message_len,
            _ => 0,
        };

        let message_len = message_len.saturating_add(payload_len);

        if message_len > self.limits.max_message {
            return Err(ProtocolError::MessageTooBig);
        }

        self.message_len = message_len;

        let head = FrameHead {
            fin,
            opcode,
            payload_len,
        };

        tracing::trace!(?opcode, fin, payload_len, "data frame");

        dst.push(Decoded::DataHead(head));

        if payload_len == 0 {
            dst.push(Decoded::DataChunk {
                chunk: Vec::new(),
                last: true,
            });

            self.end_data_frame(fin);
        } else {
            self.enter(State::Data {
                head,
                mask,
                offset: 0,
            });
        }

        Ok(())
    }

    fn end_data_frame(&mut self, fin: bool) {
        if fin {
            self.message_len = 0;
        }

        self.enter(State::Head);
    }

    /// Switches state and gives the new state its own scratch buffer.
    fn enter(&mut self, state: State) {
        let len = match state {
            State::Head => HEAD_LEN,
            State::Length { extra, .. } => extra + MASK_LEN,
            State::Control { len, .. } => len,
            State::Data { .. } | State::Failed(_) => 0,
        };

        self.state = state;
        self.scratch = Scratch::with_len(len);
    }

    fn fail(&mut self, err: ProtocolError) -> ProtocolError {
        tracing::debug!(%err, "decoder failed");

        self.enter(State::Failed(err));

        err
    }
}
