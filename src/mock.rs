//! Recording handler for tests.

use crate::{CloseCode, Handler, Link, Message, OpCode};

#[derive(Debug, Default)]
pub struct Recorder {
    /// Echo every message back with the same opcode.
    pub echo: bool,
    pub opened: bool,
    pub messages: Vec<Message>,
    pub frames: Vec<(Vec<u8>, OpCode, bool)>,
    pub pongs: Vec<Vec<u8>>,
    pub closes: Vec<(CloseCode, String)>,
}

impl Recorder {
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }
}

impl Handler for Recorder {
    fn on_open(&mut self, _link: &mut Link<'_>) {
        self.opened = true;
    }

    fn on_message(&mut self, link: &mut Link<'_>, message: Message) {
        if self.echo {
            link.send(message.payload(), message.opcode());
        }

        self.messages.push(message);
    }

    fn on_frame(&mut self, _link: &mut Link<'_>, chunk: &[u8], opcode: OpCode, is_last: bool) {
        self.frames.push((chunk.to_vec(), opcode, is_last));
    }

    fn on_pong(&mut self, _link: &mut Link<'_>, payload: &[u8]) {
        self.pongs.push(payload.to_vec());
    }

    fn on_close(&mut self, code: CloseCode, reason: &str) {
        self.closes.push((code, reason.to_owned()));
    }
}
