use crate::{CloseCode, Handler, Link, Message};

/// Sends every message back to its sender unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Echo;

impl Handler for Echo {
    fn on_message(&mut self, link: &mut Link<'_>, message: Message) {
        link.send(message.payload(), message.opcode());
    }

    fn on_close(&mut self, code: CloseCode, reason: &str) {
        tracing::debug!(%code, reason, "Echo connection closed");
    }
}
