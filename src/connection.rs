use crate::{
    CloseCode, CloseFrame, Message, OpCode,
    assembler::MessageAssembler,
    decoder::{Decoded, FrameDecoder},
    encoder::FrameEncoder,
    error::{HandshakeError, ProtocolError},
    frame::Frame,
    handshake,
    http::Request,
    options::Limits,
    transport::Transport,
};

/// Lifecycle of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for the upgrade request to be validated.
    Handshaking,
    /// The handshake succeeded and frames flow both ways.
    Open,
    /// The server sent CLOSE and waits for the peer's.
    LocalClosing,
    /// The peer sent CLOSE and the echo is not written yet.
    ///
    /// Only held inside [`Connection::feed`]: the echo is written in the same call,
    /// so callers see the connection go from [`ConnectionState::Open`] straight to
    /// [`ConnectionState::Closed`].
    RemoteClosing,
    /// Both CLOSE frames were exchanged or the transport is gone.
    Closed,
}

/// Application callbacks of a WebSocket endpoint.
///
/// Every callback runs synchronously inside [`Connection::feed`] and may use the
/// [`Link`] to send frames or close the connection.
pub trait Handler {
    /// Called once the 101 response has been queued.
    fn on_open(&mut self, _link: &mut Link<'_>) {}

    /// Called with every complete message, in the order their final frames arrived.
    fn on_message(&mut self, link: &mut Link<'_>, message: Message);

    /// Called with payload bytes as they are unmasked, before the message completes.
    ///
    /// `opcode` is the message opcode (text or binary), `is_last` marks the chunk that
    /// completes the message.
    fn on_frame(&mut self, _link: &mut Link<'_>, _chunk: &[u8], _opcode: OpCode, _is_last: bool) {}

    /// Called with the payload of every received pong.
    fn on_pong(&mut self, _link: &mut Link<'_>, _payload: &[u8]) {}

    /// Called exactly once when the connection ends.
    fn on_close(&mut self, _code: CloseCode, _reason: &str) {}
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn on_open(&mut self, link: &mut Link<'_>) {
        (**self).on_open(link)
    }

    fn on_message(&mut self, link: &mut Link<'_>, message: Message) {
        (**self).on_message(link, message)
    }

    fn on_frame(&mut self, link: &mut Link<'_>, chunk: &[u8], opcode: OpCode, is_last: bool) {
        (**self).on_frame(link, chunk, opcode, is_last)
    }

    fn on_pong(&mut self, link: &mut Link<'_>, payload: &[u8]) {
        (**self).on_pong(link, payload)
    }

    fn on_close(&mut self, code: CloseCode, reason: &str) {
        (**self).on_close(code, reason)
    }
}

#[derive(Debug, Default)]
struct CloseState {
    /// The server has sent its CLOSE frame.
    server_closed: bool,
    /// The peer's CLOSE frame has been received.
    client_closed: bool,
    /// The transport has been asked to shut down or has gone away.
    terminated: bool,
    /// What the server sent when it closed.
    local: Option<CloseFrame>,
}

/// The sending side of a connection, handed to [`Handler`] callbacks.
pub struct Link<'a> {
    transport: &'a mut dyn Transport,
    close: &'a mut CloseState,
}

impl core::fmt::Debug for Link<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Link")
            .field("close", &self.close)
            .finish_non_exhaustive()
    }
}

impl<'a> Link<'a> {
    fn new(transport: &'a mut dyn Transport, close: &'a mut CloseState) -> Self {
        Self { transport, close }
    }

    /// Whether the server has already sent its CLOSE frame.
    pub fn is_closing(&self) -> bool {
        self.close.server_closed || self.close.terminated
    }

    /// Sends `payload` as one frame.
    ///
    /// Dropped once the server has closed. Continuation and close opcodes are refused,
    /// use [`Link::close`] to close.
    pub fn send(&mut self, payload: &[u8], opcode: OpCode) {
        if self.is_closing() {
            tracing::debug!(?opcode, len = payload.len(), "Connection closing, dropping send");

            return;
        }

        match opcode {
            OpCode::Continuation | OpCode::Close => {
                tracing::warn!(?opcode, "Refusing to send frame through send");

                return;
            }
            OpCode::Ping | OpCode::Pong if payload.len() > 125 => {
                tracing::warn!(?opcode, len = payload.len(), "Control payload too large");

                return;
            }
            _ => {}
        }

        FrameEncoder::new().write(true, opcode, payload, &mut *self.transport);
    }

    /// Sends a text message.
    pub fn send_text(&mut self, text: &str) {
        self.send(text.as_bytes(), OpCode::Text)
    }

    /// Sends a binary message.
    pub fn send_binary(&mut self, payload: &[u8]) {
        self.send(payload, OpCode::Binary)
    }

    /// Sends a ping. Payloads over 125 bytes are refused.
    pub fn ping(&mut self, payload: &[u8]) {
        self.send(payload, OpCode::Ping)
    }

    /// Starts the close handshake. A second call is a no-op.
    ///
    /// `reason` is truncated to fit a control frame. If the peer already sent its CLOSE,
    /// the transport is terminated right away.
    pub fn close(&mut self, code: CloseCode, reason: &str) {
        if self.is_closing() {
            tracing::trace!(%code, "Already closing");

            return;
        }

        let frame = CloseFrame::new(code, reason);

        let payload = match code.is_sendable() {
            true => frame.to_payload(),
            false => Vec::new(),
        };

        tracing::debug!(%code, reason = frame.reason(), "Sending close");

        FrameEncoder::new().write(true, OpCode::Close, &payload, &mut *self.transport);

        self.close.server_closed = true;
        self.close.local = Some(frame);

        if self.close.client_closed {
            self.terminate();
        }
    }

    fn terminate(&mut self) {
        if !self.close.terminated {
            self.close.terminated = true;
            self.transport.terminate();
        }
    }
}

/// A single WebSocket connection, driven by whatever bytes arrive.
///
/// The connection never performs I/O itself: input comes through [`Connection::feed`]
/// and output goes to its [`Transport`].
#[derive(Debug)]
pub struct Connection<H, T> {
    handler: H,
    transport: T,
    decoder: FrameDecoder,
    assembler: MessageAssembler,
    close: CloseState,
    open: bool,
    can_read: bool,
    close_notified: bool,
    /// Message opcode and FIN bit of the data frame being decoded.
    current: Option<(OpCode, bool)>,
    events: Vec<Decoded>,
}

impl<H: Handler, T: Transport> Connection<H, T> {
    /// Creates a connection waiting for its handshake.
    pub fn new(handler: H, transport: T, limits: Limits) -> Self {
        Self {
            handler,
            transport,
            decoder: FrameDecoder::new(limits),
            assembler: MessageAssembler::new(),
            close: CloseState::default(),
            open: false,
            can_read: false,
            close_notified: false,
            current: None,
            events: Vec::new(),
        }
    }

    /// Validates the upgrade request and writes the 101 or 400 response.
    ///
    /// On failure the transport is terminated and the connection never opens.
    pub fn accept(&mut self, request: &Request) -> Result<(), HandshakeError> {
        if self.state() != ConnectionState::Handshaking {
            tracing::warn!(state = ?self.state(), "Handshake on a connection past handshaking");

            return Ok(());
        }

        let (response, result) = handshake::respond(request);

        self.transport.write(&response.to_bytes());

        match result {
            Ok(()) => {
                self.open = true;
                self.can_read = true;

                let (handler, mut link) = self.parts();
                handler.on_open(&mut link);
            }
            Err(err) => {
                tracing::debug!(%err, "Handshake rejected");

                self.close.terminated = true;
                self.transport.terminate();
            }
        }

        result
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        if self.close.terminated {
            return ConnectionState::Closed;
        }

        if !self.open {
            return ConnectionState::Handshaking;
        }

        match (self.close.server_closed, self.close.client_closed) {
            (false, false) => ConnectionState::Open,
            (true, false) => ConnectionState::LocalClosing,
            (false, true) => ConnectionState::RemoteClosing,
            (true, true) => ConnectionState::Closed,
        }
    }

    /// Whether the connection reached [`ConnectionState::Closed`].
    pub fn is_closed(&self) -> bool {
        self.state() == ConnectionState::Closed
    }

    /// Whether incoming bytes are still decoded.
    pub const fn can_read(&self) -> bool {
        self.can_read
    }

    /// Returns a reference to the handler.
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns a mutable reference to the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Returns a reference to the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Returns the sending side of the connection.
    pub fn link(&mut self) -> Link<'_> {
        Link::new(&mut self.transport, &mut self.close)
    }

    /// See [`Link::send`].
    pub fn send(&mut self, payload: &[u8], opcode: OpCode) {
        self.link().send(payload, opcode)
    }

    /// See [`Link::close`].
    pub fn close(&mut self, code: CloseCode, reason: &str) {
        self.link().close(code, reason)
    }

    /// Decodes `bytes` and runs the callbacks they trigger.
    ///
    /// Ignored once the connection stopped reading.
    pub fn feed(&mut self, bytes: &[u8]) {
        if !self.can_read {
            tracing::trace!(len = bytes.len(), "Not reading, dropping bytes");

            return;
        }

        let mut events = core::mem::take(&mut self.events);
        let result = self.decoder.feed(bytes, &mut events);

        for event in events.drain(..) {
            if !self.can_read {
                break;
            }

            self.dispatch(event);
        }

        self.events = events;

        if let Err(err) = result {
            if self.can_read {
                self.fail(err);
            }
        }
    }

    /// The transport reached end of stream or failed.
    pub fn transport_closed(&mut self) {
        tracing::debug!(state = ?self.state(), "Transport closed");

        self.can_read = false;
        self.close.terminated = true;

        if self.open {
            let (code, reason) = match &self.close.local {
                Some(frame) => (frame.code(), frame.reason().to_owned()),
                None => (CloseCode::Abnormal, String::new()),
            };

            self.notify_close(code, &reason);
        }
    }

    fn parts(&mut self) -> (&mut H, Link<'_>) {
        (
            &mut self.handler,
            Link::new(&mut self.transport, &mut self.close),
        )
    }

    fn dispatch(&mut self, event: Decoded) {
        match event {
            Decoded::DataHead(head) => match self.assembler.begin_frame(&head) {
                Ok(opcode) => self.current = Some((opcode, head.fin)),
                Err(err) => self.fail(err),
            },
            Decoded::DataChunk { chunk, last } => {
                let Some((opcode, fin)) = self.current else {
                    return;
                };

                self.assembler.push(&chunk);

                let (handler, mut link) = self.parts();
                handler.on_frame(&mut link, &chunk, opcode, last && fin);

                if last {
                    self.current = None;

                    if let Some(message) = self.assembler.end_frame() {
                        tracing::trace!(opcode = ?message.opcode(), len = message.payload().len(), "Message");

                        let (handler, mut link) = self.parts();
                        handler.on_message(&mut link, message);
                    }
                }
            }
            Decoded::Control(frame) => self.on_control(frame),
        }
    }

    fn on_control(&mut self, frame: Frame) {
        match frame.opcode() {
            OpCode::Ping => self.link().send(frame.payload(), OpCode::Pong),
            OpCode::Pong => {
                let (handler, mut link) = self.parts();
                handler.on_pong(&mut link, frame.payload());
            }
            OpCode::Close => self.on_close_frame(frame.payload()),
            opcode => tracing::warn!(?opcode, "Not a control opcode"),
        }
    }

    fn on_close_frame(&mut self, payload: &[u8]) {
        self.close.client_closed = true;

        let received = match CloseFrame::parse(payload) {
            Ok(received) => received,
            Err(err) => {
                self.fail(err);

                return;
            }
        };

        self.can_read = false;

        let mut link = self.link();

        if !link.close.server_closed {
            let echo = received
                .clone()
                .unwrap_or_else(|| CloseFrame::no_reason(CloseCode::Normal));

            tracing::debug!(code = %echo.code(), reason = echo.reason(), "Echoing close");

            FrameEncoder::new().write(true, OpCode::Close, &echo.to_payload(), &mut *link.transport);

            link.close.server_closed = true;
        }

        link.terminate();

        let (code, reason) = match received {
            Some(frame) => (frame.code(), frame.reason().to_owned()),
            None => (CloseCode::Status, String::new()),
        };

        self.notify_close(code, &reason);
    }

    /// Fails the connection: sends CLOSE with the violation's code and stops reading.
    fn fail(&mut self, err: ProtocolError) {
        tracing::warn!(%err, code = %err.close_code(), "Protocol violation");

        self.can_read = false;

        let mut link = self.link();
        link.close(err.close_code(), &err.to_string());
        link.terminate();
    }

    fn notify_close(&mut self, code: CloseCode, reason: &str) {
        if self.close_notified {
            return;
        }

        self.close_notified = true;
        self.handler.on_close(code, reason);
    }
}
