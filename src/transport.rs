//! The write path of a connection.

/// Where a connection sends its bytes.
///
/// Writes never block and never fail at this level: an implementation queues the bytes
/// and the I/O driver reports socket errors through [`Connection::transport_closed`].
///
/// [`Connection::transport_closed`]: crate::Connection::transport_closed
pub trait Transport {
    /// Queues `bytes` for the peer.
    fn write(&mut self, bytes: &[u8]);

    /// Asks the driver to shut the socket down once queued bytes are flushed.
    fn terminate(&mut self);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes)
    }

    fn terminate(&mut self) {
        (**self).terminate()
    }
}

/// A [`Transport`] that queues bytes in memory until the driver drains them.
#[derive(Debug, Default)]
pub struct Outbox {
    buf: Vec<u8>,
    writes: usize,
    terminated: bool,
}

impl Outbox {
    /// Creates an empty [`Outbox`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all queued bytes.
    pub fn drain(&mut self) -> Vec<u8> {
        self.writes = 0;

        core::mem::take(&mut self.buf)
    }

    /// The bytes queued since the last drain.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Number of `write` calls since the last drain.
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Whether the connection asked for the socket to be shut down.
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl Transport for Outbox {
    fn write(&mut self, bytes: &[u8]) {
        self.writes += 1;
        self.buf.extend_from_slice(bytes);
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }
}
