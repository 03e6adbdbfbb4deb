//! Socket driver: HTTP dispatch and WebSocket connections on tokio.

use std::{net::SocketAddr, sync::Arc};

use embedded_io_adapters::tokio_1::FromTokio;
use embedded_io_async::{Read, Write};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::TcpListener,
};

use crate::{
    Connection, Handler,
    config::DEFAULT_MAX_REQUEST_HEAD,
    error::{HttpError, ServerError},
    http::{Request, Response},
    options::Limits,
    router::{Route, Router},
    transport::Outbox,
};

const READ_CHUNK: usize = 8 * 1024;

/// Serves a [`Router`] over tokio sockets.
#[derive(Debug, Clone)]
pub struct Server {
    router: Arc<Router>,
    limits: Limits,
    max_request_head: usize,
}

impl Server {
    /// Creates a server with default limits.
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            limits: Limits::default(),
            max_request_head: DEFAULT_MAX_REQUEST_HEAD,
        }
    }

    /// Sets the WebSocket frame and message limits.
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the largest accepted request head, in bytes.
    pub const fn with_max_request_head(mut self, max_request_head: usize) -> Self {
        self.max_request_head = max_request_head;
        self
    }

    /// Accepts connections forever, one task per socket.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;

            let server = self.clone();

            tokio::spawn(async move {
                if let Err(err) = server.serve(stream, peer).await {
                    tracing::error!(ip = %peer.ip(), port = peer.port(), %err, "Connection failed");
                }
            });
        }
    }

    /// Serves one request on `stream`, then either closes it or runs a WebSocket
    /// connection on it until either side ends it.
    pub async fn serve<S>(&self, stream: S, peer: SocketAddr) -> Result<(), ServerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut io = FromTokio::new(stream);

        let mut buf = Vec::with_capacity(READ_CHUNK);
        let mut chunk = vec![0; READ_CHUNK];

        let (request, consumed) = loop {
            match Request::parse(&buf) {
                Ok(Some(parsed)) => break parsed,
                Ok(None) => {}
                Err(err) => {
                    tracing::info!(ip = %peer.ip(), port = peer.port(), %err, status = 400, "Bad request");

                    respond(io, &Response::text(400, "Bad request")).await?;

                    return Err(err.into());
                }
            }

            if buf.len() >= self.max_request_head {
                respond(io, &Response::text(431, "Request head too large")).await?;

                return Err(HttpError::HeadTooLarge {
                    limit: self.max_request_head,
                }
                .into());
            }

            let n = io.read(&mut chunk).await?;

            if n == 0 {
                return match buf.is_empty() {
                    true => Ok(()),
                    false => Err(HttpError::ConnectionClosed.into()),
                };
            }

            buf.extend_from_slice(&chunk[..n]);
        };

        // Upgrade requests on HTTP routes (`Upgrade: h2c`) get a plain response.
        if let (true, Some(Route::WebSocket(factory))) =
            (request.is_upgrade(), self.router.lookup(request.path()))
        {
            let handler = factory(&request);

            return self
                .upgrade(io, handler, request, &buf[consumed..], peer)
                .await;
        }

        let response = self.router.respond(&request);

        tracing::info!(
            ip = %peer.ip(),
            port = peer.port(),
            path = request.path(),
            status = response.status(),
            content_type = response.content_type().unwrap_or(""),
            "Response"
        );

        respond(io, &response).await
    }

    async fn upgrade<S>(
        &self,
        mut io: FromTokio<S>,
        handler: Box<dyn Handler + Send>,
        request: Request,
        leftover: &[u8],
        peer: SocketAddr,
    ) -> Result<(), ServerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut connection = Connection::new(handler, Outbox::new(), self.limits);

        match connection.accept(&request) {
            Ok(()) => {
                tracing::info!(ip = %peer.ip(), port = peer.port(), path = request.path(), status = 101, "Upgrade");
            }
            Err(err) => {
                tracing::info!(ip = %peer.ip(), port = peer.port(), path = request.path(), status = 400, reason = %err, "Upgrade");
            }
        }

        connection.feed(leftover);

        let mut chunk = vec![0; READ_CHUNK];

        let result = loop {
            if let Err(err) = flush(&mut io, &mut connection).await {
                break Err(err);
            }

            if connection.is_closed() {
                break Ok(());
            }

            match io.read(&mut chunk).await {
                Ok(0) => break Ok(()),
                Ok(n) => connection.feed(&chunk[..n]),
                Err(err) => break Err(err.into()),
            }
        };

        connection.transport_closed();

        tracing::debug!(ip = %peer.ip(), port = peer.port(), "WebSocket connection ended");

        let _ = io.into_inner().shutdown().await;

        result
    }
}

/// Writes whatever the connection queued.
async fn flush<S, H>(
    io: &mut FromTokio<S>,
    connection: &mut Connection<H, Outbox>,
) -> Result<(), ServerError>
where
    S: AsyncWrite + Unpin,
    H: Handler,
{
    let bytes = connection.transport_mut().drain();

    if !bytes.is_empty() {
        io.write_all(&bytes).await?;
        io.flush().await?;
    }

    Ok(())
}

/// Writes a complete response and closes the stream.
async fn respond<S>(mut io: FromTokio<S>, response: &Response) -> Result<(), ServerError>
where
    S: AsyncWrite + Unpin,
{
    let response = response.clone().with_header("Connection", "close");

    io.write_all(&response.to_bytes()).await?;
    io.flush().await?;

    let _ = io.into_inner().shutdown().await;

    Ok(())
}
