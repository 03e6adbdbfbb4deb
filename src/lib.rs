//! A small HTTP origin server whose WebSocket engine is written directly against the
//! bytes of the transport.
//!
//! The engine is sans-io: a [`Connection`] is fed raw bytes with [`Connection::feed`]
//! and writes frames to a [`Transport`]. The [`server`] module drives connections over
//! tokio sockets.
//!
//! # Data flow
//!
//! ```text
//! bytes -> FrameDecoder -> data frames -> MessageAssembler -> Handler::on_message
//!                       -> control frames -> close/ping handling -> FrameEncoder -> Transport
//! ```
//!
//! # Example
//!
//! ```no_run
//! use originz::{Handler, Link, Message, Response, Router, Server};
//!
//! struct Shout;
//!
//! impl Handler for Shout {
//!     fn on_message(&mut self, link: &mut Link<'_>, message: Message) {
//!         if let Some(text) = message.as_text() {
//!             link.send_text(&text.to_uppercase());
//!         }
//!     }
//! }
//!
//! # async fn run() -> std::io::Result<()> {
//! let router = Router::new()
//!     .route("/", |_| Ok(Response::text(200, "hello")))
//!     .websocket("/shout", |_| Shout);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!
//! Server::new(router).run(listener).await
//! # }
//! ```

#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod assembler;
pub use assembler::{Message, MessageAssembler};

mod close_code;
pub use close_code::CloseCode;

mod close_frame;
pub use close_frame::CloseFrame;

pub mod config;
pub use config::Config;

mod connection;
pub use connection::{Connection, ConnectionState, Handler, Link};

pub mod decoder;
pub use decoder::FrameDecoder;

mod echo;
pub use echo::Echo;

mod encoder;
pub use encoder::{ClientEncoder, FrameEncoder};

pub mod error;

mod frame;
pub use frame::{Frame, FrameHead};

pub mod handshake;

pub mod http;
pub use http::{Request, Response};

mod mask;

#[cfg(test)]
mod mock;

mod opcode;
pub use opcode::OpCode;

mod options;
pub use options::Limits;

pub mod router;
pub use router::Router;

pub mod server;
pub use server::Server;

mod transport;
pub use transport::{Outbox, Transport};
