//! Command line and environment configuration.

use std::net::{IpAddr, SocketAddr};

use clap::Parser;

use crate::{error::ConfigError, options::Limits};

/// Default limit for the HTTP request head, in bytes.
pub const DEFAULT_MAX_REQUEST_HEAD: usize = 16 * 1024;

/// Server settings, read from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "originz", version, about = "HTTP origin server with WebSocket endpoints")]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Largest WebSocket frame payload accepted, in bytes.
    #[arg(long, env = "MAX_FRAME", default_value_t = Limits::DEFAULT_MAX_FRAME)]
    pub max_frame: u64,

    /// Largest WebSocket message accepted, in bytes.
    #[arg(long, env = "MAX_MESSAGE", default_value_t = Limits::DEFAULT_MAX_MESSAGE)]
    pub max_message: u64,

    /// Largest HTTP request head accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_REQUEST_HEAD)]
    pub max_request_head: usize,
}

impl Config {
    /// Rejects zero limits and a frame limit above the message limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame == 0 {
            return Err(ConfigError::Zero { name: "max frame" });
        }

        if self.max_message == 0 {
            return Err(ConfigError::Zero {
                name: "max message",
            });
        }

        if self.max_request_head == 0 {
            return Err(ConfigError::Zero {
                name: "max request head",
            });
        }

        if self.max_frame > self.max_message {
            return Err(ConfigError::FrameExceedsMessage {
                max_frame: self.max_frame,
                max_message: self.max_message,
            });
        }

        Ok(())
    }

    /// The address to bind.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The engine limits.
    pub fn limits(&self) -> Limits {
        Limits::new(self.max_frame, self.max_message)
    }
}
