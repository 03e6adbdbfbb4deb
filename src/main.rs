use clap::Parser;
use originz::{Config, Echo, Response, Router, Server};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    config.validate()?;

    let router = Router::new()
        .route("/", |_| {
            Ok(Response::html(
                200,
                "<html><body>WebSocket echo at <code>/echo</code>.</body></html>",
            ))
        })
        .route("/health", |_| {
            Ok(Response::json(&Health {
                status: "ok",
                version: env!("CARGO_PKG_VERSION"),
            })?)
        })
        .websocket("/echo", |_| Echo);

    let listener = TcpListener::bind(config.addr()).await?;

    tracing::info!(addr = %config.addr(), "Server running");

    Server::new(router)
        .with_limits(config.limits())
        .with_max_request_head(config.max_request_head)
        .run(listener)
        .await?;

    Ok(())
}
