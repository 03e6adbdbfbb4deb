//! Opening handshake validation.

use base64::{Engine as _, engine::general_purpose};
use sha1::{Digest, Sha1};

use crate::{
    error::HandshakeError,
    http::{Request, Response},
};

const GUID: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// The only protocol version the server speaks.
pub const VERSION: &str = "13";

/// Computes `Sec-WebSocket-Accept` for a client key.
pub fn accept_token(sec_key: &[u8]) -> String {
    let mut sha1 = Sha1::new();

    sha1.update(sec_key);
    sha1.update(GUID);

    let hash = sha1.finalize();

    general_purpose::STANDARD.encode(hash)
}

/// Checks the upgrade headers and returns the accept token.
pub fn validate(request: &Request) -> Result<String, HandshakeError> {
    if !request
        .header_str("upgrade")
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
    {
        return Err(HandshakeError::NonWebsocketUpgrade);
    }

    if !request
        .header_str("connection")
        .is_some_and(|v| v.to_ascii_lowercase().contains("upgrade"))
    {
        return Err(HandshakeError::NonUpgradeConnection);
    }

    if request.header_str("sec-websocket-version") != Some(VERSION) {
        return Err(HandshakeError::BadVersion);
    }

    let sec_key = request
        .header_str("sec-websocket-key")
        .ok_or(HandshakeError::BadKeyLength)?;

    match general_purpose::STANDARD.decode(sec_key) {
        Ok(raw) if raw.len() == 16 => Ok(accept_token(sec_key.as_bytes())),
        _ => Err(HandshakeError::BadKeyLength),
    }
}

/// The 101 response completing a successful handshake.
pub fn switching_protocols(accept: &str) -> Response {
    Response::new(101)
        .with_header("Upgrade", "websocket")
        .with_header("Connection", "Upgrade")
        .with_header("Sec-WebSocket-Accept", accept)
}

/// The 400 response for a refused handshake, with an empty body.
pub fn rejection(err: HandshakeError) -> Response {
    let response = Response::new(400).with_header("Connection", "close");

    match err {
        HandshakeError::BadVersion => response.with_header("Sec-WebSocket-Version", VERSION),
        _ => response,
    }
}

/// Runs the validator and builds the matching response.
pub fn respond(request: &Request) -> (Response, Result<(), HandshakeError>) {
    match validate(request) {
        Ok(accept) => (switching_protocols(&accept), Ok(())),
        Err(err) => (rejection(err), Err(err)),
    }
}
