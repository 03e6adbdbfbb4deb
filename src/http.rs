//! Minimal HTTP/1.1 request parsing and response serialization.

use httparse::Status;
use serde::Serialize;

use crate::error::HttpError;

/// Maximum number of request headers kept by [`Request::parse`].
pub const MAX_HEADERS: usize = 32;

/// A request header with its raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// The header name as sent.
    pub name: String,
    /// The raw header value.
    pub value: Vec<u8>,
}

/// A parsed request head.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    version: u8,
    headers: Vec<Header>,
}

impl Request {
    /// Builds a request from its parts. `target` may carry a query string.
    pub fn new(method: &str, target: &str, headers: &[(&str, &str)]) -> Self {
        let (path, query) = split_target(target);

        Self {
            method: method.to_owned(),
            path,
            query,
            version: 1,
            headers: headers
                .iter()
                .map(|(name, value)| Header {
                    name: (*name).to_owned(),
                    value: value.as_bytes().to_vec(),
                })
                .collect(),
        }
    }

    /// Parses a request head from the front of `src`.
    ///
    /// Returns `None` while the head is incomplete, otherwise the request and the number
    /// of bytes it occupied.
    pub fn parse(src: &[u8]) -> Result<Option<(Self, usize)>, HttpError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut request = httparse::Request::new(&mut headers);

        let len = match request.parse(src)? {
            Status::Complete(len) => len,
            Status::Partial => return Ok(None),
        };

        let (path, query) = split_target(request.path.unwrap_or("/"));

        let request = Self {
            method: request.method.unwrap_or("GET").to_owned(),
            path,
            query,
            version: request.version.unwrap_or(1),
            headers: request
                .headers
                .iter()
                .map(|header| Header {
                    name: header.name.to_owned(),
                    value: header.value.to_vec(),
                })
                .collect(),
        };

        Ok(Some((request, len)))
    }

    /// The request method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Minor HTTP version: `0` for HTTP/1.0, `1` for HTTP/1.1.
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// All headers in arrival order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// The raw value of the first header named `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_slice())
    }

    /// Like [`Request::header`], as trimmed UTF-8.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.header(name)
            .and_then(|v| core::str::from_utf8(v).ok())
            .map(str::trim)
    }

    /// Whether the client asks to switch protocols.
    pub fn is_upgrade(&self) -> bool {
        self.header("upgrade").is_some()
    }
}

fn split_target(target: &str) -> (String, Option<String>) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
        None => (target.to_owned(), None),
    }
}

/// An outgoing response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Creates an empty response with `status`.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Sets the body and its `Content-Type`.
    pub fn with_body(self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut this = self.with_header("Content-Type", content_type);
        this.body = body.into();
        this
    }

    /// A `text/plain` response.
    pub fn text(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status).with_body("text/plain", body)
    }

    /// A `text/html` response.
    pub fn html(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status).with_body("text/html", body)
    }

    /// A 200 `application/json` response.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(200).with_body("application/json", serde_json::to_vec(value)?))
    }

    /// A 302 pointing at `location`.
    pub fn redirect(location: &str) -> Self {
        Self::html(
            302,
            format!("<html><body>The content is <a href=\"{location}\">here</a>.</body></html>"),
        )
        .with_header("Location", location)
    }

    /// The 404 response.
    pub fn not_found() -> Self {
        Self::text(404, "Not found")
    }

    /// The 500 response for a failed handler.
    pub fn internal_error(message: &str) -> Self {
        Self::text(500, format!("Failed to handle:\n{message}"))
    }

    /// The 426 response for a plain request on a WebSocket route.
    pub fn upgrade_required() -> Self {
        Self::text(426, "Upgrade required").with_header("Upgrade", "websocket")
    }

    /// Returns the status code.
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// The value of the first header named `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Serializes the response. Every status except 101 gets a `Content-Length`.
    pub fn write_to(&self, dst: &mut Vec<u8>) {
        fn write_bytes(dst: &mut Vec<u8>, data: &[u8]) {
            dst.extend_from_slice(data);
        }

        write_bytes(dst, b"HTTP/1.1 ");
        write_bytes(dst, self.status.to_string().as_bytes());
        write_bytes(dst, b" ");
        write_bytes(dst, reason_phrase(self.status).as_bytes());
        write_bytes(dst, b"\r\n");

        for (name, value) in self.headers.iter() {
            write_bytes(dst, name.as_bytes());
            write_bytes(dst, b": ");
            write_bytes(dst, value.as_bytes());
            write_bytes(dst, b"\r\n");
        }

        if self.status != 101 && self.header("content-length").is_none() {
            write_bytes(dst, b"Content-Length: ");
            write_bytes(dst, self.body.len().to_string().as_bytes());
            write_bytes(dst, b"\r\n");
        }

        write_bytes(dst, b"\r\n");
        write_bytes(dst, &self.body);
    }

    /// Serializes the response into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut dst = Vec::with_capacity(128 + self.body.len());
        self.write_to(&mut dst);
        dst
    }
}

/// The reason phrase written after `status`.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        101 => "Switching Protocols",
        200 => "OK",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        426 => "Upgrade Required",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
