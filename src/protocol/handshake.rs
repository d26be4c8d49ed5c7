//! WebSocket upgrade handshake (RFC 6455 section 4.2).
//!
//! [`HttpRequest`] is the request abstraction the engine consumes from the
//! HTTP layer; [`negotiate`] turns it into the 101 Switching Protocols
//! [`HandshakeResponse`] that the connection lifecycle writes to the socket.

use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha1::{Digest, Sha1};
use std::collections::HashMap;

/// The WebSocket GUID used in the Sec-WebSocket-Accept calculation (RFC 6455).
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Headers that must not appear twice in an upgrade request.
const SECURITY_HEADERS: [&str; 4] = [
    "host",
    "upgrade",
    "connection",
    "sec-websocket-key",
];

/// Parse HTTP header lines into a map keyed by lowercase header name.
///
/// # Errors
/// Returns `Error::InvalidHandshake` if a security-critical header is duplicated.
fn parse_headers<'a, I>(lines: I) -> Result<HashMap<String, String>>
where
    I: Iterator<Item = &'a str>,
{
    let mut headers: HashMap<String, String> = HashMap::new();

    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name_lower = name.trim().to_ascii_lowercase();

            if SECURITY_HEADERS.contains(&name_lower.as_str()) && headers.contains_key(&name_lower)
            {
                return Err(Error::InvalidHandshake(format!(
                    "Duplicate header: {}",
                    name.trim()
                )));
            }

            headers.insert(name_lower, value.trim().to_string());
        }
    }

    Ok(headers)
}

/// Validate that a header value does not contain CR or LF characters.
fn validate_header_value(header_name: &str, value: &str) -> Result<()> {
    if value.contains('\r') || value.contains('\n') {
        return Err(Error::InvalidHeaderValue {
            header: header_name.to_string(),
            reason: "contains CR or LF characters".to_string(),
        });
    }
    Ok(())
}

/// Computes the Sec-WebSocket-Accept value from the client's Sec-WebSocket-Key.
///
/// The accept key is calculated as: Base64(SHA-1(key + GUID))
///
/// # Example
///
/// ```
/// use microws::protocol::handshake::compute_accept_key;
///
/// let accept = compute_accept_key("dGhlIHNhbXBsZSBub25jZQ==");
/// assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
/// ```
pub fn compute_accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// An HTTP request as handed over by the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpRequest {
    /// Request method (e.g. "GET").
    pub method: String,
    /// Request path (e.g. "/ws").
    pub path: String,
    /// Protocol version from the request line (e.g. "HTTP/1.1").
    pub version: String,
    headers: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a request with no headers.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            version: "HTTP/1.1".to_string(),
            headers: HashMap::new(),
        }
    }

    /// Add a header; names are matched case-insensitively.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parse a request head (request line and headers) from raw bytes.
    ///
    /// Everything after the first empty line is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandshake`] if:
    /// - The data is not valid UTF-8.
    /// - The request line is missing or does not have three parts.
    /// - A security-critical header (`Host`, `Upgrade`, `Connection`,
    ///   `Sec-WebSocket-Key`) appears more than once.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|_| Error::InvalidHandshake("Invalid UTF-8".into()))?;

        let mut lines = text.lines();

        let request_line = lines
            .next()
            .ok_or_else(|| Error::InvalidHandshake("Empty request".into()))?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        let [method, path, version] = parts.as_slice() else {
            return Err(Error::InvalidHandshake("Invalid request line".into()));
        };

        Ok(Self {
            method: (*method).to_string(),
            path: (*path).to_string(),
            version: (*version).to_string(),
            headers: parse_headers(lines)?,
        })
    }
}

/// An HTTP 101 Switching Protocols response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse {
    /// Value of the `Upgrade` header.
    pub upgrade: String,
    /// Additional headers, written in order.
    pub headers: Vec<(String, String)>,
}

impl HandshakeResponse {
    /// A protocol-switch response to `upgrade` with no extra headers.
    #[must_use]
    pub fn switching_protocols(upgrade: impl Into<String>) -> Self {
        Self {
            upgrade: upgrade.into(),
            headers: Vec::new(),
        }
    }

    /// Append a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Write the HTTP response to a buffer.
    ///
    /// # Errors
    /// Returns `Error::InvalidHeaderValue` if any header value contains CR/LF.
    pub fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        validate_header_value("Upgrade", &self.upgrade)?;
        for (name, value) in &self.headers {
            validate_header_value(name, value)?;
        }

        buf.extend_from_slice(b"HTTP/1.1 101 Switching Protocols\r\n");
        buf.extend_from_slice(format!("Upgrade: {}\r\n", self.upgrade).as_bytes());
        buf.extend_from_slice(b"Connection: Upgrade\r\n");
        for (name, value) in &self.headers {
            buf.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        buf.extend_from_slice(b"\r\n");
        Ok(())
    }
}

/// Validate an upgrade request and build the 101 response.
///
/// Only the client key is required; the accept token is derived from it
/// with [`compute_accept_key`].
///
/// # Errors
///
/// Returns `Error::InvalidHandshake` if `Sec-WebSocket-Key` is missing or empty.
pub fn negotiate(request: &HttpRequest) -> Result<HandshakeResponse> {
    let key = request
        .header("sec-websocket-key")
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::InvalidHandshake("Missing Sec-WebSocket-Key header".into()))?;

    Ok(HandshakeResponse::switching_protocols("websocket")
        .with_header("Sec-WebSocket-Accept", compute_accept_key(key)))
}
