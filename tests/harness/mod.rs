//! Test harness for WebSocket integration tests.
//!
//! Provides a masking test client, an echo server on a random port and a
//! handler that records every callback.

#![allow(dead_code)]

mod client;
mod metrics;
mod recorder;
mod server;

pub use client::{Frame, TestClient};
pub use metrics::Metrics;
pub use recorder::{Event, Recorder};
pub use server::{TestServer, read_request_head};

/// Key from the RFC 6455 handshake example.
pub const SAMPLE_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";
