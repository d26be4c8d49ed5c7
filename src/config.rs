//! Configuration and limits for WebSocket connections.

use std::time::Duration;

/// Resource limits for a connection.
///
/// The message buffer is allocated once at this size when the connection is
/// accepted, so these limits are also the per-connection memory budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a complete (reassembled) incoming message in bytes.
    ///
    /// Default: 1 KB (1024)
    pub max_message_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_size: 1024,
        }
    }
}

impl Limits {
    /// Create limits suitable for small embedded systems.
    ///
    /// - Max message: 256 bytes
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            max_message_size: 256,
        }
    }
}

/// Timeout configuration for WebSocket connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// Idle timeout.
    ///
    /// Maximum time a single socket read may wait once the connection is
    /// open.
    /// Default: 3600 seconds (1 hour)
    pub idle: Duration,

    /// Write timeout.
    ///
    /// Maximum time to wait for an outgoing frame to be written.
    /// Default: 60 seconds
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(3600),
            write: Duration::from_secs(60),
        }
    }
}

impl Timeouts {
    /// Create new timeouts with custom values.
    #[must_use]
    pub const fn new(idle: Duration, write: Duration) -> Self {
        Self { idle, write }
    }
}

/// Where a connection's receive loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    /// Run the loop on the accepting task; `accept` returns when the
    /// connection ends.
    #[default]
    Inline,
    /// Spawn one task per connection; `accept` returns immediately.
    Concurrent,
}

/// WebSocket connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Resource limits.
    pub limits: Limits,

    /// Timeout configuration.
    ///
    /// If `None`, reads and writes wait indefinitely.
    /// Default: `Some(Timeouts::default())`
    pub timeouts: Option<Timeouts>,

    /// Execution mode for the receive loop.
    ///
    /// Default: `ExecutionMode::Inline`
    pub execution_mode: ExecutionMode,

    /// Accept unmasked frames from clients.
    ///
    /// RFC 6455 requires clients to mask all frames; the reader unmasks when
    /// a mask is present either way. Set to `false` to reject unmasked frames.
    ///
    /// Default: true
    pub accept_unmasked_frames: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a new configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            timeouts: Some(Timeouts::default()),
            execution_mode: ExecutionMode::Inline,
            accept_unmasked_frames: true,
        }
    }

    /// Set custom limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the maximum incoming message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.limits.max_message_size = size;
        self
    }

    /// Set timeout configuration.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Disable read and write timeouts.
    #[must_use]
    pub fn without_timeouts(mut self) -> Self {
        self.timeouts = None;
        self
    }

    /// Set the execution mode.
    #[must_use]
    pub const fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Set whether unmasked client frames are accepted.
    #[must_use]
    pub const fn with_accept_unmasked_frames(mut self, accept: bool) -> Self {
        self.accept_unmasked_frames = accept;
        self
    }

    /// Configuration for a constrained device: 256-byte messages, inline loop.
    #[must_use]
    pub fn embedded() -> Self {
        Self::new().with_limits(Limits::embedded())
    }

    pub(crate) fn idle_timeout(&self) -> Option<Duration> {
        self.timeouts.as_ref().map(|t| t.idle)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        self.timeouts.as_ref().map(|t| t.write)
    }
}
