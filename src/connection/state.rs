//! Connection state machine: `Connecting → Open → Closing → Closed`.

/// Lifecycle state of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ConnectionState {
    /// Handshake, buffer allocation or worker creation still in progress.
    #[default]
    Connecting,
    /// Receive loop running; messages may be sent.
    Open,
    /// Teardown started: close frame being sent, socket being shut down.
    Closing,
    /// Socket shut down. Terminal.
    Closed,
}

impl ConnectionState {
    /// Returns `true` only for `Open`.
    #[must_use]
    #[inline]
    pub const fn can_send(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Returns `true` once teardown has started.
    #[must_use]
    #[inline]
    pub const fn is_closing(&self) -> bool {
        matches!(self, ConnectionState::Closing | ConnectionState::Closed)
    }

    /// Whether moving to `next` is a legal transition.
    ///
    /// `Connecting` may go straight to `Closing` when a connection is
    /// rejected before it opens.
    #[must_use]
    pub const fn can_transition_to(&self, next: ConnectionState) -> bool {
        matches!(
            (self, next),
            (ConnectionState::Connecting, ConnectionState::Open)
                | (
                    ConnectionState::Connecting | ConnectionState::Open,
                    ConnectionState::Closing
                )
                | (ConnectionState::Closing, ConnectionState::Closed)
        )
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Closing => write!(f, "Closing"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}
