//! Stages of a connect-operate-close chain.

use std::fmt;

/// Where a single chain is in its lifecycle.
///
/// `Connecting -> Connected -> Operating -> Closing -> Done`. `Failed` is
/// reached from `Connecting` or `Operating`; an operation failure still
/// passes through `Closing` before the chain reports `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainStage {
    /// The driver is establishing a connection.
    Connecting,
    /// A connection is open and bound to a collection.
    Connected,
    /// The query, insert, or distinct call is in flight.
    Operating,
    /// The connection is being released.
    Closing,
    /// The chain finished successfully.
    Done,
    /// The chain finished with a driver error.
    Failed,
}

impl ChainStage {
    /// Returns the lowercase stage name used in log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Operating => "operating",
            Self::Closing => "closing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for ChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
