// THEORY:
// Every failure the acquisition pipeline can meet is described here. None of them
// is fatal to the loop: capture problems degrade to "no target this cycle" and
// injection problems are handed to the configured failure policy. The types exist
// so that the choice to recover is explicit at each call site instead of implied.

/// Result type alias for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Why a snapshot of the display could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No display or capture context could be obtained.
    #[error("display capture unavailable: {reason}")]
    Unavailable {
        /// What the backend reported.
        reason: String,
    },

    /// The clamped region has no pixels left to read.
    #[error("capture region collapsed to {size}px at ({origin_x}, {origin_y})")]
    EmptyRegion { origin_x: i32, origin_y: i32, size: i32 },

    /// The backend produced a frame that did not match the requested region.
    #[error("capture backend error: {0}")]
    Backend(String),
}

/// Why a single relative pointer movement could not be enqueued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectionError {
    /// The OS input subsystem refused the event.
    #[error("pointer move ({dx}, {dy}) rejected: {reason}")]
    Rejected { dx: i32, dy: i32, reason: String },

    /// No input subsystem is reachable from this process.
    #[error("pointer injection unavailable: {0}")]
    Unavailable(String),
}

/// Errors that end an acquisition run or a smoothed move early.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// A pointer step failed while the actuator was told to abort on failure.
    #[error("smoothed move aborted after {emitted_events} events: {source}")]
    Injection {
        emitted_events: usize,
        #[source]
        source: InjectionError,
    },

    /// The acquisition task panicked or was cancelled by the runtime.
    #[error("acquisition task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Problems found while reading configuration overrides.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
