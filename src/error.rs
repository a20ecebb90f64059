use thiserror::Error;

/// Errors raised while turning filter lists into matchers.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The joined fragment list did not compile as a regular expression.
    #[error("invalid filter pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A watch follower task panicked or was cancelled before finishing.
    #[error("filter watch task failed: {0}")]
    WatchTask(#[from] tokio::task::JoinError),
}
