//! Error types for git-backed fallbacks.

use thiserror::Error;

/// Errors surfaced when a `git` fallback command cannot produce a value.
///
/// Absent environment variables are not errors; facts without a fallback
/// simply resolve to `None`. This enum only covers the subprocess path.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GitError {
    /// The `git` binary could not be spawned.
    #[error("failed to execute `git {args}`: {source}")]
    Spawn {
        /// Space-joined argv after `git`.
        args: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// `git` ran but exited non-zero.
    #[error("`git {args}` failed ({status}): {stderr}")]
    Command {
        /// Space-joined argv after `git`.
        args: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// `git` produced output that is not valid UTF-8.
    #[error("`git {args}` produced non-UTF-8 output")]
    NonUtf8Output {
        /// Space-joined argv after `git`.
        args: String,
    },

    /// `git` succeeded but its output did not have the expected shape.
    #[error("unexpected output from `git {args}`: {output:?}")]
    UnexpectedOutput {
        /// Space-joined argv after `git`.
        args: String,
        /// The offending output, trimmed.
        output: String,
    },
}
