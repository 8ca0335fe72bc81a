//! Unified error type.

use tracing_subscriber::util::TryInitError;

/// The error type returned by greeter's fallible operations.
///
/// Application-level failures (an empty name, an unknown route) are expressed
/// as HTTP [`Response`](crate::Response) values, not as `Error`s. This type
/// surfaces infrastructure failures: binding to a port, accepting a
/// connection, or installing the log subscriber twice.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging: {0}")]
    Logging(#[from] TryInitError),
}
