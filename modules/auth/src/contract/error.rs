use thiserror::Error;

/// Failures of the gate itself. "Invalid token" and "wrong password" are not
/// errors; the gate answers `None` for them.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("auth backend unreachable: {0}")]
    Unreachable(String),

    #[error("auth backend answered with status {status}")]
    Upstream { status: u16 },

    #[error("malformed auth backend response: {0}")]
    Malformed(String),
}
