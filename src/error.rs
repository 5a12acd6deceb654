//! Error types for a single fetch.

use thiserror::Error;

use crate::socket::CandidateFailure;

#[derive(Debug, Error)]
pub enum Error {
    #[error("URL {component} is {len} bytes long, limit is {max}")]
    ComponentTooLong {
        component: &'static str,
        len: usize,
        max: usize,
    },

    #[error("cannot resolve {host}:{port}: {cause}")]
    AddressResolution {
        host: String,
        port: String,
        cause: String,
    },

    #[error("unable to connect to {host}:{port}{}", format_attempts(.attempts))]
    Connect {
        host: String,
        port: String,
        attempts: Vec<CandidateFailure>,
    },

    #[error("unexpected status line: {0:?}")]
    ProtocolStatus(String),

    #[error("received {received} bytes but Content-Length declared {declared}")]
    LengthMismatch { declared: u64, received: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_attempts(attempts: &[CandidateFailure]) -> String {
    if attempts.is_empty() {
        return ": no candidate addresses".to_string();
    }
    attempts
        .iter()
        .map(|attempt| format!("\n  {}: {}", attempt.addr, attempt.cause))
        .collect()
}
