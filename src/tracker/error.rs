use crate::bencode::BencodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid tracker url: {0}")]
    InvalidUrl(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tracker returned status {0}")]
    BadStatus(u16),

    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// The tracker explicitly refused the announce ("failure reason" in the
    /// response body). Distinct from transport-level failure.
    #[error("tracker rejected announce: {0}")]
    Rejected(String),

    /// A compact peer list whose length is not a multiple of 6.
    #[error("malformed compact peer list: {0} bytes")]
    MalformedPeerList(usize),

    #[error("invalid response: {0}")]
    InvalidResponse(&'static str),
}
