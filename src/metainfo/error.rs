use crate::bencode::BencodeError;
use thiserror::Error;

/// Errors from parsing torrent metainfo.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The input is not valid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// The top-level value is not a dictionary.
    #[error("top-level value is not a dictionary")]
    NotADictionary,

    /// The torrent has no "info" dictionary.
    #[error("missing info dictionary")]
    MissingInfo,

    /// A required field is absent from the info dictionary.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field is present but malformed.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// An info hash was constructed from a slice that is not 20 bytes.
    #[error("info hash must be 20 bytes")]
    InvalidHashLength,
}
