//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format used for `.torrent` files and HTTP
//! tracker responses. Four data types exist: integers (`i42e`), byte strings
//! (`4:spam`), lists (`l...e`), and dictionaries (`d...e`).
//!
//! # Examples
//!
//! ```
//! use swarmlet::bencode::{decode, encode, Value};
//!
//! let value = decode(b"d3:fooi42ee").unwrap();
//! assert_eq!(value.get(b"foo").and_then(|v| v.as_integer()), Some(42));
//!
//! assert_eq!(encode(&Value::string("spam")), b"4:spam");
//! ```
//!
//! Besides the usual tree decode, [`raw_dict_value`] exposes the original
//! encoded byte span of a top-level dictionary entry. Torrent identity is the
//! SHA1 of the "info" value *as it appeared on the wire*; a decode followed
//! by a re-encode may reorder keys and change the digest, so the metainfo
//! parser hashes the span returned here instead.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, raw_dict_value};
pub use encode::encode;
pub use error::BencodeError;
pub use value::Value;

#[cfg(test)]
mod tests;
