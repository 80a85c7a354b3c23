//! Torrent metainfo handling ([BEP-3]).
//!
//! A `.torrent` file is a bencoded dictionary describing the content to be
//! shared: file names and sizes, the piece layout with one SHA1 hash per
//! piece, and tracker URLs. [`Metainfo::from_bytes`] parses that dictionary
//! into a typed structure and derives the torrent's [`InfoHash`].
//!
//! # Info hash derivation
//!
//! The info hash is the SHA1 digest of the "info" value's *original encoded
//! bytes*. It is computed over the exact byte span the value occupies in the
//! input, never over a decoded-and-re-encoded copy: re-encoding can reorder
//! dictionary keys or reformat integers, which silently changes the digest
//! and makes trackers and peers reject the torrent.
//!
//! # Examples
//!
//! ```no_run
//! use swarmlet::metainfo::Metainfo;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("example.torrent")?;
//! let torrent = Metainfo::from_bytes(&data)?;
//!
//! println!("Name: {}", torrent.info.name);
//! println!("Info hash: {}", torrent.info_hash);
//! println!("Pieces: {}", torrent.info.piece_count());
//! # Ok(())
//! # }
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod error;
mod info_hash;
mod torrent;

pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use torrent::{File, Info, Metainfo};
