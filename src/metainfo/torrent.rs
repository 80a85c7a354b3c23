use super::error::MetainfoError;
use super::info_hash::InfoHash;
use crate::bencode::{self, Value};
use bytes::Bytes;
use std::path::PathBuf;

/// A parsed torrent file.
///
/// Immutable once parsed; the [`InfoHash`] is derived exactly once, from the
/// raw byte span the "info" value occupied in the input.
#[derive(Debug, Clone)]
pub struct Metainfo {
    /// The info dictionary with file and piece layout.
    pub info: Info,
    /// The unique identifier for this torrent.
    pub info_hash: InfoHash,
    /// Primary tracker URL.
    pub announce: Option<String>,
    /// Multi-tier tracker list (BEP-12).
    pub announce_list: Vec<Vec<String>>,
    /// Unix timestamp when the torrent was created.
    pub creation_date: Option<i64>,
    /// Optional comment.
    pub comment: Option<String>,
    /// Client that created the torrent.
    pub created_by: Option<String>,
    raw_info: Bytes,
}

/// The info dictionary from a torrent file.
#[derive(Debug, Clone)]
pub struct Info {
    /// Suggested name for the file or directory.
    pub name: String,
    /// Number of bytes per piece.
    pub piece_length: u64,
    /// SHA1 hash of each piece.
    pub pieces: Vec<[u8; 20]>,
    /// Files in the torrent; single-file torrents have one entry.
    pub files: Vec<File>,
    /// Total size of all files combined.
    pub total_length: u64,
    /// If true, clients should use only the trackers in the metainfo.
    pub private: bool,
}

/// A file within a torrent, with its byte offset in the piece space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Path relative to the download root (multi-file paths are nested
    /// under the torrent name).
    pub path: PathBuf,
    /// Size of the file in bytes.
    pub length: u64,
    /// Byte offset within the torrent's piece data.
    pub offset: u64,
}

impl Metainfo {
    /// Parses a torrent file from raw bytes.
    ///
    /// # Errors
    ///
    /// - [`MetainfoError::Bencode`] / [`MetainfoError::NotADictionary`] if
    ///   the input is not a bencoded dictionary
    /// - [`MetainfoError::MissingInfo`] if there is no "info" key
    /// - [`MetainfoError::MissingField`] / [`MetainfoError::InvalidField`]
    ///   if the info dictionary is incomplete or malformed (for example a
    ///   pieces string whose length is not a multiple of 20)
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let top = bencode::decode(data)?;
        let dict = top.as_dict().ok_or(MetainfoError::NotADictionary)?;

        // The hash input is the span the "info" value occupies in `data`,
        // not a re-encode of the decoded tree. Encoders are free to order
        // keys differently than our canonical form; hashing a re-encode
        // would produce an identity no tracker or peer recognizes.
        let raw_info = bencode::raw_dict_value(data, b"info")?.ok_or(MetainfoError::MissingInfo)?;
        let info_hash = InfoHash::digest(raw_info);

        let info_value = dict.get(b"info".as_slice()).ok_or(MetainfoError::MissingInfo)?;
        let info = parse_info(info_value)?;

        let announce = dict
            .get(b"announce".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        let announce_list = dict
            .get(b"announce-list".as_slice())
            .and_then(|v| v.as_list())
            .map(|tiers| {
                tiers
                    .iter()
                    .filter_map(|tier| {
                        tier.as_list().map(|urls| {
                            urls.iter()
                                .filter_map(|u| u.as_str().map(String::from))
                                .collect()
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let creation_date = dict
            .get(b"creation date".as_slice())
            .and_then(|v| v.as_integer());

        let comment = dict
            .get(b"comment".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        let created_by = dict
            .get(b"created by".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        Ok(Self {
            info,
            info_hash,
            announce,
            announce_list,
            creation_date,
            comment,
            created_by,
            raw_info: Bytes::copy_from_slice(raw_info),
        })
    }

    /// Returns the raw bencoded info dictionary as it appeared in the input.
    pub fn raw_info(&self) -> &Bytes {
        &self.raw_info
    }

    /// All tracker URLs, primary first, duplicates removed.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers = Vec::new();

        if let Some(ref announce) = self.announce {
            trackers.push(announce.clone());
        }

        for tier in &self.announce_list {
            for tracker in tier {
                if !trackers.contains(tracker) {
                    trackers.push(tracker.clone());
                }
            }
        }

        trackers
    }
}

impl Info {
    /// Number of pieces in the torrent.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }
}

fn parse_info(value: &Value) -> Result<Info, MetainfoError> {
    let dict = value.as_dict().ok_or(MetainfoError::InvalidField("info"))?;

    let name = dict
        .get(b"name".as_slice())
        .and_then(|v| v.as_str())
        .ok_or(MetainfoError::MissingField("name"))?
        .to_string();

    let piece_length = dict
        .get(b"piece length".as_slice())
        .and_then(|v| v.as_integer())
        .ok_or(MetainfoError::MissingField("piece length"))?;

    if piece_length <= 0 {
        return Err(MetainfoError::InvalidField("piece length"));
    }
    let piece_length = piece_length as u64;

    let pieces_bytes = dict
        .get(b"pieces".as_slice())
        .and_then(|v| v.as_bytes())
        .ok_or(MetainfoError::MissingField("pieces"))?;

    if pieces_bytes.len() % 20 != 0 {
        return Err(MetainfoError::InvalidField("pieces"));
    }

    let pieces: Vec<[u8; 20]> = pieces_bytes
        .chunks_exact(20)
        .map(|chunk| {
            let mut arr = [0u8; 20];
            arr.copy_from_slice(chunk);
            arr
        })
        .collect();

    let private = dict
        .get(b"private".as_slice())
        .and_then(|v| v.as_integer())
        .map(|v| v == 1)
        .unwrap_or(false);

    let (files, total_length) = parse_files(dict, &name)?;

    Ok(Info {
        name,
        piece_length,
        pieces,
        files,
        total_length,
        private,
    })
}

fn parse_files(
    dict: &std::collections::BTreeMap<Bytes, Value>,
    name: &str,
) -> Result<(Vec<File>, u64), MetainfoError> {
    // Single-file mode: a top-level "length".
    if let Some(length) = dict.get(b"length".as_slice()).and_then(|v| v.as_integer()) {
        if length < 0 {
            return Err(MetainfoError::InvalidField("length"));
        }
        let length = length as u64;
        let file = File {
            path: PathBuf::from(name),
            length,
            offset: 0,
        };
        return Ok((vec![file], length));
    }

    // Multi-file mode: a "files" list of {length, path} dictionaries.
    let files_list = dict
        .get(b"files".as_slice())
        .and_then(|v| v.as_list())
        .ok_or(MetainfoError::MissingField("length or files"))?;

    let mut files = Vec::with_capacity(files_list.len());
    let mut offset = 0u64;

    for entry in files_list {
        let file_dict = entry.as_dict().ok_or(MetainfoError::InvalidField("files"))?;

        let length = file_dict
            .get(b"length".as_slice())
            .and_then(|v| v.as_integer())
            .ok_or(MetainfoError::MissingField("file length"))?;

        if length < 0 {
            return Err(MetainfoError::InvalidField("file length"));
        }

        let segments = file_dict
            .get(b"path".as_slice())
            .and_then(|v| v.as_list())
            .ok_or(MetainfoError::MissingField("file path"))?;

        let path: PathBuf = std::iter::once(name.to_string())
            .chain(segments.iter().filter_map(|s| s.as_str().map(String::from)))
            .collect();

        files.push(File {
            path,
            length: length as u64,
            offset,
        });

        offset += length as u64;
    }

    Ok((files, offset))
}
