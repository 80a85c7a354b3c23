use super::error::TrackerError;
use crate::bencode::{decode, Value};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// A candidate peer returned from a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// The peer's socket address.
    pub addr: SocketAddr,
    /// The peer's 20-byte ID; only present in non-compact responses.
    pub peer_id: Option<[u8; 20]>,
}

impl Peer {
    /// Decodes a peer from a 6-byte compact group: 4 bytes of IPv4 address
    /// followed by a big-endian port.
    ///
    /// The port is composed by shift-and-add (`from_be_bytes`). Multiplying
    /// the two bytes is a known client bug: it zeroes every port with a zero
    /// byte in either position.
    pub fn from_compact(bytes: &[u8; 6]) -> Self {
        let ip = Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]);
        let port = u16::from_be_bytes([bytes[4], bytes[5]]);
        Self {
            addr: SocketAddr::new(IpAddr::V4(ip), port),
            peer_id: None,
        }
    }
}

/// A decoded tracker announce response.
#[derive(Debug, Clone)]
pub struct AnnounceResponse {
    /// Seconds the tracker asks us to wait before the next announce.
    pub interval: u32,
    /// Lower bound on the re-announce interval, if the tracker sent one.
    pub min_interval: Option<u32>,
    /// Number of seeders in the swarm.
    pub complete: Option<u32>,
    /// Number of leechers in the swarm.
    pub incomplete: Option<u32>,
    /// Candidate peers.
    pub peers: Vec<Peer>,
}

impl AnnounceResponse {
    /// The effective wait before the next periodic announce: `interval`
    /// clamped to at least `min interval`.
    pub fn reannounce_after(&self) -> Duration {
        let secs = self.interval.max(self.min_interval.unwrap_or(0));
        Duration::from_secs(u64::from(secs))
    }
}

/// Decodes an announce response body.
///
/// A "failure reason" key means the tracker rejected the request and is
/// reported as [`TrackerError::Rejected`]. The "peers" field may be either a
/// compact byte string or a list of per-peer dictionaries; both are accepted
/// regardless of what the request asked for, since trackers do not always
/// honor the `compact` flag.
pub(crate) fn parse_announce_response(body: &[u8]) -> Result<AnnounceResponse, TrackerError> {
    let value = decode(body)?;
    let dict = value
        .as_dict()
        .ok_or(TrackerError::InvalidResponse("expected dictionary"))?;

    if let Some(reason) = dict
        .get(b"failure reason".as_slice())
        .and_then(|v| v.as_str())
    {
        return Err(TrackerError::Rejected(reason.to_string()));
    }

    let interval = dict
        .get(b"interval".as_slice())
        .and_then(|v| v.as_integer())
        .ok_or(TrackerError::InvalidResponse("missing interval"))?;
    // A negative interval would wrap into a multi-year wait.
    let interval = u32::try_from(interval)
        .map_err(|_| TrackerError::InvalidResponse("interval out of range"))?;

    let min_interval = dict
        .get(b"min interval".as_slice())
        .and_then(|v| v.as_integer())
        .and_then(|v| u32::try_from(v).ok());

    let complete = dict
        .get(b"complete".as_slice())
        .and_then(|v| v.as_integer())
        .and_then(|v| u32::try_from(v).ok());

    let incomplete = dict
        .get(b"incomplete".as_slice())
        .and_then(|v| v.as_integer())
        .and_then(|v| u32::try_from(v).ok());

    let peers = match dict.get(b"peers".as_slice()) {
        Some(Value::Bytes(data)) => parse_compact_peers(data)?,
        Some(Value::List(list)) => parse_peer_dicts(list),
        Some(_) => return Err(TrackerError::InvalidResponse("peers has wrong type")),
        None => Vec::new(),
    };

    Ok(AnnounceResponse {
        interval,
        min_interval,
        complete,
        incomplete,
        peers,
    })
}

/// Decodes a compact peer list: each 6-byte group is one IPv4 peer.
pub(crate) fn parse_compact_peers(data: &[u8]) -> Result<Vec<Peer>, TrackerError> {
    if data.len() % 6 != 0 {
        return Err(TrackerError::MalformedPeerList(data.len()));
    }

    Ok(data
        .chunks_exact(6)
        .map(|chunk| {
            let mut group = [0u8; 6];
            group.copy_from_slice(chunk);
            Peer::from_compact(&group)
        })
        .collect())
}

/// Decodes the non-compact peer list: dictionaries with "peer id", "ip",
/// and "port". Entries with an unparseable address are skipped.
fn parse_peer_dicts(list: &[Value]) -> Vec<Peer> {
    list.iter()
        .filter_map(|entry| {
            let ip: IpAddr = entry.get(b"ip")?.as_str()?.parse().ok()?;
            let port = entry.get(b"port")?.as_integer()?;
            let port = u16::try_from(port).ok()?;

            let peer_id = entry
                .get(b"peer id")
                .and_then(|v| v.as_bytes())
                .and_then(|b| <[u8; 20]>::try_from(b.as_ref()).ok());

            Some(Peer {
                addr: SocketAddr::new(ip, port),
                peer_id,
            })
        })
        .collect()
}
