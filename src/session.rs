//! Torrent session: announce lifecycle and peer workers.
//!
//! A [`Session`] owns everything one torrent needs at runtime: the parsed
//! metainfo, this client's identity, the tracker endpoint, the shared
//! [`TransferStats`], and the set of peer worker tasks. There is no ambient
//! global; callers hold the session and pass it where needed.
//!
//! The announce event sequence is enforced here: `started` exactly once,
//! periodic plain announces at the tracker-supplied interval, `completed` at
//! most once (and never when the transfer was already complete at start),
//! and a best-effort `stopped` on shutdown. Per-peer failures are logged and
//! the candidate discarded; they never take the session down.

mod driver;
mod error;
mod stats;

pub use driver::Session;
pub use error::SessionError;
pub use stats::{StatsSnapshot, TransferStats};

#[cfg(test)]
mod tests;
