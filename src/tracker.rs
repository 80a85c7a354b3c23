//! HTTP tracker announce protocol (BEP-3).
//!
//! An announce reports this client's identity, listening port, and transfer
//! progress to the tracker and returns a list of candidate peers plus a
//! re-announce interval. Both tracker response encodings are supported: the
//! compact 6-bytes-per-peer form (BEP-23) and the original list of
//! per-peer dictionaries.

mod error;
mod http;
mod request;
mod response;

pub use error::TrackerError;
pub use http::HttpTracker;
pub use request::{AnnounceRequest, TrackerEvent};
pub use response::{AnnounceResponse, Peer};
