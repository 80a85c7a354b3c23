use crate::tracker::TrackerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The metainfo carries no usable HTTP(S) tracker URL.
    #[error("no http tracker in metainfo")]
    NoTracker,

    /// A `started` announce was attempted after one already succeeded.
    #[error("session already started")]
    AlreadyStarted,

    /// A lifecycle announce was attempted before `started` succeeded.
    #[error("session not started")]
    NotStarted,

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),
}
