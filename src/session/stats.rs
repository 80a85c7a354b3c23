use parking_lot::Mutex;

/// A point-in-time copy of the transfer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub corrupt: u64,
}

/// Transfer counters shared between the announce task and peer workers.
///
/// Writers are the piece-exchange layer running inside peer workers; the
/// announce task reads a consistent snapshot at each announce. A single lock
/// keeps the four counters from tearing relative to each other.
#[derive(Debug, Default)]
pub struct TransferStats {
    inner: Mutex<StatsSnapshot>,
}

impl TransferStats {
    /// Creates counters for a transfer with `left` bytes still missing.
    pub fn new(left: u64) -> Self {
        Self {
            inner: Mutex::new(StatsSnapshot {
                left,
                ..Default::default()
            }),
        }
    }

    pub fn add_uploaded(&self, bytes: u64) {
        self.inner.lock().uploaded += bytes;
    }

    /// Records verified downloaded bytes, shrinking `left`.
    pub fn add_downloaded(&self, bytes: u64) {
        let mut stats = self.inner.lock();
        stats.downloaded += bytes;
        stats.left = stats.left.saturating_sub(bytes);
    }

    /// Records bytes that failed verification. They count as corrupt and go
    /// back into `left`, since the piece must be fetched again.
    pub fn record_corrupt(&self, bytes: u64) {
        let mut stats = self.inner.lock();
        stats.corrupt += bytes;
        stats.left = stats.left.saturating_add(bytes);
    }

    pub fn is_complete(&self) -> bool {
        self.inner.lock().left == 0
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        *self.inner.lock()
    }
}
