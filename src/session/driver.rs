use super::error::SessionError;
use super::stats::TransferStats;
use crate::metainfo::{InfoHash, Metainfo};
use crate::peer::{PeerConnection, PeerId};
use crate::tracker::{AnnounceRequest, AnnounceResponse, HttpTracker, TrackerError, TrackerEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

const MAX_PEER_WORKERS: usize = 30;
const STOPPED_RETRIES: usize = 2;
const STOPPED_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Announce lifecycle flags, updated under one lock so the event sequence
/// cannot interleave: started once, completed at most once, stopped once.
#[derive(Debug, Default)]
struct AnnounceState {
    starting: bool,
    started: bool,
    complete_at_start: bool,
    completed_sent: bool,
    stopped_sent: bool,
}

/// The runtime state of one torrent.
///
/// Owns the tracker endpoint, the shared transfer counters, and the peer
/// worker tasks. [`run`](Self::run) drives the periodic announce loop;
/// [`shutdown`](Self::shutdown) asks it to wind down, which sends the final
/// `stopped` announce and closes every worker.
pub struct Session {
    metainfo: Arc<Metainfo>,
    peer_id: PeerId,
    listen_port: u16,
    tracker: HttpTracker,
    stats: Arc<TransferStats>,
    state: Mutex<AnnounceState>,
    known_peers: Mutex<HashSet<SocketAddr>>,
    workers: Mutex<JoinSet<()>>,
    shutdown_signal: Notify,
}

impl Session {
    /// Builds a session around parsed metainfo.
    ///
    /// Picks the first usable HTTP(S) tracker from the metainfo; fails with
    /// [`SessionError::NoTracker`] if there is none.
    pub fn new(
        metainfo: Metainfo,
        peer_id: PeerId,
        listen_port: u16,
    ) -> Result<Self, SessionError> {
        let tracker = metainfo
            .trackers()
            .iter()
            .find_map(|url| HttpTracker::new(url).ok())
            .ok_or(SessionError::NoTracker)?;

        let stats = Arc::new(TransferStats::new(metainfo.info.total_length));

        Ok(Self {
            metainfo: Arc::new(metainfo),
            peer_id,
            listen_port,
            tracker,
            stats,
            state: Mutex::new(AnnounceState::default()),
            known_peers: Mutex::new(HashSet::new()),
            workers: Mutex::new(JoinSet::new()),
            shutdown_signal: Notify::new(),
        })
    }

    pub fn metainfo(&self) -> &Metainfo {
        &self.metainfo
    }

    pub fn info_hash(&self) -> InfoHash {
        self.metainfo.info_hash
    }

    /// The counters peer workers update and announces report.
    pub fn stats(&self) -> Arc<TransferStats> {
        Arc::clone(&self.stats)
    }

    /// Sends the initial `started` announce. Succeeds at most once per
    /// session; whether the transfer was already complete is recorded here
    /// so a `completed` event is never sent for it later.
    pub async fn announce_started(&self) -> Result<AnnounceResponse, SessionError> {
        let complete_at_start = {
            let mut state = self.state.lock();
            if state.started || state.starting {
                return Err(SessionError::AlreadyStarted);
            }
            // Latched before the announce so a concurrent caller cannot
            // send a second `started` while this one is in flight.
            state.starting = true;
            self.stats.is_complete()
        };

        let result = self.announce(TrackerEvent::Started).await;

        let mut state = self.state.lock();
        state.starting = false;
        match result {
            Ok(response) => {
                state.started = true;
                state.complete_at_start = complete_at_start;
                Ok(response)
            }
            // A failed start stays retryable.
            Err(err) => Err(err.into()),
        }
    }

    /// Reports a finished transfer. At most one `completed` is ever sent,
    /// and none at all when the transfer was complete at `started` time.
    pub async fn announce_completed(&self) -> Result<(), SessionError> {
        {
            let mut state = self.state.lock();
            if !state.started {
                return Err(SessionError::NotStarted);
            }
            if state.completed_sent || state.complete_at_start {
                return Ok(());
            }
            // One attempt only; a failed completed announce is not retried.
            state.completed_sent = true;
        }

        self.announce(TrackerEvent::Completed).await?;
        Ok(())
    }

    /// A periodic announce with no event, refreshing the peer list.
    pub async fn announce_periodic(&self) -> Result<AnnounceResponse, SessionError> {
        if !self.state.lock().started {
            return Err(SessionError::NotStarted);
        }
        Ok(self.announce(TrackerEvent::None).await?)
    }

    /// Runs the announce loop until [`shutdown`](Self::shutdown) is called:
    /// `started`, then periodic announces at the tracker's interval (clamped
    /// to its minimum), spawning peer workers from each peer list.
    pub async fn run(self: Arc<Self>) -> Result<(), SessionError> {
        let response = self.announce_started().await?;
        self.connect_peers(&response);
        let mut wait = response.reannounce_after();

        loop {
            tokio::select! {
                _ = self.shutdown_signal.notified() => break,
                _ = tokio::time::sleep(wait) => {
                    match self.announce_periodic().await {
                        Ok(next) => {
                            wait = next.reannounce_after();
                            self.connect_peers(&next);
                        }
                        // Recoverable; keep the previous interval and retry
                        // at the next tick.
                        Err(err) => warn!(%err, "periodic announce failed"),
                    }
                }
            }
        }

        self.stop().await;
        Ok(())
    }

    /// Asks the announce loop to wind down.
    pub fn shutdown(&self) {
        self.shutdown_signal.notify_one();
    }

    /// Sends the final `stopped` announce (best effort, bounded retry) and
    /// closes all peer workers. Idempotent; only the first call announces.
    pub async fn stop(&self) {
        let announce_stopped = {
            let mut state = self.state.lock();
            let first = !state.stopped_sent;
            state.stopped_sent = true;
            // Nothing to retract if started never succeeded.
            first && state.started
        };

        if announce_stopped {
            for attempt in 0..=STOPPED_RETRIES {
                match self.announce(TrackerEvent::Stopped).await {
                    Ok(_) => break,
                    Err(err) if attempt < STOPPED_RETRIES => {
                        warn!(%err, attempt, "stopped announce failed, retrying");
                        tokio::time::sleep(STOPPED_RETRY_DELAY).await;
                    }
                    Err(err) => warn!(%err, "giving up on stopped announce"),
                }
            }
        }

        let mut workers = self.workers.lock();
        workers.abort_all();
        debug!("session stopped");
    }

    async fn announce(&self, event: TrackerEvent) -> Result<AnnounceResponse, TrackerError> {
        let snapshot = self.stats.snapshot();
        let request = AnnounceRequest {
            info_hash: self.metainfo.info_hash,
            peer_id: self.peer_id,
            port: self.listen_port,
            uploaded: snapshot.uploaded,
            downloaded: snapshot.downloaded,
            left: snapshot.left,
            corrupt: snapshot.corrupt,
            event,
            compact: true,
        };

        self.tracker.announce(&request).await
    }

    /// Spawns a worker for each previously unseen peer, up to the worker
    /// cap. Workers share nothing with each other; per-peer failures stay
    /// inside the worker.
    pub(super) fn connect_peers(self: &Arc<Self>, response: &AnnounceResponse) {
        let mut known = self.known_peers.lock();
        let mut workers = self.workers.lock();

        // Reap finished workers first; a dead task must not hold a slot.
        while workers.try_join_next().is_some() {}

        for peer in &response.peers {
            if workers.len() >= MAX_PEER_WORKERS {
                break;
            }
            if !known.insert(peer.addr) {
                continue;
            }

            let addr = peer.addr;
            let info_hash = self.metainfo.info_hash;
            let peer_id = self.peer_id;
            workers.spawn(peer_worker(addr, info_hash, peer_id));
        }
    }
}

/// One connection's worth of work: handshake, then drain the framed stream.
///
/// Message dispatch belongs to the piece-exchange layer; this worker's
/// contract ends at producing and draining a validated stream. Failures
/// discard the candidate and nothing else.
async fn peer_worker(addr: SocketAddr, info_hash: InfoHash, our_peer_id: PeerId) {
    let mut conn = match PeerConnection::connect(addr, info_hash, our_peer_id).await {
        Ok(conn) => conn,
        Err(err) => {
            debug!(%addr, %err, "discarding peer candidate");
            return;
        }
    };

    loop {
        match conn.receive().await {
            Ok(message) => trace!(%addr, ?message, "peer message"),
            Err(err) => {
                debug!(%addr, %err, "peer disconnected");
                break;
            }
        }
    }

    conn.close();
}
