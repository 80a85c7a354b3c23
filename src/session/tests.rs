use super::*;
use crate::bencode::{encode, Value};
use crate::metainfo::Metainfo;
use crate::peer::PeerId;
use crate::tracker::{AnnounceResponse, Peer};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A minimal HTTP tracker stub: answers every GET with the given bencoded
/// body and records the request targets it saw.
async fn tracker_stub(body: Vec<u8>) -> (SocketAddr, Arc<parking_lot::Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };

            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => raw.extend_from_slice(&buf[..n]),
                }
            }

            if let Some(line) = raw.split(|&b| b == b'\r').next() {
                seen.lock().push(String::from_utf8_lossy(line).into_owned());
            }

            let head = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
        }
    });

    (addr, requests)
}

fn empty_peers_body(interval: i64) -> Vec<u8> {
    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"interval"), Value::Integer(interval));
    dict.insert(Bytes::from_static(b"peers"), Value::Bytes(Bytes::new()));
    encode(&Value::Dict(dict))
}

fn metainfo_with_tracker(announce: &str, length: i64) -> Metainfo {
    let mut info = BTreeMap::new();
    info.insert(Bytes::from_static(b"length"), Value::Integer(length));
    info.insert(Bytes::from_static(b"name"), Value::string("payload"));
    info.insert(Bytes::from_static(b"piece length"), Value::Integer(16384));
    let piece_hashes = if length > 0 { vec![0u8; 20] } else { Vec::new() };
    info.insert(
        Bytes::from_static(b"pieces"),
        Value::Bytes(Bytes::from(piece_hashes)),
    );

    let mut top = BTreeMap::new();
    top.insert(Bytes::from_static(b"announce"), Value::string(announce));
    top.insert(Bytes::from_static(b"info"), Value::Dict(info));

    Metainfo::from_bytes(&encode(&Value::Dict(top))).unwrap()
}

fn count_event(requests: &parking_lot::Mutex<Vec<String>>, event: &str) -> usize {
    let needle = format!("event={}", event);
    requests.lock().iter().filter(|r| r.contains(&needle)).count()
}

#[tokio::test]
async fn test_session_requires_http_tracker() {
    let metainfo = metainfo_with_tracker("udp://tracker.example:80", 1);
    assert!(matches!(
        Session::new(metainfo, PeerId::generate(), 6881),
        Err(SessionError::NoTracker)
    ));
}

#[tokio::test]
async fn test_started_announce_happens_once() {
    let (addr, requests) = tracker_stub(empty_peers_body(1800)).await;
    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 100);
    let session = Session::new(metainfo, PeerId::generate(), 6881).unwrap();

    let response = session.announce_started().await.unwrap();
    assert_eq!(response.interval, 1800);
    assert!(response.peers.is_empty());
    assert_eq!(count_event(&requests, "started"), 1);

    assert!(matches!(
        session.announce_started().await,
        Err(SessionError::AlreadyStarted)
    ));
    assert_eq!(count_event(&requests, "started"), 1);
}

#[tokio::test]
async fn test_lifecycle_announces_require_start() {
    let (addr, _) = tracker_stub(empty_peers_body(60)).await;
    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 100);
    let session = Session::new(metainfo, PeerId::generate(), 6881).unwrap();

    assert!(matches!(
        session.announce_completed().await,
        Err(SessionError::NotStarted)
    ));
    assert!(matches!(
        session.announce_periodic().await,
        Err(SessionError::NotStarted)
    ));
}

#[tokio::test]
async fn test_completed_sent_at_most_once() {
    let (addr, requests) = tracker_stub(empty_peers_body(60)).await;
    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 100);
    let session = Session::new(metainfo, PeerId::generate(), 6881).unwrap();

    session.announce_started().await.unwrap();
    session.stats().add_downloaded(100);

    session.announce_completed().await.unwrap();
    session.announce_completed().await.unwrap();
    assert_eq!(count_event(&requests, "completed"), 1);
}

#[tokio::test]
async fn test_completed_suppressed_when_complete_at_start() {
    let (addr, requests) = tracker_stub(empty_peers_body(60)).await;
    // Zero-length transfer: nothing left at started time.
    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 0);
    let session = Session::new(metainfo, PeerId::generate(), 6881).unwrap();

    session.announce_started().await.unwrap();
    session.announce_completed().await.unwrap();

    assert_eq!(count_event(&requests, "completed"), 0);
}

#[tokio::test]
async fn test_stop_sends_single_stopped_announce() {
    let (addr, requests) = tracker_stub(empty_peers_body(60)).await;
    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 100);
    let session = Session::new(metainfo, PeerId::generate(), 6881).unwrap();

    session.announce_started().await.unwrap();
    session.stop().await;
    session.stop().await;

    assert_eq!(count_event(&requests, "stopped"), 1);
}

#[tokio::test]
async fn test_announce_reports_current_stats() {
    let (addr, requests) = tracker_stub(empty_peers_body(60)).await;
    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 100);
    let session = Session::new(metainfo, PeerId::generate(), 6881).unwrap();

    session.stats().add_downloaded(40);
    session.stats().add_uploaded(7);
    session.announce_started().await.unwrap();

    let line = requests.lock().last().unwrap().clone();
    assert!(line.contains("downloaded=40"));
    assert!(line.contains("uploaded=7"));
    assert!(line.contains("left=60"));
    assert!(line.contains("corrupt=0"));
}

fn peer_list(peers: Vec<Peer>) -> AnnounceResponse {
    AnnounceResponse {
        interval: 60,
        min_interval: None,
        complete: None,
        incomplete: None,
        peers,
    }
}

#[tokio::test]
async fn test_concurrent_started_announces_send_one_event() {
    let (addr, requests) = tracker_stub(empty_peers_body(60)).await;
    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 100);
    let session = Session::new(metainfo, PeerId::generate(), 6881).unwrap();

    let (first, second) = tokio::join!(session.announce_started(), session.announce_started());

    let successes = first.is_ok() as usize + second.is_ok() as usize;
    assert_eq!(successes, 1);
    assert_eq!(count_event(&requests, "started"), 1);
}

#[tokio::test]
async fn test_failed_start_stays_retryable() {
    // Bind and drop to get a port with no tracker behind it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 100);
    let session = Session::new(metainfo, PeerId::generate(), 6881).unwrap();

    assert!(matches!(
        session.announce_started().await,
        Err(SessionError::Tracker(_))
    ));
    // The failure latches nothing; the retry reaches the tracker again.
    assert!(matches!(
        session.announce_started().await,
        Err(SessionError::Tracker(_))
    ));
}

#[tokio::test]
async fn test_worker_slots_recycle_after_peer_failures() {
    let (addr, _) = tracker_stub(empty_peers_body(60)).await;
    let metainfo = metainfo_with_tracker(&format!("http://{}/announce", addr), 100);
    let session = Arc::new(Session::new(metainfo, PeerId::generate(), 6881).unwrap());

    // Enough refused peers to fill every worker slot.
    let mut dead = Vec::new();
    for _ in 0..30 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        dead.push(Peer {
            addr: listener.local_addr().unwrap(),
            peer_id: None,
        });
    }
    session.connect_peers(&peer_list(dead));

    // Loopback refusals fail fast; give every worker time to finish.
    tokio::time::sleep(Duration::from_secs(1)).await;

    let fresh = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let fresh_addr = fresh.local_addr().unwrap();
    session.connect_peers(&peer_list(vec![Peer {
        addr: fresh_addr,
        peer_id: None,
    }]));

    // The fresh peer only gets dialed if the dead workers freed their slots.
    let accepted = tokio::time::timeout(Duration::from_secs(5), fresh.accept()).await;
    assert!(accepted.is_ok(), "no worker dialed the fresh peer");
}

#[test]
fn test_transfer_stats_accounting() {
    let stats = TransferStats::new(100);
    assert!(!stats.is_complete());

    stats.add_downloaded(60);
    stats.add_uploaded(10);
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.downloaded, 60);
    assert_eq!(snapshot.uploaded, 10);
    assert_eq!(snapshot.left, 40);

    // Corrupt bytes go back into the remaining count.
    stats.record_corrupt(20);
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.corrupt, 20);
    assert_eq!(snapshot.left, 60);

    stats.add_downloaded(60);
    assert!(stats.is_complete());

    // Over-reporting never underflows.
    stats.add_downloaded(5);
    assert_eq!(stats.snapshot().left, 0);
}
