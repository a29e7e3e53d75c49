//! Bounded byte relay between the upstream body and the downstream response

use crate::upstream::{ByteStream, UpstreamResult};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Chunks buffered between the upstream read and the downstream write
pub const RELAY_CHANNEL_CAPACITY: usize = 16;

/// Phases a generate request moves through once its body has been read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayPhase {
    Validating,
    AwaitingUpstream,
    Streaming,
    Closed,
}

/// How a generate request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayTermination {
    /// The prompt failed validation; upstream was never contacted
    Rejected,
    /// Upstream answered with a non-success status, mirrored to the caller
    UpstreamStatus(u16),
    /// Upstream could not be reached or timed out before responding
    UpstreamFailed,
    /// The whole upstream body was relayed
    Completed,
    /// The caller went away mid-stream; the upstream read was dropped
    ClientDisconnected,
    /// The upstream body failed after streaming had started
    UpstreamInterrupted(String),
}

impl RelayTermination {
    /// Phase the request was in when it ended
    pub fn phase(&self) -> RelayPhase {
        match self {
            RelayTermination::Rejected => RelayPhase::Validating,
            RelayTermination::UpstreamStatus(_) | RelayTermination::UpstreamFailed => {
                RelayPhase::AwaitingUpstream
            }
            RelayTermination::ClientDisconnected | RelayTermination::UpstreamInterrupted(_) => {
                RelayPhase::Streaming
            }
            RelayTermination::Completed => RelayPhase::Closed,
        }
    }
}

/// Copy `upstream` into `tx` until either side is done
///
/// Waits for channel capacity before reading further, so a slow caller stalls
/// the upstream read instead of growing a buffer. Returns as soon as the
/// receiving side is dropped, which drops `upstream` and its connection.
pub async fn pump(
    mut upstream: ByteStream,
    tx: mpsc::Sender<UpstreamResult<Bytes>>,
) -> RelayTermination {
    loop {
        let next = tokio::select! {
            _ = tx.closed() => return RelayTermination::ClientDisconnected,
            next = upstream.next() => next,
        };

        match next {
            None => return RelayTermination::Completed,
            Some(Ok(chunk)) => {
                if tx.send(Ok(chunk)).await.is_err() {
                    return RelayTermination::ClientDisconnected;
                }
            }
            Some(Err(err)) => {
                let message = err.to_string();
                // Forward the failure so the response is aborted, not completed
                let _ = tx.send(Err(err)).await;
                return RelayTermination::UpstreamInterrupted(message);
            }
        }
    }
}

/// Start relaying `upstream` and return the downstream body
pub fn relay_body(
    upstream: ByteStream,
    request_id: Uuid,
    capacity: usize,
) -> impl Stream<Item = UpstreamResult<Bytes>> {
    let (tx, mut rx) = mpsc::channel(capacity.max(1));

    tokio::spawn(async move {
        let termination = pump(upstream, tx).await;
        log_termination(request_id, &termination);
    });

    async_stream::stream! {
        while let Some(item) = rx.recv().await {
            yield item;
        }
    }
}

/// Record how a request ended; only failures are logged above debug level
pub fn log_termination(request_id: Uuid, termination: &RelayTermination) {
    let phase = termination.phase();
    match termination {
        RelayTermination::Completed => {
            debug!(%request_id, ?phase, "Relay completed");
        }
        RelayTermination::Rejected => {
            warn!(%request_id, ?phase, "Rejected generate request: missing prompt");
        }
        RelayTermination::UpstreamStatus(status) => {
            warn!(%request_id, ?phase, status, "Mirroring upstream error status");
        }
        RelayTermination::UpstreamFailed => {
            error!(%request_id, ?phase, "Upstream request failed");
        }
        RelayTermination::ClientDisconnected => {
            warn!(%request_id, ?phase, "Client disconnected, upstream read released");
        }
        RelayTermination::UpstreamInterrupted(message) => {
            error!(%request_id, ?phase, error = %message, "Upstream stream interrupted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamError;
    use futures::stream;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn chunks(parts: &[&'static str]) -> ByteStream {
        let items: Vec<UpstreamResult<Bytes>> = parts
            .iter()
            .map(|part| Ok(Bytes::from_static(part.as_bytes())))
            .collect();
        Box::pin(stream::iter(items))
    }

    /// Marks a flag when dropped, to observe the upstream being released
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_relays_bytes_in_order() {
        let parts = [
            "data: {\"choices\":[",
            "{\"delta\":{\"content\":\"Hi\"}}]}\n",
            "data: [DONE]\n",
        ];
        let body: Vec<Bytes> = relay_body(chunks(&parts), Uuid::new_v4(), 2)
            .map(|item| item.unwrap())
            .collect()
            .await;

        let joined: Vec<u8> = body.iter().flat_map(|b| b.iter().copied()).collect();
        assert_eq!(joined, parts.concat().into_bytes());
    }

    #[tokio::test]
    async fn test_pump_completes() {
        let (tx, mut rx) = mpsc::channel(4);
        let termination = pump(chunks(&["a", "b"]), tx).await;
        assert_eq!(termination, RelayTermination::Completed);
        assert_eq!(rx.recv().await.unwrap().unwrap(), Bytes::from_static(b"a"));
        assert_eq!(rx.recv().await.unwrap().unwrap(), Bytes::from_static(b"b"));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pump_forwards_upstream_error() {
        let items: Vec<UpstreamResult<Bytes>> = vec![
            Ok(Bytes::from_static(b"data: x\n")),
            Err(UpstreamError::Body("connection reset".to_string())),
        ];
        let (tx, mut rx) = mpsc::channel(4);
        let termination = pump(Box::pin(stream::iter(items)), tx).await;

        assert!(matches!(termination, RelayTermination::UpstreamInterrupted(_)));
        assert_eq!(termination.phase(), RelayPhase::Streaming);
        assert!(rx.recv().await.unwrap().is_ok());
        assert!(matches!(rx.recv().await, Some(Err(UpstreamError::Body(_)))));
    }

    #[tokio::test]
    async fn test_client_disconnect_releases_upstream() {
        let released = Arc::new(AtomicBool::new(false));
        let guard = DropFlag(released.clone());

        // one chunk, then an upstream that never produces again
        let upstream: ByteStream = Box::pin(
            stream::iter(vec![Ok::<_, UpstreamError>(Bytes::from_static(
                b"data: first\n",
            ))])
            .chain(stream::pending())
            .map(move |item| {
                let _held = &guard;
                item
            }),
        );

        let (tx, mut rx) = mpsc::channel(1);
        let task = tokio::spawn(pump(upstream, tx));

        assert!(rx.recv().await.unwrap().is_ok());
        drop(rx);

        let termination = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("pump should notice the closed channel")
            .unwrap();
        assert_eq!(termination, RelayTermination::ClientDisconnected);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_termination_phases() {
        assert_eq!(RelayTermination::Rejected.phase(), RelayPhase::Validating);
        assert_eq!(
            RelayTermination::UpstreamStatus(503).phase(),
            RelayPhase::AwaitingUpstream
        );
        assert_eq!(
            RelayTermination::UpstreamFailed.phase(),
            RelayPhase::AwaitingUpstream
        );
        assert_eq!(
            RelayTermination::ClientDisconnected.phase(),
            RelayPhase::Streaming
        );
        assert_eq!(RelayTermination::Completed.phase(), RelayPhase::Closed);
    }
}
