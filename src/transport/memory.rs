//! # In-Memory Transport
//!
//! An in-process [`Host`] backed by duplex pipes.
//!
//! A [`MemNetwork`] is a hub of named peers. Opening a stream to a peer looks
//! up the stream handler that peer registered for the protocol identifier,
//! wires both ends of a [`tokio::io::duplex`] pipe together, and runs the
//! remote handler on its own task, mirroring how a real host delivers inbound
//! streams concurrently.

use crate::error::{Result, SubError};
use crate::host::{Host, PeerId, StreamHandler, SubStream};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Buffer capacity of each in-memory stream.
const STREAM_CAPACITY: usize = 64 * 1024;

type HandlerTable = HashMap<PeerId, HashMap<String, StreamHandler>>;

/// An in-process network of named peers.
pub struct MemNetwork {
    peers: Mutex<HandlerTable>,
}

impl fmt::Debug for MemNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peers = self.peers.lock().map(|p| p.len()).unwrap_or(0);
        f.debug_struct("MemNetwork").field("peers", &peers).finish()
    }
}

impl MemNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            peers: Mutex::new(HashMap::new()),
        })
    }

    /// Join the network under `id`, returning the peer's host handle.
    ///
    /// Joining twice under the same id replaces nothing until the new host
    /// registers its own stream handlers.
    pub fn host(self: &Arc<Self>, id: impl Into<PeerId>) -> Arc<MemHost> {
        let id = id.into();
        if let Ok(mut peers) = self.peers.lock() {
            peers.entry(id.clone()).or_default();
        }

        Arc::new(MemHost {
            network: self.clone(),
            id,
        })
    }

    fn handler_for(&self, peer: &PeerId, protocol: &str) -> Result<StreamHandler> {
        let peers = self
            .peers
            .lock()
            .map_err(|_| SubError::Internal("memory network lock poisoned".to_string()))?;

        let protocols = peers
            .get(peer)
            .ok_or_else(|| SubError::Transport(format!("unknown peer: {peer}")))?;

        protocols
            .get(protocol)
            .cloned()
            .ok_or_else(|| SubError::Transport(format!("{peer} has no handler for {protocol}")))
    }
}

/// One peer's handle onto a [`MemNetwork`].
pub struct MemHost {
    network: Arc<MemNetwork>,
    id: PeerId,
}

impl fmt::Debug for MemHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemHost").field("id", &self.id).finish()
    }
}

impl Host for MemHost {
    fn open_stream(&self, peer: PeerId, protocol: &str) -> BoxFuture<'_, Result<SubStream>> {
        let protocol = protocol.to_string();
        Box::pin(async move {
            let handler = self.network.handler_for(&peer, &protocol)?;

            let (outbound, inbound) = tokio::io::duplex(STREAM_CAPACITY);
            debug!(from = %self.id, to = %peer, protocol = %protocol, "opening in-memory stream");

            // The remote side runs concurrently, like a real inbound stream.
            tokio::spawn(handler(Box::new(inbound) as SubStream));

            Ok(Box::new(outbound) as SubStream)
        })
    }

    fn set_stream_handler(&self, protocol: &str, handler: StreamHandler) -> Result<()> {
        let mut peers = self
            .network
            .peers
            .lock()
            .map_err(|_| SubError::Registration("memory network lock poisoned".to_string()))?;

        peers
            .entry(self.id.clone())
            .or_default()
            .insert(protocol.to_string(), handler);
        Ok(())
    }

    fn remove_stream_handler(&self, protocol: &str) {
        if let Ok(mut peers) = self.network.peers.lock() {
            if let Some(protocols) = peers.get_mut(&self.id) {
                protocols.remove(protocol);
            }
        }
    }

    fn peers(&self) -> Vec<PeerId> {
        self.network
            .peers
            .lock()
            .map(|peers| peers.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn local_id(&self) -> PeerId {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn open_stream_to_unknown_peer_fails() {
        let network = MemNetwork::new();
        let host = network.host("peer-a");

        let err = host
            .open_stream(PeerId::from("ghost"), "/x/sub")
            .await
            .unwrap_err();
        assert!(matches!(err, SubError::Transport(_)));
    }

    #[tokio::test]
    async fn open_stream_without_registered_protocol_fails() {
        let network = MemNetwork::new();
        let host_a = network.host("peer-a");
        let _host_b = network.host("peer-b");

        let err = host_a
            .open_stream(PeerId::from("peer-b"), "/x/sub")
            .await
            .unwrap_err();
        assert!(matches!(err, SubError::Transport(_)));
    }

    #[tokio::test]
    async fn handler_runs_once_per_opened_stream() {
        let network = MemNetwork::new();
        let host_a = network.host("peer-a");
        let host_b = network.host("peer-b");

        let streams = Arc::new(AtomicUsize::new(0));
        let counter = streams.clone();
        host_b
            .set_stream_handler(
                "/x/sub",
                Arc::new(move |_stream| {
                    let counter = counter.clone();
                    Box::pin(async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                }),
            )
            .unwrap();

        for _ in 0..3 {
            let _stream = host_a
                .open_stream(PeerId::from("peer-b"), "/x/sub")
                .await
                .unwrap();
        }

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(streams.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn bytes_written_reach_the_remote_handler() {
        let network = MemNetwork::new();
        let host_a = network.host("peer-a");
        let host_b = network.host("peer-b");

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        host_b
            .set_stream_handler(
                "/x/sub",
                Arc::new(move |mut stream| {
                    let tx = tx.clone();
                    Box::pin(async move {
                        let mut buf = Vec::new();
                        let _ = stream.read_to_end(&mut buf).await;
                        let _ = tx.send(buf);
                    })
                }),
            )
            .unwrap();

        let mut stream = host_a
            .open_stream(PeerId::from("peer-b"), "/x/sub")
            .await
            .unwrap();
        stream.write_all(b"over the wire").await.unwrap();
        drop(stream);

        assert_eq!(rx.recv().await.unwrap(), b"over the wire");
    }

    #[tokio::test]
    async fn peers_lists_everyone_who_joined() {
        let network = MemNetwork::new();
        let host_a = network.host("peer-a");
        let _host_b = network.host("peer-b");
        let _host_c = network.host("peer-c");

        let mut peers = host_a.peers();
        peers.sort();
        assert_eq!(
            peers,
            vec![
                PeerId::from("peer-a"),
                PeerId::from("peer-b"),
                PeerId::from("peer-c")
            ]
        );
        assert_eq!(host_a.local_id(), PeerId::from("peer-a"));
    }

    #[tokio::test]
    async fn removed_handler_stops_accepting_streams() {
        let network = MemNetwork::new();
        let host_a = network.host("peer-a");
        let host_b = network.host("peer-b");

        host_b
            .set_stream_handler("/x/sub", Arc::new(|_stream| Box::pin(async {})))
            .unwrap();
        host_b.remove_stream_handler("/x/sub");

        let err = host_a
            .open_stream(PeerId::from("peer-b"), "/x/sub")
            .await
            .unwrap_err();
        assert!(matches!(err, SubError::Transport(_)));
    }
}
