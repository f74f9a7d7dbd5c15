//! # Pub/Sub Node
//!
//! The central hub for all pub/sub operations on one host.
//!
//! A [`SimpleSub`] is in many ways analogous to the host it wraps: it is
//! created once, bound to a route prefix, and serves subscribe and publish
//! calls for the lifetime of the host. Construction applies all configuration
//! options first, then derives the protocol identifier and registers the
//! receive dispatcher; the caller gets either a fully configured node or an
//! error, never anything in between. No outbound network I/O happens at
//! construction time.

use crate::config::{SubConfig, SubOption};
use crate::core::codec::FrameCodec;
use crate::core::message::Message;
use crate::error::{Result, SubError};
use crate::host::{Host, PeerId, SubStream};
use crate::protocol::dispatcher::{self, HandlerRegistry};
use bytes::Bytes;
use futures::SinkExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::codec::FramedWrite;
use tracing::{debug, instrument};

/// Per-call fan-out diagnostics.
///
/// Per-peer send failures are non-fatal by contract; these counts are the
/// only visibility a caller gets into how the fan-out went. `attempted`
/// counts peers after self-exclusion, so `attempted == delivered + failed`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    /// Peers a send was attempted to.
    pub attempted: usize,
    /// Peers the frame was fully written to.
    pub delivered: usize,
    /// Peers skipped after a stream-open or write failure.
    pub failed: usize,
}

/// The pub/sub hub: one host, one route prefix, one handler registry.
pub struct SimpleSub {
    host: Arc<dyn Host>,
    route_prefix: String,
    protocol_id: String,
    publish_timeout: Duration,
    registry: Arc<HandlerRegistry>,
}

impl fmt::Debug for SimpleSub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleSub")
            .field("route_prefix", &self.route_prefix)
            .field("protocol_id", &self.protocol_id)
            .field("publish_timeout", &self.publish_timeout)
            .field("registry", &self.registry)
            .finish()
    }
}

impl SimpleSub {
    /// Initialize a new node on `host` and register its receive dispatcher.
    ///
    /// Options are applied in order; the first failing option aborts
    /// construction, as does a host that rejects handler registration.
    pub fn new(host: Arc<dyn Host>, options: Vec<SubOption>) -> Result<Self> {
        let mut config = SubConfig::default();
        config.apply(options)?;

        let protocol_id = config.protocol_id();
        let registry = Arc::new(HandlerRegistry::new());

        let dispatch_registry = registry.clone();
        host.set_stream_handler(
            &protocol_id,
            Arc::new(move |stream| {
                Box::pin(dispatcher::handle_inbound(stream, dispatch_registry.clone()))
            }),
        )?;

        Ok(Self {
            host,
            route_prefix: config.route_prefix,
            protocol_id,
            publish_timeout: config.publish_timeout,
            registry,
        })
    }

    /// The node's route prefix (always begins with `/`).
    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    /// The protocol identifier inbound streams are routed by.
    pub fn protocol_id(&self) -> &str {
        &self.protocol_id
    }

    /// Subscribe to a given topic.
    ///
    /// The handler is invoked with the inbound stream and the decoded message
    /// for every frame published to `topic`; it owns the stream from that
    /// point on. Re-subscribing to a topic silently replaces the previous
    /// handler. Topics are not validated; the empty topic is legal.
    pub fn subscribe<F, Fut>(&self, topic: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(SubStream, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.registry.register(
            topic.into(),
            Arc::new(move |stream, message| Box::pin(handler(stream, message))),
        )
    }

    /// Publish to a given topic, to a given subset of peers.
    ///
    /// With an empty `peers` list the message is broadcast to every peer the
    /// host currently knows about. The local identity is always excluded,
    /// wherever it appears. The message is encoded once and the bytes reused
    /// for every target; an encoding failure aborts the call before any
    /// stream is opened.
    ///
    /// Delivery is best-effort: each per-peer stream-open/write attempt is
    /// bounded by the configured publish timeout, and any per-peer failure is
    /// skipped without aborting the fan-out. Callers wanting a bound on the
    /// whole call can wrap it in [`tokio::time::timeout`].
    #[instrument(skip(self, data, peers), fields(topic = %topic, protocol = %self.protocol_id))]
    pub async fn publish(&self, topic: &str, data: &[u8], peers: &[PeerId]) -> Result<PublishReport> {
        let message = Message::new(topic, data);
        let encoded = Bytes::from(message.to_bytes()?);

        let targets: Vec<PeerId> = if peers.is_empty() {
            self.host.peers()
        } else {
            peers.to_vec()
        };
        let local = self.host.local_id();

        let mut report = PublishReport::default();
        for peer in targets {
            if peer == local {
                continue;
            }
            report.attempted += 1;

            match self.send_frame(&peer, encoded.clone()).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    debug!(peer = %peer, error = %e, "skipping peer after failed send");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Unregister this node's dispatcher from the host.
    ///
    /// A node normally lives as long as its host and is never torn down;
    /// this hook exists for scoped shutdown. Streams already handed to the
    /// dispatcher are unaffected.
    pub fn close(&self) {
        self.host.remove_stream_handler(&self.protocol_id);
    }

    /// Open a stream to one peer and write a single frame, each step bounded
    /// by the publish timeout.
    async fn send_frame(&self, peer: &PeerId, record: Bytes) -> Result<()> {
        let open = self.host.open_stream(peer.clone(), &self.protocol_id);
        let stream = time::timeout(self.publish_timeout, open)
            .await
            .map_err(|_| SubError::Timeout)??;

        let mut framed = FramedWrite::new(stream, FrameCodec);
        time::timeout(self.publish_timeout, framed.send(record))
            .await
            .map_err(|_| SubError::Timeout)??;

        Ok(())
    }
}
