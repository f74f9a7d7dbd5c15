//! # Host Abstraction
//!
//! The external peer-to-peer host this crate publishes and receives through.
//!
//! Connection establishment, peer discovery, and routing are the host's
//! business; this crate only asks it to open outbound streams by protocol
//! identifier, to route inbound streams for a protocol identifier to a
//! registered callback, and to enumerate the peers it currently knows about.
//! The node shares the host and never owns its lifecycle: the host must
//! outlive every node bound to it.
//!
//! An in-process implementation backed by duplex pipes lives in
//! [`crate::transport::memory`]; adapters for real hosts (libp2p, iroh, ...)
//! are written by the surrounding application.

use crate::error::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// Opaque identifier for a peer known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Marker trait for the byte streams a host hands out.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

/// A bidirectional byte stream between two peers.
pub type SubStream = Box<dyn AsyncStream>;

impl fmt::Debug for dyn AsyncStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubStream")
    }
}

/// Callback a host invokes once per inbound stream on a registered protocol.
pub type StreamHandler = Arc<dyn Fn(SubStream) -> BoxFuture<'static, ()> + Send + Sync>;

/// Contract the surrounding application's peer-to-peer host must satisfy.
///
/// Implementations are expected to invoke a registered [`StreamHandler`]
/// concurrently, once per inbound stream, potentially many at a time.
pub trait Host: Send + Sync {
    /// Open an outbound stream to `peer` on `protocol`.
    fn open_stream(&self, peer: PeerId, protocol: &str) -> BoxFuture<'_, Result<SubStream>>;

    /// Route inbound streams for `protocol` to `handler`.
    ///
    /// One node registers exactly one handler, under its own protocol
    /// identifier, at construction time.
    fn set_stream_handler(&self, protocol: &str, handler: StreamHandler) -> Result<()>;

    /// Stop routing inbound streams for `protocol`.
    ///
    /// Hosts that cannot unregister may keep the default no-op; closing a
    /// node bound to such a host leaves its dispatcher registered.
    fn remove_stream_handler(&self, _protocol: &str) {}

    /// Peers currently known to the host. Best-effort; the set may change
    /// between calls and may include the local identity.
    fn peers(&self) -> Vec<PeerId>;

    /// The host's own identity.
    fn local_id(&self) -> PeerId;
}
