//! # Receive Dispatcher
//!
//! Handler registry and the per-stream inbound dispatch path.
//!
//! The host invokes [`handle_inbound`] once per inbound stream on the node's
//! protocol identifier, concurrently across streams and concurrently with any
//! in-flight publish. The registry is therefore behind a read-write lock;
//! handler references are cloned out so no lock is ever held across an await.
//!
//! Every failure on this path (truncated frame, undecodable record, unknown
//! topic) ends in a silent drop. Dispatch is host-driven: there is no caller
//! to report to, and a misbehaving peer must not be able to break the
//! dispatcher for everyone else.

use crate::core::codec::FrameCodec;
use crate::core::message::Message;
use crate::error::{Result, SubError};
use crate::host::SubStream;
use futures::future::BoxFuture;
use futures::StreamExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tokio_util::codec::FramedRead;
use tracing::{debug, trace};

type TopicHandlerFn = dyn Fn(SubStream, Message) -> BoxFuture<'static, ()> + Send + Sync;

/// A registered topic callback.
pub type TopicHandler = Arc<TopicHandlerFn>;

/// Thread-safe topic -> handler mapping.
///
/// Keys are unique; registering a handler for an existing topic silently
/// replaces the previous one. Having no handler for a topic is a valid,
/// expected state, not an error.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, TopicHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.handlers.read().map(|h| h.len()).unwrap_or(0);
        f.debug_struct("HandlerRegistry").field("topics", &topics).finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`, replacing any previous handler.
    pub fn register(&self, topic: String, handler: TopicHandler) -> Result<()> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| SubError::Internal("handler registry lock poisoned".to_string()))?;

        handlers.insert(topic, handler);
        Ok(())
    }

    /// Look up the handler for `topic`, if any.
    pub fn get(&self, topic: &str) -> Result<Option<TopicHandler>> {
        let handlers = self
            .handlers
            .read()
            .map_err(|_| SubError::Internal("handler registry lock poisoned".to_string()))?;

        Ok(handlers.get(topic).cloned())
    }
}

/// Handle one inbound stream: read a single frame, decode it, and invoke the
/// registered topic handler with the stream and the decoded message.
///
/// The dispatcher never closes the stream; once a handler is invoked, stream
/// lifetime is the handler's responsibility. Bytes the frame reader consumed
/// past the first delimiter are discarded with the reader (one frame per
/// stream by design).
pub(crate) async fn handle_inbound(stream: SubStream, registry: Arc<HandlerRegistry>) {
    let mut frames = FramedRead::new(stream, FrameCodec);

    let frame = match frames.next().await {
        Some(Ok(frame)) => frame,
        Some(Err(e)) => {
            trace!(error = %e, "dropping inbound stream: unreadable frame");
            return;
        }
        None => {
            trace!("dropping inbound stream: closed before a frame arrived");
            return;
        }
    };

    let message = match Message::from_bytes(&frame) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "dropping inbound frame: undecodable record");
            return;
        }
    };

    let handler = match registry.get(message.topic()) {
        Ok(Some(handler)) => handler,
        Ok(None) => {
            trace!(topic = message.topic(), "dropping inbound frame: no handler registered");
            return;
        }
        Err(e) => {
            debug!(error = %e, "dropping inbound frame: registry unavailable");
            return;
        }
    };

    let stream = frames.into_inner();
    handler(stream, message).await;
}
