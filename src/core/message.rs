//! # Message Records
//!
//! The `{topic, data}` record exchanged between peers.
//!
//! Messages encode to a self-describing JSON record with exactly two named
//! fields, `topic` and `data`. The encoding never includes the frame
//! delimiter; appending and stripping it is the frame codec's job.
//!
//! Decoding is pure and side-effect free. A record that round-trips through
//! `to_bytes`/`from_bytes` compares equal to the original, including the
//! empty-payload and empty-topic cases (an empty topic is syntactically legal
//! at this layer; whether a node does anything useful with it is up to the
//! handlers registered on that node).

use crate::error::{Result, SubError};
use serde::{Deserialize, Serialize};

/// A single pub/sub message. Immutable once constructed; one is created per
/// publish call and per successfully decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Topic identifier partitioning messages into independently handled
    /// channels.
    topic: String,

    /// Opaque payload bytes. May be empty; no length limit is imposed at
    /// this layer.
    data: Vec<u8>,
}

impl Message {
    pub fn new(topic: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            data: data.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the message, returning its payload.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Serialize this message to its wire encoding, without the frame
    /// delimiter.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| SubError::Encode(e.to_string()))
    }

    /// Attempt to decode a message from a delimiter-stripped frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| SubError::Decode(e.to_string()))
    }
}
