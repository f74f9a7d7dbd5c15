//! # simple-sub
//!
//! Lightweight topic-based pub/sub messaging core for routed peer-to-peer hosts.
//!
//! In contrast with full-featured gossip pub/sub stacks, `simple-sub` stays
//! agnostic to how peers are discovered and routed: the surrounding
//! application supplies a [`Host`](host::Host) implementation (connection
//! establishment, stream-handler registration, peer enumeration) and may back
//! it with whatever routing solution it prefers (e.g. a Kademlia DHT). This
//! crate only owns the message framing and dispatch protocol in between.
//!
//! ## Components
//! - **Message + codec**: self-describing `{topic, data}` records, newline
//!   frame delimiting over byte streams
//! - **Node**: the pub/sub hub bound to one host, one route prefix, and one
//!   topic handler registry
//! - **Publisher**: best-effort fan-out to explicit targets or the whole
//!   known peer set
//! - **Receive dispatcher**: per-stream frame read, decode, and handler
//!   invocation
//!
//! ## Delivery semantics
//! Fire-and-forget. There is no durability, no acknowledgment, no ordering
//! across publishes, no backpressure, and no retry; a peer that cannot be
//! reached during a publish is skipped. Callers needing stronger guarantees
//! should layer them on top.
//!
//! ## Example
//! ```no_run
//! use simple_sub::{config::with_route_prefix, transport::memory::MemNetwork, SimpleSub};
//!
//! # async fn example() -> simple_sub::error::Result<()> {
//! let network = MemNetwork::new();
//! let host_a = network.host("peer-a");
//! let host_b = network.host("peer-b");
//!
//! let sub_a = SimpleSub::new(host_a, vec![with_route_prefix("chat")])?;
//! let sub_b = SimpleSub::new(host_b, vec![with_route_prefix("chat")])?;
//!
//! sub_a.subscribe("greet", |_stream, message| async move {
//!     println!("received: {:?}", message.data());
//! })?;
//!
//! sub_b.publish("greet", b"hello", &[]).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_debug_implementations)]
#![warn(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod protocol;
pub mod transport;

// Re-export the main surface for convenience
pub use config::{with_publish_timeout, with_route_prefix, SubConfig, SubOption};
pub use core::message::Message;
pub use error::{Result, SubError};
pub use host::{Host, PeerId, SubStream};
pub use protocol::sub::{PublishReport, SimpleSub};
