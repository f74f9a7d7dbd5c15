//! # Pub/Sub Protocol
//!
//! The node, its topic handler registry, and the receive dispatcher.
//!
//! ## Components
//! - **SimpleSub**: the hub bound to one host and one route prefix; owns
//!   subscribe and publish
//! - **Dispatcher**: per-inbound-stream frame read, decode, and handler
//!   lookup/invocation

pub mod dispatcher;
pub mod sub;
