//! # Transports
//!
//! Concrete [`Host`](crate::host::Host) implementations.
//!
//! Only the in-process memory transport ships with this crate; it backs the
//! test suite and local development. Hosts speaking real networks (libp2p,
//! iroh, raw TCP) are adapters owned by the surrounding application.

pub mod memory;
