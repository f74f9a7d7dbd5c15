//! # Error Types
//!
//! Error handling for the pub/sub core.
//!
//! This module defines all error variants that can occur during pub/sub
//! operations, from construction-time configuration failures to per-peer
//! transport failures during a publish fan-out.
//!
//! ## Propagation Policy
//! - **Construction errors** ([`SubError::Config`], [`SubError::Registration`])
//!   propagate synchronously to the caller; the node is never half-built.
//! - **Encode errors** abort a `publish` before any stream is opened.
//! - **Per-peer transport errors** during a publish are absorbed: the fan-out
//!   skips the peer and continues (counts surface in the publish report).
//! - **Receive-path errors** (truncated frames, undecodable records, unknown
//!   topics) are absorbed silently: there is no receiver-side caller to
//!   surface them to, since dispatch is host-driven.
//!
//! No failure in this crate is fatal to the process.

use std::io;
use thiserror::Error;

/// Primary error type for all pub/sub operations.
#[derive(Error, Debug)]
pub enum SubError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stream handler registration failed: {0}")]
    Registration(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Type alias for Results using SubError
pub type Result<T> = std::result::Result<T, SubError>;
