//! # Core Protocol Components
//!
//! Message records, encoding/decoding, and wire framing.
//!
//! This module provides the foundation for the pub/sub protocol: the
//! `{topic, data}` message record, its self-describing byte encoding, and the
//! delimiter-based frame codec used over byte streams.
//!
//! ## Wire Format
//! ```text
//! [Encoded record (named fields: topic, data)] [Delimiter(1) = b'\n']
//! ```
//!
//! No length prefix, no checksum, no version tag. The record encoding and the
//! frame delimiting are deliberately separate concerns: [`message`] never
//! emits the delimiter, [`codec`] owns it.
//!
//! ## Security
//! - Maximum frame size: 16MB (prevents memory exhaustion from a peer that
//!   withholds the delimiter)

pub mod codec;
pub mod message;
