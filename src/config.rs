//! # Configuration Management
//!
//! Construction-time configuration for a pub/sub node.
//!
//! Configuration is expressed as a plain [`SubConfig`] struct populated by a
//! sequence of named, pure mutator options ([`SubOption`]). Options are
//! applied in the order supplied; the first option that fails aborts node
//! construction with its error, and no partially configured node is ever
//! exposed to the caller.
//!
//! All options are applied before the protocol identifier is derived and the
//! receive dispatcher is registered, so a route prefix set here is the one
//! the node listens on.

use crate::error::{Result, SubError};
use std::time::Duration;
use tracing::debug;

/// Default route prefix when none is configured.
pub const DEFAULT_ROUTE_PREFIX: &str = "/simple-sub";

/// Suffix appended to the route prefix to form the protocol identifier.
pub const PROTOCOL_SUFFIX: &str = "/sub";

/// Byte terminating every frame on the wire.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Upper bound on a single decoded frame (guards against memory exhaustion
/// from a peer that never sends a delimiter).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Default bound on each per-peer stream-open and write attempt during a
/// publish fan-out.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Node configuration assembled by applying [`SubOption`]s in order.
#[derive(Debug, Clone)]
pub struct SubConfig {
    /// Route prefix for this node's protocol namespace. Always begins with
    /// `/` after normalization.
    pub route_prefix: String,

    /// Bound on each individual stream-open/write attempt during a publish.
    pub publish_timeout: Duration,
}

impl Default for SubConfig {
    fn default() -> Self {
        Self {
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }
}

impl SubConfig {
    /// Apply a sequence of options, stopping at the first failure.
    pub fn apply(&mut self, options: Vec<SubOption>) -> Result<()> {
        for option in options {
            let name = option.name;
            if let Err(e) = (option.apply)(self) {
                debug!(option = name, error = %e, "configuration option failed");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Derive the protocol identifier the host uses to route inbound streams
    /// to this node's dispatcher.
    pub fn protocol_id(&self) -> String {
        format!("{}{}", self.route_prefix, PROTOCOL_SUFFIX)
    }
}

/// A named, pure configuration mutator.
///
/// Options carry their name for diagnostics; failures reported by an option
/// abort node construction.
pub struct SubOption {
    name: &'static str,
    apply: Box<dyn FnOnce(&mut SubConfig) -> Result<()> + Send>,
}

impl std::fmt::Debug for SubOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubOption").field("name", &self.name).finish()
    }
}

/// Override the node's route prefix.
///
/// The stored prefix always begins with a path separator: `"net1"` becomes
/// `/net1`, while `"/net1"` is kept unchanged. Useful to differentiate
/// between nodes in a network, or to partition such networks.
pub fn with_route_prefix(prefix: impl Into<String>) -> SubOption {
    let prefix = prefix.into();
    SubOption {
        name: "with_route_prefix",
        apply: Box::new(move |config| {
            config.route_prefix = normalize_route_prefix(&prefix);
            Ok(())
        }),
    }
}

/// Override the per-peer attempt timeout used during publish fan-out.
///
/// A zero duration is rejected: it would make every send attempt fail
/// immediately.
pub fn with_publish_timeout(timeout: Duration) -> SubOption {
    SubOption {
        name: "with_publish_timeout",
        apply: Box::new(move |config| {
            if timeout.is_zero() {
                return Err(SubError::Config(
                    "publish timeout must be non-zero".to_string(),
                ));
            }
            config.publish_timeout = timeout;
            Ok(())
        }),
    }
}

/// Normalize a route prefix so it always begins with `/`.
fn normalize_route_prefix(prefix: &str) -> String {
    if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn prefix_without_separator_gets_one_prepended() {
        let mut config = SubConfig::default();
        config
            .apply(vec![with_route_prefix("net1")])
            .unwrap();
        assert_eq!(config.route_prefix, "/net1");
        assert_eq!(config.protocol_id(), "/net1/sub");
    }

    #[test]
    fn prefix_with_separator_is_unchanged() {
        let mut config = SubConfig::default();
        config
            .apply(vec![with_route_prefix("/net1")])
            .unwrap();
        assert_eq!(config.route_prefix, "/net1");
        assert_eq!(config.protocol_id(), "/net1/sub");
    }

    #[test]
    fn interior_separator_still_gains_leading_one() {
        let mut config = SubConfig::default();
        config.apply(vec![with_route_prefix("a/b")]).unwrap();
        assert_eq!(config.route_prefix, "/a/b");
    }

    #[test]
    fn default_prefix_satisfies_invariant() {
        let config = SubConfig::default();
        assert!(config.route_prefix.starts_with('/'));
        assert_eq!(config.protocol_id(), "/simple-sub/sub");
    }

    #[test]
    fn options_apply_in_order_last_wins() {
        let mut config = SubConfig::default();
        config
            .apply(vec![with_route_prefix("first"), with_route_prefix("second")])
            .unwrap();
        assert_eq!(config.route_prefix, "/second");
    }

    #[test]
    fn zero_publish_timeout_is_rejected() {
        let mut config = SubConfig::default();
        let err = config
            .apply(vec![with_publish_timeout(Duration::ZERO)])
            .unwrap_err();
        assert!(matches!(err, SubError::Config(_)));
    }

    #[test]
    fn failed_option_stops_later_options() {
        let mut config = SubConfig::default();
        let result = config.apply(vec![
            with_publish_timeout(Duration::ZERO),
            with_route_prefix("never-applied"),
        ]);
        assert!(result.is_err());
        assert_eq!(config.route_prefix, DEFAULT_ROUTE_PREFIX);
    }
}
