//! # Target Element Id
//!
//! DOM anchor id generated once per coordinator.

use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every generated anchor id
pub const TARGET_ID_PREFIX: &str = "paytm-checkout-element-";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Id of the element the SDK mounts into when rendering inline
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetId(String);

impl TargetId {
    /// Generate a fresh id from the creation time.
    ///
    /// Two coordinators created within the same millisecond are told apart by
    /// a process-wide sequence number.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}{}-{}", TARGET_ID_PREFIX, millis, seq))
    }

    /// Wrap an existing id (for hosts that manage their own anchors, and tests)
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CSS selector for this element (`#id`)
    pub fn selector(&self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = TargetId::generate();
        let b = TargetId::generate();

        assert_ne!(a, b);
        assert!(a.as_str().starts_with(TARGET_ID_PREFIX));
        assert!(b.as_str().starts_with(TARGET_ID_PREFIX));
    }

    #[test]
    fn test_selector() {
        let id = TargetId::from_raw("anchor-1");
        assert_eq!(id.selector(), "#anchor-1");
        assert_eq!(id.to_string(), "anchor-1");
    }
}
