//! # Checkout Surface
//!
//! Leaf consumer that opens the payment page. It must be nested under a
//! provider (it is built from that provider's subscription) and renders only
//! the anchor element the SDK mounts into when not in popup mode.

use crate::channel::ContextSubscriber;
use crate::error::CheckoutError;
use crate::handle::SdkHandle;
use crate::target::TargetId;
use std::fmt;
use tracing::debug;

/// The single empty element rendered by the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub id: TargetId,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<div id=\"{}\"></div>", self.id)
    }
}

/// Invokes the published handle once per distinct handle generation
pub struct CheckoutSurface {
    subscriber: ContextSubscriber,
    element_id: TargetId,
    last_seen: Option<u64>,
}

impl CheckoutSurface {
    pub fn new(subscriber: ContextSubscriber) -> Self {
        let element_id = subscriber.target_id();
        Self {
            subscriber,
            element_id,
            last_seen: None,
        }
    }

    pub fn anchor(&self) -> Anchor {
        Anchor {
            id: self.element_id.clone(),
        }
    }

    /// Invoke the current handle, if there is one, and return the anchor.
    ///
    /// In inline mode the SDK looks the anchor up when invoked. Hosts that
    /// attach elements themselves call [`CheckoutSurface::anchor`] first and
    /// then [`CheckoutSurface::sync`].
    pub fn mount(&mut self) -> Anchor {
        self.sync();
        self.anchor()
    }

    /// Invoke if the published handle differs from the last one observed.
    /// Returns whether an invoke was attempted.
    pub fn sync(&mut self) -> bool {
        let ctx = self.subscriber.current_and_mark_seen();
        match ctx.handle {
            Some(handle) if self.last_seen != Some(handle.generation()) => {
                self.invoke(&handle);
                true
            }
            _ => false,
        }
    }

    /// Keep syncing on every publish until the provider goes away
    pub async fn run(mut self) {
        self.sync();
        while self.subscriber.changed().await.is_some() {
            self.sync();
        }
        debug!(element_id = %self.element_id, "Checkout surface detached");
    }

    fn invoke(&mut self, handle: &SdkHandle) {
        // Recorded before the call: a throwing invoke is not retried for the
        // same handle
        self.last_seen = Some(handle.generation());
        debug!(generation = handle.generation(), "Invoking checkout");

        if let Err(source) = handle.invoke() {
            CheckoutError::Invoke(source).log();
        }
    }
}
