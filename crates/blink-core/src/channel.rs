//! # Propagation Channel
//!
//! Read-only broadcast of the published checkout handle from one coordinator
//! to any number of descendants. Built on `tokio::sync::watch`: subscribers
//! always see the latest value and are woken on every publish.
//!
//! The channel is owned by its coordinator and handed down explicitly; there
//! is no global registry.

use crate::handle::SdkHandle;
use crate::target::TargetId;
use tokio::sync::watch;

/// The value crossing the channel
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedContext {
    /// `None` until the first successful `init`
    pub handle: Option<SdkHandle>,
    /// Anchor id the SDK mounts into in inline mode
    pub target_id: TargetId,
}

/// Sending side, held by the coordinator
#[derive(Debug)]
pub struct ContextPublisher {
    tx: watch::Sender<PublishedContext>,
}

impl ContextPublisher {
    pub fn new(target_id: TargetId) -> Self {
        let (tx, _rx) = watch::channel(PublishedContext {
            handle: None,
            target_id,
        });
        Self { tx }
    }

    /// Publish a new handle. The channel only moves forward: there is no way
    /// to publish "no handle" once one has been set.
    pub fn publish(&self, handle: SdkHandle) {
        self.tx.send_modify(|ctx| ctx.handle = Some(handle));
    }

    pub fn current(&self) -> PublishedContext {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> ContextSubscriber {
        ContextSubscriber {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving side, cloned freely into descendants
#[derive(Debug, Clone)]
pub struct ContextSubscriber {
    rx: watch::Receiver<PublishedContext>,
}

impl ContextSubscriber {
    /// Latest published value, without marking it seen
    pub fn current(&self) -> PublishedContext {
        self.rx.borrow().clone()
    }

    /// Latest published value, marking it seen
    pub fn current_and_mark_seen(&mut self) -> PublishedContext {
        self.rx.borrow_and_update().clone()
    }

    pub fn target_id(&self) -> TargetId {
        self.rx.borrow().target_id.clone()
    }

    /// Wait for the next publish. `None` once the coordinator is gone.
    pub async fn changed(&mut self) -> Option<PublishedContext> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
