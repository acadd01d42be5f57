//! # Local Task Spawning
//!
//! The provider continues work after each external suspension point (script
//! fetch, `onLoad`, `init`) on the host's single-threaded event loop. The host
//! decides how local tasks run: tokio's `LocalSet` natively, the browser
//! microtask queue under wasm.

use std::future::Future;
use std::pin::Pin;

/// A `!Send` task spawned onto the UI event loop
pub type LocalTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Runs local tasks to completion in the background.
///
/// Implementations queue the task rather than polling it before returning.
pub trait Spawner {
    fn spawn_local(&self, task: LocalTask);
}

/// Spawns onto the current tokio `LocalSet`
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

#[cfg(not(target_arch = "wasm32"))]
impl Spawner for TokioSpawner {
    /// # Panics
    ///
    /// Panics when called outside a `tokio::task::LocalSet`.
    fn spawn_local(&self, task: LocalTask) {
        tokio::task::spawn_local(task);
    }
}
