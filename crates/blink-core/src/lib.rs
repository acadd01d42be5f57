//! # blink-core
//!
//! Checkout session coordination for the Blink CheckoutJS SDK.
//!
//! This crate provides:
//! - `Coordinator`, the load/init state machine for one mounted provider
//! - `CheckoutProvider`, which drives a coordinator through a `ScriptLoader` and a `Spawner`
//! - `ContextPublisher`/`ContextSubscriber`, the propagation channel to descendants
//! - `CheckoutSurface`, which invokes the published handle once per generation
//! - `inject_checkout`/`CheckoutInjector` for explicit-parameter consumers
//! - `CheckoutError` for typed, logged-not-thrown error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use blink_core::{
//!     CheckoutConfig, CheckoutEnv, CheckoutProvider, CheckoutSurface, Coordinator,
//!     CoordinatorInputs, DisplayMode, ScriptEndpoint, TokioSpawner,
//! };
//!
//! let config = CheckoutConfig::from_json_str(r#"{"merchant": {"mid": "M1"}}"#)?;
//!
//! // Mount a provider; the SDK script is fetched once, then `init` runs
//! let provider = CheckoutProvider::mount(
//!     Coordinator::new(ScriptEndpoint::for_env(CheckoutEnv::Staging)).with_resolver(resolver),
//!     Rc::new(loader),
//!     Rc::new(TokioSpawner),
//!     CoordinatorInputs::new(config).with_display_mode(DisplayMode::Inline),
//! );
//!
//! // Any descendant can open the payment page once the handle is published
//! let surface = CheckoutSurface::new(provider.subscribe());
//! tokio::task::spawn_local(surface.run());
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod handle;
pub mod inject;
pub mod loader;
pub mod provider;
pub mod runtime;
pub mod surface;
pub mod target;

// Re-exports for convenience
pub use channel::{ContextPublisher, ContextSubscriber, PublishedContext};
pub use config::{CheckoutConfig, DisplayMode};
pub use coordinator::{
    Command, Coordinator, CoordinatorInputs, InitAttempt, LoadState, SessionPhase, WatchedInput,
    WATCHED_INPUTS,
};
pub use error::{CheckoutError, CheckoutResult, ScriptError, SdkError};
pub use handle::{CheckoutSdk, SdkHandle, SdkRef, SdkResolver};
pub use inject::{inject_checkout, CheckoutInjector, Injected};
pub use loader::{CheckoutEnv, ScriptEndpoint, ScriptLoader};
pub use provider::CheckoutProvider;
#[cfg(not(target_arch = "wasm32"))]
pub use runtime::TokioSpawner;
pub use runtime::{LocalTask, Spawner};
pub use surface::{Anchor, CheckoutSurface};
pub use target::TargetId;
