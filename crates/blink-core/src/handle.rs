//! # Checkout SDK Handle
//!
//! The capability surface consumed from the external checkout SDK, and the
//! versioned handle the coordinator publishes to descendants.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CheckoutSdk (trait)                      │
//! │  ├── on_load()   resolves once SDK bootstrap completes      │
//! │  ├── init()      async, fallible                            │
//! │  └── invoke()    sync, may throw                            │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┴─────────────────┐
//!          │                                   │
//!  ┌───────┴────────┐                  ┌───────┴────────┐
//!  │   JsCheckout   │                  │  test doubles  │
//!  │  (blink-wasm)  │                  │                │
//!  └────────────────┘                  └────────────────┘
//! ```
//!
//! Everything here is single-threaded: handles are `Rc` and futures are `?Send`,
//! matching the UI event loop the SDK lives on.

use crate::error::SdkError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Operations exposed by the external checkout SDK.
#[async_trait(?Send)]
pub trait CheckoutSdk {
    /// Resolve once the SDK has finished its own internal bootstrap.
    ///
    /// Fetching the script does not imply the SDK is ready; `init` must not be
    /// attempted before this resolves.
    async fn on_load(&self) -> Result<(), SdkError>;

    /// Initialize the SDK with the merchant config (including `root`).
    async fn init(&self, config: Value) -> Result<(), SdkError>;

    /// Open the payment page.
    fn invoke(&self) -> Result<(), SdkError>;
}

/// Shared reference to an SDK object
pub type SdkRef = Rc<dyn CheckoutSdk>;

/// Host-supplied lookup for the SDK the bootstrap script installs
/// (in the browser, `window.Paytm.CheckoutJS`).
pub type SdkResolver = Rc<dyn Fn() -> Option<SdkRef>>;

/// Whether two SDK references point at the same object
pub fn same_sdk(a: &SdkRef, b: &SdkRef) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

/// SDK handle published after a successful `init`.
///
/// Each successful initialization gets a fresh generation, even when the
/// underlying SDK object is reused. Equality compares generations only, so
/// "has the handle changed" is an exact check.
#[derive(Clone)]
pub struct SdkHandle {
    sdk: SdkRef,
    generation: u64,
}

impl SdkHandle {
    pub fn new(sdk: SdkRef, generation: u64) -> Self {
        Self { sdk, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sdk(&self) -> &SdkRef {
        &self.sdk
    }

    /// Open the payment page through the underlying SDK
    pub fn invoke(&self) -> Result<(), SdkError> {
        self.sdk.invoke()
    }
}

impl PartialEq for SdkHandle {
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation
    }
}

impl Eq for SdkHandle {}

impl fmt::Debug for SdkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkHandle")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
