//! # blink-wasm
//!
//! Browser bindings for the Blink checkout session coordinator.
//!
//! This crate provides:
//! - `JsCheckout`, the `CheckoutSdk` binding for `window.Paytm.CheckoutJS`
//! - `DomScriptLoader`, which fetches the SDK with a `<script>` element
//! - `WasmSpawner`, running provider continuations on the browser event loop
//! - A JavaScript-facing `CheckoutProvider`
//! - Console logging for `tracing`
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { CheckoutProvider } from 'blink-checkout-wasm';
//!
//! await init();
//!
//! const provider = new CheckoutProvider(
//!   { merchant: { mid: 'MID123' }, data: { orderId, amount, token, tokenType: 'TXN_TOKEN' } },
//!   true,      // openInPopup
//!   'STAGE',   // env
//!   undefined, // checkoutJsInstance
//! );
//! provider.mountCheckout(document.getElementById('checkout'));
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

pub mod loader;
pub mod logging;
pub mod provider;
pub mod sdk;

pub use loader::DomScriptLoader;
pub use provider::JsCheckoutProvider;
pub use sdk::{window_resolver, JsCheckout};

use blink_core::{LocalTask, Spawner};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::install(None);
}

/// Spawns provider continuations onto the browser's microtask queue
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl Spawner for WasmSpawner {
    fn spawn_local(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);
