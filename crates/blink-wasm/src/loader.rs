//! # DOM Script Loader
//!
//! Appends an async `<script>` element to `document.body` and resolves on its
//! `load`/`error` event.

use crate::sdk::describe;
use async_trait::async_trait;
use blink_core::{ScriptError, ScriptLoader};
use js_sys::Promise;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

/// Loads scripts by inserting `<script>` elements into the current document
#[derive(Debug, Clone, Copy, Default)]
pub struct DomScriptLoader;

#[async_trait(?Send)]
impl ScriptLoader for DomScriptLoader {
    async fn load(&self, url: &str) -> Result<(), ScriptError> {
        let loaded = insert_script(url).map_err(|e| ScriptError::new(describe(&e)))?;
        debug!(%url, "Checkout script inserted");

        JsFuture::from(loaded)
            .await
            .map(|_| ())
            .map_err(|_| ScriptError::new("script element fired an error event"))
    }
}

fn insert_script(url: &str) -> Result<Promise, JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_async(true);
    script.set_src(url);
    script.set_type("application/javascript");

    let loaded = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });

    body.append_child(&script)?;
    Ok(loaded)
}
