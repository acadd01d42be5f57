//! # JavaScript Provider
//!
//! `CheckoutProvider` as seen from JavaScript hosts. Takes `config`,
//! `openInPopup`, `env` and `checkoutJsInstance`, and never throws: bad input
//! is logged and treated as a config without a merchant id.
//!
//! ```javascript
//! const provider = new CheckoutProvider(config, false, "STAGE", undefined);
//! provider.mountCheckout(document.getElementById("checkout"));
//!
//! // later, after the merchant edits the order
//! provider.update(updatedConfig, false, undefined);
//! ```

use crate::loader::DomScriptLoader;
use crate::sdk::{empty_handlers, window_resolver, HandlerSlot, JsCheckout};
use crate::WasmSpawner;
use blink_core::{
    CheckoutConfig, CheckoutEnv, CheckoutProvider, CheckoutSurface, Coordinator,
    CoordinatorInputs, DisplayMode, ScriptEndpoint, SdkRef,
};
use js_sys::{Object, Reflect, JSON};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// A mounted checkout session for JavaScript hosts
#[wasm_bindgen(js_name = CheckoutProvider)]
pub struct JsCheckoutProvider {
    inner: CheckoutProvider,
    handlers: HandlerSlot,
    handler_revision: u64,
    external: Option<(JsValue, SdkRef)>,
}

#[wasm_bindgen(js_class = CheckoutProvider)]
impl JsCheckoutProvider {
    /// Mount a provider. `env` of `"STAGE"` loads the staging SDK.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        open_in_popup: JsValue,
        env: Option<String>,
        checkout_js_instance: JsValue,
    ) -> JsCheckoutProvider {
        let env = env.as_deref().map(CheckoutEnv::parse).unwrap_or_default();
        let handlers = empty_handlers();
        let coordinator =
            Coordinator::new(ScriptEndpoint::for_env(env)).with_resolver(window_resolver(handlers.clone()));

        let mut external = None;
        let mut handler_revision = 0;
        let inputs = read_inputs(
            &config,
            &open_in_popup,
            &checkout_js_instance,
            &handlers,
            &mut handler_revision,
            &mut external,
        );
        let inner = CheckoutProvider::mount(
            coordinator,
            Rc::new(DomScriptLoader),
            Rc::new(WasmSpawner),
            inputs,
        );

        Self {
            inner,
            handlers,
            handler_revision,
            external,
        }
    }

    /// Re-render with new inputs; re-initializes only if something changed
    pub fn update(&mut self, config: JsValue, open_in_popup: JsValue, checkout_js_instance: JsValue) {
        let inputs = read_inputs(
            &config,
            &open_in_popup,
            &checkout_js_instance,
            &self.handlers,
            &mut self.handler_revision,
            &mut self.external,
        );
        self.inner.update(inputs);
    }

    /// Id of the anchor element the SDK mounts into in inline mode
    #[wasm_bindgen(getter, js_name = elementId)]
    pub fn element_id(&self) -> String {
        self.inner.target_id().to_string()
    }

    /// Whether an initialized checkout instance has been published
    #[wasm_bindgen(getter)]
    pub fn ready(&self) -> bool {
        self.inner.published().handle.is_some()
    }

    /// The CheckoutJS instance in use, for hosts that drive it directly.
    /// `null` until the first successful init.
    #[wasm_bindgen(getter, js_name = checkoutJsInstance)]
    pub fn checkout_js_instance(&self) -> JsValue {
        if self.inner.published().handle.is_none() {
            return JsValue::NULL;
        }
        match &self.external {
            Some((instance, _)) => instance.clone(),
            None => crate::sdk::window_checkout().unwrap_or(JsValue::NULL),
        }
    }

    /// Render the checkout anchor into `container` and invoke the SDK once per
    /// initialized instance for as long as the provider is mounted
    #[wasm_bindgen(js_name = mountCheckout)]
    pub fn mount_checkout(&self, container: &web_sys::Element) -> Result<(), JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container is not attached to a document"))?;

        let surface = CheckoutSurface::new(self.inner.subscribe());
        let anchor = document.create_element("div")?;
        anchor.set_id(surface.anchor().id.as_str());
        container.append_child(&anchor)?;

        wasm_bindgen_futures::spawn_local(surface.run());
        Ok(())
    }

    /// Tear the session down; pending loads and inits are dropped
    pub fn unmount(self) {
        drop(self);
    }
}

fn read_inputs(
    config: &JsValue,
    open_in_popup: &JsValue,
    checkout_js_instance: &JsValue,
    handlers: &HandlerSlot,
    handler_revision: &mut u64,
    external: &mut Option<(JsValue, SdkRef)>,
) -> CoordinatorInputs {
    // A new callbacks object is a config change even when the data is equal
    let next = read_handlers(config);
    let replaced = !Object::is(&handlers.borrow(), &next);
    if replaced {
        *handler_revision += 1;
    }
    *handlers.borrow_mut() = next;

    let mut inputs = CoordinatorInputs::new(read_config(config))
        .with_display_mode(display_mode(open_in_popup))
        .with_handler_revision(*handler_revision);

    if checkout_js_instance.is_undefined() || checkout_js_instance.is_null() {
        *external = None;
    } else {
        let reuse = matches!(external, Some((previous, _)) if Object::is(previous, checkout_js_instance));
        if !reuse {
            let sdk: SdkRef = Rc::new(JsCheckout::new(
                checkout_js_instance.clone(),
                handlers.clone(),
            ));
            *external = Some((checkout_js_instance.clone(), sdk));
        }
        if let Some((_, sdk)) = external {
            inputs = inputs.with_external_handle(sdk.clone());
        }
    }
    inputs
}

fn read_config(config: &JsValue) -> CheckoutConfig {
    let json = JSON::stringify(config).ok().and_then(|text| text.as_string());
    let parsed = match json {
        Some(json) => CheckoutConfig::from_json_str(&json),
        None => CheckoutConfig::from_json_str("null"),
    };
    parsed.unwrap_or_else(|err| {
        err.log();
        CheckoutConfig::default()
    })
}

fn read_handlers(config: &JsValue) -> JsValue {
    if !config.is_object() {
        return JsValue::UNDEFINED;
    }
    Reflect::get(config, &JsValue::from_str("handler")).unwrap_or(JsValue::UNDEFINED)
}

/// `openInPopup`: omitted means popup, otherwise boolean-ish
pub fn display_mode(flag: &JsValue) -> DisplayMode {
    if flag.is_undefined() {
        return DisplayMode::default();
    }
    if let Some(open_in_popup) = flag.as_bool() {
        return DisplayMode::from(open_in_popup);
    }
    match flag.as_string() {
        Some(text) => DisplayMode::parse(&text),
        None => DisplayMode::Inline,
    }
}
