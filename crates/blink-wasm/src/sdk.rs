//! # CheckoutJS Binding
//!
//! [`CheckoutSdk`] over the JavaScript object the bootstrap script installs at
//! `window.Paytm.CheckoutJS`.

use async_trait::async_trait;
use blink_core::{CheckoutSdk, SdkError, SdkRef, SdkResolver};
use js_sys::{Function, Promise, Reflect, JSON};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Merchant callbacks (`config.handler`) kept as a live JS object.
///
/// Functions do not survive the trip through JSON, so they are carried beside
/// the config and put back into every `init` payload.
pub type HandlerSlot = Rc<RefCell<JsValue>>;

pub fn empty_handlers() -> HandlerSlot {
    Rc::new(RefCell::new(JsValue::UNDEFINED))
}

/// A CheckoutJS instance
pub struct JsCheckout {
    instance: JsValue,
    handlers: HandlerSlot,
}

impl JsCheckout {
    pub fn new(instance: JsValue, handlers: HandlerSlot) -> Self {
        Self { instance, handlers }
    }

    pub fn instance(&self) -> &JsValue {
        &self.instance
    }

    fn method(&self, name: &'static str) -> Result<Function, SdkError> {
        Reflect::get(&self.instance, &JsValue::from_str(name))
            .map_err(|e| SdkError::Threw(describe(&e)))?
            .dyn_into::<Function>()
            .map_err(|_| SdkError::MissingCapability(name))
    }

    fn payload(&self, config: &Value) -> Result<JsValue, SdkError> {
        let json = serde_json::to_string(config).map_err(|e| SdkError::Threw(e.to_string()))?;
        let payload = JSON::parse(&json).map_err(|e| SdkError::Threw(describe(&e)))?;

        let handlers = self.handlers.borrow();
        if handlers.is_object() {
            Reflect::set(&payload, &JsValue::from_str("handler"), &handlers)
                .map_err(|e| SdkError::Threw(describe(&e)))?;
        }
        Ok(payload)
    }
}

#[async_trait(?Send)]
impl CheckoutSdk for JsCheckout {
    async fn on_load(&self) -> Result<(), SdkError> {
        let on_load = self.method("onLoad")?;
        let instance = self.instance.clone();

        let ready = Promise::new(&mut |resolve, reject| {
            if let Err(err) = on_load.call1(&instance, &resolve) {
                let _ = reject.call1(&JsValue::UNDEFINED, &err);
            }
        });

        JsFuture::from(ready)
            .await
            .map(|_| ())
            .map_err(|e| SdkError::Threw(describe(&e)))
    }

    async fn init(&self, config: Value) -> Result<(), SdkError> {
        let init = self.method("init")?;
        // An instance that cannot be invoked is useless even if init succeeds
        self.method("invoke")?;

        let payload = self.payload(&config)?;
        let returned = init
            .call1(&self.instance, &payload)
            .map_err(|e| SdkError::Threw(describe(&e)))?;

        JsFuture::from(Promise::resolve(&returned))
            .await
            .map(|_| ())
            .map_err(|e| SdkError::Rejected(describe(&e)))
    }

    fn invoke(&self) -> Result<(), SdkError> {
        self.method("invoke")?
            .call0(&self.instance)
            .map(|_| ())
            .map_err(|e| SdkError::Threw(describe(&e)))
    }
}

/// `window.Paytm.CheckoutJS`, if the bootstrap script has installed it
pub fn window_checkout() -> Option<JsValue> {
    let window = web_sys::window()?;
    let paytm = Reflect::get(&window, &JsValue::from_str("Paytm")).ok()?;
    if paytm.is_undefined() || paytm.is_null() {
        return None;
    }
    let checkout = Reflect::get(&paytm, &JsValue::from_str("CheckoutJS")).ok()?;
    (!checkout.is_undefined() && !checkout.is_null()).then_some(checkout)
}

/// Resolver reading the global instance on every call
pub fn window_resolver(handlers: HandlerSlot) -> SdkResolver {
    Rc::new(move || {
        window_checkout().map(|instance| Rc::new(JsCheckout::new(instance, handlers.clone())) as SdkRef)
    })
}

/// Human-readable text for a thrown JS value
pub fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}
