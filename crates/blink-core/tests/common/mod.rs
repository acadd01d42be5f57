//! Test doubles for the SDK and the script loader.

#![allow(dead_code)]

use async_trait::async_trait;
use blink_core::{
    CheckoutConfig, CheckoutProvider, CheckoutSdk, Coordinator, CoordinatorInputs, ScriptEndpoint,
    ScriptError, ScriptLoader, SdkError, SdkRef, SdkResolver, TokioSpawner,
};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::Notify;

pub const BASE_URL: &str = "https://checkout.test/merchants/";

/// Records every call; `init` and `onLoad` outcomes are switchable
#[derive(Default)]
pub struct MockSdk {
    pub on_load_calls: Cell<usize>,
    pub init_payloads: RefCell<Vec<Value>>,
    pub invokes: Cell<usize>,
    pub reject_init: Cell<bool>,
    pub missing_on_load: Cell<bool>,
}

impl MockSdk {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn init_calls(&self) -> usize {
        self.init_payloads.borrow().len()
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.init_payloads.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl CheckoutSdk for MockSdk {
    async fn on_load(&self) -> Result<(), SdkError> {
        self.on_load_calls.set(self.on_load_calls.get() + 1);
        if self.missing_on_load.get() {
            return Err(SdkError::MissingCapability("onLoad"));
        }
        Ok(())
    }

    async fn init(&self, config: Value) -> Result<(), SdkError> {
        self.init_payloads.borrow_mut().push(config);
        if self.reject_init.get() {
            return Err(SdkError::Rejected("invalid txn token".to_string()));
        }
        Ok(())
    }

    fn invoke(&self) -> Result<(), SdkError> {
        self.invokes.set(self.invokes.get() + 1);
        Ok(())
    }
}

/// Records every inserted script URL. Loads can be held open with a gate.
#[derive(Default)]
pub struct MockLoader {
    pub urls: RefCell<Vec<String>>,
    pub fail: Cell<bool>,
    gate: Option<Rc<Notify>>,
}

impl MockLoader {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A loader whose loads stay in flight until the returned gate is notified
    pub fn gated() -> (Rc<Self>, Rc<Notify>) {
        let gate = Rc::new(Notify::new());
        let loader = Rc::new(Self {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        (loader, gate)
    }

    pub fn insertions(&self) -> usize {
        self.urls.borrow().len()
    }
}

#[async_trait(?Send)]
impl ScriptLoader for MockLoader {
    async fn load(&self, url: &str) -> Result<(), ScriptError> {
        self.urls.borrow_mut().push(url.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.get() {
            return Err(ScriptError::new("net::ERR_NAME_NOT_RESOLVED"));
        }
        Ok(())
    }
}

pub fn resolver_for(sdk: &Rc<MockSdk>) -> SdkResolver {
    let sdk = sdk.clone();
    Rc::new(move || Some(sdk.clone() as SdkRef))
}

pub fn config(value: Value) -> CheckoutConfig {
    CheckoutConfig::try_from(value).expect("test config must be an object")
}

pub fn merchant(mid: &str) -> CoordinatorInputs {
    CoordinatorInputs::new(config(json!({
        "merchant": {"mid": mid, "name": "Demo Store"},
        "data": {"orderId": "ORD-1", "amount": "1.00", "tokenType": "TXN_TOKEN"}
    })))
}

/// Mount a provider whose script installs `sdk` as the global instance
pub fn mount_with_global(
    loader: Rc<MockLoader>,
    sdk: &Rc<MockSdk>,
    inputs: CoordinatorInputs,
) -> CheckoutProvider {
    CheckoutProvider::mount(
        Coordinator::new(ScriptEndpoint::new(BASE_URL)).with_resolver(resolver_for(sdk)),
        loader,
        Rc::new(TokioSpawner),
        inputs,
    )
}

/// Let every spawned local task run to its next suspension point
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

pub const WAIT: Duration = Duration::from_secs(2);
