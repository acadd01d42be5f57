//! # Script Loader
//!
//! Where the SDK bootstrap script lives and how it gets fetched.
//! The coordinator decides *whether* to load; a [`ScriptLoader`] only performs
//! the single insertion it is asked for.

use crate::error::{CheckoutError, CheckoutResult, ScriptError};
use async_trait::async_trait;
use std::env;

/// Production script base (merchant id is appended)
pub const PRODUCTION_BASE_URL: &str =
    "https://securegw.paytm.in/merchantpgpui/checkoutjs/merchants/";

/// Staging script base (merchant id is appended)
pub const STAGING_BASE_URL: &str =
    "https://securegw-stage.paytm.in/merchantpgpui/checkoutjs/merchants/";

/// SDK environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutEnv {
    #[default]
    Production,
    Staging,
}

impl CheckoutEnv {
    /// Parse the host's `env` value. `STAGE`/`STAGING` (any case) select
    /// staging; anything else is production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "STAGE" | "STAGING" => CheckoutEnv::Staging,
            _ => CheckoutEnv::Production,
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            CheckoutEnv::Production => PRODUCTION_BASE_URL,
            CheckoutEnv::Staging => STAGING_BASE_URL,
        }
    }
}

/// Base endpoint the bootstrap script is fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEndpoint {
    base_url: String,
}

impl ScriptEndpoint {
    /// Use an explicit base URL (for testing/mocking)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn for_env(env: CheckoutEnv) -> Self {
        Self::new(env.base_url())
    }

    /// Load the endpoint from environment variables.
    ///
    /// - `BLINK_CHECKOUT_JS_BASE_URL` overrides the base URL outright
    /// - otherwise `BLINK_CHECKOUT_ENV` picks staging or production
    pub fn from_env() -> CheckoutResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        if let Ok(base_url) = env::var("BLINK_CHECKOUT_JS_BASE_URL") {
            if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
                return Err(CheckoutError::Configuration(
                    "BLINK_CHECKOUT_JS_BASE_URL must start with http:// or https://".to_string(),
                ));
            }
            return Ok(Self::new(base_url));
        }

        let env = env::var("BLINK_CHECKOUT_ENV")
            .map(|value| CheckoutEnv::parse(&value))
            .unwrap_or_default();
        Ok(Self::for_env(env))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bootstrap script URL for a merchant (plain concatenation)
    pub fn script_url(&self, merchant_id: &str) -> String {
        format!("{}{}", self.base_url, merchant_id)
    }
}

impl Default for ScriptEndpoint {
    fn default() -> Self {
        Self::for_env(CheckoutEnv::default())
    }
}

/// Inserts the SDK bootstrap script for asynchronous fetch.
///
/// `load` resolves once the resource has been fetched and executed, or fails
/// if it could not be fetched. One call is one insertion.
#[async_trait(?Send)]
pub trait ScriptLoader {
    async fn load(&self, url: &str) -> Result<(), ScriptError>;
}
