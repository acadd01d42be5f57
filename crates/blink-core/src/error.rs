//! # Checkout Error Types
//!
//! Typed error handling for the checkout session coordinator.
//! Every external call boundary (script fetch, `init`, `invoke`) maps its
//! failure into a [`CheckoutError`]. None of them escape to the host: the
//! provider and the checkout surface log them and carry on.

use thiserror::Error;
use tracing::{error, warn};

/// Failure reported by the external checkout SDK itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// The SDK object does not expose a required operation
    #[error("checkout instance has no `{0}` operation")]
    MissingCapability(&'static str),

    /// `init` returned a rejected promise
    #[error("init rejected: {0}")]
    Rejected(String),

    /// A synchronous SDK call threw
    #[error("checkout call threw: {0}")]
    Threw(String),
}

/// Failure reported by a [`ScriptLoader`](crate::loader::ScriptLoader).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ScriptError(pub String);

impl ScriptError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Core error type for all checkout session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// `merchant.mid` is missing from the checkout config
    #[error("Merchant id not found in checkout config (expected `merchant.mid`)")]
    MerchantIdNotFound,

    /// The SDK bootstrap script could not be fetched
    #[error("Failed to load checkout script from {url}: {source}")]
    ScriptLoad {
        url: String,
        #[source]
        source: ScriptError,
    },

    /// The SDK object is present but unusable (no `onLoad`, not found after load)
    #[error("Invalid checkout js instance: {0}")]
    InvalidInstance(String),

    /// No SDK handle is reachable, neither supplied nor resolvable
    #[error("Checkout js instance not available")]
    CheckoutNotAvailable,

    /// The SDK rejected `init`
    #[error("Checkout init failed: {0}")]
    Init(#[source] SdkError),

    /// The SDK threw from `invoke`
    #[error("Checkout invoke failed: {0}")]
    Invoke(#[source] SdkError),

    /// Host or environment configuration is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CheckoutError {
    /// Stable code used as the `code` field of every logged failure
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::MerchantIdNotFound => "MERCHANT_ID_NOT_FOUND",
            CheckoutError::ScriptLoad { .. } => "FAILED_TO_LOAD_SCRIPT",
            CheckoutError::InvalidInstance(_) => "INVALID_CHECKOUT_JS_INSTANCE",
            CheckoutError::CheckoutNotAvailable => "CHECKOUT_NOT_AVAILABLE",
            CheckoutError::Init(_) => "INIT",
            CheckoutError::Invoke(_) => "INVOKE",
            CheckoutError::Configuration(_) => "INVALID_CONFIG",
        }
    }

    /// Returns true if a later input change or remount can succeed where this failed.
    ///
    /// Only host configuration errors are fatal to the value that produced them.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CheckoutError::Configuration(_))
    }

    /// Emit this failure as a tracing event.
    ///
    /// A missing SDK is a warning; everything else is an error.
    pub fn log(&self) {
        match self {
            CheckoutError::CheckoutNotAvailable => {
                warn!(code = self.code(), "{}", self)
            }
            _ => error!(code = self.code(), "{}", self),
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
