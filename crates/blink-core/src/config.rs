//! # Checkout Configuration
//!
//! The merchant configuration handed to the SDK's `init`, plus the popup/inline
//! display switch. The configuration is opaque: only `merchant.mid` is read,
//! everything else is passed through untouched.

use crate::error::{CheckoutError, CheckoutResult};
use crate::target::TargetId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the SDK expects its mount point
pub const ROOT_KEY: &str = "root";

/// Merchant configuration in the CheckoutJS format
///
/// See the CheckoutJS configuration reference for the expected shape. A
/// minimal config is `{"merchant": {"mid": "..."}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutConfig(Map<String, Value>);

impl CheckoutConfig {
    /// Create a config from a JSON object map
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Parse a config from JSON text. The top level must be an object.
    pub fn from_json_str(json: &str) -> CheckoutResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CheckoutError::Configuration(format!("invalid config JSON: {}", e)))?;
        Self::try_from(value)
    }

    /// Merchant id at `merchant.mid`.
    ///
    /// Empty strings, `null` and non-scalar values count as absent. Numeric ids
    /// are accepted and rendered as text.
    pub fn merchant_id(&self) -> Option<String> {
        match self.0.get("merchant")?.get("mid")? {
            Value::String(mid) if !mid.is_empty() => Some(mid.clone()),
            Value::Number(mid) => Some(mid.to_string()),
            _ => None,
        }
    }

    /// Payload for the SDK's `init`: every config field plus `root`.
    pub fn with_root(&self, root: impl Into<String>) -> Value {
        let mut fields = self.0.clone();
        fields.insert(ROOT_KEY.to_string(), Value::String(root.into()));
        Value::Object(fields)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for CheckoutConfig {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for CheckoutConfig {
    type Error = CheckoutError;

    fn try_from(value: Value) -> CheckoutResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(CheckoutError::Configuration(format!(
                "checkout config must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Where the SDK renders its payment UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Overlay; no DOM anchor needed
    Popup,
    /// Mounted inside the checkout surface's anchor element
    Inline,
}

impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::Popup
    }
}

impl DisplayMode {
    /// Interpret a boolean-ish `openInPopup` flag.
    ///
    /// `true`/`"true"` selects popup. `false`, `"false"` and anything else
    /// (including `null`) select inline. Callers that want the default for an
    /// omitted flag should use [`DisplayMode::default`] instead.
    pub fn from_flag(flag: &Value) -> Self {
        match flag {
            Value::Bool(open_in_popup) => Self::from(*open_in_popup),
            Value::String(text) => Self::parse(text),
            _ => DisplayMode::Inline,
        }
    }

    /// Interpret a textual flag; only the exact string `"true"` selects popup.
    pub fn parse(text: &str) -> Self {
        Self::from(text == "true")
    }

    pub fn is_popup(&self) -> bool {
        matches!(self, DisplayMode::Popup)
    }

    /// The `root` value passed to `init`
    pub fn root(&self, target_id: &TargetId) -> String {
        match self {
            DisplayMode::Popup => String::new(),
            DisplayMode::Inline => target_id.selector(),
        }
    }
}

impl From<bool> for DisplayMode {
    fn from(open_in_popup: bool) -> Self {
        if open_in_popup {
            DisplayMode::Popup
        } else {
            DisplayMode::Inline
        }
    }
}
