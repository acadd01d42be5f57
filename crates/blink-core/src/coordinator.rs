//! # Session Coordinator
//!
//! State machine owning the SDK load/init lifecycle for one mounted provider.
//!
//! The coordinator performs no I/O. Every input (host change, loader
//! completion, SDK callback) is a method call that returns the [`Command`]s the
//! driver must execute next, or the [`CheckoutError`] to log. This keeps the
//! ordering rules checkable without a browser:
//!
//! ```text
//!   mount/update ──► decide ──┬─► LoadScript ──► script_loaded ──► AwaitSdk ──► sdk_ready ─┐
//!                             │                  script_failed (retry later)                │
//!                             └─► Init ◄──────────────────────────────────────────────────┘
//!                                  │
//!                                  └─► init_settled ──► publish (Ok) / log (Err)
//! ```
//!
//! Only one load is ever in flight. Host changes that arrive while it is in
//! flight are recorded and the single init that follows uses the latest ones.

use crate::channel::{ContextPublisher, ContextSubscriber, PublishedContext};
use crate::config::{CheckoutConfig, DisplayMode};
use crate::error::{CheckoutError, CheckoutResult, ScriptError, SdkError};
use crate::handle::{same_sdk, SdkHandle, SdkRef, SdkResolver};
use crate::loader::ScriptEndpoint;
use crate::target::TargetId;
use serde_json::Value;
use tracing::{debug, info};

/// Host inputs that re-run the decision procedure when they change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedInput {
    Config,
    ExternalHandle,
    OpenInPopup,
}

/// Every watched input, in diff order
pub const WATCHED_INPUTS: [WatchedInput; 3] = [
    WatchedInput::Config,
    WatchedInput::ExternalHandle,
    WatchedInput::OpenInPopup,
];

/// Inputs supplied by the host on mount and on every render
#[derive(Clone)]
pub struct CoordinatorInputs {
    pub config: CheckoutConfig,
    /// Pre-existing SDK object; bypasses the script fetch
    pub external_handle: Option<SdkRef>,
    pub open_in_popup: DisplayMode,
    /// Bumped by hosts whose merchant callbacks live outside the JSON config
    pub handler_revision: u64,
}

impl CoordinatorInputs {
    pub fn new(config: CheckoutConfig) -> Self {
        Self {
            config,
            external_handle: None,
            open_in_popup: DisplayMode::default(),
            handler_revision: 0,
        }
    }

    pub fn with_external_handle(mut self, sdk: SdkRef) -> Self {
        self.external_handle = Some(sdk);
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.open_in_popup = mode;
        self
    }

    pub fn with_handler_revision(mut self, revision: u64) -> Self {
        self.handler_revision = revision;
        self
    }

    /// Watched inputs that differ from `previous`
    pub fn changed_inputs(&self, previous: &CoordinatorInputs) -> Vec<WatchedInput> {
        WATCHED_INPUTS
            .into_iter()
            .filter(|input| match input {
                WatchedInput::Config => {
                    self.config != previous.config
                        || self.handler_revision != previous.handler_revision
                }
                WatchedInput::ExternalHandle => {
                    match (&self.external_handle, &previous.external_handle) {
                        (Some(current), Some(prev)) => !same_sdk(current, prev),
                        (None, None) => false,
                        _ => true,
                    }
                }
                WatchedInput::OpenInPopup => self.open_in_popup != previous.open_in_popup,
            })
            .collect()
    }
}

/// Script load progress. Private to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    /// Script fetch or SDK bootstrap in flight
    Loading,
    /// Script inserted but no usable SDK confirmed yet; never inserted again
    ScriptPresent,
    /// SDK announced readiness; never loads again
    Loaded,
}

/// Externally visible lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Initializing,
    Ready,
    Failed,
}

/// One `init` attempt: the SDK it targets and the generation it would publish
#[derive(Clone)]
pub struct InitAttempt {
    pub generation: u64,
    pub sdk: SdkRef,
}

/// Work the driver must perform on the coordinator's behalf
pub enum Command {
    /// Insert the bootstrap script, then report `script_loaded`/`script_failed`
    LoadScript { url: String },
    /// Wait for the SDK's `onLoad`, then report `sdk_ready`/`sdk_unavailable`
    AwaitSdk { sdk: SdkRef },
    /// Call `init` with `payload`, then report `init_settled`
    Init { attempt: InitAttempt, payload: Value },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::LoadScript { url } => f.debug_struct("LoadScript").field("url", url).finish(),
            Command::AwaitSdk { .. } => f.write_str("AwaitSdk"),
            Command::Init { attempt, payload } => f
                .debug_struct("Init")
                .field("generation", &attempt.generation)
                .field("payload", payload)
                .finish(),
        }
    }
}

/// Load/init state machine for one mounted provider
pub struct Coordinator {
    target_id: TargetId,
    endpoint: ScriptEndpoint,
    resolver: Option<SdkResolver>,
    publisher: ContextPublisher,
    inputs: Option<CoordinatorInputs>,
    load: LoadState,
    last_generation: u64,
    pending_init: Option<u64>,
    failed: bool,
    active: bool,
}

impl Coordinator {
    /// Create a coordinator with a freshly generated target id
    pub fn new(endpoint: ScriptEndpoint) -> Self {
        Self::with_target_id(endpoint, TargetId::generate())
    }

    pub fn with_target_id(endpoint: ScriptEndpoint, target_id: TargetId) -> Self {
        Self {
            publisher: ContextPublisher::new(target_id.clone()),
            target_id,
            endpoint,
            resolver: None,
            inputs: None,
            load: LoadState::NotLoaded,
            last_generation: 0,
            pending_init: None,
            failed: false,
            active: false,
        }
    }

    /// Builder: set the lookup for the SDK installed by the bootstrap script
    pub fn with_resolver(mut self, resolver: SdkResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn inputs(&self) -> Option<&CoordinatorInputs> {
        self.inputs.as_ref()
    }

    pub fn published(&self) -> PublishedContext {
        self.publisher.current()
    }

    pub fn subscribe(&self) -> ContextSubscriber {
        self.publisher.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.pending_init.is_some() {
            SessionPhase::Initializing
        } else if self.load == LoadState::Loading {
            SessionPhase::Loading
        } else if self.failed {
            SessionPhase::Failed
        } else if self.publisher.current().handle.is_some() {
            SessionPhase::Ready
        } else {
            SessionPhase::Uninitialized
        }
    }

    /// Host mounted the provider: run the decision procedure unconditionally
    pub fn mount(&mut self, inputs: CoordinatorInputs) -> CheckoutResult<Vec<Command>> {
        self.active = true;
        self.inputs = Some(inputs);
        self.decide()
    }

    /// Host re-rendered the provider: run the decision procedure if any
    /// watched input changed
    pub fn update(&mut self, inputs: CoordinatorInputs) -> CheckoutResult<Vec<Command>> {
        if !self.active {
            return Ok(Vec::new());
        }

        let changed = match &self.inputs {
            Some(previous) => inputs.changed_inputs(previous),
            None => WATCHED_INPUTS.to_vec(),
        };
        self.inputs = Some(inputs);

        if changed.is_empty() {
            return Ok(Vec::new());
        }
        debug!(?changed, target_id = %self.target_id, "Checkout inputs changed");
        self.decide()
    }

    /// Host unmounted the provider; later completions are ignored
    pub fn unmount(&mut self) {
        self.active = false;
        self.pending_init = None;
    }

    /// Bootstrap script fetched and executed
    pub fn script_loaded(&mut self) -> CheckoutResult<Vec<Command>> {
        if !self.active {
            return Ok(Vec::new());
        }

        match self.resolve_global() {
            Some(sdk) => {
                debug!(target_id = %self.target_id, "Checkout script loaded, waiting for SDK");
                Ok(vec![Command::AwaitSdk { sdk }])
            }
            None => {
                self.load = LoadState::ScriptPresent;
                self.failed = true;
                Err(CheckoutError::InvalidInstance(
                    "script loaded but no checkout instance was installed".to_string(),
                ))
            }
        }
    }

    /// Bootstrap script could not be fetched. Returns the error to log.
    pub fn script_failed(&mut self, url: String, source: ScriptError) -> CheckoutError {
        if self.active {
            self.load = LoadState::NotLoaded;
            self.failed = true;
        }
        CheckoutError::ScriptLoad { url, source }
    }

    /// SDK announced readiness through `onLoad`
    pub fn sdk_ready(&mut self) -> CheckoutResult<Vec<Command>> {
        if !self.active {
            return Ok(Vec::new());
        }

        self.load = LoadState::Loaded;
        info!(target_id = %self.target_id, "Checkout SDK ready");

        // Inputs may have lost their merchant id while the script was loading
        if self.current_merchant_id().is_none() {
            return Err(CheckoutError::MerchantIdNotFound);
        }
        self.initialize().map(|command| vec![command])
    }

    /// SDK cannot announce readiness (no usable `onLoad`)
    pub fn sdk_unavailable(&mut self, source: SdkError) -> CheckoutError {
        if self.active {
            self.load = LoadState::ScriptPresent;
            self.failed = true;
        }
        CheckoutError::InvalidInstance(source.to_string())
    }

    /// An `init` call finished. Returns the newly published handle, if any.
    pub fn init_settled(
        &mut self,
        attempt: InitAttempt,
        result: Result<(), SdkError>,
    ) -> CheckoutResult<Option<SdkHandle>> {
        if !self.active {
            return Ok(None);
        }
        if self.pending_init == Some(attempt.generation) {
            self.pending_init = None;
        }

        if let Err(source) = result {
            self.failed = true;
            return Err(match source {
                SdkError::MissingCapability(_) => CheckoutError::InvalidInstance(source.to_string()),
                other => CheckoutError::Init(other),
            });
        }

        let newer = self
            .publisher
            .current()
            .handle
            .map_or(true, |published| attempt.generation > published.generation());
        if !newer {
            debug!(generation = attempt.generation, "Ignoring superseded init result");
            return Ok(None);
        }

        let handle = SdkHandle::new(attempt.sdk, attempt.generation);
        self.publisher.publish(handle.clone());
        self.failed = false;
        info!(
            target_id = %self.target_id,
            generation = handle.generation(),
            "Checkout instance published"
        );
        Ok(Some(handle))
    }

    fn current_merchant_id(&self) -> Option<String> {
        self.inputs.as_ref()?.config.merchant_id()
    }

    fn decide(&mut self) -> CheckoutResult<Vec<Command>> {
        let Some(merchant_id) = self.current_merchant_id() else {
            return Err(CheckoutError::MerchantIdNotFound);
        };

        let has_external = self
            .inputs
            .as_ref()
            .is_some_and(|inputs| inputs.external_handle.is_some());

        if has_external || self.load == LoadState::Loaded {
            return self.initialize().map(|command| vec![command]);
        }

        if self.load == LoadState::Loading {
            debug!(target_id = %self.target_id, "Checkout script already loading");
            return Ok(Vec::new());
        }

        if self.load == LoadState::ScriptPresent {
            let sdk = self.resolve_global().ok_or_else(|| {
                CheckoutError::InvalidInstance("checkout instance still not installed".to_string())
            })?;
            self.load = LoadState::Loading;
            self.failed = false;
            debug!(target_id = %self.target_id, "Checkout script present, waiting for SDK");
            return Ok(vec![Command::AwaitSdk { sdk }]);
        }

        self.load = LoadState::Loading;
        self.failed = false;
        let url = self.endpoint.script_url(&merchant_id);
        info!(target_id = %self.target_id, %url, "Loading checkout script");
        Ok(vec![Command::LoadScript { url }])
    }

    fn initialize(&mut self) -> CheckoutResult<Command> {
        let inputs = self
            .inputs
            .as_ref()
            .ok_or(CheckoutError::CheckoutNotAvailable)?;

        let sdk = inputs
            .external_handle
            .clone()
            .or_else(|| self.resolve_global())
            .ok_or(CheckoutError::CheckoutNotAvailable)?;

        let root = inputs.open_in_popup.root(&self.target_id);
        let payload = inputs.config.with_root(root);

        self.last_generation += 1;
        let generation = self.last_generation;
        self.pending_init = Some(generation);
        self.failed = false;
        debug!(target_id = %self.target_id, generation, "Initializing checkout");

        Ok(Command::Init {
            attempt: InitAttempt { generation, sdk },
            payload,
        })
    }

    fn resolve_global(&self) -> Option<SdkRef> {
        self.resolver.as_ref().and_then(|resolve| resolve())
    }
}
