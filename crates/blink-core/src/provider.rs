//! # Checkout Provider
//!
//! Drives a [`Coordinator`] against the outside world: executes the commands
//! it emits through the injected [`ScriptLoader`] and SDK, feeds completions
//! back in, and logs every failure. Nothing here returns an error to the host.
//!
//! Spawned continuations only hold a weak reference to the coordinator. Once
//! the provider is unmounted (or dropped) they find nothing to upgrade and
//! finish without touching any state.

use crate::channel::{ContextSubscriber, PublishedContext};
use crate::coordinator::{Command, Coordinator, CoordinatorInputs, SessionPhase};
use crate::error::CheckoutResult;
use crate::loader::ScriptLoader;
use crate::runtime::Spawner;
use crate::target::TargetId;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, instrument};

struct Drivers {
    loader: Rc<dyn ScriptLoader>,
    spawner: Rc<dyn Spawner>,
}

/// A mounted checkout session
///
/// ```rust,ignore
/// let provider = CheckoutProvider::mount(
///     Coordinator::new(ScriptEndpoint::for_env(CheckoutEnv::Staging)).with_resolver(resolver),
///     Rc::new(loader),
///     Rc::new(TokioSpawner),
///     CoordinatorInputs::new(config),
/// );
///
/// let mut surface = CheckoutSurface::new(provider.subscribe());
/// let anchor = surface.mount();
/// ```
pub struct CheckoutProvider {
    coordinator: Rc<RefCell<Coordinator>>,
    target_id: TargetId,
    subscriber: ContextSubscriber,
    drivers: Rc<Drivers>,
}

impl CheckoutProvider {
    /// Mount a session and run the first decision
    pub fn mount(
        coordinator: Coordinator,
        loader: Rc<dyn ScriptLoader>,
        spawner: Rc<dyn Spawner>,
        inputs: CoordinatorInputs,
    ) -> Self {
        let provider = Self {
            target_id: coordinator.target_id().clone(),
            subscriber: coordinator.subscribe(),
            coordinator: Rc::new(RefCell::new(coordinator)),
            drivers: Rc::new(Drivers { loader, spawner }),
        };

        debug!(target_id = %provider.target_id, "Mounting checkout provider");
        let outcome = provider.coordinator.borrow_mut().mount(inputs);
        dispatch(Rc::downgrade(&provider.coordinator), &provider.drivers, outcome);
        provider
    }

    /// Host re-rendered with (possibly) new inputs
    #[instrument(skip_all, fields(target_id = %self.target_id))]
    pub fn update(&self, inputs: CoordinatorInputs) {
        let outcome = self.coordinator.borrow_mut().update(inputs);
        dispatch(Rc::downgrade(&self.coordinator), &self.drivers, outcome);
    }

    /// New subscription to the published context, for descendants
    pub fn subscribe(&self) -> ContextSubscriber {
        self.subscriber.clone()
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    pub fn published(&self) -> PublishedContext {
        self.subscriber.current()
    }

    pub fn phase(&self) -> SessionPhase {
        self.coordinator.borrow().phase()
    }

    /// Tear the session down. Outstanding loads and inits become no-ops and
    /// subscribers see the channel close.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for CheckoutProvider {
    fn drop(&mut self) {
        if let Ok(mut coordinator) = self.coordinator.try_borrow_mut() {
            coordinator.unmount();
        }
        debug!(target_id = %self.target_id, "Checkout provider unmounted");
    }
}

fn dispatch(
    coordinator: Weak<RefCell<Coordinator>>,
    drivers: &Rc<Drivers>,
    outcome: CheckoutResult<Vec<Command>>,
) {
    match outcome {
        Ok(commands) => {
            for command in commands {
                execute(coordinator.clone(), drivers.clone(), command);
            }
        }
        Err(err) => err.log(),
    }
}

fn execute(coordinator: Weak<RefCell<Coordinator>>, drivers: Rc<Drivers>, command: Command) {
    let spawner = drivers.spawner.clone();

    match command {
        Command::LoadScript { url } => spawner.spawn_local(Box::pin(async move {
            let result = drivers.loader.load(&url).await;

            let Some(cell) = coordinator.upgrade() else {
                return;
            };
            let outcome = {
                let mut coordinator = cell.borrow_mut();
                match result {
                    Ok(()) => coordinator.script_loaded(),
                    Err(source) => Err(coordinator.script_failed(url, source)),
                }
            };
            drop(cell);

            dispatch(coordinator, &drivers, outcome);
        })),

        Command::AwaitSdk { sdk } => spawner.spawn_local(Box::pin(async move {
            let ready = sdk.on_load().await;

            let Some(cell) = coordinator.upgrade() else {
                return;
            };
            let outcome = {
                let mut coordinator = cell.borrow_mut();
                match ready {
                    Ok(()) => coordinator.sdk_ready(),
                    Err(source) => Err(coordinator.sdk_unavailable(source)),
                }
            };
            drop(cell);

            dispatch(coordinator, &drivers, outcome);
        })),

        Command::Init { attempt, payload } => spawner.spawn_local(Box::pin(async move {
            let result = attempt.sdk.init(payload).await;

            let Some(cell) = coordinator.upgrade() else {
                return;
            };
            let settled = cell.borrow_mut().init_settled(attempt, result);
            if let Err(err) = settled {
                err.log();
            }
        })),
    }
}
