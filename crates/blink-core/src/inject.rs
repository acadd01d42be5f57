//! # Capability Injection
//!
//! For consumers that prefer an explicit parameter over reading the channel
//! themselves: the current checkout handle is handed over next to the
//! consumer's own props.
//!
//! ```rust,ignore
//! fn pay_button(input: Injected<ButtonProps>) -> String {
//!     match &input.checkout {
//!         Some(_) => format!("<button>{}</button>", input.label),
//!         None => "<button disabled>Loading…</button>".to_string(),
//!     }
//! }
//!
//! let button = CheckoutInjector::new(provider.subscribe(), pay_button);
//! let html = button.render(ButtonProps { label: "Pay".into() });
//! ```

use crate::channel::ContextSubscriber;
use crate::handle::SdkHandle;
use std::ops::Deref;

/// Props plus the injected checkout handle
#[derive(Debug, Clone)]
pub struct Injected<P> {
    /// `None` until the provider's first successful init
    pub checkout: Option<SdkHandle>,
    pub props: P,
}

impl<P> Deref for Injected<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.props
    }
}

/// Attach the current checkout handle to `props`
pub fn inject_checkout<P>(subscriber: &ContextSubscriber, props: P) -> Injected<P> {
    Injected {
        checkout: subscriber.current().handle,
        props,
    }
}

/// Wraps a consumer so every render receives the current checkout handle
pub struct CheckoutInjector<F> {
    subscriber: ContextSubscriber,
    consumer: F,
}

impl<F> CheckoutInjector<F> {
    pub fn new(subscriber: ContextSubscriber, consumer: F) -> Self {
        Self {
            subscriber,
            consumer,
        }
    }

    pub fn render<P, R>(&self, props: P) -> R
    where
        F: Fn(Injected<P>) -> R,
    {
        (self.consumer)(inject_checkout(&self.subscriber, props))
    }
}
