//! End-to-end checkout flows through `CheckoutProvider` with mocked SDK and loader.

mod common;

use blink_core::{
    inject_checkout, CheckoutProvider, CheckoutSurface, Coordinator, CoordinatorInputs,
    DisplayMode, ScriptEndpoint, SdkRef, SessionPhase, TokioSpawner,
};
use common::*;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use tokio::task::LocalSet;
use tokio::time::timeout;

#[tokio::test]
async fn test_loads_initializes_and_invokes() {
    LocalSet::new()
        .run_until(async {
            let loader = MockLoader::new();
            let sdk = MockSdk::new();
            let provider = mount_with_global(loader.clone(), &sdk, merchant("M1"));

            let mut subscriber = provider.subscribe();
            let surface = CheckoutSurface::new(provider.subscribe());
            tokio::task::spawn_local(surface.run());

            let ctx = timeout(WAIT, subscriber.changed())
                .await
                .expect("handle published")
                .expect("provider alive");
            settle().await;

            assert_eq!(
                loader.urls.borrow().as_slice(),
                ["https://checkout.test/merchants/M1".to_string()]
            );
            assert_eq!(sdk.on_load_calls.get(), 1);
            assert_eq!(sdk.init_calls(), 1);
            assert!(ctx.handle.is_some());
            assert_eq!(sdk.invokes.get(), 1);
            assert_eq!(provider.phase(), SessionPhase::Ready);
        })
        .await;
}

#[tokio::test]
async fn test_missing_merchant_id_does_nothing() {
    LocalSet::new()
        .run_until(async {
            let loader = MockLoader::new();
            let sdk = MockSdk::new();
            let provider = mount_with_global(
                loader.clone(),
                &sdk,
                CoordinatorInputs::new(config(json!({}))),
            );
            settle().await;

            assert_eq!(loader.insertions(), 0);
            assert_eq!(sdk.init_calls(), 0);
            assert!(provider.published().handle.is_none());
            assert_eq!(provider.phase(), SessionPhase::Uninitialized);
        })
        .await;
}

#[tokio::test]
async fn test_supplied_instance_skips_script() {
    LocalSet::new()
        .run_until(async {
            let loader = MockLoader::new();
            let global = MockSdk::new();
            let supplied = MockSdk::new();

            let provider = mount_with_global(
                loader.clone(),
                &global,
                merchant("M1").with_external_handle(supplied.clone()),
            );
            let mut subscriber = provider.subscribe();
            timeout(WAIT, subscriber.changed()).await.unwrap().unwrap();

            assert_eq!(loader.insertions(), 0);
            assert_eq!(supplied.init_calls(), 1);
            assert_eq!(supplied.on_load_calls.get(), 0);
            assert_eq!(global.init_calls(), 0);
        })
        .await;
}

#[tokio::test]
async fn test_root_matches_display_mode() {
    LocalSet::new()
        .run_until(async {
            let sdk = MockSdk::new();

            let inline = mount_with_global(
                MockLoader::new(),
                &sdk,
                merchant("M1").with_display_mode(DisplayMode::Inline),
            );
            timeout(WAIT, inline.subscribe().changed()).await.unwrap().unwrap();
            assert_eq!(
                sdk.last_payload().unwrap()["root"],
                format!("#{}", inline.target_id())
            );

            let popup = mount_with_global(MockLoader::new(), &sdk, merchant("M1"));
            timeout(WAIT, popup.subscribe().changed()).await.unwrap().unwrap();
            assert_eq!(sdk.last_payload().unwrap()["root"], "");
        })
        .await;
}

#[tokio::test]
async fn test_changes_during_load_use_latest_config() {
    LocalSet::new()
        .run_until(async {
            let (loader, gate) = MockLoader::gated();
            let sdk = MockSdk::new();
            let provider = mount_with_global(loader.clone(), &sdk, merchant("M1"));
            settle().await;

            for amount in ["2.00", "3.00", "4.00"] {
                provider.update(CoordinatorInputs::new(config(json!({
                    "merchant": {"mid": "M1"},
                    "data": {"amount": amount}
                }))));
                settle().await;
            }
            assert_eq!(loader.insertions(), 1);
            assert_eq!(sdk.init_calls(), 0);

            gate.notify_one();
            timeout(WAIT, provider.subscribe().changed()).await.unwrap().unwrap();
            settle().await;

            assert_eq!(loader.insertions(), 1);
            assert_eq!(sdk.init_calls(), 1);
            assert_eq!(sdk.last_payload().unwrap()["data"]["amount"], "4.00");
        })
        .await;
}

#[tokio::test]
async fn test_rejected_init_keeps_previous_handle() {
    LocalSet::new()
        .run_until(async {
            let sdk = MockSdk::new();
            let provider = mount_with_global(MockLoader::new(), &sdk, merchant("M1"));
            let mut subscriber = provider.subscribe();
            let first = timeout(WAIT, subscriber.changed())
                .await
                .unwrap()
                .unwrap()
                .handle
                .unwrap();

            sdk.reject_init.set(true);
            provider.update(merchant("M2"));
            settle().await;

            assert_eq!(sdk.init_calls(), 2);
            assert_eq!(provider.published().handle, Some(first));
            assert_eq!(provider.phase(), SessionPhase::Failed);
        })
        .await;
}

#[tokio::test]
async fn test_rejected_first_init_publishes_nothing() {
    LocalSet::new()
        .run_until(async {
            let sdk = MockSdk::new();
            sdk.reject_init.set(true);
            let provider = mount_with_global(MockLoader::new(), &sdk, merchant("M1"));
            settle().await;

            assert_eq!(sdk.init_calls(), 1);
            assert!(provider.published().handle.is_none());
        })
        .await;
}

#[tokio::test]
async fn test_reinit_invokes_surface_again() {
    LocalSet::new()
        .run_until(async {
            let sdk = MockSdk::new();
            let provider = mount_with_global(MockLoader::new(), &sdk, merchant("M1"));
            let mut surface = CheckoutSurface::new(provider.subscribe());
            let mut subscriber = provider.subscribe();

            timeout(WAIT, subscriber.changed()).await.unwrap().unwrap();
            surface.sync();
            surface.sync();
            assert_eq!(sdk.invokes.get(), 1);

            provider.update(merchant("M2"));
            timeout(WAIT, subscriber.changed()).await.unwrap().unwrap();
            surface.sync();
            surface.sync();
            assert_eq!(sdk.invokes.get(), 2);
        })
        .await;
}

#[tokio::test]
async fn test_script_failure_retries_on_next_change() {
    LocalSet::new()
        .run_until(async {
            let loader = MockLoader::new();
            loader.fail.set(true);
            let sdk = MockSdk::new();
            let provider = mount_with_global(loader.clone(), &sdk, merchant("M1"));
            settle().await;

            assert_eq!(loader.insertions(), 1);
            assert_eq!(provider.phase(), SessionPhase::Failed);

            // Same inputs: no retry
            provider.update(merchant("M1"));
            settle().await;
            assert_eq!(loader.insertions(), 1);

            loader.fail.set(false);
            provider.update(merchant("M2"));
            timeout(WAIT, provider.subscribe().changed()).await.unwrap().unwrap();
            assert_eq!(loader.insertions(), 2);
            assert_eq!(sdk.init_calls(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_sdk_without_on_load_is_not_initialized() {
    LocalSet::new()
        .run_until(async {
            let sdk = MockSdk::new();
            sdk.missing_on_load.set(true);
            let provider = mount_with_global(MockLoader::new(), &sdk, merchant("M1"));
            settle().await;

            assert_eq!(sdk.on_load_calls.get(), 1);
            assert_eq!(sdk.init_calls(), 0);
            assert!(provider.published().handle.is_none());
        })
        .await;
}

#[tokio::test]
async fn test_missing_instance_never_reinserts_script() {
    LocalSet::new()
        .run_until(async {
            let loader = MockLoader::new();
            let sdk = MockSdk::new();
            let installed: Rc<RefCell<Option<SdkRef>>> = Rc::new(RefCell::new(None));
            let lookup = installed.clone();
            let provider = CheckoutProvider::mount(
                Coordinator::new(ScriptEndpoint::new(BASE_URL))
                    .with_resolver(Rc::new(move || lookup.borrow().clone())),
                loader.clone(),
                Rc::new(TokioSpawner),
                merchant("M1"),
            );
            settle().await;

            assert_eq!(provider.phase(), SessionPhase::Failed);
            provider.update(merchant("M2"));
            settle().await;
            assert_eq!(loader.insertions(), 1);

            // Once the instance shows up it is awaited, then initialized
            *installed.borrow_mut() = Some(sdk.clone() as SdkRef);
            provider.update(merchant("M3"));
            timeout(WAIT, provider.subscribe().changed()).await.unwrap().unwrap();

            assert_eq!(
                loader.urls.borrow().as_slice(),
                ["https://checkout.test/merchants/M1".to_string()]
            );
            assert_eq!(sdk.on_load_calls.get(), 1);
            assert_eq!(sdk.init_calls(), 1);
            assert_eq!(sdk.last_payload().unwrap()["merchant"]["mid"], "M3");
        })
        .await;
}

#[tokio::test]
async fn test_unmount_during_load_is_inert() {
    LocalSet::new()
        .run_until(async {
            let (loader, gate) = MockLoader::gated();
            let sdk = MockSdk::new();
            let provider = mount_with_global(loader.clone(), &sdk, merchant("M1"));
            let mut subscriber = provider.subscribe();
            settle().await;

            provider.unmount();
            gate.notify_one();
            settle().await;

            assert_eq!(loader.insertions(), 1);
            assert_eq!(sdk.on_load_calls.get(), 0);
            assert_eq!(sdk.init_calls(), 0);
            assert!(subscriber.changed().await.is_none());
        })
        .await;
}

#[tokio::test]
async fn test_target_ids_are_per_provider() {
    LocalSet::new()
        .run_until(async {
            let sdk = MockSdk::new();
            let first = mount_with_global(MockLoader::new(), &sdk, merchant("M1"));
            let second = mount_with_global(MockLoader::new(), &sdk, merchant("M1"));
            assert_ne!(first.target_id(), second.target_id());

            let before = first.target_id().clone();
            first.update(merchant("M2"));
            first.update(merchant("M3"));
            settle().await;
            assert_eq!(first.target_id(), &before);
            assert_eq!(first.published().target_id, before);
        })
        .await;
}

#[tokio::test]
async fn test_injected_consumer_sees_handle() {
    LocalSet::new()
        .run_until(async {
            let sdk = MockSdk::new();
            let provider = CheckoutProvider::mount(
                Coordinator::new(ScriptEndpoint::new(BASE_URL)),
                MockLoader::new(),
                Rc::new(TokioSpawner),
                merchant("M1").with_external_handle(sdk.clone()),
            );
            let subscriber = provider.subscribe();

            assert!(inject_checkout(&subscriber, ()).checkout.is_none());
            timeout(WAIT, provider.subscribe().changed()).await.unwrap().unwrap();

            let injected = inject_checkout(&subscriber, "props");
            assert_eq!(injected.props, "props");
            assert_eq!(injected.checkout.map(|h| h.generation()), Some(1));
        })
        .await;
}
