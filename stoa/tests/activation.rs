use std::sync::Arc;
use stoa::{
    Activation, ContextFacade, Controller, KeyIdentity, LoggingRegistry, LoggingStore, MemoryStore,
    SeedPolicy,
};
use tracing_subscriber::EnvFilter;

mod common;
use common::{Mailer, OrdersController, SharedStore, application_registry, populated_session};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_request_lifecycle() {
    init_tracing();
    let session = populated_session();
    let application: SharedStore = Arc::new(
        MemoryStore::new()
            .with_attribute(KeyIdentity::symbol("motd"), "welcome".to_string()),
    );
    let mut handler = OrdersController::default();
    let registry = LoggingRegistry::new(application_registry(), "application");
    handler.set_registry(Arc::new(registry));

    Activation::new()
        .request(Arc::new(MemoryStore::new()))
        .session(Arc::clone(&session))
        .application(Arc::clone(&application))
        .apply(&mut handler);

    let motd = handler.application().and_then(|a| a.get("motd"));
    assert_eq!(motd.map(String::as_str), Some("welcome"));
    handler
        .request_mut()
        .unwrap()
        .set("order_id", "o-17".to_string());
    let mailer = handler.find_as::<Mailer>("mailer").unwrap();
    mailer.send("alice@example.org");

    handler.release_contexts();
    assert!(handler.request().is_none());
    assert!(handler.session().is_none());
    assert!(handler.application().is_none());
    // The registry outlives the request.
    assert!(handler.find("mailer").is_ok());
}

#[test]
fn test_session_writes_carry_over_to_the_next_request() {
    let session = populated_session();

    let mut first = OrdersController::default();
    Activation::new()
        .session(Arc::clone(&session))
        .apply(&mut first);
    first
        .session_mut()
        .unwrap()
        .set(KeyIdentity::symbol("cart"), "2 items".to_string());
    first.release_contexts();

    let mut second = first.sibling();
    Activation::new()
        .session(Arc::clone(&session))
        .seed_policy(SeedPolicy::all())
        .apply(&mut second);

    let facade = second.session().unwrap();
    assert_eq!(facade.get("cart").map(String::as_str), Some("2 items"));
    assert_eq!(facade.get("user").map(String::as_str), Some("alice"));
}

#[test]
fn test_default_policy_hides_facade_written_keys_from_later_requests() {
    let session = populated_session();

    let mut first = OrdersController::default();
    Activation::new()
        .session(Arc::clone(&session))
        .apply(&mut first);
    first
        .session_mut()
        .unwrap()
        .set("cart", "2 items".to_string());

    let mut second = first.sibling();
    Activation::new()
        .session(Arc::clone(&session))
        .apply(&mut second);

    // Written under a plain key, so not imported; still reachable on demand.
    let facade = second.session_mut().unwrap();
    assert!(facade.get("cart").is_none());
    assert_eq!(facade.refresh("cart").map(String::as_str), Some("2 items"));
}

#[test]
fn test_partial_activation_keeps_other_contexts() {
    let mut handler = OrdersController::default();
    Activation::new()
        .session(populated_session())
        .apply(&mut handler);

    Activation::new()
        .request(Arc::new(MemoryStore::new()))
        .apply(&mut handler);

    assert!(handler.request().is_some());
    assert!(handler.session().is_some());
    assert!(handler.application().is_none());
}

#[test]
fn test_contexts_can_be_set_directly() {
    init_tracing();
    let store = LoggingStore::new(
        MemoryStore::new()
            .with_attribute(KeyIdentity::symbol("user"), "carol".to_string()),
        "request",
    );
    let facade = ContextFacade::new(&store);

    assert_eq!(facade.get("user").map(String::as_str), Some("carol"));
    assert_eq!(store.scope(), "request");

    let mut handler = OrdersController::default();
    let request = MemoryStore::new()
        .with_attribute(KeyIdentity::symbol("path"), "/orders".to_string());
    handler.set_request_context(ContextFacade::new(Arc::new(request)));
    let path = handler.request().and_then(|r| r.get("path"));
    assert_eq!(path.map(String::as_str), Some("/orders"));
}
