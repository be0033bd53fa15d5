//! Integration tests for the runtime core, organized by feature
//!
//! These tests exercise the runtime through the public API.
//!
//! ## Aggressive Test Defaults
//!
//! Tests use aggressive defaults to catch rooting bugs early:
//! - `GC_THRESHOLD=1` - collect at every safe point
//!
//! Override via environment variables:
//!
//! ```bash
//! cargo test                           # Default: aggressive settings
//! GC_THRESHOLD=100 cargo test          # Less aggressive GC for faster runs
//! ```

mod completion;
mod object;
mod symbol;

use realmjs::{
    Agent, AgentOptions, ErrorKind, Intrinsic, JsError, JsObjectRef, JsResult, JsValue,
    PropertyKey, RealmId,
};
use tracing_subscriber::EnvFilter;

/// Route runtime logs to the test output. Filtered by `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create an agent with aggressive defaults for testing.
///
/// `GC_THRESHOLD` defaults to 1 so every `run_in_realm` ends in a
/// collection.
pub fn create_test_agent() -> Agent {
    init_tracing();
    let gc_threshold = std::env::var("GC_THRESHOLD")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1);
    Agent::new(AgentOptions::default().with_gc_threshold(gc_threshold))
}

/// An agent with one realm already created
pub fn create_agent_with_realm() -> (Agent, RealmId) {
    let mut agent = create_test_agent();
    let realm = agent.create_realm().expect("realm creation failed");
    (agent, realm)
}

/// Run `f` inside a fresh realm and return its result
pub fn with_realm<R>(f: impl FnOnce(&mut Agent) -> JsResult<R>) -> R {
    let (mut agent, realm) = create_agent_with_realm();
    agent.run_in_realm(realm, f).expect("unexpected abrupt completion")
}

/// Run `f` inside a fresh realm and return its completion untouched
pub fn try_in_realm<R>(f: impl FnOnce(&mut Agent) -> JsResult<R>) -> JsResult<R> {
    let (mut agent, realm) = create_agent_with_realm();
    agent.run_in_realm(realm, f)
}

/// The running realm's global object
pub fn global(agent: &Agent) -> JsResult<JsObjectRef> {
    Ok(agent.running_realm()?.global_object().clone())
}

/// Read a global binding
pub fn get_global(agent: &mut Agent, name: &str) -> JsResult<JsValue> {
    let global = global(agent)?;
    agent.get(&global, &PropertyKey::from(name))
}

/// Read `value[name]`
pub fn get(agent: &mut Agent, value: &JsValue, name: &str) -> JsResult<JsValue> {
    agent.get_v(value, &PropertyKey::from(name))
}

/// Call `receiver[name](...args)`
pub fn call_method(
    agent: &mut Agent,
    receiver: &JsValue,
    name: &str,
    args: &[JsValue],
) -> JsResult<JsValue> {
    let method = get(agent, receiver, name)?;
    agent.call(&method, receiver, args)
}

/// Call `Global.name(...args)` for a global constructor
pub fn call_static(agent: &mut Agent, global_name: &str, name: &str, args: &[JsValue]) -> JsResult<JsValue> {
    let holder = get_global(agent, global_name)?;
    call_method(agent, &holder, name, args)
}

/// `new Global(...args)`
pub fn construct_global(agent: &mut Agent, name: &str, args: &[JsValue]) -> JsResult<JsObjectRef> {
    let ctor = get_global(agent, name)?;
    agent.construct(&ctor, args, None)
}

/// The native error kind of a thrown error, judged by its prototype
pub fn thrown_kind(agent: &Agent, err: &JsError) -> Option<ErrorKind> {
    let JsValue::Object(obj) = err.thrown_value()? else {
        return None;
    };
    let proto = obj.borrow().prototype.clone()?;
    let realm = agent.running_realm().ok()?;
    ErrorKind::ALL
        .into_iter()
        .find(|&kind| *realm.intrinsic(Intrinsic::error_prototype(kind)) == proto)
}

/// Assert that `result` is a throw completion carrying a `kind` error
pub fn assert_throws<T: std::fmt::Debug>(agent: &Agent, result: JsResult<T>, kind: ErrorKind) {
    match result {
        Err(err) => assert_eq!(
            thrown_kind(agent, &err),
            Some(kind),
            "expected {} but got {}",
            kind,
            err
        ),
        Ok(value) => panic!("expected {} but completed normally with {:?}", kind, value),
    }
}

/// Shorthand for a string value
pub fn s(text: &str) -> JsValue {
    JsValue::from(text)
}
