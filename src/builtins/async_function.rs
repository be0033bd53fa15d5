//! %AsyncFunction.prototype%.
//!
//! A marker: it installs nothing of its own, but every async function created
//! in a realm chains from it, which is what `Agent::is_async_function`
//! checks.

use crate::agent::Agent;
use crate::error::JsResult;
use crate::gc::Gc;
use crate::realm::Intrinsic;
use crate::value::JsValue;

pub(crate) fn init(agent: &mut Agent) -> JsResult<()> {
    agent.intrinsic(Intrinsic::AsyncFunctionPrototype).map(drop)
}

/// Whether `value` is callable and inherits from its function realm's
/// %AsyncFunction.prototype%
pub(crate) fn is_async_function(agent: &Agent, value: &JsValue) -> JsResult<bool> {
    let JsValue::Object(func) = value else {
        return Ok(false);
    };
    if !func.borrow().is_callable() {
        return Ok(false);
    }
    let realm = agent.get_function_realm(func)?;
    let marker = agent.realm_record(realm)?.intrinsic(Intrinsic::AsyncFunctionPrototype);

    let mut current = func.borrow().prototype.clone();
    while let Some(proto) = current {
        if Gc::ptr_eq(&proto, marker) {
            return Ok(true);
        }
        current = proto.borrow().prototype.clone();
    }
    Ok(false)
}
