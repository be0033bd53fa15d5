//! Execution contexts.
//!
//! Each context owns a GC guard. Every object allocated while the context is
//! running is rooted there, so native code can hold temporaries in Rust
//! locals; the roots go away when the context is popped.

use crate::gc::Guard;
use crate::object::{JsObject, JsObjectRef};
use crate::realm::RealmId;

pub struct ExecutionContext {
    /// [[Realm]]
    pub realm: RealmId,
    /// The active function object, `None` for host-entered contexts
    pub function: Option<JsObjectRef>,
    pub(crate) guard: Guard<JsObject>,
}

impl ExecutionContext {
    pub(crate) fn new(realm: RealmId, function: Option<JsObjectRef>, guard: Guard<JsObject>) -> Self {
        if let Some(function) = &function {
            guard.guard(function);
        }
        Self {
            realm,
            function,
            guard,
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("realm", &self.realm)
            .field("function", &self.function.as_ref().map(|func| func.id()))
            .field("roots", &self.guard.len())
            .finish()
    }
}
