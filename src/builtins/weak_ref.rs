//! WeakRef constructor and WeakRef.prototype

use crate::agent::Agent;
use crate::error::{ErrorType, JsResult};
use crate::native::{Arguments, NativeFunctionSpec};
use crate::object::{JsObjectRef, ObjectKind, WeakRefTarget};
use crate::realm::Intrinsic;
use crate::string_dict::Names;
use crate::value::JsValue;

pub(crate) fn constructor_spec(names: &Names) -> NativeFunctionSpec {
    NativeFunctionSpec::constructor(&names.weak_ref, 1, weak_ref_call, weak_ref_construct)
}

pub(crate) fn init(agent: &mut Agent) -> JsResult<()> {
    super::link_constructor(agent, Intrinsic::WeakRef, Intrinsic::WeakRefPrototype)?;

    let proto = agent.intrinsic(Intrinsic::WeakRefPrototype)?;
    let deref = agent.names().deref.clone();
    agent.register_method(&proto, NativeFunctionSpec::method(deref, 0, weak_ref_proto_deref))?;
    super::install_to_string_tag(agent, Intrinsic::WeakRefPrototype, "WeakRef")
}

/// CanBeHeldWeakly: objects and symbols not in the global registry
fn weak_target(value: &JsValue) -> Option<WeakRefTarget> {
    match value {
        JsValue::Object(obj) => Some(WeakRefTarget::Object(obj.downgrade())),
        JsValue::Symbol(symbol) if !symbol.is_global() => {
            Some(WeakRefTarget::Symbol(symbol.downgrade()))
        }
        _ => None,
    }
}

fn weak_ref_call(agent: &mut Agent, _this: &JsValue, _args: &Arguments<'_>) -> JsResult<JsValue> {
    Err(agent.throw(ErrorType::ConstructorWithoutNew("WeakRef".to_string())))
}

/// new WeakRef(target)
fn weak_ref_construct(
    agent: &mut Agent,
    args: &Arguments<'_>,
    new_target: &JsObjectRef,
) -> JsResult<JsObjectRef> {
    let target = args.get(0);
    let Some(weak) = weak_target(&target) else {
        return Err(agent.throw(ErrorType::CannotBeHeldWeakly(agent.to_display_string(&target))));
    };
    let weak_ref = agent.ordinary_create_from_constructor(
        new_target,
        Intrinsic::WeakRefPrototype,
        ObjectKind::WeakRef(weak),
    )?;
    agent.add_to_kept_objects(&target);
    Ok(weak_ref)
}

/// WeakRef.prototype.deref()
fn weak_ref_proto_deref(agent: &mut Agent, this: &JsValue, _args: &Arguments<'_>) -> JsResult<JsValue> {
    let target = match this {
        JsValue::Object(obj) => match &obj.borrow().kind {
            ObjectKind::WeakRef(target) => Some(target.clone()),
            _ => None,
        },
        _ => None,
    };
    let Some(target) = target else {
        return Err(agent.throw(ErrorType::IncompatibleReceiver {
            method: "WeakRef.prototype.deref".to_string(),
            receiver: agent.to_display_string(this),
        }));
    };
    match target.upgrade() {
        Some(value) => {
            agent.add_to_kept_objects(&value);
            Ok(value)
        }
        None => Ok(JsValue::Undefined),
    }
}
