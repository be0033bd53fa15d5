//! Built-in function objects and Function.prototype

use crate::agent::Agent;
use crate::error::{ErrorType, JsResult};
use crate::native::{Arguments, NativeFunctionData, NativeFunctionSpec};
use crate::object::{
    Attributes, BoundFunctionData, JsObject, JsObjectRef, ObjectKind, PropertyDescriptor,
    PropertyKey,
};
use crate::realm::{Intrinsic, RealmId};
use crate::string_dict::Names;
use crate::value::{CheapClone, JsString, JsValue};

/// Upper bound on argument lists built by `Function.prototype.apply`
const MAX_APPLY_ARGUMENTS: usize = 65_535;

/// SetFunctionName for a descriptor: symbol keys become `[description]`,
/// accessors get their `get`/`set` prefix.
fn function_name(spec: &NativeFunctionSpec) -> JsString {
    let base = match &spec.key {
        PropertyKey::String(s) => s.cheap_clone(),
        PropertyKey::Symbol(sym) => match sym.description() {
            Some(description) => JsString::from(format!("[{}]", description)),
            None => JsString::from(""),
        },
    };
    match spec.prefix {
        Some(prefix) => JsString::from(format!("{} {}", prefix, base)),
        None => base,
    }
}

/// CreateBuiltinFunction: `length` is installed before `name`, both
/// configurable only.
pub(crate) fn builtin_function_object(
    names: &Names,
    spec: &NativeFunctionSpec,
    realm: RealmId,
    realm_global: &JsObjectRef,
    prototype: Option<JsObjectRef>,
) -> JsObject {
    let name = function_name(spec);
    let mut object = JsObject::with_kind(
        prototype,
        ObjectKind::NativeFunction(NativeFunctionData {
            name: name.cheap_clone(),
            length: spec.length,
            realm,
            realm_global: realm_global.cheap_clone(),
            call: spec.call,
            construct: spec.construct,
        }),
    );
    object.insert_data(
        PropertyKey::from(&names.length),
        JsValue::from(spec.length),
        Attributes::CONFIGURABLE,
    );
    object.insert_data(
        PropertyKey::from(&names.name),
        JsValue::String(name),
        Attributes::CONFIGURABLE,
    );
    object
}

/// %Function.prototype%: itself callable, accepting anything and returning
/// undefined
pub(crate) fn function_prototype_object(
    names: &Names,
    realm: RealmId,
    realm_global: &JsObjectRef,
    parent: Option<JsObjectRef>,
) -> JsObject {
    let spec = NativeFunctionSpec::method("", 0, function_prototype_call);
    builtin_function_object(names, &spec, realm, realm_global, parent)
}

fn function_prototype_call(_: &mut Agent, _: &JsValue, _: &Arguments<'_>) -> JsResult<JsValue> {
    Ok(JsValue::Undefined)
}

pub(crate) fn init(agent: &mut Agent) -> JsResult<()> {
    let proto = agent.intrinsic(Intrinsic::FunctionPrototype)?;
    let names = agent.names().clone();

    agent.register_method(&proto, NativeFunctionSpec::method(&names.apply, 2, function_apply))?;
    agent.register_method(&proto, NativeFunctionSpec::method(&names.bind, 1, function_bind))?;
    agent.register_method(&proto, NativeFunctionSpec::method(&names.call, 1, function_call))?;
    agent.register_method(
        &proto,
        NativeFunctionSpec::method(&names.to_string, 0, function_to_string),
    )?;

    let has_instance = agent.well_known().has_instance.cheap_clone();
    agent.register_method(
        &proto,
        NativeFunctionSpec::method(has_instance, 1, function_has_instance)
            .with_attributes(Attributes::NONE),
    )?;
    Ok(())
}

/// The callable `this` of a Function.prototype method
fn this_callable(agent: &mut Agent, this: &JsValue) -> JsResult<JsObjectRef> {
    match this {
        JsValue::Object(obj) if obj.borrow().is_callable() => Ok(obj.cheap_clone()),
        _ => Err(agent.throw(ErrorType::NotAFunction(agent.to_display_string(this)))),
    }
}

/// Function.prototype.call(thisArg, ...args)
fn function_call(agent: &mut Agent, this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let func = this_callable(agent, this)?;
    agent.call(&JsValue::Object(func), &args.get(0), args.rest(1))
}

/// Function.prototype.apply(thisArg, argArray)
fn function_apply(agent: &mut Agent, this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let func = this_callable(agent, this)?;
    let arg_array = args.get(1);
    let list = if arg_array.is_nullish() {
        Vec::new()
    } else {
        create_list_from_array_like(agent, &arg_array)?
    };
    agent.call(&JsValue::Object(func), &args.get(0), &list)
}

/// CreateListFromArrayLike
fn create_list_from_array_like(agent: &mut Agent, value: &JsValue) -> JsResult<Vec<JsValue>> {
    let JsValue::Object(obj) = value else {
        return Err(agent.throw(ErrorType::NotAnObject(agent.to_display_string(value))));
    };
    let length_key = PropertyKey::from(&agent.names().length);
    let length = agent.get(obj, &length_key)?;
    let length = agent.to_integer_or_infinity(&length)?.max(0.0);
    if length > MAX_APPLY_ARGUMENTS as f64 {
        return Err(agent.throw(ErrorType::TooManyArguments(MAX_APPLY_ARGUMENTS)));
    }
    let length = length as usize;

    let mut list = Vec::with_capacity(length);
    for index in 0..length {
        let key = PropertyKey::from(JsString::from(index.to_string()));
        list.push(agent.get(obj, &key)?);
    }
    Ok(list)
}

/// Function.prototype.bind(thisArg, ...args)
fn function_bind(agent: &mut Agent, this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let target = this_callable(agent, this)?;
    let bound_args = args.rest(1).to_vec();
    let arg_count = bound_args.len() as f64;
    let (prototype, constructible) = {
        let t = target.borrow();
        (t.prototype.clone(), t.is_constructor())
    };

    let bound = agent.alloc(JsObject::with_kind(
        prototype,
        ObjectKind::BoundFunction(BoundFunctionData {
            target: target.cheap_clone(),
            bound_this: args.get(0),
            bound_args,
            constructible,
        }),
    ));

    let names = agent.names().clone();
    let length_key = PropertyKey::from(&names.length);
    let mut length = 0.0;
    if agent.has_own_property(&target, &length_key) {
        if let JsValue::Number(target_length) = agent.get(&target, &length_key)? {
            length = if target_length == f64::INFINITY {
                f64::INFINITY
            } else if target_length == f64::NEG_INFINITY {
                0.0
            } else {
                let n = agent.to_integer_or_infinity(&JsValue::Number(target_length))?;
                (n - arg_count).max(0.0)
            };
        }
    }
    agent.define_property_or_throw(
        &bound,
        &length_key,
        PropertyDescriptor::data(JsValue::Number(length), Attributes::CONFIGURABLE),
    )?;

    let name_key = PropertyKey::from(&names.name);
    let target_name = match agent.get(&target, &name_key)? {
        JsValue::String(s) => s,
        _ => JsString::from(""),
    };
    agent.define_property_or_throw(
        &bound,
        &name_key,
        PropertyDescriptor::data(
            JsValue::from(format!("bound {}", target_name)),
            Attributes::CONFIGURABLE,
        ),
    )?;

    Ok(JsValue::Object(bound))
}

/// Function.prototype.toString
fn function_to_string(agent: &mut Agent, this: &JsValue, _: &Arguments<'_>) -> JsResult<JsValue> {
    let rendered = match this {
        JsValue::Object(obj) => match &obj.borrow().kind {
            ObjectKind::NativeFunction(data) => {
                Some(format!("function {}() {{ [native code] }}", data.name))
            }
            ObjectKind::BoundFunction(_) => Some("function () { [native code] }".to_string()),
            _ => None,
        },
        _ => None,
    };
    match rendered {
        Some(source) => Ok(JsValue::from(source)),
        None => Err(agent.throw(ErrorType::IncompatibleReceiver {
            method: "Function.prototype.toString".to_string(),
            receiver: agent.to_display_string(this),
        })),
    }
}

/// Function.prototype[@@hasInstance](V)
fn function_has_instance(agent: &mut Agent, this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let result = agent.ordinary_has_instance(this, &args.get(0))?;
    Ok(JsValue::Boolean(result))
}
