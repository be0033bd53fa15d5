//! Object constructor and Object.prototype

use crate::agent::Agent;
use crate::error::{ErrorType, JsError, JsResult};
use crate::gc::Gc;
use crate::native::{Arguments, NativeFunctionSpec};
use crate::object::{JsObjectRef, ObjectKind, PropertyDescriptor, PropertyKey};
use crate::realm::Intrinsic;
use crate::string_dict::Names;
use crate::value::{CheapClone, JsValue};

pub(crate) fn constructor_spec(names: &Names) -> NativeFunctionSpec {
    NativeFunctionSpec::constructor(&names.object, 1, object_call, object_construct)
}

pub(crate) fn init(agent: &mut Agent) -> JsResult<()> {
    super::link_constructor(agent, Intrinsic::Object, Intrinsic::ObjectPrototype)?;

    let names = agent.names().clone();
    let ctor = agent.intrinsic(Intrinsic::Object)?;
    let statics = [
        NativeFunctionSpec::method(&names.create, 2, object_create),
        NativeFunctionSpec::method(&names.define_property, 3, object_define_property),
        NativeFunctionSpec::method(
            &names.get_own_property_descriptor,
            2,
            object_get_own_property_descriptor,
        ),
        NativeFunctionSpec::method(&names.get_prototype_of, 1, object_get_prototype_of),
        NativeFunctionSpec::method(&names.is, 2, object_is),
        NativeFunctionSpec::method(&names.is_extensible, 1, object_is_extensible),
        NativeFunctionSpec::method(&names.prevent_extensions, 1, object_prevent_extensions),
        NativeFunctionSpec::method(&names.set_prototype_of, 2, object_set_prototype_of),
    ];
    for spec in statics {
        agent.register_method(&ctor, spec)?;
    }

    let proto = agent.intrinsic(Intrinsic::ObjectPrototype)?;
    let methods = [
        NativeFunctionSpec::method(&names.has_own_property, 1, object_proto_has_own_property),
        NativeFunctionSpec::method(&names.is_prototype_of, 1, object_proto_is_prototype_of),
        NativeFunctionSpec::method(
            &names.property_is_enumerable,
            1,
            object_proto_property_is_enumerable,
        ),
        NativeFunctionSpec::method(&names.to_string, 0, object_proto_to_string),
        NativeFunctionSpec::method(&names.value_of, 0, object_proto_value_of),
    ];
    for spec in methods {
        agent.register_method(&proto, spec)?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Constructor
// ═══════════════════════════════════════════════════════════════════════════

/// Object(value) without `new`
fn object_call(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    object_from_value(agent, &args.get(0)).map(JsValue::Object)
}

fn object_construct(
    agent: &mut Agent,
    args: &Arguments<'_>,
    new_target: &JsObjectRef,
) -> JsResult<JsObjectRef> {
    let active = agent
        .active_function()
        .ok_or_else(|| JsError::internal("Object constructor running without a function"))?;
    if !Gc::ptr_eq(&active, new_target) {
        return agent.ordinary_create_from_constructor(
            new_target,
            Intrinsic::ObjectPrototype,
            ObjectKind::Ordinary,
        );
    }
    object_from_value(agent, &args.get(0))
}

fn object_from_value(agent: &mut Agent, value: &JsValue) -> JsResult<JsObjectRef> {
    if value.is_nullish() {
        return agent.create_plain_object();
    }
    agent.to_object(value)
}

// ═══════════════════════════════════════════════════════════════════════════
// Statics
// ═══════════════════════════════════════════════════════════════════════════

/// Object.getPrototypeOf(O)
fn object_get_prototype_of(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let obj = agent.to_object(&args.get(0))?;
    Ok(JsValue::from(agent.get_prototype_of(&obj)))
}

/// The object-or-null argument of setPrototypeOf and create
fn prototype_argument(agent: &mut Agent, value: &JsValue) -> JsResult<Option<JsObjectRef>> {
    match value {
        JsValue::Object(obj) => Ok(Some(obj.cheap_clone())),
        JsValue::Null => Ok(None),
        other => Err(agent.throw(ErrorType::InvalidPrototype(agent.to_display_string(other)))),
    }
}

/// Object.setPrototypeOf(O, proto)
fn object_set_prototype_of(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let target = args.get(0);
    agent.require_object_coercible(&target)?;
    let proto = prototype_argument(agent, &args.get(1))?;
    if let JsValue::Object(obj) = &target {
        agent.set_prototype_of_or_throw(obj, proto)?;
    }
    Ok(target)
}

/// Object.defineProperty(O, P, Attributes)
fn object_define_property(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let target = args.get(0);
    let JsValue::Object(obj) = &target else {
        return Err(agent.throw(ErrorType::NotAnObject(agent.to_display_string(&target))));
    };
    let key = agent.to_property_key(&args.get(1))?;
    let desc = agent.to_property_descriptor(&args.get(2))?;
    agent.define_property_or_throw(obj, &key, desc)?;
    Ok(target)
}

/// Object.getOwnPropertyDescriptor(O, P)
fn object_get_own_property_descriptor(
    agent: &mut Agent,
    _this: &JsValue,
    args: &Arguments<'_>,
) -> JsResult<JsValue> {
    let obj = agent.to_object(&args.get(0))?;
    let key = agent.to_property_key(&args.get(1))?;
    let desc = agent.get_own_property(&obj, &key);
    agent.from_property_descriptor(desc)
}

/// Object.create(O, Properties)
fn object_create(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let proto = prototype_argument(agent, &args.get(0))?;
    let obj = agent.create_object(proto);
    let properties = args.get(1);
    if !properties.is_undefined() {
        define_properties(agent, &obj, &properties)?;
    }
    Ok(JsValue::Object(obj))
}

/// ObjectDefineProperties: every descriptor is validated before any is
/// applied
fn define_properties(agent: &mut Agent, obj: &JsObjectRef, properties: &JsValue) -> JsResult<()> {
    let props = agent.to_object(properties)?;
    let mut descriptors: Vec<(PropertyKey, PropertyDescriptor)> = Vec::new();
    for key in agent.own_property_keys(&props) {
        let enumerable = agent
            .get_own_property(&props, &key)
            .is_some_and(|desc| desc.enumerable == Some(true));
        if !enumerable {
            continue;
        }
        let desc_obj = agent.get(&props, &key)?;
        let desc = agent.to_property_descriptor(&desc_obj)?;
        descriptors.push((key, desc));
    }
    for (key, desc) in descriptors {
        agent.define_property_or_throw(obj, &key, desc)?;
    }
    Ok(())
}

/// Object.preventExtensions(O)
fn object_prevent_extensions(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let target = args.get(0);
    if let JsValue::Object(obj) = &target {
        if !agent.prevent_extensions(obj) {
            return Err(agent.throw(ErrorType::PreventExtensionsFailed));
        }
    }
    Ok(target)
}

/// Object.isExtensible(O)
fn object_is_extensible(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let result = match args.get(0) {
        JsValue::Object(obj) => agent.is_extensible(&obj),
        _ => false,
    };
    Ok(JsValue::Boolean(result))
}

/// Object.is(a, b)
fn object_is(_agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(args.get(0).same_value(&args.get(1))))
}

// ═══════════════════════════════════════════════════════════════════════════
// Object.prototype
// ═══════════════════════════════════════════════════════════════════════════

/// Object.prototype.hasOwnProperty(V)
fn object_proto_has_own_property(
    agent: &mut Agent,
    this: &JsValue,
    args: &Arguments<'_>,
) -> JsResult<JsValue> {
    let key = agent.to_property_key(&args.get(0))?;
    let obj = agent.to_object(this)?;
    Ok(JsValue::Boolean(agent.has_own_property(&obj, &key)))
}

/// Object.prototype.isPrototypeOf(V)
fn object_proto_is_prototype_of(
    agent: &mut Agent,
    this: &JsValue,
    args: &Arguments<'_>,
) -> JsResult<JsValue> {
    let JsValue::Object(value) = args.get(0) else {
        return Ok(JsValue::Boolean(false));
    };
    let obj = agent.to_object(this)?;
    let mut current = agent.get_prototype_of(&value);
    while let Some(proto) = current {
        if Gc::ptr_eq(&proto, &obj) {
            return Ok(JsValue::Boolean(true));
        }
        current = agent.get_prototype_of(&proto);
    }
    Ok(JsValue::Boolean(false))
}

/// Object.prototype.propertyIsEnumerable(V)
fn object_proto_property_is_enumerable(
    agent: &mut Agent,
    this: &JsValue,
    args: &Arguments<'_>,
) -> JsResult<JsValue> {
    let key = agent.to_property_key(&args.get(0))?;
    let obj = agent.to_object(this)?;
    let enumerable = agent
        .get_own_property(&obj, &key)
        .is_some_and(|desc| desc.enumerable == Some(true));
    Ok(JsValue::Boolean(enumerable))
}

/// Object.prototype.toString: `[object Tag]`, honouring `@@toStringTag`
fn object_proto_to_string(agent: &mut Agent, this: &JsValue, _args: &Arguments<'_>) -> JsResult<JsValue> {
    match this {
        JsValue::Undefined => return Ok(JsValue::from("[object Undefined]")),
        JsValue::Null => return Ok(JsValue::from("[object Null]")),
        _ => {}
    }
    let obj = agent.to_object(this)?;
    let builtin_tag = {
        let o = obj.borrow();
        match &o.kind {
            ObjectKind::NativeFunction(_) | ObjectKind::BoundFunction(_) => "Function",
            ObjectKind::Error => "Error",
            ObjectKind::Primitive(JsValue::Boolean(_)) => "Boolean",
            ObjectKind::Primitive(JsValue::Number(_)) => "Number",
            ObjectKind::Primitive(JsValue::String(_)) => "String",
            _ => "Object",
        }
    };
    let tag_key = PropertyKey::from(agent.well_known().to_string_tag.cheap_clone());
    let tag = match agent.get(&obj, &tag_key)? {
        JsValue::String(tag) => tag.to_string(),
        _ => builtin_tag.to_string(),
    };
    Ok(JsValue::from(format!("[object {}]", tag)))
}

/// Object.prototype.valueOf
fn object_proto_value_of(agent: &mut Agent, this: &JsValue, _args: &Arguments<'_>) -> JsResult<JsValue> {
    agent.to_object(this).map(JsValue::Object)
}
