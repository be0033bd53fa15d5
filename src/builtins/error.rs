//! Error, the native error constructors and %AggregateError.prototype%

use crate::agent::Agent;
use crate::error::{ErrorKind, ErrorType, JsError, JsResult};
use crate::native::{Arguments, NativeFunctionSpec};
use crate::object::{Attributes, JsObjectRef, ObjectKind, PropertyKey};
use crate::realm::Intrinsic;
use crate::string_dict::Names;
use crate::value::{CheapClone, JsString, JsValue};

fn constructor_name(names: &Names, kind: ErrorKind) -> &JsString {
    match kind {
        ErrorKind::Error => &names.error,
        ErrorKind::TypeError => &names.type_error,
        ErrorKind::RangeError => &names.range_error,
        ErrorKind::ReferenceError => &names.reference_error,
        ErrorKind::SyntaxError => &names.syntax_error,
        ErrorKind::EvalError => &names.eval_error,
        ErrorKind::UriError => &names.uri_error,
    }
}

macro_rules! error_constructors {
    ($($kind:ident => $call:ident, $construct:ident;)*) => {
        $(
            fn $call(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
                // Called as a function, NewTarget is the active function
                let new_target = agent
                    .active_function()
                    .ok_or_else(|| JsError::internal("error constructor running without a function"))?;
                construct_error(agent, ErrorKind::$kind, args, &new_target).map(JsValue::Object)
            }

            fn $construct(
                agent: &mut Agent,
                args: &Arguments<'_>,
                new_target: &JsObjectRef,
            ) -> JsResult<JsObjectRef> {
                construct_error(agent, ErrorKind::$kind, args, new_target)
            }
        )*

        pub(crate) fn constructor_spec(names: &Names, kind: ErrorKind) -> NativeFunctionSpec {
            let key = constructor_name(names, kind);
            match kind {
                $(ErrorKind::$kind => NativeFunctionSpec::constructor(key, 1, $call, $construct),)*
            }
        }
    };
}

error_constructors! {
    Error => error_call, error_construct;
    TypeError => type_error_call, type_error_construct;
    RangeError => range_error_call, range_error_construct;
    ReferenceError => reference_error_call, reference_error_construct;
    SyntaxError => syntax_error_call, syntax_error_construct;
    EvalError => eval_error_call, eval_error_construct;
    UriError => uri_error_call, uri_error_construct;
}

/// Shared body of `Error(message, options)` and the native errors
fn construct_error(
    agent: &mut Agent,
    kind: ErrorKind,
    args: &Arguments<'_>,
    new_target: &JsObjectRef,
) -> JsResult<JsObjectRef> {
    let error = agent.ordinary_create_from_constructor(
        new_target,
        Intrinsic::error_prototype(kind),
        ObjectKind::Error,
    )?;

    let message = args.get(0);
    if !message.is_undefined() {
        let message = agent.to_string(&message)?;
        let key = PropertyKey::from(&agent.names().message);
        agent.create_non_enumerable_data_property_or_throw(&error, &key, JsValue::String(message))?;
    }
    install_error_cause(agent, &error, &args.get(1))?;
    Ok(error)
}

/// InstallErrorCause
fn install_error_cause(agent: &mut Agent, error: &JsObjectRef, options: &JsValue) -> JsResult<()> {
    let JsValue::Object(options) = options else {
        return Ok(());
    };
    let key = PropertyKey::from(&agent.names().cause);
    if agent.has_property(options, &key) {
        let cause = agent.get(options, &key)?;
        agent.create_non_enumerable_data_property_or_throw(error, &key, cause)?;
    }
    Ok(())
}

/// Install `name` and `message` on an error prototype
fn install_name_and_message(agent: &mut Agent, proto: &JsObjectRef, name: &str) {
    let names = agent.names();
    let name_key = PropertyKey::from(&names.name);
    let message_key = PropertyKey::from(&names.message);
    let name = agent.intern(name);
    let mut p = proto.borrow_mut();
    p.insert_data(name_key, JsValue::String(name), Attributes::WRITABLE_CONFIGURABLE);
    p.insert_data(message_key, JsValue::from(""), Attributes::WRITABLE_CONFIGURABLE);
}

pub(crate) fn init(agent: &mut Agent) -> JsResult<()> {
    let error_ctor = agent.intrinsic(Intrinsic::Error)?;
    for kind in ErrorKind::ALL {
        let ctor = Intrinsic::error_constructor(kind);
        let proto = Intrinsic::error_prototype(kind);
        super::link_constructor(agent, ctor, proto)?;
        let proto = agent.intrinsic(proto)?;
        install_name_and_message(agent, &proto, kind.name());

        // NativeError constructors inherit from %Error%
        if kind != ErrorKind::Error {
            agent.intrinsic(ctor)?.borrow_mut().prototype = Some(error_ctor.cheap_clone());
        }
    }

    let error_proto = agent.intrinsic(Intrinsic::ErrorPrototype)?;
    let to_string = agent.names().to_string.cheap_clone();
    agent.register_method(
        &error_proto,
        NativeFunctionSpec::method(to_string, 0, error_proto_to_string),
    )?;
    Ok(())
}

/// %AggregateError.prototype%: `name` and `message` live on the prototype
pub(crate) fn init_aggregate_error_prototype(agent: &mut Agent) -> JsResult<()> {
    let proto = agent.intrinsic(Intrinsic::AggregateErrorPrototype)?;
    let name = agent.names().aggregate_error.cheap_clone();
    install_name_and_message(agent, &proto, name.as_str());
    Ok(())
}

/// Error.prototype.toString
fn error_proto_to_string(agent: &mut Agent, this: &JsValue, _args: &Arguments<'_>) -> JsResult<JsValue> {
    let JsValue::Object(obj) = this else {
        return Err(agent.throw(ErrorType::IncompatibleReceiver {
            method: "Error.prototype.toString".to_string(),
            receiver: agent.to_display_string(this),
        }));
    };
    let names = agent.names().clone();

    let name = match agent.get(obj, &PropertyKey::from(&names.name))? {
        JsValue::Undefined => names.error.cheap_clone(),
        other => agent.to_string(&other)?,
    };
    let message = match agent.get(obj, &PropertyKey::from(&names.message))? {
        JsValue::Undefined => JsString::from(""),
        other => agent.to_string(&other)?,
    };

    if name.is_empty() {
        return Ok(JsValue::String(message));
    }
    if message.is_empty() {
        return Ok(JsValue::String(name));
    }
    Ok(JsValue::from(format!("{}: {}", name, message)))
}
