//! Symbol constructor and Symbol.prototype

use crate::agent::{Agent, WellKnownSymbol};
use crate::error::{ErrorType, JsResult};
use crate::native::{Arguments, NativeFunctionSpec};
use crate::object::{Attributes, JsObjectRef, ObjectKind, PropertyKey};
use crate::realm::Intrinsic;
use crate::string_dict::Names;
use crate::value::{CheapClone, JsSymbol, JsValue};

pub(crate) fn constructor_spec(names: &Names) -> NativeFunctionSpec {
    NativeFunctionSpec::constructor(&names.symbol, 0, symbol_call, symbol_construct)
}

pub(crate) fn init(agent: &mut Agent) -> JsResult<()> {
    super::link_constructor(agent, Intrinsic::Symbol, Intrinsic::SymbolPrototype)?;

    let names = agent.names().clone();
    let ctor = agent.intrinsic(Intrinsic::Symbol)?;
    agent.register_method(&ctor, NativeFunctionSpec::method(&names.for_, 1, symbol_for))?;
    agent.register_method(&ctor, NativeFunctionSpec::method(&names.key_for, 1, symbol_key_for))?;

    // Every realm shares the agent's well-known symbols
    for &which in WellKnownSymbol::ALL {
        let key = PropertyKey::from(agent.intern(which.external_name()));
        let symbol = agent.well_known_symbol(which);
        ctor.borrow_mut()
            .insert_data(key, JsValue::Symbol(symbol), Attributes::NONE);
    }

    let proto = agent.intrinsic(Intrinsic::SymbolPrototype)?;
    agent.register_method(
        &proto,
        NativeFunctionSpec::method(&names.to_string, 0, symbol_proto_to_string),
    )?;
    agent.register_method(
        &proto,
        NativeFunctionSpec::method(&names.value_of, 0, symbol_proto_value_of),
    )?;
    agent.register_getter(
        &proto,
        NativeFunctionSpec::getter(&names.description, symbol_proto_description),
    )?;
    let to_primitive = agent.well_known().to_primitive.cheap_clone();
    agent.register_method(
        &proto,
        NativeFunctionSpec::method(to_primitive, 1, symbol_proto_to_primitive)
            .with_attributes(Attributes::CONFIGURABLE),
    )?;
    super::install_to_string_tag(agent, Intrinsic::SymbolPrototype, "Symbol")
}

/// Symbol([description])
fn symbol_call(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let description = match args.get(0) {
        JsValue::Undefined => None,
        value => Some(agent.to_string(&value)?),
    };
    Ok(JsValue::Symbol(agent.new_symbol(description)))
}

/// `new Symbol()` always throws
fn symbol_construct(
    agent: &mut Agent,
    _args: &Arguments<'_>,
    _new_target: &JsObjectRef,
) -> JsResult<JsObjectRef> {
    Err(agent.throw(ErrorType::NotAConstructor("Symbol".to_string())))
}

/// Symbol.for(key)
fn symbol_for(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let key = agent.to_string(&args.get(0))?;
    Ok(JsValue::Symbol(agent.symbol_for(key)))
}

/// Symbol.keyFor(sym)
fn symbol_key_for(agent: &mut Agent, _this: &JsValue, args: &Arguments<'_>) -> JsResult<JsValue> {
    let value = args.get(0);
    let JsValue::Symbol(symbol) = &value else {
        return Err(agent.throw(ErrorType::NotASymbol(agent.to_display_string(&value))));
    };
    Ok(agent
        .key_for(symbol)
        .map_or(JsValue::Undefined, JsValue::String))
}

/// thisSymbolValue
fn this_symbol_value(agent: &mut Agent, this: &JsValue, method: &str) -> JsResult<JsSymbol> {
    match this {
        JsValue::Symbol(symbol) => return Ok(symbol.cheap_clone()),
        JsValue::Object(obj) => {
            if let ObjectKind::Symbol(symbol) = &obj.borrow().kind {
                return Ok(symbol.cheap_clone());
            }
        }
        _ => {}
    }
    Err(agent.throw(ErrorType::IncompatibleReceiver {
        method: method.to_string(),
        receiver: agent.to_display_string(this),
    }))
}

fn symbol_proto_to_string(agent: &mut Agent, this: &JsValue, _args: &Arguments<'_>) -> JsResult<JsValue> {
    let symbol = this_symbol_value(agent, this, "Symbol.prototype.toString")?;
    Ok(JsValue::from(symbol.descriptive_string()))
}

fn symbol_proto_value_of(agent: &mut Agent, this: &JsValue, _args: &Arguments<'_>) -> JsResult<JsValue> {
    this_symbol_value(agent, this, "Symbol.prototype.valueOf").map(JsValue::Symbol)
}

fn symbol_proto_description(
    agent: &mut Agent,
    this: &JsValue,
    _args: &Arguments<'_>,
) -> JsResult<JsValue> {
    let symbol = this_symbol_value(agent, this, "Symbol.prototype.description")?;
    Ok(symbol
        .description()
        .map_or(JsValue::Undefined, |d| JsValue::String(d.cheap_clone())))
}

fn symbol_proto_to_primitive(
    agent: &mut Agent,
    this: &JsValue,
    _args: &Arguments<'_>,
) -> JsResult<JsValue> {
    this_symbol_value(agent, this, "Symbol.prototype [ @@toPrimitive ]").map(JsValue::Symbol)
}
