//! Built-in objects installed into every realm.
//!
//! `Realm::new` allocates the intrinsic objects; the `init` function of each
//! module then installs their properties while running inside the realm.

pub(crate) mod async_function;
pub(crate) mod error;
pub(crate) mod function;
mod global;
mod object;
mod symbol;
mod weak_ref;

use crate::agent::Agent;
use crate::error::{ErrorKind, JsResult};
use crate::native::NativeFunctionSpec;
use crate::object::{Attributes, PropertyKey};
use crate::realm::Intrinsic;
use crate::string_dict::Names;
use crate::value::{CheapClone, JsValue};

/// The intrinsic constructors, with the descriptors they are created from
pub(crate) fn constructor_specs(names: &Names) -> Vec<(Intrinsic, NativeFunctionSpec)> {
    let mut specs = vec![(Intrinsic::Object, object::constructor_spec(names))];
    specs.extend(
        ErrorKind::ALL
            .iter()
            .map(|&kind| (Intrinsic::error_constructor(kind), error::constructor_spec(names, kind))),
    );
    specs.push((Intrinsic::Symbol, symbol::constructor_spec(names)));
    specs.push((Intrinsic::WeakRef, weak_ref::constructor_spec(names)));
    specs
}

/// Install the properties of every intrinsic in the running realm
pub(crate) fn initialize_realm(agent: &mut Agent) -> JsResult<()> {
    object::init(agent)?;
    function::init(agent)?;
    error::init(agent)?;
    error::init_aggregate_error_prototype(agent)?;
    symbol::init(agent)?;
    async_function::init(agent)?;
    weak_ref::init(agent)?;
    if agent.options().install_global_bindings {
        global::init(agent)?;
    }
    Ok(())
}

/// Wire `constructor.prototype` and `prototype.constructor`
fn link_constructor(agent: &mut Agent, constructor: Intrinsic, prototype: Intrinsic) -> JsResult<()> {
    let ctor = agent.intrinsic(constructor)?;
    let proto = agent.intrinsic(prototype)?;
    let names = agent.names();
    ctor.borrow_mut().insert_data(
        PropertyKey::from(&names.prototype),
        JsValue::Object(proto.cheap_clone()),
        Attributes::NONE,
    );
    proto.borrow_mut().insert_data(
        PropertyKey::from(&names.constructor),
        JsValue::Object(ctor),
        Attributes::WRITABLE_CONFIGURABLE,
    );
    Ok(())
}

/// `@@toStringTag`, non-writable and non-enumerable
fn install_to_string_tag(agent: &mut Agent, holder: Intrinsic, tag: &str) -> JsResult<()> {
    let holder = agent.intrinsic(holder)?;
    let key = PropertyKey::from(agent.well_known().to_string_tag.cheap_clone());
    let tag = agent.intern(tag);
    holder
        .borrow_mut()
        .insert_data(key, JsValue::String(tag), Attributes::CONFIGURABLE);
    Ok(())
}
