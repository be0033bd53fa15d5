//! Default bindings on the global object

use crate::agent::Agent;
use crate::error::{ErrorKind, JsResult};
use crate::object::{Attributes, PropertyKey};
use crate::realm::Intrinsic;
use crate::value::{CheapClone, JsValue};

pub(crate) fn init(agent: &mut Agent) -> JsResult<()> {
    let names = agent.names().clone();
    let global = agent.running_realm()?.global_object().cheap_clone();

    let mut bindings = vec![
        (names.global_this.cheap_clone(), global.cheap_clone()),
        (names.object.cheap_clone(), agent.intrinsic(Intrinsic::Object)?),
        (names.symbol.cheap_clone(), agent.intrinsic(Intrinsic::Symbol)?),
        (names.weak_ref.cheap_clone(), agent.intrinsic(Intrinsic::WeakRef)?),
    ];
    for kind in ErrorKind::ALL {
        let ctor = agent.intrinsic(Intrinsic::error_constructor(kind))?;
        bindings.push((agent.intern(kind.name()), ctor));
    }

    let mut g = global.borrow_mut();
    for (name, value) in bindings {
        g.insert_data(
            PropertyKey::from(name),
            JsValue::Object(value),
            Attributes::WRITABLE_CONFIGURABLE,
        );
    }
    g.insert_data(PropertyKey::from(&names.nan), JsValue::Number(f64::NAN), Attributes::NONE);
    g.insert_data(
        PropertyKey::from(&names.infinity),
        JsValue::Number(f64::INFINITY),
        Attributes::NONE,
    );
    g.insert_data(PropertyKey::from(&names.undefined), JsValue::Undefined, Attributes::NONE);
    Ok(())
}
