//! Symbol, Symbol.for / Symbol.keyFor and Symbol.prototype

use super::{assert_throws, call_method, call_static, construct_global, get, get_global, s, with_realm};
use realmjs::{ErrorKind, JsValue, PropertyKey, WellKnownSymbol};

#[test]
fn test_symbol_for_same_description_is_identical() {
    with_realm(|agent| {
        for description in ["app", "", "Symbol.iterator", "ключ"] {
            let a = call_static(agent, "Symbol", "for", &[s(description)])?;
            let b = call_static(agent, "Symbol", "for", &[s(description)])?;
            assert!(a.is_symbol());
            assert!(a.strict_equals(&b), "Symbol.for({:?}) not stable", description);
        }
        Ok(())
    });
}

#[test]
fn test_symbol_for_distinct_descriptions_differ() {
    with_realm(|agent| {
        let a = call_static(agent, "Symbol", "for", &[s("a")])?;
        let b = call_static(agent, "Symbol", "for", &[s("b")])?;
        assert!(!a.strict_equals(&b));
        Ok(())
    });
}

#[test]
fn test_symbol_for_coerces_key() {
    with_realm(|agent| {
        let from_number = call_static(agent, "Symbol", "for", &[JsValue::from(42)])?;
        let from_string = call_static(agent, "Symbol", "for", &[s("42")])?;
        assert!(from_number.strict_equals(&from_string));

        let from_undefined = call_static(agent, "Symbol", "for", &[])?;
        let key = call_static(agent, "Symbol", "keyFor", &[from_undefined])?;
        assert_eq!(key, s("undefined"));
        Ok(())
    });
}

#[test]
fn test_key_for_registered_symbol() {
    with_realm(|agent| {
        let sym = call_static(agent, "Symbol", "for", &[s("x")])?;
        let key = call_static(agent, "Symbol", "keyFor", &[sym])?;
        assert_eq!(key, s("x"));
        Ok(())
    });
}

#[test]
fn test_key_for_unregistered_symbol_is_undefined() {
    with_realm(|agent| {
        let symbol_ctor = get_global(agent, "Symbol")?;
        let sym = agent.call(&symbol_ctor, &JsValue::Undefined, &[s("x")])?;
        let key = call_static(agent, "Symbol", "keyFor", &[sym])?;
        assert!(key.is_undefined());

        let iterator = get(agent, &symbol_ctor, "iterator")?;
        let key = call_static(agent, "Symbol", "keyFor", &[iterator])?;
        assert!(key.is_undefined());
        Ok(())
    });
}

#[test]
fn test_key_for_non_symbol_throws_type_error() {
    with_realm(|agent| {
        for value in [JsValue::from(42), s("x"), JsValue::Undefined, JsValue::Null] {
            let result = call_static(agent, "Symbol", "keyFor", &[value]);
            assert_throws(agent, result, ErrorKind::TypeError);
        }
        Ok(())
    });
}

#[test]
fn test_new_symbol_throws_type_error() {
    with_realm(|agent| {
        for args in [vec![], vec![s("desc")], vec![JsValue::Undefined, JsValue::from(1)]] {
            let result = construct_global(agent, "Symbol", &args);
            assert_throws(agent, result, ErrorKind::TypeError);
        }
        Ok(())
    });
}

#[test]
fn test_new_symbol_message() {
    with_realm(|agent| {
        let err = construct_global(agent, "Symbol", &[]).unwrap_err();
        assert_eq!(err.to_string(), "Uncaught TypeError: Symbol is not a constructor");
        Ok(())
    });
}

#[test]
fn test_symbol_call_creates_unique_symbols() {
    with_realm(|agent| {
        let ctor = get_global(agent, "Symbol")?;
        let a = agent.call(&ctor, &JsValue::Undefined, &[s("same")])?;
        let b = agent.call(&ctor, &JsValue::Undefined, &[s("same")])?;
        assert!(!a.strict_equals(&b));
        assert!(!a.as_symbol().unwrap().is_global());

        let none = agent.call(&ctor, &JsValue::Undefined, &[])?;
        assert!(none.as_symbol().unwrap().description().is_none());
        let described = agent.call(&ctor, &JsValue::Undefined, &[JsValue::from(7)])?;
        assert_eq!(described.as_symbol().unwrap().description().unwrap().as_str(), "7");
        Ok(())
    });
}

#[test]
fn test_symbol_description_to_string_throws() {
    with_realm(|agent| {
        let ctor = get_global(agent, "Symbol")?;
        let sym = agent.call(&ctor, &JsValue::Undefined, &[])?;
        let result = agent.call(&ctor, &JsValue::Undefined, &[sym]);
        assert_throws(agent, result, ErrorKind::TypeError);
        Ok(())
    });
}

#[test]
fn test_well_known_symbols_installed_frozen() {
    with_realm(|agent| {
        let ctor = get_global(agent, "Symbol")?;
        let ctor = ctor.as_object().unwrap().clone();
        for &which in WellKnownSymbol::ALL {
            let key = PropertyKey::from(which.external_name());
            let desc = agent.get_own_property(&ctor, &key).expect("missing well-known symbol");
            assert_eq!(desc.writable, Some(false));
            assert_eq!(desc.enumerable, Some(false));
            assert_eq!(desc.configurable, Some(false));
            let value = desc.value.unwrap();
            assert!(value.strict_equals(&JsValue::Symbol(agent.well_known_symbol(which))));
        }
        Ok(())
    });
}

#[test]
fn test_well_known_symbols_shared_across_realms() {
    let (mut agent, first) = super::create_agent_with_realm();
    let second = agent.create_realm().unwrap();
    let a = agent
        .run_in_realm(first, |agent| {
            let ctor = get_global(agent, "Symbol")?;
            get(agent, &ctor, "iterator")
        })
        .unwrap();
    let b = agent
        .run_in_realm(second, |agent| {
            let ctor = get_global(agent, "Symbol")?;
            get(agent, &ctor, "iterator")
        })
        .unwrap();
    assert!(a.strict_equals(&b));
}

#[test]
fn test_registry_is_agent_wide() {
    let (mut agent, first) = super::create_agent_with_realm();
    let second = agent.create_realm().unwrap();
    let a = agent
        .run_in_realm(first, |agent| call_static(agent, "Symbol", "for", &[s("shared")]))
        .unwrap();
    let b = agent
        .run_in_realm(second, |agent| call_static(agent, "Symbol", "for", &[s("shared")]))
        .unwrap();
    assert!(a.strict_equals(&b));
    assert_eq!(agent.symbol_registry().len(), 1);
}

#[test]
fn test_registries_do_not_cross_agents() {
    let a = with_realm(|agent| call_static(agent, "Symbol", "for", &[s("k")]));
    let b = with_realm(|agent| call_static(agent, "Symbol", "for", &[s("k")]));
    assert!(!a.strict_equals(&b));
}

#[test]
fn test_symbol_constructor_shape() {
    with_realm(|agent| {
        let ctor = get_global(agent, "Symbol")?;
        let ctor_obj = ctor.as_object().unwrap().clone();
        assert_eq!(get(agent, &ctor, "length")?, JsValue::from(0));
        assert_eq!(get(agent, &ctor, "name")?, s("Symbol"));

        let length = agent.get_own_property(&ctor_obj, &PropertyKey::from("length")).unwrap();
        assert_eq!(length.configurable, Some(true));
        assert_eq!(length.writable, Some(false));

        let proto = agent.get_own_property(&ctor_obj, &PropertyKey::from("prototype")).unwrap();
        assert_eq!(proto.writable, Some(false));
        assert_eq!(proto.enumerable, Some(false));
        assert_eq!(proto.configurable, Some(false));

        let for_fn = get(agent, &ctor, "for")?;
        assert_eq!(get(agent, &for_fn, "length")?, JsValue::from(1));
        let key_for = get(agent, &ctor, "keyFor")?;
        assert_eq!(get(agent, &key_for, "length")?, JsValue::from(1));
        Ok(())
    });
}

#[test]
fn test_symbol_prototype_methods() {
    with_realm(|agent| {
        let ctor = get_global(agent, "Symbol")?;
        let sym = agent.call(&ctor, &JsValue::Undefined, &[s("tag")])?;
        assert_eq!(call_method(agent, &sym, "toString", &[])?, s("Symbol(tag)"));
        assert!(call_method(agent, &sym, "valueOf", &[])?.strict_equals(&sym));
        assert_eq!(get(agent, &sym, "description")?, s("tag"));

        let bare = agent.call(&ctor, &JsValue::Undefined, &[])?;
        assert_eq!(call_method(agent, &bare, "toString", &[])?, s("Symbol()"));
        assert!(get(agent, &bare, "description")?.is_undefined());
        Ok(())
    });
}

#[test]
fn test_symbol_prototype_rejects_other_receivers() {
    with_realm(|agent| {
        let ctor = get_global(agent, "Symbol")?;
        let proto = get(agent, &ctor, "prototype")?;
        let to_string = get(agent, &proto, "toString")?;
        let result = agent.call(&to_string, &s("not a symbol"), &[]);
        assert_throws(agent, result, ErrorKind::TypeError);
        let result = agent.call(&to_string, &proto, &[]);
        assert_throws(agent, result, ErrorKind::TypeError);
        Ok(())
    });
}

#[test]
fn test_symbol_wrapper_object() {
    with_realm(|agent| {
        let ctor = get_global(agent, "Symbol")?;
        let sym = agent.call(&ctor, &JsValue::Undefined, &[s("boxed")])?;
        let object_ctor = get_global(agent, "Object")?;
        let boxed = agent.call(&object_ctor, &JsValue::Undefined, &[sym.clone()])?;
        assert!(boxed.is_object());
        assert!(call_method(agent, &boxed, "valueOf", &[])?.strict_equals(&sym));
        assert_eq!(
            call_method(agent, &boxed, "toString", &[])?,
            s("Symbol(boxed)")
        );
        Ok(())
    });
}

#[test]
fn test_symbol_to_primitive_and_tag() {
    with_realm(|agent| {
        let proto = agent.intrinsic(realmjs::Intrinsic::SymbolPrototype)?;
        let to_primitive = PropertyKey::from(agent.well_known().to_primitive.clone());
        let desc = agent.get_own_property(&proto, &to_primitive).unwrap();
        assert_eq!(desc.writable, Some(false));
        assert_eq!(desc.configurable, Some(true));
        let func = desc.value.unwrap();
        assert_eq!(get(agent, &func, "name")?, s("[Symbol.toPrimitive]"));

        let tag = PropertyKey::from(agent.well_known().to_string_tag.clone());
        let tag = agent.get_own_property(&proto, &tag).unwrap();
        assert_eq!(tag.value, Some(s("Symbol")));
        assert_eq!(tag.configurable, Some(true));
        assert_eq!(tag.writable, Some(false));

        let getter = agent
            .get_own_property(&proto, &PropertyKey::from("description"))
            .unwrap();
        assert!(getter.is_accessor_descriptor());
        let get_fn = JsValue::from(getter.get.unwrap());
        assert_eq!(get(agent, &get_fn, "name")?, s("get description"));
        Ok(())
    });
}

#[test]
fn test_symbol_property_keys() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        let sym = JsValue::Symbol(agent.new_symbol(None));
        let key = agent.to_property_key(&sym)?;
        agent.create_data_property_or_throw(&obj, &key, JsValue::from(1))?;
        assert_eq!(agent.get(&obj, &key)?, JsValue::from(1));
        assert!(agent.get(&obj, &PropertyKey::from("Symbol()"))?.is_undefined());

        let attrs = agent.get_own_property(&obj, &key).unwrap();
        assert_eq!(attrs.enumerable, Some(true));
        assert_eq!(attrs.writable, Some(true));
        Ok(())
    });
}
