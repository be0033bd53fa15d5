//! Object model: property lookup, attributes, prototypes and the Object
//! built-ins

use super::{assert_throws, call_method, call_static, get, get_global, s, with_realm};
use realmjs::{Attributes, ErrorKind, Gc, JsValue, PropertyDescriptor, PropertyKey};

#[test]
fn test_missing_key_walks_chain_to_undefined() {
    with_realm(|agent| {
        let root = agent.create_object(None);
        let mut obj = root.clone();
        for _ in 0..64 {
            obj = agent.create_object(Some(obj));
        }
        assert!(agent.get(&obj, &PropertyKey::from("missing"))?.is_undefined());

        root.borrow_mut()
            .insert_data(PropertyKey::from("deep"), JsValue::from(1), Attributes::ALL);
        assert_eq!(agent.get(&obj, &PropertyKey::from("deep"))?, JsValue::from(1));
        Ok(())
    });
}

#[test]
fn test_null_prototype_terminates() {
    with_realm(|agent| {
        let obj = agent.create_object(None);
        assert!(agent.get(&obj, &PropertyKey::from("toString"))?.is_undefined());
        assert!(!agent.has_property(&obj, &PropertyKey::from("toString")));
        Ok(())
    });
}

#[test]
fn test_self_cycle_rejected_without_mutation() {
    with_realm(|agent| {
        let proto = agent.create_plain_object()?;
        let obj = agent.create_object(Some(proto.clone()));
        assert!(!agent.set_prototype_of(&obj, Some(obj.clone())));
        assert!(Gc::ptr_eq(&agent.get_prototype_of(&obj).unwrap(), &proto));
        Ok(())
    });
}

#[test]
fn test_indirect_cycle_rejected_without_mutation() {
    with_realm(|agent| {
        let a = agent.create_plain_object()?;
        let b = agent.create_object(Some(a.clone()));
        let c = agent.create_object(Some(b.clone()));
        let before = agent.get_prototype_of(&a);

        assert!(!agent.set_prototype_of(&a, Some(c.clone())));
        let after = agent.get_prototype_of(&a);
        assert!(Gc::ptr_eq(&before.unwrap(), &after.unwrap()));

        let result = call_static(
            agent,
            "Object",
            "setPrototypeOf",
            &[JsValue::Object(a.clone()), JsValue::Object(c)],
        );
        assert_throws(agent, result, ErrorKind::TypeError);
        assert!(Gc::ptr_eq(&agent.get_prototype_of(&b).unwrap(), &a));
        Ok(())
    });
}

#[test]
fn test_non_extensible_prototype_change_rejected() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        let other = agent.create_plain_object()?;
        assert!(agent.prevent_extensions(&obj));
        assert!(!agent.set_prototype_of(&obj, Some(other.clone())));

        let err = call_static(
            agent,
            "Object",
            "setPrototypeOf",
            &[JsValue::Object(obj.clone()), JsValue::Object(other)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("is not extensible"), "{}", err);
        Ok(())
    });
}

#[test]
fn test_frozen_property_value_change_fails() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        let key = PropertyKey::from("fixed");
        agent.define_property_or_throw(&obj, &key, PropertyDescriptor::data(JsValue::from(1), Attributes::NONE))?;

        // Strict: throws
        let result = agent.define_property_or_throw(
            &obj,
            &key,
            PropertyDescriptor::value_only(JsValue::from(2)),
        );
        assert_throws(agent, result, ErrorKind::TypeError);
        let result = agent.set(&obj, &key, JsValue::from(3), true);
        assert_throws(agent, result, ErrorKind::TypeError);

        // Sloppy: no-op
        assert!(!agent.set(&obj, &key, JsValue::from(4), false)?);

        let desc = agent.get_own_property(&obj, &key).unwrap();
        assert_eq!(desc.value, Some(JsValue::from(1)));
        assert_eq!(desc.writable, Some(false));
        assert_eq!(desc.enumerable, Some(false));
        assert_eq!(desc.configurable, Some(false));
        Ok(())
    });
}

#[test]
fn test_same_value_redefinition_of_frozen_property_succeeds() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        let key = PropertyKey::from("nan");
        agent.define_property_or_throw(&obj, &key, PropertyDescriptor::data(JsValue::Number(f64::NAN), Attributes::NONE))?;
        agent.define_property_or_throw(&obj, &key, PropertyDescriptor::value_only(JsValue::Number(f64::NAN)))?;
        Ok(())
    });
}

#[test]
fn test_non_configurable_cannot_become_configurable() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        let key = PropertyKey::from("p");
        agent.define_property_or_throw(
            &obj,
            &key,
            PropertyDescriptor::data(JsValue::from(1), Attributes { writable: true, enumerable: false, configurable: false }),
        )?;
        let widen = PropertyDescriptor {
            configurable: Some(true),
            ..PropertyDescriptor::default()
        };
        assert!(!agent.define_own_property(&obj, &key, widen));

        // writable true -> false stays allowed
        let narrow = PropertyDescriptor {
            writable: Some(false),
            ..PropertyDescriptor::default()
        };
        assert!(agent.define_own_property(&obj, &key, narrow));
        let back = PropertyDescriptor {
            writable: Some(true),
            ..PropertyDescriptor::default()
        };
        assert!(!agent.define_own_property(&obj, &key, back));
        Ok(())
    });
}

#[test]
fn test_inherited_read_only_blocks_set() {
    with_realm(|agent| {
        let proto = agent.create_plain_object()?;
        let key = PropertyKey::from("ro");
        agent.define_property_or_throw(&proto, &key, PropertyDescriptor::data(JsValue::from(1), Attributes::NONE))?;
        let obj = agent.create_object(Some(proto));
        assert!(!agent.set(&obj, &key, JsValue::from(2), false)?);
        assert!(!agent.has_own_property(&obj, &key));
        Ok(())
    });
}

#[test]
fn test_set_creates_own_property_shadowing_proto() {
    with_realm(|agent| {
        let proto = agent.create_plain_object()?;
        let key = PropertyKey::from("x");
        agent.create_data_property_or_throw(&proto, &key, JsValue::from(1))?;
        let obj = agent.create_object(Some(proto.clone()));
        assert!(agent.set(&obj, &key, JsValue::from(2), true)?);
        assert_eq!(agent.get(&obj, &key)?, JsValue::from(2));
        assert_eq!(agent.get(&proto, &key)?, JsValue::from(1));

        let desc = agent.get_own_property(&obj, &key).unwrap();
        assert_eq!(desc.enumerable, Some(true));
        assert_eq!(desc.writable, Some(true));
        assert_eq!(desc.configurable, Some(true));
        Ok(())
    });
}

#[test]
fn test_set_on_non_extensible_fails() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        agent.prevent_extensions(&obj);
        let key = PropertyKey::from("late");
        assert!(!agent.set(&obj, &key, JsValue::from(1), false)?);
        let result = agent.set(&obj, &key, JsValue::from(1), true);
        assert_throws(agent, result, ErrorKind::TypeError);
        Ok(())
    });
}

#[test]
fn test_accessor_get_and_set_through_object_define_property() {
    with_realm(|agent| {
        let target = agent.create_plain_object()?;
        let desc = agent.create_plain_object()?;
        let object_ctor = get_global(agent, "Object")?;
        let getter = get(agent, &object_ctor, "getPrototypeOf")?;
        agent.create_data_property_or_throw(&desc, &PropertyKey::from("get"), getter)?;
        agent.create_data_property_or_throw(&desc, &PropertyKey::from("enumerable"), JsValue::from(true))?;

        call_static(
            agent,
            "Object",
            "defineProperty",
            &[JsValue::Object(target.clone()), s("proto"), JsValue::Object(desc)],
        )?;

        // getPrototypeOf(undefined) throws, proving the getter ran with no argument
        let result = agent.get(&target, &PropertyKey::from("proto"));
        assert_throws(agent, result, ErrorKind::TypeError);

        // No setter: sloppy assignment fails quietly
        assert!(!agent.set(&target, &PropertyKey::from("proto"), JsValue::from(1), false)?);
        Ok(())
    });
}

#[test]
fn test_to_property_descriptor_rejects_mixed() {
    with_realm(|agent| {
        let desc = agent.create_plain_object()?;
        let getter = get_global(agent, "Object")?;
        agent.create_data_property_or_throw(&desc, &PropertyKey::from("get"), getter)?;
        agent.create_data_property_or_throw(&desc, &PropertyKey::from("value"), JsValue::from(1))?;
        let result = agent.to_property_descriptor(&JsValue::Object(desc));
        assert_throws(agent, result, ErrorKind::TypeError);

        let result = agent.to_property_descriptor(&JsValue::from(1));
        assert_throws(agent, result, ErrorKind::TypeError);

        let bad_getter = agent.create_plain_object()?;
        agent.create_data_property_or_throw(&bad_getter, &PropertyKey::from("get"), JsValue::from(1))?;
        let result = agent.to_property_descriptor(&JsValue::Object(bad_getter));
        assert_throws(agent, result, ErrorKind::TypeError);
        Ok(())
    });
}

#[test]
fn test_get_own_property_descriptor_round_trip() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        agent.create_data_property_or_throw(&obj, &PropertyKey::from("a"), JsValue::from(5))?;
        let desc = call_static(agent, "Object", "getOwnPropertyDescriptor", &[JsValue::Object(obj.clone()), s("a")])?;
        assert_eq!(get(agent, &desc, "value")?, JsValue::from(5));
        assert_eq!(get(agent, &desc, "writable")?, JsValue::from(true));
        assert_eq!(get(agent, &desc, "enumerable")?, JsValue::from(true));
        assert_eq!(get(agent, &desc, "configurable")?, JsValue::from(true));

        let missing = call_static(agent, "Object", "getOwnPropertyDescriptor", &[JsValue::Object(obj), s("b")])?;
        assert!(missing.is_undefined());
        Ok(())
    });
}

#[test]
fn test_accessor_descriptor_round_trip() {
    with_realm(|agent| {
        let symbol_proto = JsValue::Object(agent.intrinsic(realmjs::Intrinsic::SymbolPrototype)?);
        let desc = call_static(agent, "Object", "getOwnPropertyDescriptor", &[symbol_proto, s("description")])?;
        let getter = get(agent, &desc, "get")?;
        assert!(getter.is_callable());
        // A getter-only accessor reports its missing setter as undefined
        let setter = get(agent, &desc, "set")?;
        assert!(setter.is_undefined());
        assert!(!agent.has_own_property(desc.as_object().unwrap(), &PropertyKey::from("value")));

        let target = JsValue::Object(agent.create_plain_object()?);
        call_static(agent, "Object", "defineProperty", &[target.clone(), s("x"), desc.clone()])?;
        let copied = agent
            .get_own_property(target.as_object().unwrap(), &PropertyKey::from("x"))
            .unwrap();
        assert!(copied.is_accessor_descriptor());
        assert!(JsValue::from(copied.get.unwrap().unwrap()).strict_equals(&getter));
        assert!(copied.set.unwrap().is_none());

        let again = call_static(agent, "Object", "getOwnPropertyDescriptor", &[target, s("x")])?;
        assert!(get(agent, &again, "set")?.is_undefined());
        assert!(get(agent, &again, "get")?.strict_equals(&getter));
        Ok(())
    });
}

#[test]
fn test_own_property_keys_order() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        let sym = agent.new_symbol(Some("s".into()));
        for key in [
            PropertyKey::from("b"),
            PropertyKey::from(sym.clone()),
            PropertyKey::from("10"),
            PropertyKey::from("a"),
            PropertyKey::from("2"),
        ] {
            agent.create_data_property_or_throw(&obj, &key, JsValue::Undefined)?;
        }
        let keys: Vec<String> = agent
            .own_property_keys(&obj)
            .iter()
            .map(|key| key.to_string())
            .collect();
        assert_eq!(keys[..4].to_vec(), vec!["2", "10", "b", "a"]);
        assert!(agent.own_property_keys(&obj)[4].is_symbol());
        Ok(())
    });
}

#[test]
fn test_delete() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        let key = PropertyKey::from("gone");
        agent.create_data_property_or_throw(&obj, &key, JsValue::from(1))?;
        agent.delete_property_or_throw(&obj, &key)?;
        assert!(!agent.has_own_property(&obj, &key));
        assert!(agent.delete(&obj, &key));

        let fixed = PropertyKey::from("fixed");
        agent.define_property_or_throw(&obj, &fixed, PropertyDescriptor::data(JsValue::from(1), Attributes::NONE))?;
        let result = agent.delete_property_or_throw(&obj, &fixed);
        assert_throws(agent, result, ErrorKind::TypeError);
        assert!(agent.has_own_property(&obj, &fixed));
        Ok(())
    });
}

#[test]
fn test_object_create_with_properties() {
    with_realm(|agent| {
        let proto = agent.create_plain_object()?;
        let props = agent.create_plain_object()?;
        let x_desc = agent.create_plain_object()?;
        agent.create_data_property_or_throw(&x_desc, &PropertyKey::from("value"), JsValue::from(42))?;
        agent.create_data_property_or_throw(&props, &PropertyKey::from("x"), JsValue::Object(x_desc))?;

        let created = call_static(
            agent,
            "Object",
            "create",
            &[JsValue::Object(proto.clone()), JsValue::Object(props)],
        )?;
        let created = created.as_object().unwrap().clone();
        assert!(Gc::ptr_eq(&agent.get_prototype_of(&created).unwrap(), &proto));
        let desc = agent.get_own_property(&created, &PropertyKey::from("x")).unwrap();
        assert_eq!(desc.value, Some(JsValue::from(42)));
        assert_eq!(desc.writable, Some(false));
        assert_eq!(desc.enumerable, Some(false));

        let null_proto = call_static(agent, "Object", "create", &[JsValue::Null])?;
        assert!(agent.get_prototype_of(null_proto.as_object().unwrap()).is_none());

        let result = call_static(agent, "Object", "create", &[JsValue::from(1)]);
        assert_throws(agent, result, ErrorKind::TypeError);
        Ok(())
    });
}

#[test]
fn test_object_extensibility_statics() {
    with_realm(|agent| {
        let obj = JsValue::Object(agent.create_plain_object()?);
        assert_eq!(call_static(agent, "Object", "isExtensible", &[obj.clone()])?, JsValue::from(true));
        let returned = call_static(agent, "Object", "preventExtensions", &[obj.clone()])?;
        assert!(returned.strict_equals(&obj));
        assert_eq!(call_static(agent, "Object", "isExtensible", &[obj])?, JsValue::from(false));
        assert_eq!(call_static(agent, "Object", "isExtensible", &[JsValue::from(1)])?, JsValue::from(false));
        assert_eq!(call_static(agent, "Object", "preventExtensions", &[JsValue::from(1)])?, JsValue::from(1));
        Ok(())
    });
}

#[test]
fn test_object_is() {
    with_realm(|agent| {
        let nan = JsValue::Number(f64::NAN);
        assert_eq!(call_static(agent, "Object", "is", &[nan.clone(), nan])?, JsValue::from(true));
        assert_eq!(
            call_static(agent, "Object", "is", &[JsValue::Number(0.0), JsValue::Number(-0.0)])?,
            JsValue::from(false)
        );
        assert_eq!(call_static(agent, "Object", "is", &[s("a"), s("a")])?, JsValue::from(true));
        Ok(())
    });
}

#[test]
fn test_object_constructor() {
    with_realm(|agent| {
        let ctor = get_global(agent, "Object")?;
        let plain = agent.call(&ctor, &JsValue::Undefined, &[])?;
        let object_proto = agent.intrinsic(realmjs::Intrinsic::ObjectPrototype)?;
        assert!(Gc::ptr_eq(&agent.get_prototype_of(plain.as_object().unwrap()).unwrap(), &object_proto));

        let existing = JsValue::Object(agent.create_plain_object()?);
        assert!(agent.call(&ctor, &JsValue::Undefined, &[existing.clone()])?.strict_equals(&existing));
        let constructed = agent.construct(&ctor, &[existing.clone()], None)?;
        assert!(JsValue::Object(constructed).strict_equals(&existing));

        let boxed = agent.call(&ctor, &JsValue::Undefined, &[JsValue::from(3)])?;
        assert_eq!(call_method(agent, &boxed, "toString", &[])?, s("[object Number]"));
        Ok(())
    });
}

#[test]
fn test_object_prototype_methods() {
    with_realm(|agent| {
        let obj = JsValue::Object(agent.create_plain_object()?);
        agent.create_data_property_or_throw(obj.as_object().unwrap(), &PropertyKey::from("own"), JsValue::from(1))?;
        assert_eq!(call_method(agent, &obj, "hasOwnProperty", &[s("own")])?, JsValue::from(true));
        assert_eq!(call_method(agent, &obj, "hasOwnProperty", &[s("toString")])?, JsValue::from(false));
        assert_eq!(call_method(agent, &obj, "propertyIsEnumerable", &[s("own")])?, JsValue::from(true));

        let proto = JsValue::Object(agent.intrinsic(realmjs::Intrinsic::ObjectPrototype)?);
        assert_eq!(call_method(agent, &proto, "isPrototypeOf", &[obj.clone()])?, JsValue::from(true));
        assert_eq!(call_method(agent, &obj, "isPrototypeOf", &[proto.clone()])?, JsValue::from(false));
        assert_eq!(call_method(agent, &proto, "propertyIsEnumerable", &[s("toString")])?, JsValue::from(false));

        assert!(call_method(agent, &obj, "valueOf", &[])?.strict_equals(&obj));
        assert_eq!(call_method(agent, &obj, "toString", &[])?, s("[object Object]"));
        Ok(())
    });
}

#[test]
fn test_object_to_string_tags() {
    with_realm(|agent| {
        let to_string = {
            let proto = JsValue::Object(agent.intrinsic(realmjs::Intrinsic::ObjectPrototype)?);
            get(agent, &proto, "toString")?
        };
        assert_eq!(agent.call(&to_string, &JsValue::Undefined, &[])?, s("[object Undefined]"));
        assert_eq!(agent.call(&to_string, &JsValue::Null, &[])?, s("[object Null]"));
        assert_eq!(agent.call(&to_string, &JsValue::from(true), &[])?, s("[object Boolean]"));
        assert_eq!(agent.call(&to_string, &s("x"), &[])?, s("[object String]"));

        let func = get_global(agent, "Object")?;
        assert_eq!(agent.call(&to_string, &func, &[])?, s("[object Function]"));
        let error = JsValue::Object(super::construct_global(agent, "TypeError", &[])?);
        assert_eq!(agent.call(&to_string, &error, &[])?, s("[object Error]"));

        let sym = JsValue::Symbol(agent.new_symbol(None));
        assert_eq!(agent.call(&to_string, &sym, &[])?, s("[object Symbol]"));

        let tagged = agent.create_plain_object()?;
        let tag = PropertyKey::from(agent.well_known().to_string_tag.clone());
        agent.create_data_property_or_throw(&tagged, &tag, s("Custom"))?;
        assert_eq!(agent.call(&to_string, &JsValue::Object(tagged), &[])?, s("[object Custom]"));
        Ok(())
    });
}

#[test]
fn test_get_prototype_of_primitive_and_nullish() {
    with_realm(|agent| {
        let proto = call_static(agent, "Object", "getPrototypeOf", &[s("str")])?;
        let object_proto = agent.intrinsic(realmjs::Intrinsic::ObjectPrototype)?;
        assert!(proto.strict_equals(&JsValue::Object(object_proto)));

        let result = call_static(agent, "Object", "getPrototypeOf", &[JsValue::Null]);
        assert_throws(agent, result, ErrorKind::TypeError);
        Ok(())
    });
}

#[test]
fn test_set_prototype_of_validation() {
    with_realm(|agent| {
        let result = call_static(agent, "Object", "setPrototypeOf", &[JsValue::Undefined, JsValue::Null]);
        assert_throws(agent, result, ErrorKind::TypeError);

        let obj = JsValue::Object(agent.create_plain_object()?);
        let result = call_static(agent, "Object", "setPrototypeOf", &[obj.clone(), JsValue::from(1)]);
        assert_throws(agent, result, ErrorKind::TypeError);

        let returned = call_static(agent, "Object", "setPrototypeOf", &[obj.clone(), JsValue::Null])?;
        assert!(returned.strict_equals(&obj));
        assert!(agent.get_prototype_of(obj.as_object().unwrap()).is_none());

        // Primitives pass through untouched
        assert_eq!(call_static(agent, "Object", "setPrototypeOf", &[JsValue::from(1), JsValue::Null])?, JsValue::from(1));
        Ok(())
    });
}

#[test]
fn test_to_primitive_uses_value_of_then_to_string() {
    with_realm(|agent| {
        let obj = agent.create_plain_object()?;
        let value = JsValue::Object(obj.clone());
        assert_eq!(agent.to_string(&value)?.as_str(), "[object Object]");
        assert!(agent.to_number(&value)?.is_nan());

        // A non-callable toString is skipped, leaving nothing to convert with
        agent.create_data_property_or_throw(&obj, &PropertyKey::from("toString"), JsValue::from(1))?;
        let result = agent.to_number(&value);
        assert_throws(agent, result, ErrorKind::TypeError);
        let result = agent.to_string(&value);
        assert_throws(agent, result, ErrorKind::TypeError);
        Ok(())
    });
}

#[test]
fn test_symbol_coercions_throw() {
    with_realm(|agent| {
        let sym = JsValue::Symbol(agent.new_symbol(None));
        let result = agent.to_string(&sym);
        assert_throws(agent, result, ErrorKind::TypeError);
        let result = agent.to_number(&sym);
        assert_throws(agent, result, ErrorKind::TypeError);
        assert!(agent.to_property_key(&sym)?.is_symbol());
        Ok(())
    });
}
