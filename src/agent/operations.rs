//! Object internal methods that walk the prototype chain, plus the abstract
//! operations built on them.

use super::Agent;
use crate::error::{ErrorType, JsResult};
use crate::gc::Gc;
use crate::object::{
    Attributes, JsObject, JsObjectRef, ObjectKind, PropertyDescriptor, PropertyKey,
    PropertyValue, set_prototype_of,
};
use crate::realm::{Intrinsic, RealmId};
use crate::value::{CheapClone, JsValue};

/// One step of a prototype-chain walk
enum Lookup<T> {
    Found(T),
    Next(JsObjectRef),
    Missing,
}

impl Agent {
    // ═══════════════════════════════════════════════════════════════════════
    // Internal methods
    // ═══════════════════════════════════════════════════════════════════════

    /// [[Get]] with the object itself as receiver
    pub fn get(&mut self, obj: &JsObjectRef, key: &PropertyKey) -> JsResult<JsValue> {
        let receiver = JsValue::Object(obj.cheap_clone());
        self.get_with_receiver(obj, key, &receiver)
    }

    /// [[Get]](P, Receiver). Runs in O(chain length).
    pub fn get_with_receiver(
        &mut self,
        obj: &JsObjectRef,
        key: &PropertyKey,
        receiver: &JsValue,
    ) -> JsResult<JsValue> {
        let mut current = obj.cheap_clone();
        let getter = loop {
            let step = {
                let o = current.borrow();
                match o.get_own_property(key) {
                    Some(prop) => match &prop.value {
                        PropertyValue::Data(value) => return Ok(value.clone()),
                        PropertyValue::Accessor { get, .. } => Lookup::Found(get.clone()),
                    },
                    None => match &o.prototype {
                        Some(proto) => Lookup::Next(proto.cheap_clone()),
                        None => Lookup::Missing,
                    },
                }
            };
            match step {
                Lookup::Found(getter) => break getter,
                Lookup::Next(proto) => current = proto,
                Lookup::Missing => return Ok(JsValue::Undefined),
            }
        };
        match getter {
            Some(getter) => self.call(&JsValue::Object(getter), receiver, &[]),
            None => Ok(JsValue::Undefined),
        }
    }

    /// GetV: property lookup on any value, boxing primitives
    pub fn get_v(&mut self, value: &JsValue, key: &PropertyKey) -> JsResult<JsValue> {
        let obj = self.to_object(value)?;
        self.get_with_receiver(&obj, key, value)
    }

    /// [[Set]] with the object itself as receiver; returns whether it
    /// succeeded
    pub fn ordinary_set(
        &mut self,
        obj: &JsObjectRef,
        key: &PropertyKey,
        value: JsValue,
        receiver: &JsValue,
    ) -> JsResult<bool> {
        let mut current = obj.cheap_clone();
        let own = loop {
            let step = {
                let o = current.borrow();
                match o.get_own_property(key) {
                    Some(prop) => Lookup::Found(prop.clone()),
                    None => match &o.prototype {
                        Some(proto) => Lookup::Next(proto.cheap_clone()),
                        None => Lookup::Missing,
                    },
                }
            };
            match step {
                Lookup::Found(prop) => break Some(prop),
                Lookup::Next(proto) => current = proto,
                Lookup::Missing => break None,
            }
        };

        let (writable, setter) = match own {
            None => (true, None),
            Some(prop) => match prop.value {
                PropertyValue::Data(_) => (prop.attributes.writable, None),
                PropertyValue::Accessor { set, .. } => {
                    let Some(setter) = set else {
                        return Ok(false);
                    };
                    (false, Some(setter))
                }
            },
        };

        if let Some(setter) = setter {
            self.call(&JsValue::Object(setter), receiver, &[value])?;
            return Ok(true);
        }
        if !writable {
            return Ok(false);
        }
        let JsValue::Object(receiver) = receiver else {
            return Ok(false);
        };

        let existing = receiver.borrow().get_own_property(key).cloned();
        let mut target = receiver.borrow_mut();
        match existing {
            Some(existing) => {
                if existing.is_accessor() || !existing.writable() {
                    return Ok(false);
                }
                Ok(target.define_own_property(key.cheap_clone(), PropertyDescriptor::value_only(value)))
            }
            None => Ok(target.define_own_property(
                key.cheap_clone(),
                PropertyDescriptor::data(value, Attributes::ALL),
            )),
        }
    }

    /// Set(O, P, V, Throw)
    pub fn set(
        &mut self,
        obj: &JsObjectRef,
        key: &PropertyKey,
        value: JsValue,
        throw: bool,
    ) -> JsResult<bool> {
        let receiver = JsValue::Object(obj.cheap_clone());
        let success = self.ordinary_set(obj, key, value, &receiver)?;
        if !success && throw {
            return Err(self.throw(ErrorType::ReadOnlyProperty(key.to_string())));
        }
        Ok(success)
    }

    /// [[HasProperty]]
    pub fn has_property(&self, obj: &JsObjectRef, key: &PropertyKey) -> bool {
        let mut current = Some(obj.cheap_clone());
        while let Some(o) = current {
            let o = o.borrow();
            if o.has_own_property(key) {
                return true;
            }
            current = o.prototype.clone();
        }
        false
    }

    /// HasOwnProperty
    pub fn has_own_property(&self, obj: &JsObjectRef, key: &PropertyKey) -> bool {
        obj.borrow().has_own_property(key)
    }

    /// [[GetOwnProperty]] as a descriptor
    pub fn get_own_property(&self, obj: &JsObjectRef, key: &PropertyKey) -> Option<PropertyDescriptor> {
        obj.borrow().get_own_property(key).map(|prop| prop.to_descriptor())
    }

    /// [[DefineOwnProperty]]
    pub fn define_own_property(
        &mut self,
        obj: &JsObjectRef,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> bool {
        obj.borrow_mut().define_own_property(key.cheap_clone(), desc)
    }

    /// DefinePropertyOrThrow
    pub fn define_property_or_throw(
        &mut self,
        obj: &JsObjectRef,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> JsResult<()> {
        if !self.define_own_property(obj, key, desc) {
            return Err(self.throw(ErrorType::DefinePropertyFailed(key.to_string())));
        }
        Ok(())
    }

    /// CreateDataProperty
    pub fn create_data_property(&mut self, obj: &JsObjectRef, key: &PropertyKey, value: JsValue) -> bool {
        self.define_own_property(obj, key, PropertyDescriptor::data(value, Attributes::ALL))
    }

    /// CreateDataPropertyOrThrow
    pub fn create_data_property_or_throw(
        &mut self,
        obj: &JsObjectRef,
        key: &PropertyKey,
        value: JsValue,
    ) -> JsResult<()> {
        self.define_property_or_throw(obj, key, PropertyDescriptor::data(value, Attributes::ALL))
    }

    /// CreateNonEnumerableDataPropertyOrThrow
    pub fn create_non_enumerable_data_property_or_throw(
        &mut self,
        obj: &JsObjectRef,
        key: &PropertyKey,
        value: JsValue,
    ) -> JsResult<()> {
        self.define_property_or_throw(
            obj,
            key,
            PropertyDescriptor::data(value, Attributes::WRITABLE_CONFIGURABLE),
        )
    }

    /// [[Delete]]
    pub fn delete(&mut self, obj: &JsObjectRef, key: &PropertyKey) -> bool {
        obj.borrow_mut().delete(key)
    }

    /// DeletePropertyOrThrow
    pub fn delete_property_or_throw(&mut self, obj: &JsObjectRef, key: &PropertyKey) -> JsResult<()> {
        if !self.delete(obj, key) {
            return Err(self.throw(ErrorType::DeleteFailed(key.to_string())));
        }
        Ok(())
    }

    /// [[OwnPropertyKeys]]
    pub fn own_property_keys(&self, obj: &JsObjectRef) -> Vec<PropertyKey> {
        obj.borrow().own_property_keys()
    }

    /// [[GetPrototypeOf]]
    pub fn get_prototype_of(&self, obj: &JsObjectRef) -> Option<JsObjectRef> {
        obj.borrow().prototype.clone()
    }

    /// [[SetPrototypeOf]]. False, with the chain untouched, on a cycle or a
    /// non-extensible object.
    pub fn set_prototype_of(&mut self, obj: &JsObjectRef, proto: Option<JsObjectRef>) -> bool {
        set_prototype_of(obj, proto)
    }

    /// [[SetPrototypeOf]], throwing a TypeError on failure
    pub fn set_prototype_of_or_throw(
        &mut self,
        obj: &JsObjectRef,
        proto: Option<JsObjectRef>,
    ) -> JsResult<()> {
        if set_prototype_of(obj, proto) {
            return Ok(());
        }
        if obj.borrow().extensible {
            Err(self.throw(ErrorType::PrototypeCycle))
        } else {
            let shown = self.to_display_string(&JsValue::Object(obj.cheap_clone()));
            Err(self.throw(ErrorType::NotExtensible(shown)))
        }
    }

    /// [[IsExtensible]]
    pub fn is_extensible(&self, obj: &JsObjectRef) -> bool {
        obj.borrow().extensible
    }

    /// [[PreventExtensions]]
    pub fn prevent_extensions(&mut self, obj: &JsObjectRef) -> bool {
        obj.borrow_mut().prevent_extensions()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Abstract operations
    // ═══════════════════════════════════════════════════════════════════════

    /// GetMethod: `None` for undefined or null, TypeError if not callable
    pub fn get_method(&mut self, value: &JsValue, key: &PropertyKey) -> JsResult<Option<JsObjectRef>> {
        let func = self.get_v(value, key)?;
        match func {
            JsValue::Undefined | JsValue::Null => Ok(None),
            JsValue::Object(obj) if obj.borrow().is_callable() => Ok(Some(obj)),
            other => Err(self.throw(ErrorType::NotAFunction(self.to_display_string(&other)))),
        }
    }

    /// GetFunctionRealm
    pub fn get_function_realm(&self, obj: &JsObjectRef) -> JsResult<RealmId> {
        let mut current = obj.cheap_clone();
        loop {
            let next = match &current.borrow().kind {
                ObjectKind::NativeFunction(data) => return Ok(data.realm),
                ObjectKind::BoundFunction(bound) => bound.target.cheap_clone(),
                _ => return self.running_realm_id(),
            };
            current = next;
        }
    }

    /// GetPrototypeFromConstructor
    pub fn get_prototype_from_constructor(
        &mut self,
        constructor: &JsObjectRef,
        default: Intrinsic,
    ) -> JsResult<JsObjectRef> {
        let key = PropertyKey::from(&self.names.prototype);
        match self.get(constructor, &key)? {
            JsValue::Object(proto) => Ok(proto),
            _ => {
                let realm = self.get_function_realm(constructor)?;
                Ok(self.realm_record(realm)?.intrinsic(default).cheap_clone())
            }
        }
    }

    /// OrdinaryCreateFromConstructor
    pub fn ordinary_create_from_constructor(
        &mut self,
        constructor: &JsObjectRef,
        default: Intrinsic,
        kind: ObjectKind,
    ) -> JsResult<JsObjectRef> {
        let proto = self.get_prototype_from_constructor(constructor, default)?;
        Ok(self.alloc(JsObject::with_kind(Some(proto), kind)))
    }

    /// OrdinaryHasInstance
    pub fn ordinary_has_instance(&mut self, constructor: &JsValue, value: &JsValue) -> JsResult<bool> {
        let JsValue::Object(c) = constructor else {
            return Ok(false);
        };
        let bound_target = match &c.borrow().kind {
            ObjectKind::NativeFunction(_) => None,
            ObjectKind::BoundFunction(bound) => Some(bound.target.cheap_clone()),
            _ => return Ok(false),
        };
        if let Some(target) = bound_target {
            return self.instance_of(value, &JsValue::Object(target));
        }
        let JsValue::Object(obj) = value else {
            return Ok(false);
        };

        let key = PropertyKey::from(&self.names.prototype);
        let proto = match self.get(c, &key)? {
            JsValue::Object(proto) => proto,
            other => {
                return Err(self.throw(ErrorType::InstanceofBadPrototype(
                    self.to_display_string(&other),
                )));
            }
        };

        let mut current = obj.borrow().prototype.clone();
        while let Some(p) = current {
            if Gc::ptr_eq(&p, &proto) {
                return Ok(true);
            }
            current = p.borrow().prototype.clone();
        }
        Ok(false)
    }

    /// InstanceofOperator
    pub fn instance_of(&mut self, value: &JsValue, target: &JsValue) -> JsResult<bool> {
        if !target.is_object() {
            return Err(self.throw(ErrorType::NotAnObject(self.to_display_string(target))));
        }
        let key = PropertyKey::from(&self.well_known.has_instance);
        if let Some(handler) = self.get_method(target, &key)? {
            let result = self.call(&JsValue::Object(handler), target, &[value.clone()])?;
            return Ok(result.to_boolean());
        }
        if !target.is_callable() {
            return Err(self.throw(ErrorType::InstanceofNotCallable));
        }
        self.ordinary_has_instance(target, value)
    }

    /// ToPropertyDescriptor
    pub fn to_property_descriptor(&mut self, value: &JsValue) -> JsResult<PropertyDescriptor> {
        let JsValue::Object(obj) = value else {
            return Err(self.throw(ErrorType::DescriptorNotObject(self.to_display_string(value))));
        };
        let names = self.names.clone();
        let mut desc = PropertyDescriptor::default();

        let key = PropertyKey::from(&names.enumerable);
        if self.has_property(obj, &key) {
            desc.enumerable = Some(self.get(obj, &key)?.to_boolean());
        }
        let key = PropertyKey::from(&names.configurable);
        if self.has_property(obj, &key) {
            desc.configurable = Some(self.get(obj, &key)?.to_boolean());
        }
        let key = PropertyKey::from(&names.value);
        if self.has_property(obj, &key) {
            desc.value = Some(self.get(obj, &key)?);
        }
        let key = PropertyKey::from(&names.writable);
        if self.has_property(obj, &key) {
            desc.writable = Some(self.get(obj, &key)?.to_boolean());
        }
        let key = PropertyKey::from(&names.get);
        if self.has_property(obj, &key) {
            desc.get = Some(match self.get(obj, &key)? {
                JsValue::Undefined => None,
                JsValue::Object(getter) if getter.borrow().is_callable() => Some(getter),
                other => {
                    return Err(self.throw(ErrorType::GetterNotCallable(
                        self.to_display_string(&other),
                    )));
                }
            });
        }
        let key = PropertyKey::from(&names.set);
        if self.has_property(obj, &key) {
            desc.set = Some(match self.get(obj, &key)? {
                JsValue::Undefined => None,
                JsValue::Object(setter) if setter.borrow().is_callable() => Some(setter),
                other => {
                    return Err(self.throw(ErrorType::SetterNotCallable(
                        self.to_display_string(&other),
                    )));
                }
            });
        }

        if desc.is_accessor_descriptor() && desc.is_data_descriptor() {
            return Err(self.throw(ErrorType::MixedDescriptor));
        }
        Ok(desc)
    }

    /// FromPropertyDescriptor
    pub fn from_property_descriptor(
        &mut self,
        desc: Option<PropertyDescriptor>,
    ) -> JsResult<JsValue> {
        let Some(desc) = desc else {
            return Ok(JsValue::Undefined);
        };
        let obj = self.create_plain_object()?;
        let names = self.names.clone();
        if let Some(value) = desc.value {
            self.create_data_property_or_throw(&obj, &PropertyKey::from(&names.value), value)?;
        }
        if let Some(writable) = desc.writable {
            self.create_data_property_or_throw(
                &obj,
                &PropertyKey::from(&names.writable),
                JsValue::Boolean(writable),
            )?;
        }
        // An absent getter or setter reads back as undefined, not null
        if let Some(get) = desc.get {
            let get = get.map_or(JsValue::Undefined, JsValue::Object);
            self.create_data_property_or_throw(&obj, &PropertyKey::from(&names.get), get)?;
        }
        if let Some(set) = desc.set {
            let set = set.map_or(JsValue::Undefined, JsValue::Object);
            self.create_data_property_or_throw(&obj, &PropertyKey::from(&names.set), set)?;
        }
        if let Some(enumerable) = desc.enumerable {
            self.create_data_property_or_throw(
                &obj,
                &PropertyKey::from(&names.enumerable),
                JsValue::Boolean(enumerable),
            )?;
        }
        if let Some(configurable) = desc.configurable {
            self.create_data_property_or_throw(
                &obj,
                &PropertyKey::from(&names.configurable),
                JsValue::Boolean(configurable),
            )?;
        }
        Ok(JsValue::Object(obj))
    }
}
