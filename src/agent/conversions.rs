//! Type conversions that may run user code.

use super::Agent;
use crate::error::{ErrorType, JsResult};
use crate::object::{JsObject, JsObjectRef, ObjectKind, PropertyKey, PropertyValue};
use crate::realm::Intrinsic;
use crate::value::{CheapClone, JsString, JsValue, number_to_string, string_to_number};

/// Hint passed to ToPrimitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    String,
    Number,
}

impl PreferredType {
    fn as_str(self) -> &'static str {
        match self {
            PreferredType::Default => "default",
            PreferredType::String => "string",
            PreferredType::Number => "number",
        }
    }
}

impl Agent {
    /// ToPrimitive
    pub fn to_primitive(&mut self, value: &JsValue, hint: PreferredType) -> JsResult<JsValue> {
        let JsValue::Object(obj) = value else {
            return Ok(value.clone());
        };
        let key = PropertyKey::from(&self.well_known.to_primitive);
        if let Some(exotic) = self.get_method(value, &key)? {
            let hint = JsValue::from(hint.as_str());
            let result = self.call(&JsValue::Object(exotic), value, &[hint])?;
            if result.is_object() {
                return Err(self.throw(ErrorType::ConvertToPrimitive));
            }
            return Ok(result);
        }
        let hint = match hint {
            PreferredType::Default => PreferredType::Number,
            other => other,
        };
        self.ordinary_to_primitive(obj, hint)
    }

    /// OrdinaryToPrimitive
    pub fn ordinary_to_primitive(
        &mut self,
        obj: &JsObjectRef,
        hint: PreferredType,
    ) -> JsResult<JsValue> {
        let to_string = PropertyKey::from(&self.names.to_string);
        let value_of = PropertyKey::from(&self.names.value_of);
        let order = if hint == PreferredType::String {
            [to_string, value_of]
        } else {
            [value_of, to_string]
        };
        let this = JsValue::Object(obj.cheap_clone());
        for key in &order {
            let method = self.get(obj, key)?;
            if method.is_callable() {
                let result = self.call(&method, &this, &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        Err(self.throw(ErrorType::ConvertToPrimitive))
    }

    /// ToString
    pub fn to_string(&mut self, value: &JsValue) -> JsResult<JsString> {
        Ok(match value {
            JsValue::Undefined => self.names.undefined.cheap_clone(),
            JsValue::Null => self.names.null.cheap_clone(),
            JsValue::Boolean(true) => self.names.true_.cheap_clone(),
            JsValue::Boolean(false) => self.names.false_.cheap_clone(),
            JsValue::Number(n) => JsString::from(number_to_string(*n)),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Symbol(_) => return Err(self.throw(ErrorType::ConvertSymbolToString)),
            JsValue::Object(_) => {
                let primitive = self.to_primitive(value, PreferredType::String)?;
                return self.to_string(&primitive);
            }
        })
    }

    /// ToNumber
    pub fn to_number(&mut self, value: &JsValue) -> JsResult<f64> {
        Ok(match value {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            JsValue::Number(n) => *n,
            JsValue::String(s) => string_to_number(s.as_str()),
            JsValue::Symbol(_) => return Err(self.throw(ErrorType::ConvertSymbolToNumber)),
            JsValue::Object(_) => {
                let primitive = self.to_primitive(value, PreferredType::Number)?;
                return self.to_number(&primitive);
            }
        })
    }

    /// ToIntegerOrInfinity
    pub fn to_integer_or_infinity(&mut self, value: &JsValue) -> JsResult<f64> {
        let n = self.to_number(value)?;
        if n.is_nan() || n == 0.0 {
            return Ok(0.0);
        }
        Ok(n.trunc())
    }

    /// ToPropertyKey
    pub fn to_property_key(&mut self, value: &JsValue) -> JsResult<PropertyKey> {
        let key = self.to_primitive(value, PreferredType::String)?;
        match key {
            JsValue::Symbol(sym) => Ok(PropertyKey::Symbol(sym)),
            other => Ok(PropertyKey::String(self.to_string(&other)?)),
        }
    }

    /// ToObject
    ///
    /// Booleans, numbers and strings are wrapped with %Object.prototype% as
    /// their prototype; their own prototypes are not part of this runtime.
    pub fn to_object(&mut self, value: &JsValue) -> JsResult<JsObjectRef> {
        let (proto, kind) = match value {
            JsValue::Object(obj) => return Ok(obj.cheap_clone()),
            JsValue::Undefined | JsValue::Null => {
                return Err(self.throw(ErrorType::ConvertNullishToObject));
            }
            JsValue::Symbol(sym) => (
                Intrinsic::SymbolPrototype,
                ObjectKind::Symbol(sym.cheap_clone()),
            ),
            primitive => (
                Intrinsic::ObjectPrototype,
                ObjectKind::Primitive(primitive.clone()),
            ),
        };
        let proto = self.intrinsic(proto)?;
        Ok(self.alloc(JsObject::with_kind(Some(proto), kind)))
    }

    /// RequireObjectCoercible
    pub fn require_object_coercible(&mut self, value: &JsValue) -> JsResult<()> {
        if value.is_nullish() {
            return Err(self.throw(ErrorType::ConvertNullishToObject));
        }
        Ok(())
    }

    /// Render a value for messages without running user code
    pub fn to_display_string(&self, value: &JsValue) -> String {
        match value {
            JsValue::String(s) => s.to_string(),
            JsValue::Symbol(sym) => sym.descriptive_string(),
            JsValue::Object(obj) => self.describe_object(obj),
            primitive => format!("{:?}", primitive),
        }
    }

    fn describe_object(&self, obj: &JsObjectRef) -> String {
        let Some(o) = obj.try_borrow() else {
            return "#<Object>".to_string();
        };
        match &o.kind {
            ObjectKind::NativeFunction(data) if data.name.is_empty() => "function".to_string(),
            ObjectKind::NativeFunction(data) => data.name.to_string(),
            ObjectKind::BoundFunction(_) => "bound function".to_string(),
            ObjectKind::Error => {
                let name = self.lookup_data_string(obj, &self.names.name);
                let message = self.lookup_data_string(obj, &self.names.message);
                match (name, message) {
                    (Some(name), Some(message)) if !message.is_empty() => {
                        format!("{}: {}", name, message)
                    }
                    (Some(name), _) => name.to_string(),
                    (None, _) => "Error".to_string(),
                }
            }
            _ => format!("#<{}>", o.class_name()),
        }
    }

    /// A string data property found along the prototype chain, without
    /// invoking getters
    fn lookup_data_string(&self, obj: &JsObjectRef, name: &JsString) -> Option<JsString> {
        let key = PropertyKey::from(name);
        let mut current = Some(obj.cheap_clone());
        while let Some(gc) = current {
            let o = gc.try_borrow()?;
            if let Some(prop) = o.get_own_property(&key) {
                return match &prop.value {
                    PropertyValue::Data(JsValue::String(s)) => Some(s.cheap_clone()),
                    _ => None,
                };
            }
            current = o.prototype.clone();
        }
        None
    }
}
