//! Native function protocol.
//!
//! A built-in is a plain `fn` for `[[Call]]` and optionally another for
//! `[[Construct]]`. Constructibility is data: a function is a constructor
//! exactly when its descriptor carries a construct behaviour.

use crate::agent::Agent;
use crate::error::JsResult;
use crate::object::{Attributes, JsObjectRef, PropertyKey};
use crate::realm::RealmId;
use crate::value::{JsString, JsValue};

/// `[[Call]]` behaviour: `(agent, this, arguments)`
pub type NativeFn = fn(&mut Agent, &JsValue, &Arguments<'_>) -> JsResult<JsValue>;

/// `[[Construct]]` behaviour: `(agent, arguments, new_target)`
pub type NativeConstructFn = fn(&mut Agent, &Arguments<'_>, &JsObjectRef) -> JsResult<JsObjectRef>;

/// Arguments passed to a native function.
///
/// Reading past the supplied count yields `undefined`.
#[derive(Clone, Copy, Debug)]
pub struct Arguments<'a> {
    values: &'a [JsValue],
}

impl<'a> Arguments<'a> {
    pub fn new(values: &'a [JsValue]) -> Self {
        Self { values }
    }

    /// The argument at `index`, or `undefined`
    pub fn get(&self, index: usize) -> JsValue {
        self.values.get(index).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &'a [JsValue] {
        self.values
    }

    /// Arguments from `start` on, empty if there are fewer
    pub fn rest(&self, start: usize) -> &'a [JsValue] {
        self.values.get(start..).unwrap_or(&[])
    }
}

/// Internal slots of a built-in function object
#[derive(Clone)]
pub struct NativeFunctionData {
    /// Initial name, used in error messages
    pub name: JsString,
    pub length: u32,
    /// [[Realm]]
    pub realm: RealmId,
    /// Global object of [[Realm]]. Keeps the realm reachable.
    pub realm_global: JsObjectRef,
    pub call: NativeFn,
    pub construct: Option<NativeConstructFn>,
}

impl NativeFunctionData {
    pub fn has_constructor(&self) -> bool {
        self.construct.is_some()
    }
}

impl std::fmt::Debug for NativeFunctionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunctionData")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("realm", &self.realm)
            .field("has_constructor", &self.has_constructor())
            .finish()
    }
}

/// Registration record for a built-in: how to create it and how to install
/// it on its holder.
#[derive(Clone)]
pub struct NativeFunctionSpec {
    /// Property key the function is installed under; also its name
    pub key: PropertyKey,
    /// `"get"` / `"set"` for accessor functions
    pub prefix: Option<&'static str>,
    pub length: u32,
    /// Attributes of the property holding the function
    pub attributes: Attributes,
    pub call: NativeFn,
    pub construct: Option<NativeConstructFn>,
}

impl NativeFunctionSpec {
    /// A plain method: writable, configurable, not enumerable
    pub fn method(key: impl Into<PropertyKey>, length: u32, call: NativeFn) -> Self {
        Self {
            key: key.into(),
            prefix: None,
            length,
            attributes: Attributes::WRITABLE_CONFIGURABLE,
            call,
            construct: None,
        }
    }

    /// A constructor with both behaviours
    pub fn constructor(
        key: impl Into<PropertyKey>,
        length: u32,
        call: NativeFn,
        construct: NativeConstructFn,
    ) -> Self {
        Self {
            construct: Some(construct),
            ..Self::method(key, length, call)
        }
    }

    /// A getter named `get <key>`
    pub fn getter(key: impl Into<PropertyKey>, call: NativeFn) -> Self {
        Self {
            prefix: Some("get"),
            attributes: Attributes::CONFIGURABLE,
            ..Self::method(key, 0, call)
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn has_constructor(&self) -> bool {
        self.construct.is_some()
    }
}

impl std::fmt::Debug for NativeFunctionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunctionSpec")
            .field("key", &self.key)
            .field("length", &self.length)
            .field("attributes", &self.attributes)
            .field("has_constructor", &self.has_constructor())
            .finish()
    }
}
