//! Object model: property keys, property records, descriptors and the
//! ordinary internal methods that never run user code.
//!
//! Methods that may call getters or setters (`[[Get]]`, `[[Set]]`,
//! `[[HasProperty]]`) walk the prototype chain and live on `Agent`.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::gc::{Gc, Reset, Traceable, WeakGc};
use crate::native::NativeFunctionData;
use crate::value::{CheapClone, JsString, JsSymbol, JsValue, WeakSymbol, canonical_array_index};

/// A GC-managed object handle
pub type JsObjectRef = Gc<JsObject>;

// ═══════════════════════════════════════════════════════════════════════════
// PropertyKey
// ═══════════════════════════════════════════════════════════════════════════

/// Property key: strings compare by content, symbols by identity
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Symbol(JsSymbol),
}

impl CheapClone for PropertyKey {}

impl PropertyKey {
    /// The key as an array index, if it is a canonical one
    pub fn as_array_index(&self) -> Option<u32> {
        match self {
            PropertyKey::String(s) => canonical_array_index(s.as_str()),
            PropertyKey::Symbol(_) => None,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    pub fn as_symbol(&self) -> Option<&JsSymbol> {
        match self {
            PropertyKey::Symbol(s) => Some(s),
            PropertyKey::String(_) => None,
        }
    }

    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            PropertyKey::String(s) => Some(s),
            PropertyKey::Symbol(_) => None,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::String(JsString::from(s))
    }
}

impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        PropertyKey::String(s)
    }
}

impl From<&JsString> for PropertyKey {
    fn from(s: &JsString) -> Self {
        PropertyKey::String(s.cheap_clone())
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(s: JsSymbol) -> Self {
        PropertyKey::Symbol(s)
    }
}

impl From<&JsSymbol> for PropertyKey {
    fn from(s: &JsSymbol) -> Self {
        PropertyKey::Symbol(s.cheap_clone())
    }
}

impl From<PropertyKey> for JsValue {
    fn from(key: PropertyKey) -> Self {
        match key {
            PropertyKey::String(s) => JsValue::String(s),
            PropertyKey::Symbol(s) => JsValue::Symbol(s),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{}", s),
            PropertyKey::Symbol(s) => write!(f, "{}", s.descriptive_string()),
        }
    }
}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{:?}", s),
            PropertyKey::Symbol(s) => write!(f, "{:?}", s),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════

/// Property attribute flags. `writable` is ignored for accessor properties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Attributes {
    pub const NONE: Attributes = Attributes {
        writable: false,
        enumerable: false,
        configurable: false,
    };

    pub const CONFIGURABLE: Attributes = Attributes {
        writable: false,
        enumerable: false,
        configurable: true,
    };

    /// Default for built-in methods and prototype data properties
    pub const WRITABLE_CONFIGURABLE: Attributes = Attributes {
        writable: true,
        enumerable: false,
        configurable: true,
    };

    /// What CreateDataProperty installs
    pub const ALL: Attributes = Attributes {
        writable: true,
        enumerable: true,
        configurable: true,
    };
}

#[derive(Clone, Debug)]
pub enum PropertyValue {
    Data(JsValue),
    Accessor {
        get: Option<JsObjectRef>,
        set: Option<JsObjectRef>,
    },
}

/// A property record stored on an object
#[derive(Clone, Debug)]
pub struct Property {
    pub value: PropertyValue,
    pub attributes: Attributes,
}

impl Property {
    pub fn data(value: JsValue, attributes: Attributes) -> Self {
        Self {
            value: PropertyValue::Data(value),
            attributes,
        }
    }

    pub fn accessor(
        get: Option<JsObjectRef>,
        set: Option<JsObjectRef>,
        attributes: Attributes,
    ) -> Self {
        Self {
            value: PropertyValue::Accessor { get, set },
            attributes: Attributes {
                writable: false,
                ..attributes
            },
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.value, PropertyValue::Accessor { .. })
    }

    pub fn writable(&self) -> bool {
        self.attributes.writable
    }

    pub fn enumerable(&self) -> bool {
        self.attributes.enumerable
    }

    pub fn configurable(&self) -> bool {
        self.attributes.configurable
    }

    /// The value of a data property
    pub fn data_value(&self) -> Option<&JsValue> {
        match &self.value {
            PropertyValue::Data(v) => Some(v),
            PropertyValue::Accessor { .. } => None,
        }
    }

    /// A fully populated descriptor for this property
    pub fn to_descriptor(&self) -> PropertyDescriptor {
        match &self.value {
            PropertyValue::Data(value) => PropertyDescriptor {
                value: Some(value.clone()),
                writable: Some(self.attributes.writable),
                get: None,
                set: None,
                enumerable: Some(self.attributes.enumerable),
                configurable: Some(self.attributes.configurable),
            },
            PropertyValue::Accessor { get, set } => PropertyDescriptor {
                value: None,
                writable: None,
                get: Some(get.clone()),
                set: Some(set.clone()),
                enumerable: Some(self.attributes.enumerable),
                configurable: Some(self.attributes.configurable),
            },
        }
    }

    /// A new property from a descriptor, absent fields taking their defaults
    fn from_descriptor(desc: PropertyDescriptor) -> Self {
        let attributes = Attributes {
            writable: desc.writable.unwrap_or(false),
            enumerable: desc.enumerable.unwrap_or(false),
            configurable: desc.configurable.unwrap_or(false),
        };
        if desc.is_accessor_descriptor() {
            Property::accessor(desc.get.flatten(), desc.set.flatten(), attributes)
        } else {
            Property::data(desc.value.unwrap_or_default(), attributes)
        }
    }
}

/// A property descriptor where every field may be absent.
///
/// For `get`/`set`, `Some(None)` means present and undefined.
#[derive(Clone, Debug, Default)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub get: Option<Option<JsObjectRef>>,
    pub set: Option<Option<JsObjectRef>>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// A complete data descriptor
    pub fn data(value: JsValue, attributes: Attributes) -> Self {
        Self {
            value: Some(value),
            writable: Some(attributes.writable),
            enumerable: Some(attributes.enumerable),
            configurable: Some(attributes.configurable),
            ..Self::default()
        }
    }

    /// A descriptor that only carries a value
    pub fn value_only(value: JsValue) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// A complete accessor descriptor
    pub fn accessor(
        get: Option<JsObjectRef>,
        set: Option<JsObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            get: Some(get),
            set: Some(set),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }
}

fn same_accessor(a: &Option<JsObjectRef>, b: &Option<JsObjectRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Gc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Object kinds
// ═══════════════════════════════════════════════════════════════════════════

/// Internal slots that distinguish one object type from another
#[derive(Debug)]
pub enum ObjectKind {
    Ordinary,
    NativeFunction(NativeFunctionData),
    BoundFunction(BoundFunctionData),
    /// [[ErrorData]]
    Error,
    /// [[SymbolData]]
    Symbol(JsSymbol),
    /// [[BooleanData]], [[NumberData]] or [[StringData]]
    Primitive(JsValue),
    /// [[WeakRefTarget]]
    WeakRef(WeakRefTarget),
    /// A realm's global object. Holds every intrinsic of the realm, so the
    /// intrinsics stay reachable for as long as the global is.
    Global(Vec<JsObjectRef>),
}

/// Bound function exotic object slots
#[derive(Debug)]
pub struct BoundFunctionData {
    pub target: JsObjectRef,
    pub bound_this: JsValue,
    pub bound_args: Vec<JsValue>,
    /// Whether the target was a constructor when bound
    pub constructible: bool,
}

/// Target of a WeakRef. Never traced.
#[derive(Debug, Clone)]
pub enum WeakRefTarget {
    Object(WeakGc<JsObject>),
    Symbol(WeakSymbol),
}

impl WeakRefTarget {
    /// The target if it is still alive
    pub fn upgrade(&self) -> Option<JsValue> {
        match self {
            WeakRefTarget::Object(weak) => weak.upgrade().map(JsValue::Object),
            WeakRefTarget::Symbol(weak) => weak.upgrade().map(JsValue::Symbol),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// JsObject
// ═══════════════════════════════════════════════════════════════════════════

/// An object: ordered properties, a prototype link and internal slots
pub struct JsObject {
    pub prototype: Option<JsObjectRef>,
    pub extensible: bool,
    properties: IndexMap<PropertyKey, Property, FxBuildHasher>,
    pub kind: ObjectKind,
}

impl JsObject {
    pub fn new(prototype: Option<JsObjectRef>) -> Self {
        Self::with_kind(prototype, ObjectKind::Ordinary)
    }

    pub fn with_kind(prototype: Option<JsObjectRef>, kind: ObjectKind) -> Self {
        Self {
            prototype,
            extensible: true,
            properties: IndexMap::with_hasher(FxBuildHasher),
            kind,
        }
    }

    /// Builtin tag used by Object.prototype.toString and debug output
    pub fn class_name(&self) -> &'static str {
        match &self.kind {
            ObjectKind::Ordinary | ObjectKind::Global(_) => "Object",
            ObjectKind::NativeFunction(_) | ObjectKind::BoundFunction(_) => "Function",
            ObjectKind::Error => "Error",
            ObjectKind::Symbol(_) => "Symbol",
            ObjectKind::Primitive(JsValue::Boolean(_)) => "Boolean",
            ObjectKind::Primitive(JsValue::Number(_)) => "Number",
            ObjectKind::Primitive(JsValue::String(_)) => "String",
            ObjectKind::Primitive(_) => "Object",
            ObjectKind::WeakRef(_) => "WeakRef",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::NativeFunction(_) | ObjectKind::BoundFunction(_)
        )
    }

    pub fn is_constructor(&self) -> bool {
        match &self.kind {
            ObjectKind::NativeFunction(data) => data.has_constructor(),
            ObjectKind::BoundFunction(data) => data.constructible,
            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ObjectKind::Error)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// [[GetOwnProperty]]
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    /// Install or replace a property without validation.
    ///
    /// Only for setting up fresh objects (intrinsics, error instances);
    /// everything else goes through `define_own_property`.
    pub fn insert_property(&mut self, key: PropertyKey, property: Property) {
        self.properties.insert(key, property);
    }

    pub fn insert_data(&mut self, key: PropertyKey, value: JsValue, attributes: Attributes) {
        self.insert_property(key, Property::data(value, attributes));
    }

    /// [[DefineOwnProperty]] (ValidateAndApplyPropertyDescriptor).
    ///
    /// Returns false without touching the object when the change is not
    /// allowed.
    pub fn define_own_property(&mut self, key: PropertyKey, desc: PropertyDescriptor) -> bool {
        let extensible = self.extensible;
        let Some(current) = self.properties.get_mut(&key) else {
            if !extensible {
                return false;
            }
            self.properties.insert(key, Property::from_descriptor(desc));
            return true;
        };

        if !current.attributes.configurable {
            if desc.configurable == Some(true) {
                return false;
            }
            if desc
                .enumerable
                .is_some_and(|e| e != current.attributes.enumerable)
            {
                return false;
            }
            if !desc.is_generic_descriptor()
                && desc.is_accessor_descriptor() != current.is_accessor()
            {
                return false;
            }
            match &current.value {
                PropertyValue::Accessor { get, set } => {
                    if desc.get.as_ref().is_some_and(|g| !same_accessor(g, get)) {
                        return false;
                    }
                    if desc.set.as_ref().is_some_and(|s| !same_accessor(s, set)) {
                        return false;
                    }
                }
                PropertyValue::Data(value) => {
                    if !current.attributes.writable {
                        if desc.writable == Some(true) {
                            return false;
                        }
                        if desc.value.as_ref().is_some_and(|v| !v.same_value(value)) {
                            return false;
                        }
                    }
                }
            }
        }

        // Switch between data and accessor, keeping enumerable/configurable
        if desc.is_accessor_descriptor() && !current.is_accessor() {
            current.value = PropertyValue::Accessor {
                get: None,
                set: None,
            };
            current.attributes.writable = false;
        } else if desc.is_data_descriptor() && current.is_accessor() {
            current.value = PropertyValue::Data(JsValue::Undefined);
            current.attributes.writable = false;
        }

        match &mut current.value {
            PropertyValue::Data(value) => {
                if let Some(new_value) = desc.value {
                    *value = new_value;
                }
                if let Some(writable) = desc.writable {
                    current.attributes.writable = writable;
                }
            }
            PropertyValue::Accessor { get, set } => {
                if let Some(new_get) = desc.get {
                    *get = new_get;
                }
                if let Some(new_set) = desc.set {
                    *set = new_set;
                }
            }
        }
        if let Some(enumerable) = desc.enumerable {
            current.attributes.enumerable = enumerable;
        }
        if let Some(configurable) = desc.configurable {
            current.attributes.configurable = configurable;
        }
        true
    }

    /// [[Delete]]
    pub fn delete(&mut self, key: &PropertyKey) -> bool {
        match self.properties.get(key) {
            None => true,
            Some(prop) if prop.attributes.configurable => {
                self.properties.shift_remove(key);
                true
            }
            Some(_) => false,
        }
    }

    /// [[OwnPropertyKeys]]: array indices ascending, then string keys, then
    /// symbols, each group in insertion order
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut indices = Vec::new();
        let mut strings = Vec::new();
        let mut symbols = Vec::new();
        for key in self.properties.keys() {
            match key {
                PropertyKey::Symbol(_) => symbols.push(key.cheap_clone()),
                PropertyKey::String(_) => match key.as_array_index() {
                    Some(index) => indices.push((index, key.cheap_clone())),
                    None => strings.push(key.cheap_clone()),
                },
            }
        }
        indices.sort_by_key(|(index, _)| *index);

        let mut keys = Vec::with_capacity(self.properties.len());
        keys.extend(indices.into_iter().map(|(_, key)| key));
        keys.extend(strings);
        keys.extend(symbols);
        keys
    }

    /// [[PreventExtensions]]
    pub fn prevent_extensions(&mut self) -> bool {
        self.extensible = false;
        true
    }
}

/// [[SetPrototypeOf]] for ordinary objects.
///
/// Returns false, leaving the object untouched, if the object is not
/// extensible or `proto` would make the chain cyclic.
pub fn set_prototype_of(obj: &JsObjectRef, proto: Option<JsObjectRef>) -> bool {
    let (same, extensible) = {
        let o = obj.borrow();
        (same_accessor(&o.prototype, &proto), o.extensible)
    };
    if same {
        return true;
    }
    if !extensible {
        return false;
    }

    let mut cursor = proto.clone();
    while let Some(p) = cursor {
        if Gc::ptr_eq(&p, obj) {
            return false;
        }
        cursor = p.borrow().prototype.clone();
    }

    obj.borrow_mut().prototype = proto;
    true
}

impl Traceable for JsObject {
    fn trace<F: FnMut(&Gc<Self>)>(&self, mut visitor: F) {
        if let Some(proto) = &self.prototype {
            visitor(proto);
        }
        for prop in self.properties.values() {
            match &prop.value {
                PropertyValue::Data(JsValue::Object(obj)) => visitor(obj),
                PropertyValue::Data(_) => {}
                PropertyValue::Accessor { get, set } => {
                    if let Some(get) = get {
                        visitor(get);
                    }
                    if let Some(set) = set {
                        visitor(set);
                    }
                }
            }
        }
        match &self.kind {
            ObjectKind::BoundFunction(bound) => {
                visitor(&bound.target);
                if let JsValue::Object(this) = &bound.bound_this {
                    visitor(this);
                }
                for arg in &bound.bound_args {
                    if let JsValue::Object(obj) = arg {
                        visitor(obj);
                    }
                }
            }
            // A function keeps its [[Realm]] alive through the realm's global
            ObjectKind::NativeFunction(data) => visitor(&data.realm_global),
            ObjectKind::Global(intrinsics) => intrinsics.iter().for_each(&mut visitor),
            _ => {}
        }
    }
}

impl Reset for JsObject {
    fn reset(&mut self) {
        self.prototype = None;
        self.properties.clear();
        self.kind = ObjectKind::Ordinary;
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObject")
            .field("class", &self.class_name())
            .field("extensible", &self.extensible)
            .field("keys", &self.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}
