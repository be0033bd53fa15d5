//! String interning for property names.
//!
//! Built-ins look up the same handful of property names over and over. The
//! agent interns them once so every realm shares one `Rc<str>` per name.

use rustc_hash::FxHashMap;

use crate::value::{CheapClone, JsString};

/// A dictionary that hands out one shared `JsString` per distinct content.
#[derive(Default)]
pub struct StringDict {
    strings: FxHashMap<Box<str>, JsString>,
}

impl StringDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an existing string or insert a new one.
    pub fn get_or_insert(&mut self, s: &str) -> JsString {
        if let Some(existing) = self.strings.get(s) {
            return existing.cheap_clone();
        }
        let js_str = JsString::from(s);
        self.strings.insert(s.into(), js_str.cheap_clone());
        js_str
    }

    /// Get an existing string without inserting.
    pub fn get(&self, s: &str) -> Option<JsString> {
        self.strings.get(s).map(CheapClone::cheap_clone)
    }

    /// Number of unique strings in the dictionary.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

macro_rules! define_names {
    ($($field:ident => $text:literal),* $(,)?) => {
        /// Property names interned once per agent.
        ///
        /// Consumers refer to names by field, never by string literal.
        #[derive(Clone)]
        pub struct Names {
            $(
                #[doc = concat!("`\"", $text, "\"`")]
                pub $field: JsString,
            )*
        }

        impl Names {
            /// Intern every name into `dict`.
            pub fn new(dict: &mut StringDict) -> Self {
                Self {
                    $($field: dict.get_or_insert($text),)*
                }
            }
        }
    };
}

define_names! {
    aggregate_error => "AggregateError",
    apply => "apply",
    bind => "bind",
    call => "call",
    cause => "cause",
    configurable => "configurable",
    constructor => "constructor",
    create => "create",
    define_property => "defineProperty",
    deref => "deref",
    false_ => "false",
    description => "description",
    enumerable => "enumerable",
    error => "Error",
    eval_error => "EvalError",
    for_ => "for",
    get => "get",
    get_own_property_descriptor => "getOwnPropertyDescriptor",
    get_prototype_of => "getPrototypeOf",
    global_this => "globalThis",
    has_own_property => "hasOwnProperty",
    infinity => "Infinity",
    is => "is",
    is_extensible => "isExtensible",
    is_prototype_of => "isPrototypeOf",
    key_for => "keyFor",
    length => "length",
    message => "message",
    name => "name",
    nan => "NaN",
    null => "null",
    object => "Object",
    prevent_extensions => "preventExtensions",
    property_is_enumerable => "propertyIsEnumerable",
    prototype => "prototype",
    range_error => "RangeError",
    reference_error => "ReferenceError",
    set => "set",
    set_prototype_of => "setPrototypeOf",
    symbol => "Symbol",
    syntax_error => "SyntaxError",
    to_string => "toString",
    true_ => "true",
    type_error => "TypeError",
    undefined => "undefined",
    uri_error => "URIError",
    value => "value",
    value_of => "valueOf",
    weak_ref => "WeakRef",
    writable => "writable",
}
