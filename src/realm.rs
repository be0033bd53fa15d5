//! Realms and their intrinsic objects.
//!
//! A realm is created in three steps: the global object, then every intrinsic
//! prototype (each one only after the prototype it chains from), then the
//! intrinsic constructors. The built-in initializers then install properties
//! while running inside the new realm.

use serde::Serialize;

use crate::builtins;
use crate::error::{ErrorKind, JsError, JsResult};
use crate::gc::Guard;
use crate::native::NativeFunctionSpec;
use crate::object::{JsObject, JsObjectRef, ObjectKind};
use crate::string_dict::Names;

/// Identifies a realm within its agent. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RealmId(pub(crate) usize);

impl RealmId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RealmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "realm#{}", self.0)
    }
}

macro_rules! define_intrinsics {
    ($($variant:ident, $field:ident => $name:literal;)*) => {
        /// Names one intrinsic object
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Intrinsic {
            $($variant,)*
        }

        impl Intrinsic {
            pub const ALL: &'static [Intrinsic] = &[$(Intrinsic::$variant,)*];

            /// Specification name, e.g. `%Object.prototype%`
            pub fn name(self) -> &'static str {
                match self {
                    $(Intrinsic::$variant => $name,)*
                }
            }
        }

        /// A realm's intrinsic objects
        pub struct Intrinsics {
            $(
                #[doc = $name]
                pub $field: JsObjectRef,
            )*
        }

        impl Intrinsics {
            pub fn get(&self, which: Intrinsic) -> &JsObjectRef {
                match which {
                    $(Intrinsic::$variant => &self.$field,)*
                }
            }

            fn to_vec(&self) -> Vec<JsObjectRef> {
                vec![$(self.$field.clone(),)*]
            }
        }

        #[derive(Default)]
        struct IntrinsicsBuilder {
            $($field: Option<JsObjectRef>,)*
        }

        impl IntrinsicsBuilder {
            fn get(&self, which: Intrinsic) -> Option<&JsObjectRef> {
                match which {
                    $(Intrinsic::$variant => self.$field.as_ref(),)*
                }
            }

            fn slot(&mut self, which: Intrinsic) -> &mut Option<JsObjectRef> {
                match which {
                    $(Intrinsic::$variant => &mut self.$field,)*
                }
            }

            fn build(self) -> JsResult<Intrinsics> {
                Ok(Intrinsics {
                    $(
                        $field: self.$field.ok_or_else(|| {
                            JsError::internal(format!("intrinsic {} was never created", $name))
                        })?,
                    )*
                })
            }
        }
    };
}

define_intrinsics! {
    ObjectPrototype, object_prototype => "%Object.prototype%";
    FunctionPrototype, function_prototype => "%Function.prototype%";
    ErrorPrototype, error_prototype => "%Error.prototype%";
    TypeErrorPrototype, type_error_prototype => "%TypeError.prototype%";
    RangeErrorPrototype, range_error_prototype => "%RangeError.prototype%";
    ReferenceErrorPrototype, reference_error_prototype => "%ReferenceError.prototype%";
    SyntaxErrorPrototype, syntax_error_prototype => "%SyntaxError.prototype%";
    EvalErrorPrototype, eval_error_prototype => "%EvalError.prototype%";
    UriErrorPrototype, uri_error_prototype => "%URIError.prototype%";
    AggregateErrorPrototype, aggregate_error_prototype => "%AggregateError.prototype%";
    SymbolPrototype, symbol_prototype => "%Symbol.prototype%";
    AsyncFunctionPrototype, async_function_prototype => "%AsyncFunction.prototype%";
    WeakRefPrototype, weak_ref_prototype => "%WeakRef.prototype%";
    Object, object => "%Object%";
    Error, error => "%Error%";
    TypeError, type_error => "%TypeError%";
    RangeError, range_error => "%RangeError%";
    ReferenceError, reference_error => "%ReferenceError%";
    SyntaxError, syntax_error => "%SyntaxError%";
    EvalError, eval_error => "%EvalError%";
    UriError, uri_error => "%URIError%";
    Symbol, symbol => "%Symbol%";
    WeakRef, weak_ref => "%WeakRef%";
}

impl Intrinsic {
    /// `%NativeError.prototype%` for an error kind
    pub fn error_prototype(kind: ErrorKind) -> Intrinsic {
        match kind {
            ErrorKind::Error => Intrinsic::ErrorPrototype,
            ErrorKind::TypeError => Intrinsic::TypeErrorPrototype,
            ErrorKind::RangeError => Intrinsic::RangeErrorPrototype,
            ErrorKind::ReferenceError => Intrinsic::ReferenceErrorPrototype,
            ErrorKind::SyntaxError => Intrinsic::SyntaxErrorPrototype,
            ErrorKind::EvalError => Intrinsic::EvalErrorPrototype,
            ErrorKind::UriError => Intrinsic::UriErrorPrototype,
        }
    }

    /// `%NativeError%` for an error kind
    pub fn error_constructor(kind: ErrorKind) -> Intrinsic {
        match kind {
            ErrorKind::Error => Intrinsic::Error,
            ErrorKind::TypeError => Intrinsic::TypeError,
            ErrorKind::RangeError => Intrinsic::RangeError,
            ErrorKind::ReferenceError => Intrinsic::ReferenceError,
            ErrorKind::SyntaxError => Intrinsic::SyntaxError,
            ErrorKind::EvalError => Intrinsic::EvalError,
            ErrorKind::UriError => Intrinsic::UriError,
        }
    }
}

/// Intrinsic prototypes in creation order, with the prototype each chains from
const PROTOTYPES: &[(Intrinsic, Option<Intrinsic>)] = &[
    (Intrinsic::ObjectPrototype, None),
    (Intrinsic::FunctionPrototype, Some(Intrinsic::ObjectPrototype)),
    (Intrinsic::ErrorPrototype, Some(Intrinsic::ObjectPrototype)),
    (Intrinsic::TypeErrorPrototype, Some(Intrinsic::ErrorPrototype)),
    (Intrinsic::RangeErrorPrototype, Some(Intrinsic::ErrorPrototype)),
    (Intrinsic::ReferenceErrorPrototype, Some(Intrinsic::ErrorPrototype)),
    (Intrinsic::SyntaxErrorPrototype, Some(Intrinsic::ErrorPrototype)),
    (Intrinsic::EvalErrorPrototype, Some(Intrinsic::ErrorPrototype)),
    (Intrinsic::UriErrorPrototype, Some(Intrinsic::ErrorPrototype)),
    (Intrinsic::AggregateErrorPrototype, Some(Intrinsic::ErrorPrototype)),
    (Intrinsic::SymbolPrototype, Some(Intrinsic::ObjectPrototype)),
    (Intrinsic::AsyncFunctionPrototype, Some(Intrinsic::FunctionPrototype)),
    (Intrinsic::WeakRefPrototype, Some(Intrinsic::ObjectPrototype)),
];

impl IntrinsicsBuilder {
    /// Allocate one intrinsic prototype. Its parent must already exist.
    fn create_prototype(
        &mut self,
        guard: &Guard<JsObject>,
        names: &Names,
        realm: RealmId,
        global: &JsObjectRef,
        which: Intrinsic,
        parent: Option<Intrinsic>,
    ) -> JsResult<()> {
        let parent = match parent {
            Some(parent) => Some(self.get(parent).cloned().ok_or_else(|| {
                JsError::internal(format!(
                    "{} created before its parent {}",
                    which.name(),
                    parent.name()
                ))
            })?),
            None => None,
        };
        let object = if which == Intrinsic::FunctionPrototype {
            builtins::function::function_prototype_object(names, realm, global, parent)
        } else {
            JsObject::new(parent)
        };
        *self.slot(which) = Some(guard.alloc(object));
        Ok(())
    }

    fn create_constructor(
        &mut self,
        guard: &Guard<JsObject>,
        names: &Names,
        realm: RealmId,
        global: &JsObjectRef,
        which: Intrinsic,
        spec: &NativeFunctionSpec,
    ) -> JsResult<()> {
        let function_prototype = self.get(Intrinsic::FunctionPrototype).cloned().ok_or_else(|| {
            JsError::internal(format!("{} created before %Function.prototype%", which.name()))
        })?;
        let object = builtins::function::builtin_function_object(
            names,
            spec,
            realm,
            global,
            Some(function_prototype),
        );
        *self.slot(which) = Some(guard.alloc(object));
        Ok(())
    }
}

/// A realm: a global object plus its intrinsics
pub struct Realm {
    id: RealmId,
    global_object: JsObjectRef,
    intrinsics: Intrinsics,
    /// Roots the global object and every intrinsic until the realm is removed
    guard: Guard<JsObject>,
    detached: bool,
}

impl Realm {
    /// Allocate the global object and all intrinsics. Properties are
    /// installed later by the built-in initializers.
    pub(crate) fn new(id: RealmId, guard: Guard<JsObject>, names: &Names) -> JsResult<Self> {
        let global_object = guard.alloc(JsObject::new(None));

        let mut builder = IntrinsicsBuilder::default();
        for &(which, parent) in PROTOTYPES {
            builder.create_prototype(&guard, names, id, &global_object, which, parent)?;
        }
        for (which, spec) in builtins::constructor_specs(names) {
            builder.create_constructor(&guard, names, id, &global_object, which, &spec)?;
        }
        let intrinsics = builder.build()?;

        {
            let mut global = global_object.borrow_mut();
            global.prototype = Some(intrinsics.object_prototype.clone());
            global.kind = ObjectKind::Global(intrinsics.to_vec());
        }

        Ok(Self {
            id,
            global_object,
            intrinsics,
            guard,
            detached: false,
        })
    }

    pub fn id(&self) -> RealmId {
        self.id
    }

    pub fn global_object(&self) -> &JsObjectRef {
        &self.global_object
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn intrinsic(&self, which: Intrinsic) -> &JsObjectRef {
        self.intrinsics.get(which)
    }

    /// Number of objects this realm roots directly
    pub fn root_count(&self) -> usize {
        self.guard.len()
    }

    /// Whether the embedder has removed this realm
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Drop the realm's own roots. Its objects stay alive only while
    /// something else reaches them.
    pub(crate) fn detach(&mut self) {
        self.guard.clear();
        self.detached = true;
    }

    /// Whether the collector has reclaimed the realm's global, and with it
    /// every function that could run in this realm
    pub(crate) fn is_reclaimed(&self) -> bool {
        self.global_object.is_swept()
    }
}

impl std::fmt::Debug for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Realm")
            .field("id", &self.id)
            .field("global_object", &self.global_object.id())
            .field("detached", &self.detached)
            .finish()
    }
}
