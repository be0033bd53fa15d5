//! Error types for the runtime core

use thiserror::Error;

use crate::value::JsValue;

/// Result type for every fallible runtime operation.
///
/// `Ok` is a normal completion and `Err(JsError::Thrown { .. })` a throw
/// completion; `?` short-circuits abrupt results unchanged.
pub type JsResult<T> = Result<T, JsError>;

/// Main error type for the runtime
#[derive(Debug, Clone, Error)]
pub enum JsError {
    /// A JavaScript exception. `message` is a side-effect-free rendering of the
    /// value, captured when the throw happened.
    #[error("Uncaught {message}")]
    Thrown { value: JsValue, message: String },

    /// A broken runtime invariant. Never observable by executed code.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Agent options could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl JsError {
    pub fn internal(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    /// The thrown value, if this is a throw completion
    pub fn thrown_value(&self) -> Option<&JsValue> {
        match self {
            JsError::Thrown { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_thrown(&self) -> bool {
        matches!(self, JsError::Thrown { .. })
    }

    /// Whether this is a fatal runtime error rather than a JavaScript exception
    pub fn is_fatal(&self) -> bool {
        !self.is_thrown()
    }
}

impl From<serde_json::Error> for JsError {
    fn from(err: serde_json::Error) -> Self {
        JsError::Config(err.to_string())
    }
}

/// The native error constructor a thrown error is created from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    TypeError,
    RangeError,
    ReferenceError,
    SyntaxError,
    EvalError,
    UriError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::EvalError,
        ErrorKind::UriError,
    ];

    /// Value of the prototype's `name` property
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::UriError => "URIError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Messages for the errors the runtime itself throws.
///
/// String payloads are side-effect-free renderings of the offending value
/// or key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorType {
    #[error("{0} is not a constructor")]
    NotAConstructor(String),

    #[error("{0} is not a function")]
    NotAFunction(String),

    #[error("{0} is not a symbol")]
    NotASymbol(String),

    #[error("Constructor {0} requires 'new'")]
    ConstructorWithoutNew(String),

    #[error("{0} is not an object")]
    NotAnObject(String),

    #[error("Invalid value used as weak reference target: {0}")]
    CannotBeHeldWeakly(String),

    #[error("Cannot convert a Symbol value to a string")]
    ConvertSymbolToString,

    #[error("Cannot convert a Symbol value to a number")]
    ConvertSymbolToNumber,

    #[error("Cannot convert undefined or null to object")]
    ConvertNullishToObject,

    #[error("Cannot convert object to primitive value")]
    ConvertToPrimitive,

    #[error("Cyclic __proto__ value")]
    PrototypeCycle,

    #[error("Object prototype may only be an Object or null: {0}")]
    InvalidPrototype(String),

    #[error("Cannot redefine property: {0}")]
    DefinePropertyFailed(String),

    #[error("Cannot assign to read only property '{0}'")]
    ReadOnlyProperty(String),

    #[error("Cannot add property {0}, object is not extensible")]
    NonExtensible(String),

    #[error("{0} is not extensible")]
    NotExtensible(String),

    #[error("Cannot delete property '{0}'")]
    DeleteFailed(String),

    #[error("Cannot prevent extensions")]
    PreventExtensionsFailed,

    #[error("Property description must be an object: {0}")]
    DescriptorNotObject(String),

    #[error(
        "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute"
    )]
    MixedDescriptor,

    #[error("Getter must be a function: {0}")]
    GetterNotCallable(String),

    #[error("Setter must be a function: {0}")]
    SetterNotCallable(String),

    #[error("Method {method} called on incompatible receiver {receiver}")]
    IncompatibleReceiver { method: String, receiver: String },

    #[error("Right-hand side of 'instanceof' is not callable")]
    InstanceofNotCallable,

    #[error("Function has non-object prototype '{0}' in instanceof check")]
    InstanceofBadPrototype(String),

    #[error("Too many arguments in function call (only {0} allowed)")]
    TooManyArguments(usize),

    #[error("Maximum call stack size exceeded")]
    StackOverflow,
}

impl ErrorType {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorType::StackOverflow | ErrorType::TooManyArguments(_) => ErrorKind::RangeError,
            _ => ErrorKind::TypeError,
        }
    }
}
