//! ECMAScript object and value runtime core
//!
//! Values, objects with ordered properties and prototype links, symbols and
//! the global symbol registry, realms with their intrinsics, and the native
//! function call/construct protocol. Abrupt completions travel as
//! `Err(JsError::Thrown { .. })` through ordinary `Result`s.
//!
//! # Example
//!
//! ```
//! use realmjs::{Agent, JsError, JsValue, PropertyKey};
//!
//! # fn main() -> Result<(), JsError> {
//! let mut agent = Agent::default();
//! let realm = agent.create_realm()?;
//! let same = agent.run_in_realm(realm, |agent| {
//!     let global = agent.running_realm()?.global_object().clone();
//!     let symbol = agent.get(&global, &PropertyKey::from("Symbol"))?;
//!     let symbol = symbol
//!         .as_object()
//!         .cloned()
//!         .ok_or_else(|| JsError::internal("Symbol is not installed"))?;
//!     let symbol_for = agent.get(&symbol, &PropertyKey::from("for"))?;
//!     let a = agent.call(&symbol_for, &JsValue::Undefined, &[JsValue::from("app")])?;
//!     let b = agent.call(&symbol_for, &JsValue::Undefined, &[JsValue::from("app")])?;
//!     Ok(a.strict_equals(&b))
//! })?;
//! assert!(same);
//! # Ok(())
//! # }
//! ```

pub mod agent;
mod builtins;
pub mod completion;
pub mod error;
pub mod gc;
pub mod native;
pub mod object;
pub mod options;
pub mod realm;
pub mod string_dict;
pub mod value;

pub use agent::Agent;
pub use agent::PreferredType;
pub use agent::WellKnownSymbol;
pub use completion::Completion;
pub use error::ErrorKind;
pub use error::ErrorType;
pub use error::JsError;
pub use error::JsResult;
pub use gc::Gc;
pub use native::Arguments;
pub use native::NativeFunctionSpec;
pub use object::Attributes;
pub use object::JsObject;
pub use object::JsObjectRef;
pub use object::ObjectKind;
pub use object::PropertyDescriptor;
pub use object::PropertyKey;
pub use options::AgentOptions;
pub use realm::Intrinsic;
pub use realm::Realm;
pub use realm::RealmId;
pub use value::CheapClone;
pub use value::JsString;
pub use value::JsSymbol;
pub use value::JsValue;
