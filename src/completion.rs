//! Completion records.
//!
//! Inside the runtime every fallible operation returns `JsResult`, which can
//! only express normal and throw completions. `Completion` is the full record
//! used by structured control constructs layered on top: `return`, `break`
//! and `continue` travel through it unchanged until the construct that owns
//! them consumes them.

use crate::error::{JsError, JsResult};
use crate::value::{JsString, JsValue};

/// A completion record
#[must_use]
#[derive(Debug, Clone)]
pub enum Completion {
    Normal(JsValue),
    Throw(JsValue),
    Return(JsValue),
    /// `break`, with an optional label
    Break(Option<JsString>),
    /// `continue`, with an optional label
    Continue(Option<JsString>),
}

impl Completion {
    /// Convert an operation result into a completion.
    ///
    /// Fatal errors stay errors; they never turn into a catchable throw.
    pub fn from_result(result: JsResult<JsValue>) -> JsResult<Completion> {
        match result {
            Ok(value) => Ok(Completion::Normal(value)),
            Err(JsError::Thrown { value, .. }) => Ok(Completion::Throw(value)),
            Err(err) => Err(err),
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Completion::Normal(_))
    }

    pub fn is_abrupt(&self) -> bool {
        !self.is_normal()
    }

    pub fn is_throw(&self) -> bool {
        matches!(self, Completion::Throw(_))
    }

    /// The value of a normal completion, or the abrupt completion itself
    pub fn into_normal(self) -> Result<JsValue, Completion> {
        match self {
            Completion::Normal(value) => Ok(value),
            abrupt => Err(abrupt),
        }
    }

    /// Run `f` on the value of a normal completion. Abrupt completions are
    /// returned unchanged.
    pub fn and_then(self, f: impl FnOnce(JsValue) -> Completion) -> Completion {
        match self {
            Completion::Normal(value) => f(value),
            abrupt => abrupt,
        }
    }

    /// UpdateEmpty for the value-carrying variants
    pub fn value(&self) -> Option<&JsValue> {
        match self {
            Completion::Normal(v) | Completion::Throw(v) | Completion::Return(v) => Some(v),
            Completion::Break(_) | Completion::Continue(_) => None,
        }
    }
}

impl From<JsValue> for Completion {
    fn from(value: JsValue) -> Self {
        Completion::Normal(value)
    }
}
