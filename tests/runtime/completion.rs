//! Completion records built from runtime results

use super::{assert_throws, construct_global, try_in_realm, with_realm};
use realmjs::{Completion, ErrorKind, JsError, JsValue};

#[test]
fn test_thrown_error_becomes_throw_completion() {
    with_realm(|agent| {
        let result = construct_global(agent, "Symbol", &[]).map(JsValue::Object);
        let completion = Completion::from_result(result)?;
        assert!(completion.is_throw());
        assert!(completion.is_abrupt());
        let value = completion.value().unwrap();
        assert!(value.is_object());
        Ok(())
    });
}

#[test]
fn test_normal_result_becomes_normal_completion() {
    with_realm(|agent| {
        let result = construct_global(agent, "Error", &[]).map(JsValue::Object);
        let completion = Completion::from_result(result)?;
        assert!(completion.is_normal());
        let value = completion.into_normal().unwrap();
        assert!(value.as_object().unwrap().borrow().is_error());
        Ok(())
    });
}

#[test]
fn test_internal_errors_stay_fatal() {
    let result: Result<JsValue, JsError> = Err(JsError::internal("corrupted"));
    assert!(Completion::from_result(result).is_err());
}

#[test]
fn test_abrupt_completion_escapes_run_in_realm() {
    let result = try_in_realm(|agent| {
        construct_global(agent, "Symbol", &[])?;
        Ok(())
    });
    let err = result.unwrap_err();
    assert!(err.is_thrown());
    assert!(err.to_string().starts_with("Uncaught TypeError"));
}

#[test]
fn test_catch_and_continue() {
    with_realm(|agent| {
        let result = construct_global(agent, "WeakRef", &[JsValue::from(1)]);
        assert_throws(agent, result, ErrorKind::TypeError);
        // The agent is usable after a caught throw
        let error = construct_global(agent, "Error", &[JsValue::from("after")])?;
        assert!(error.borrow().is_error());
        Ok(())
    });
}
