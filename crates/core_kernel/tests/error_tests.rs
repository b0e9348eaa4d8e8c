//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::PortError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing config");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing config"),
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}

#[test]
fn test_port_error_display_keeps_constraint_name() {
    let error = PortError::constraint("accounts_balance_non_negative", "new row violates check");
    let display = error.to_string();

    assert!(display.contains("accounts_balance_non_negative"));
    assert!(display.contains("new row violates check"));
}

#[test]
fn test_port_error_validation_has_no_field() {
    match PortError::validation("bad amount") {
        PortError::Validation { message, field } => {
            assert_eq!(message, "bad amount");
            assert!(field.is_none());
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }
}
