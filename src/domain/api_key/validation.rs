//! Input validation for key records

use thiserror::Error;

/// Errors that can occur when validating key record input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KeyInputError {
    #[error("Key name cannot be empty")]
    EmptyName,

    #[error("Key name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("User id cannot be empty")]
    EmptyUserId,

    #[error("Credential value cannot be empty")]
    EmptyKeyValue,
}

const MAX_KEY_NAME_LENGTH: usize = 100;

/// Validate a user-facing key name
pub fn validate_key_name(name: &str) -> Result<(), KeyInputError> {
    if name.trim().is_empty() {
        return Err(KeyInputError::EmptyName);
    }

    if name.len() > MAX_KEY_NAME_LENGTH {
        return Err(KeyInputError::NameTooLong(MAX_KEY_NAME_LENGTH));
    }

    Ok(())
}

/// Validate the non-secret parts of a create/rotate request
pub fn validate_key_input(user_id: &str, key_value: &str) -> Result<(), KeyInputError> {
    if user_id.trim().is_empty() {
        return Err(KeyInputError::EmptyUserId);
    }

    if key_value.is_empty() {
        return Err(KeyInputError::EmptyKeyValue);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_name() {
        assert!(validate_key_name("My OpenAI Key").is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(validate_key_name(""), Err(KeyInputError::EmptyName));
        assert_eq!(validate_key_name("   "), Err(KeyInputError::EmptyName));
    }

    #[test]
    fn test_name_too_long() {
        let name = "x".repeat(101);
        assert_eq!(
            validate_key_name(&name),
            Err(KeyInputError::NameTooLong(100))
        );
    }

    #[test]
    fn test_key_input() {
        assert!(validate_key_input("u1", "sk-something").is_ok());
        assert_eq!(
            validate_key_input("", "sk-something"),
            Err(KeyInputError::EmptyUserId)
        );
        assert_eq!(
            validate_key_input("u1", ""),
            Err(KeyInputError::EmptyKeyValue)
        );
    }
}
