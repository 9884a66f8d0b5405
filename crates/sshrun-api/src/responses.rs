//! Response types for action dispatch

use serde::{Deserialize, Serialize};

/// Outcome of one action
///
/// `error_code` is 0 on success and `result` holds the command output;
/// otherwise `result` is a message with the error and any partial output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub error_code: i32,
    pub result: String,
}

impl ActionResponse {
    #[must_use]
    pub fn success(output: String) -> Self {
        Self {
            error_code: 0,
            result: output,
        }
    }

    #[must_use]
    pub fn failure(message: String) -> Self {
        Self {
            error_code: 1,
            result: message,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_code == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsValidation {
    pub are_credentials_valid: bool,
    pub raw_validation_response: String,
}
