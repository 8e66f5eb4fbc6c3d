//! Bioauth - Error Types
//!
//! Canonical error taxonomy for all biometric and key operations.
//! The string identifiers are a compatibility contract: external callers
//! match on them, so they must never change across platform updates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for biometric operations
pub type BioResult<T> = Result<T, BiometricError>;

/// Canonical error code (closed set)
///
/// Every platform-specific failure signal normalizes to exactly one of
/// these. Serialized as the stable `BIOMETRIC_*` wire identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No usable biometric hardware (missing, busy, or unsupported)
    #[serde(rename = "BIOMETRIC_NOT_AVAILABLE")]
    NotAvailable,
    /// Hardware present but no biometric credentials enrolled
    #[serde(rename = "BIOMETRIC_NOT_ENROLLED")]
    NotEnrolled,
    /// Access to the biometric capability was denied
    #[serde(rename = "BIOMETRIC_PERMISSION_DENIED")]
    PermissionDenied,
    /// Temporarily locked out after too many failed attempts
    #[serde(rename = "BIOMETRIC_LOCKOUT")]
    Lockout,
    /// Permanently locked out until the user re-authenticates with device credentials
    #[serde(rename = "BIOMETRIC_LOCKOUT_PERMANENT")]
    LockoutPermanent,
    /// Sensor could not verify the user (terminal variant, e.g. timeout)
    #[serde(rename = "BIOMETRIC_AUTH_FAILED")]
    AuthFailed,
    /// User dismissed the prompt
    #[serde(rename = "BIOMETRIC_USER_CANCEL")]
    UserCancel,
    /// System dismissed the prompt (app backgrounded, etc.)
    #[serde(rename = "BIOMETRIC_SYSTEM_CANCEL")]
    SystemCancel,
    /// User pressed the alternative-action button in Callback mode
    #[serde(rename = "BIOMETRIC_PRESSED_OTHER_WAY")]
    PressedOtherWay,
    /// Another authentication attempt is already in flight
    #[serde(rename = "BIOMETRIC_AUTHENTICATION_IN_PROGRESS")]
    AuthenticationInProgress,
    /// Key already exists - delete it before creating a new one
    #[serde(rename = "BIOMETRIC_KEY_EXISTS")]
    KeyExists,
    /// No key under the app alias
    #[serde(rename = "BIOMETRIC_KEY_NOT_FOUND")]
    KeyNotFound,
    /// Secure storage refused to generate the key pair
    #[serde(rename = "BIOMETRIC_KEY_CREATION_FAILED")]
    KeyCreationFailed,
    /// Secure storage refused to delete the key pair
    #[serde(rename = "BIOMETRIC_KEY_DELETION_FAILED")]
    KeyDeletionFailed,
    /// Signing context could not produce a signature
    #[serde(rename = "BIOMETRIC_SIGNATURE_FAILED")]
    SignatureFailed,
    /// Anything the taxonomy does not recognize
    #[serde(rename = "BIOMETRIC_UNKNOWN_ERROR")]
    UnknownError,
}

impl ErrorCode {
    /// Stable wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAvailable => "BIOMETRIC_NOT_AVAILABLE",
            Self::NotEnrolled => "BIOMETRIC_NOT_ENROLLED",
            Self::PermissionDenied => "BIOMETRIC_PERMISSION_DENIED",
            Self::Lockout => "BIOMETRIC_LOCKOUT",
            Self::LockoutPermanent => "BIOMETRIC_LOCKOUT_PERMANENT",
            Self::AuthFailed => "BIOMETRIC_AUTH_FAILED",
            Self::UserCancel => "BIOMETRIC_USER_CANCEL",
            Self::SystemCancel => "BIOMETRIC_SYSTEM_CANCEL",
            Self::PressedOtherWay => "BIOMETRIC_PRESSED_OTHER_WAY",
            Self::AuthenticationInProgress => "BIOMETRIC_AUTHENTICATION_IN_PROGRESS",
            Self::KeyExists => "BIOMETRIC_KEY_EXISTS",
            Self::KeyNotFound => "BIOMETRIC_KEY_NOT_FOUND",
            Self::KeyCreationFailed => "BIOMETRIC_KEY_CREATION_FAILED",
            Self::KeyDeletionFailed => "BIOMETRIC_KEY_DELETION_FAILED",
            Self::SignatureFailed => "BIOMETRIC_SIGNATURE_FAILED",
            Self::UnknownError => "BIOMETRIC_UNKNOWN_ERROR",
        }
    }

    /// Default human-readable message for this code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::NotAvailable => "Biometric authentication not available",
            Self::NotEnrolled => "No biometric credentials enrolled",
            Self::PermissionDenied => "Biometric permission denied",
            Self::Lockout => "Too many failed attempts - temporarily locked out",
            Self::LockoutPermanent => "Biometric authentication permanently locked out",
            Self::AuthFailed => "Biometric authentication failed",
            Self::UserCancel => "Authentication cancelled by user",
            Self::SystemCancel => "Authentication cancelled by system",
            Self::PressedOtherWay => "User chose the alternative action",
            Self::AuthenticationInProgress => "Authentication is already in progress",
            Self::KeyExists => {
                "Biometric key already exists. Delete existing key before creating a new one."
            }
            Self::KeyNotFound => "Biometric key not found. Create a key first.",
            Self::KeyCreationFailed => "Failed to create biometric key",
            Self::KeyDeletionFailed => "Failed to delete biometric key",
            Self::SignatureFailed => "Failed to create signature",
            Self::UnknownError => "Unknown error",
        }
    }

    /// Lockout is derived ONLY from explicit lockout codes, never inferred
    /// from hardware-unavailable signals.
    pub fn is_lockout(&self) -> bool {
        matches!(self, Self::Lockout | Self::LockoutPermanent)
    }

    /// Errors caused by a deliberate user action rather than a fault
    pub fn is_user_action(&self) -> bool {
        matches!(self, Self::UserCancel | Self::PressedOtherWay)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical error: one code plus a human-readable message.
///
/// The message is diagnostic only; callers branch on `code`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct BiometricError {
    pub code: ErrorCode,
    pub message: String,
}

impl BiometricError {
    /// Create an error with a custom message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Unexpected internal fault, preserving the original diagnostic text
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, message)
    }
}

impl From<ErrorCode> for BiometricError {
    fn from(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_identifiers_are_stable() {
        assert_eq!(ErrorCode::NotAvailable.as_str(), "BIOMETRIC_NOT_AVAILABLE");
        assert_eq!(ErrorCode::NotEnrolled.as_str(), "BIOMETRIC_NOT_ENROLLED");
        assert_eq!(ErrorCode::Lockout.as_str(), "BIOMETRIC_LOCKOUT");
        assert_eq!(
            ErrorCode::LockoutPermanent.as_str(),
            "BIOMETRIC_LOCKOUT_PERMANENT"
        );
        assert_eq!(
            ErrorCode::PressedOtherWay.as_str(),
            "BIOMETRIC_PRESSED_OTHER_WAY"
        );
        assert_eq!(
            ErrorCode::AuthenticationInProgress.as_str(),
            "BIOMETRIC_AUTHENTICATION_IN_PROGRESS"
        );
        assert_eq!(ErrorCode::KeyExists.as_str(), "BIOMETRIC_KEY_EXISTS");
        assert_eq!(ErrorCode::KeyNotFound.as_str(), "BIOMETRIC_KEY_NOT_FOUND");
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&ErrorCode::SignatureFailed).unwrap();
        assert_eq!(json, "\"BIOMETRIC_SIGNATURE_FAILED\"");

        let back: ErrorCode = serde_json::from_str("\"BIOMETRIC_USER_CANCEL\"").unwrap();
        assert_eq!(back, ErrorCode::UserCancel);
    }

    #[test]
    fn test_lockout_only_from_lockout_codes() {
        assert!(ErrorCode::Lockout.is_lockout());
        assert!(ErrorCode::LockoutPermanent.is_lockout());
        // Hardware-unavailable must NOT read as lockout
        assert!(!ErrorCode::NotAvailable.is_lockout());
        assert!(!ErrorCode::AuthFailed.is_lockout());
    }

    #[test]
    fn test_error_from_code_uses_default_message() {
        let err = BiometricError::from(ErrorCode::KeyNotFound);
        assert_eq!(err.code, ErrorCode::KeyNotFound);
        assert_eq!(err.message, "Biometric key not found. Create a key first.");
    }
}
