//! Bioauth - Error Normalizer
//!
//! Total mapping from native platform signals to the canonical taxonomy.
//! Owns one contextual rule: the negative-button signal reads as
//! `PressedOtherWay` only when the active attempt runs in Callback mode.

use crate::error::ErrorCode;
use crate::platform::{CapabilityStatus, NativeError};
use crate::types::FallbackMode;

/// Normalize a native prompt error under the active attempt's fallback
/// mode. Total: unrecognized codes map to `UnknownError`.
pub fn normalize(error: NativeError, mode: FallbackMode) -> ErrorCode {
    match error {
        NativeError::NoBiometrics => ErrorCode::NotEnrolled,
        NativeError::HwNotPresent => ErrorCode::NotAvailable,
        NativeError::HwUnavailable => ErrorCode::NotAvailable,
        NativeError::Lockout => ErrorCode::Lockout,
        NativeError::LockoutPermanent => ErrorCode::LockoutPermanent,
        NativeError::UserCanceled => ErrorCode::UserCancel,
        NativeError::Canceled => ErrorCode::SystemCancel,
        NativeError::NoSpace => ErrorCode::NotAvailable,
        NativeError::Timeout => ErrorCode::AuthFailed,
        NativeError::UnableToProcess => ErrorCode::AuthFailed,
        NativeError::Vendor => ErrorCode::AuthFailed,
        // Only Callback mode arms a caller-meaningful alternative action;
        // under the other modes the press keeps its generic cancellation
        // meaning.
        NativeError::NegativeButton => match mode {
            FallbackMode::Callback => ErrorCode::PressedOtherWay,
            FallbackMode::Hide | FallbackMode::DeviceCredential => ErrorCode::UserCancel,
        },
        NativeError::Other(_) => ErrorCode::UnknownError,
    }
}

/// Map a capability status to an availability error, if any.
pub fn normalize_status(status: CapabilityStatus) -> Option<(ErrorCode, &'static str)> {
    match status {
        CapabilityStatus::Ready => None,
        CapabilityStatus::NoHardware => {
            Some((ErrorCode::NotAvailable, "No biometric hardware available"))
        }
        CapabilityStatus::HardwareUnavailable => {
            Some((ErrorCode::NotAvailable, "Biometric hardware unavailable"))
        }
        CapabilityStatus::NoneEnrolled => {
            Some((ErrorCode::NotEnrolled, "No biometric credentials enrolled"))
        }
        CapabilityStatus::SecurityUpdateRequired => Some((
            ErrorCode::NotAvailable,
            "Security update required for biometrics",
        )),
        CapabilityStatus::Unsupported => Some((
            ErrorCode::NotAvailable,
            "Biometric authentication not supported",
        )),
        CapabilityStatus::Unknown => Some((ErrorCode::UnknownError, "Biometric status unknown")),
    }
}
