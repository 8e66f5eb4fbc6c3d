//! Bioauth - Core Data Model
//!
//! Biometric classes, authenticator strengths, fallback modes and the
//! per-call prompt options.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Sensor modality offered to the user
///
/// Selected once per availability check by the capability prober.
/// Priority is fixed and documented: fingerprint > face > iris.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiometricClass {
    #[serde(rename = "fingerprint")]
    Fingerprint,
    #[serde(rename = "faceId")]
    FaceId,
    #[serde(rename = "touchId")]
    TouchId,
    #[serde(rename = "iris")]
    Iris,
    #[serde(rename = "none")]
    None,
}

impl BiometricClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fingerprint => "fingerprint",
            Self::FaceId => "faceId",
            Self::TouchId => "touchId",
            Self::Iris => "iris",
            Self::None => "none",
        }
    }
}

/// Platform assurance tier for biometric verification.
///
/// Weak is used for availability probing so that plain "is biometrics
/// usable" queries never consume lockout attempts. Strong is mandatory
/// for key-backed signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticatorStrength {
    Weak,
    Strong,
}

/// Policy for the "other way" affordance on the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackMode {
    /// Suppress the alternative-action control entirely. Platform
    /// conditional: providers that cannot hide the control render a
    /// default label instead.
    #[serde(rename = "hide")]
    Hide,
    /// Show the alternative-action control; pressing it resolves the
    /// attempt with `PressedOtherWay` so the caller can run its own flow.
    #[serde(rename = "callback")]
    Callback,
    /// Allow device credential (PIN / pattern / password) as a fallback
    /// authenticator inside the same prompt.
    #[serde(rename = "PIN", alias = "pin", alias = "deviceCredential")]
    DeviceCredential,
}

impl Default for FallbackMode {
    fn default() -> Self {
        Self::DeviceCredential
    }
}

impl FallbackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Callback => "callback",
            Self::DeviceCredential => "PIN",
        }
    }
}

/// Default prompt title
pub const DEFAULT_TITLE: &str = "Biometric Authentication";

/// Default alternative-action button text
pub const DEFAULT_FALLBACK_TEXT: &str = "Another way";

/// Caller-supplied prompt options.
///
/// Accepts the legacy field spellings (`titlePrompt`, `otherwayWith`,
/// `otherwayText`) as deprecated aliases of the canonical names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptOptions {
    /// Prompt title
    #[serde(alias = "titlePrompt")]
    pub title: Option<String>,
    /// Fallback policy; defaults to device-credential
    #[serde(alias = "otherwayWith")]
    pub fallback_mode: Option<FallbackMode>,
    /// Alternative-action button text; only rendered in Callback mode
    #[serde(alias = "otherwayText")]
    pub fallback_text: Option<String>,
}

/// Ephemeral value object describing one authentication attempt.
///
/// Created at the start of a call, consumed by the orchestrator,
/// discarded on terminal outcome. At most one attempt is active
/// process-wide at any time.
#[derive(Debug, Clone)]
pub struct AuthAttempt {
    pub mode: FallbackMode,
    pub title: String,
    pub fallback_text: String,
    pub strength: AuthenticatorStrength,
}

impl AuthAttempt {
    /// Build an attempt from caller options, filling in defaults
    pub fn from_options(options: &PromptOptions, strength: AuthenticatorStrength) -> Self {
        Self {
            mode: options.fallback_mode.unwrap_or_default(),
            title: options
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            fallback_text: options
                .fallback_text
                .clone()
                .unwrap_or_else(|| DEFAULT_FALLBACK_TEXT.to_string()),
            strength,
        }
    }
}

/// Availability report produced by `checkAvailability`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub is_available: bool,
    pub allow_access: bool,
    pub biometric_type: BiometricClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Generic success/failure result (permission, key lifecycle)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl OperationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_code: None,
            error_message: None,
        }
    }

    pub fn failed(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: Some(code),
            error_message: Some(message.into()),
        }
    }
}

/// Authentication result (`authenticateBiometric` / `authenticatePIN`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressed_other_way: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Key existence query result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyExistsResult {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Signature result (`sign`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureResult {
    pub success: bool,
    /// Base64-encoded signature bytes (standard alphabet, no wrapping)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&FallbackMode::DeviceCredential).unwrap(),
            "\"PIN\""
        );
        assert_eq!(serde_json::to_string(&FallbackMode::Hide).unwrap(), "\"hide\"");
        assert_eq!(
            serde_json::to_string(&FallbackMode::Callback).unwrap(),
            "\"callback\""
        );
    }

    #[test]
    fn test_legacy_option_aliases() {
        let json = r#"{
            "titlePrompt": "Unlock wallet",
            "otherwayWith": "callback",
            "otherwayText": "Use password"
        }"#;
        let opts: PromptOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.title.as_deref(), Some("Unlock wallet"));
        assert_eq!(opts.fallback_mode, Some(FallbackMode::Callback));
        assert_eq!(opts.fallback_text.as_deref(), Some("Use password"));

        // Canonical spellings map onto the same fields
        let json = r#"{"title": "Unlock", "fallbackMode": "PIN"}"#;
        let opts: PromptOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.title.as_deref(), Some("Unlock"));
        assert_eq!(opts.fallback_mode, Some(FallbackMode::DeviceCredential));
    }

    #[test]
    fn test_attempt_defaults() {
        let attempt =
            AuthAttempt::from_options(&PromptOptions::default(), AuthenticatorStrength::Weak);
        assert_eq!(attempt.mode, FallbackMode::DeviceCredential);
        assert_eq!(attempt.title, DEFAULT_TITLE);
        assert_eq!(attempt.fallback_text, DEFAULT_FALLBACK_TEXT);
    }

    #[test]
    fn test_result_omits_absent_optionals() {
        let json = serde_json::to_string(&OperationResult::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);

        let json = serde_json::to_string(&AvailabilityResult {
            is_available: false,
            allow_access: false,
            biometric_type: BiometricClass::None,
            error_code: Some(ErrorCode::NotAvailable),
            error_message: Some("No biometric hardware available".into()),
        })
        .unwrap();
        assert!(json.contains(r#""isAvailable":false"#));
        assert!(json.contains(r#""biometricType":"none""#));
        assert!(json.contains(r#""errorCode":"BIOMETRIC_NOT_AVAILABLE""#));
    }
}
