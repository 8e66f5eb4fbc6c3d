//! Bioauth - Unified Public API
//!
//! Single entry point for all biometric operations. Every operation
//! resolves to a structured result value; failures are reported as
//! canonical codes, never as panics or raw platform faults, so the
//! boundary contract stays uniform for the host application.

use std::sync::Arc;

use crate::capability::probe;
use crate::error::{BiometricError, BioResult, ErrorCode};
use crate::keystore::BiometricKeystore;
use crate::normalize::normalize_status;
use crate::orchestrator::Orchestrator;
use crate::platform::PlatformProvider;
use crate::signer::Signer;
use crate::types::{
    AuthAttempt, AuthResult, AvailabilityResult, KeyExistsResult, OperationResult, PromptOptions,
    SignatureResult,
};

// ═══════════════════════════════════════════════════════════════════════════════
// BIOMETRIC API - THE ONLY PUBLIC INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Bioauth facade
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use bioauth::{BiometricApi, PromptOptions};
/// use bioauth::platform::software::SoftwareProvider;
///
/// let api = BiometricApi::new(Arc::new(SoftwareProvider::new("com.example.app")));
///
/// let availability = api.check_availability();
/// if availability.is_available {
///     let result = api.authenticate_biometric(&PromptOptions::default()).await;
/// }
///
/// api.create_key();
/// let signed = api.sign("challenge", &PromptOptions::default()).await;
/// ```
pub struct BiometricApi {
    provider: Arc<dyn PlatformProvider>,
    orchestrator: Orchestrator,
    keystore: BiometricKeystore,
}

impl BiometricApi {
    pub fn new(provider: Arc<dyn PlatformProvider>) -> Self {
        Self {
            orchestrator: Orchestrator::new(provider.clone()),
            keystore: BiometricKeystore::new(provider.clone()),
            provider,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // AVAILABILITY & PERMISSION
    // ═══════════════════════════════════════════════════════════════════════

    /// Check whether biometric authentication is usable on this device.
    ///
    /// Probes at Weak strength so the query never consumes lockout
    /// attempts.
    pub fn check_availability(&self) -> AvailabilityResult {
        let (class, strength) = probe(self.provider.as_ref());
        let status = self.provider.capability(strength);

        match normalize_status(status) {
            None => AvailabilityResult {
                is_available: true,
                allow_access: true,
                biometric_type: class,
                error_code: None,
                error_message: None,
            },
            Some((code, message)) => AvailabilityResult {
                is_available: false,
                allow_access: false,
                biometric_type: class,
                error_code: Some(code),
                error_message: Some(message.to_string()),
            },
        }
    }

    /// Request access to the biometric capability.
    ///
    /// No OS-level permission dialog exists on the reference platform;
    /// readiness of the probed modality is the grant.
    pub fn request_permission(&self) -> OperationResult {
        let (_, strength) = probe(self.provider.as_ref());
        match normalize_status(self.provider.capability(strength)) {
            None => OperationResult::ok(),
            Some((code, message)) => OperationResult::failed(code, message),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // AUTHENTICATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Authenticate with biometrics. Shows exactly one prompt.
    pub async fn authenticate_biometric(&self, options: &PromptOptions) -> AuthResult {
        let (_, strength) = probe(self.provider.as_ref());
        let attempt = AuthAttempt::from_options(options, strength);
        auth_result(self.orchestrator.authenticate(attempt).await)
    }

    /// Authenticate with the device credential (PIN / pattern / password)
    /// only. Shows exactly one prompt.
    pub async fn authenticate_pin(&self) -> AuthResult {
        auth_result(self.orchestrator.authenticate_credential().await)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // KEY LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════

    /// Create the biometric signing key (fails if one exists)
    pub fn create_key(&self) -> OperationResult {
        operation_result(self.keystore.create_key())
    }

    /// Whether the biometric key exists. Platform faults degrade to
    /// `exists: false` plus an error code; the query itself never fails.
    pub fn key_exists(&self) -> KeyExistsResult {
        match self.keystore.exists() {
            Ok(exists) => KeyExistsResult {
                exists,
                error_code: None,
                error_message: None,
            },
            Err(err) => KeyExistsResult {
                exists: false,
                error_code: Some(err.code),
                error_message: Some(err.message),
            },
        }
    }

    /// Delete the biometric signing key (idempotent)
    pub fn delete_key(&self) -> OperationResult {
        operation_result(self.keystore.delete_key())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SIGNING
    // ═══════════════════════════════════════════════════════════════════════

    /// Sign a payload with the biometric key behind a fresh Strong
    /// authentication. Shows exactly one prompt.
    pub async fn sign(&self, payload: &str, options: &PromptOptions) -> SignatureResult {
        let signer = Signer::new(&self.keystore, &self.orchestrator);
        match signer.sign(payload.as_bytes(), options).await {
            Ok(signature) => SignatureResult {
                success: true,
                signature: Some(signature),
                error_code: None,
                error_message: None,
            },
            Err(err) => SignatureResult {
                success: false,
                signature: None,
                error_code: Some(err.code),
                error_message: Some(err.message),
            },
        }
    }
}

fn operation_result(result: BioResult<()>) -> OperationResult {
    match result {
        Ok(()) => OperationResult::ok(),
        Err(err) => OperationResult::failed(err.code, err.message),
    }
}

fn auth_result(result: BioResult<()>) -> AuthResult {
    match result {
        Ok(()) => AuthResult {
            success: true,
            pressed_other_way: None,
            error_code: None,
            error_message: None,
        },
        Err(BiometricError { code, message }) => AuthResult {
            success: false,
            pressed_other_way: (code == ErrorCode::PressedOtherWay).then_some(true),
            error_code: Some(code),
            error_message: Some(message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::software::{ScriptedPrompt, SoftwareProvider};
    use crate::platform::NativeError;
    use crate::types::{BiometricClass, FallbackMode};

    fn api_with(provider: Arc<SoftwareProvider>) -> BiometricApi {
        let _ = env_logger::builder().is_test(true).try_init();
        BiometricApi::new(provider)
    }

    #[test]
    fn test_availability_no_hardware() {
        let api = api_with(Arc::new(SoftwareProvider::without_hardware("com.example.app")));
        let result = api.check_availability();

        assert!(!result.is_available);
        assert!(!result.allow_access);
        assert_eq!(result.biometric_type, BiometricClass::None);
        assert_eq!(result.error_code, Some(ErrorCode::NotAvailable));
    }

    #[test]
    fn test_availability_nothing_enrolled() {
        let provider = Arc::new(SoftwareProvider::new("com.example.app"));
        provider.set_enrolled(false);
        let api = api_with(provider);

        let result = api.check_availability();
        assert!(!result.is_available);
        assert_eq!(result.biometric_type, BiometricClass::Fingerprint);
        assert_eq!(result.error_code, Some(ErrorCode::NotEnrolled));
    }

    #[test]
    fn test_availability_ready() {
        let api = api_with(Arc::new(SoftwareProvider::new("com.example.app")));
        let result = api.check_availability();

        assert!(result.is_available);
        assert!(result.allow_access);
        assert_eq!(result.biometric_type, BiometricClass::Fingerprint);
        assert!(result.error_code.is_none());
        assert!(result.error_message.is_none());
    }

    #[test]
    fn test_request_permission_tracks_readiness() {
        let api = api_with(Arc::new(SoftwareProvider::new("com.example.app")));
        assert!(api.request_permission().success);

        let provider = Arc::new(SoftwareProvider::new("com.example.app"));
        provider.set_enrolled(false);
        let api = api_with(provider);
        let result = api.request_permission();
        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::NotEnrolled));
    }

    #[tokio::test]
    async fn test_authenticate_biometric_success() {
        let api = api_with(Arc::new(SoftwareProvider::new("com.example.app")));
        let result = api.authenticate_biometric(&PromptOptions::default()).await;

        assert!(result.success);
        assert!(result.pressed_other_way.is_none());
        assert!(result.error_code.is_none());
    }

    #[tokio::test]
    async fn test_pressed_other_way_only_in_callback_mode() {
        let provider = Arc::new(SoftwareProvider::new("com.example.app"));
        let api = api_with(provider.clone());

        provider.push_prompt(ScriptedPrompt::Fail(NativeError::NegativeButton));
        let result = api
            .authenticate_biometric(&PromptOptions {
                fallback_mode: Some(FallbackMode::Callback),
                ..Default::default()
            })
            .await;
        assert!(!result.success);
        assert_eq!(result.pressed_other_way, Some(true));
        assert_eq!(result.error_code, Some(ErrorCode::PressedOtherWay));

        provider.push_prompt(ScriptedPrompt::Fail(NativeError::NegativeButton));
        let result = api.authenticate_biometric(&PromptOptions::default()).await;
        assert!(!result.success);
        assert!(result.pressed_other_way.is_none());
        assert_eq!(result.error_code, Some(ErrorCode::UserCancel));
    }

    #[tokio::test]
    async fn test_authenticate_pin() {
        let provider = Arc::new(SoftwareProvider::new("com.example.app"));
        let api = api_with(provider.clone());

        let result = api.authenticate_pin().await;
        assert!(result.success);
        assert_eq!(provider.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_sequential_attempts_all_accepted() {
        let api = api_with(Arc::new(SoftwareProvider::new("com.example.app")));
        for _ in 0..5 {
            let result = api.authenticate_biometric(&PromptOptions::default()).await;
            assert!(result.success);
        }
    }

    #[test]
    fn test_key_lifecycle_results() {
        let api = api_with(Arc::new(SoftwareProvider::new("com.example.app")));

        assert!(!api.key_exists().exists);
        assert!(api.create_key().success);
        assert!(api.key_exists().exists);

        let second = api.create_key();
        assert!(!second.success);
        assert_eq!(second.error_code, Some(ErrorCode::KeyExists));

        assert!(api.delete_key().success);
        assert!(api.delete_key().success);
        assert!(!api.key_exists().exists);
    }

    #[tokio::test]
    async fn test_sign_result_wire_shape() {
        let api = api_with(Arc::new(SoftwareProvider::new("com.example.app")));
        api.create_key();

        let result = api.sign("hello", &PromptOptions::default()).await;
        assert!(result.success);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["signature"].as_str().map_or(false, |s| !s.is_empty()));
        assert!(json.get("errorCode").is_none());
        assert!(json.get("errorMessage").is_none());
    }

    #[tokio::test]
    async fn test_sign_without_key_wire_shape() {
        let api = api_with(Arc::new(SoftwareProvider::new("com.example.app")));
        let result = api.sign("hello", &PromptOptions::default()).await;

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorCode"], "BIOMETRIC_KEY_NOT_FOUND");
        assert!(json.get("signature").is_none());
    }

    #[tokio::test]
    async fn test_lockout_surfaces_canonical_code() {
        let provider = Arc::new(SoftwareProvider::new("com.example.app"));
        let api = api_with(provider.clone());

        provider.push_prompt(ScriptedPrompt::Fail(NativeError::Lockout));
        let result = api.authenticate_biometric(&PromptOptions::default()).await;
        assert_eq!(result.error_code, Some(ErrorCode::Lockout));

        // The lockout window opened; the next attempt is still accepted
        // by the gate and resolves Lockout from the platform.
        let result = api.authenticate_biometric(&PromptOptions::default()).await;
        assert_eq!(result.error_code, Some(ErrorCode::Lockout));
    }
}
