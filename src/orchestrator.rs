//! Bioauth - Authentication Orchestrator
//!
//! Sequences a single authentication attempt:
//! `Idle -> Requesting -> {Succeeded, Failed}`. Sensor mismatches inside
//! a session are retry signals and never resolve the caller-visible
//! result. A process-wide compare-and-set gate guarantees at most one
//! attempt is `Requesting` at a time; concurrent callers fail fast with
//! `AuthenticationInProgress` instead of queueing. There is no
//! cancellation API: a pending attempt resolves only through the
//! provider. Known limitation, not an oversight.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::{BiometricError, BioResult, ErrorCode};
use crate::normalize::normalize;
use crate::platform::{
    AttemptOutcome, PlatformProvider, PromptResponder, PromptSpec, SigningContext,
};
use crate::types::{AuthAttempt, FallbackMode};

const IDLE: u8 = 0;
const REQUESTING: u8 = 1;

/// Process-wide in-flight gate with compare-and-set transitions.
///
/// Replaces an ad-hoc boolean flag: the only way into `Requesting` is
/// `begin`, and the only way back to `Idle` is dropping the permit, so
/// every exit path (success, error, early return) releases exactly once.
#[derive(Clone)]
pub struct AttemptGate {
    state: Arc<AtomicU8>,
}

impl AttemptGate {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(IDLE)),
        }
    }

    /// Transition `Idle -> Requesting`, or fail fast if an attempt is
    /// already in flight.
    pub fn begin(&self) -> BioResult<AttemptPermit> {
        match self
            .state
            .compare_exchange(IDLE, REQUESTING, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => Ok(AttemptPermit {
                state: Arc::clone(&self.state),
            }),
            Err(_) => Err(ErrorCode::AuthenticationInProgress.into()),
        }
    }

    /// Whether an attempt is currently `Requesting`
    pub fn is_busy(&self) -> bool {
        self.state.load(Ordering::SeqCst) == REQUESTING
    }
}

impl Default for AttemptGate {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII token for the `Requesting` state
pub struct AttemptPermit {
    state: Arc<AtomicU8>,
}

impl Drop for AttemptPermit {
    fn drop(&mut self) {
        self.state.store(IDLE, Ordering::SeqCst);
    }
}

/// Sequences authentication attempts against the platform provider.
///
/// Stateless between attempts; the gate is the only shared mutable state.
pub struct Orchestrator {
    provider: Arc<dyn PlatformProvider>,
    gate: AttemptGate,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn PlatformProvider>) -> Self {
        Self {
            provider,
            gate: AttemptGate::new(),
        }
    }

    pub fn gate(&self) -> &AttemptGate {
        &self.gate
    }

    pub(crate) fn provider(&self) -> &dyn PlatformProvider {
        self.provider.as_ref()
    }

    /// Acquire the in-flight permit without touching platform state
    pub(crate) fn begin_attempt(&self) -> BioResult<AttemptPermit> {
        self.gate.begin()
    }

    /// Run a biometric authentication attempt to its terminal outcome
    pub async fn authenticate(&self, attempt: AuthAttempt) -> BioResult<()> {
        let permit = self.begin_attempt()?;
        let spec = prompt_spec_for(&attempt);
        self.run(permit, spec, attempt.mode, None).await.map(|_| ())
    }

    /// Run a device-credential-only (PIN / pattern / password) attempt
    pub async fn authenticate_credential(&self) -> BioResult<()> {
        let permit = self.begin_attempt()?;
        self.run(
            permit,
            device_credential_spec(),
            FallbackMode::DeviceCredential,
            None,
        )
        .await
        .map(|_| ())
    }

    /// Dispatch a prompt and await its single terminal resolution.
    ///
    /// The permit is held across the await and dropped on every exit
    /// path, so the gate can never stay wedged after a terminal outcome.
    pub(crate) async fn run(
        &self,
        permit: AttemptPermit,
        spec: PromptSpec,
        mode: FallbackMode,
        crypto: Option<Box<dyn SigningContext>>,
    ) -> BioResult<Option<Box<dyn SigningContext>>> {
        let _permit = permit;
        log::debug!("attempt Requesting (mode: {})", mode.as_str());

        let (responder, rx) = PromptResponder::channel();
        self.provider.authenticate(spec, crypto, responder);

        match rx.await {
            Ok(AttemptOutcome::Succeeded { crypto }) => {
                log::debug!("attempt Succeeded");
                Ok(crypto)
            }
            Ok(AttemptOutcome::Error { error, message }) => {
                let code = normalize(error, mode);
                log::debug!("attempt Failed ({code})");
                Err(BiometricError::new(code, message))
            }
            // Provider dropped the responder without resolving. Surface
            // as UnknownError; the permit still releases the gate.
            Err(_) => {
                log::warn!("prompt abandoned by provider without a terminal outcome");
                Err(BiometricError::unknown(
                    "Authentication prompt was abandoned by the platform",
                ))
            }
        }
    }
}

/// Compute the allowed authenticator set and prompt affordances for an
/// attempt's fallback mode.
pub(crate) fn prompt_spec_for(attempt: &AuthAttempt) -> PromptSpec {
    match attempt.mode {
        // Union the biometric authenticator with device credential; the
        // platform renders its own fallback affordance.
        FallbackMode::DeviceCredential => PromptSpec {
            title: attempt.title.clone(),
            subtitle: None,
            strength: Some(attempt.strength),
            allow_device_credential: true,
            negative_text: None,
        },
        // Biometric only, with a visible alternative-action control.
        FallbackMode::Callback => PromptSpec {
            title: attempt.title.clone(),
            subtitle: None,
            strength: Some(attempt.strength),
            allow_device_credential: false,
            negative_text: Some(attempt.fallback_text.clone()),
        },
        // Like Callback but the control is suppressed where the platform
        // allows it.
        FallbackMode::Hide => PromptSpec {
            title: attempt.title.clone(),
            subtitle: None,
            strength: Some(attempt.strength),
            allow_device_credential: false,
            negative_text: None,
        },
    }
}

/// Prompt accepting only the device credential
pub(crate) fn device_credential_spec() -> PromptSpec {
    PromptSpec {
        title: "Device Authentication".to_string(),
        subtitle: Some("Please enter your device PIN, pattern, or password".to_string()),
        strength: None,
        allow_device_credential: true,
        negative_text: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::software::{ScriptedPrompt, SoftwareProvider};
    use crate::platform::NativeError;
    use crate::types::{AuthenticatorStrength, PromptOptions};

    fn setup() -> (Arc<SoftwareProvider>, Orchestrator) {
        let _ = env_logger::builder().is_test(true).try_init();
        let provider = Arc::new(SoftwareProvider::new("com.example.app"));
        let orchestrator = Orchestrator::new(provider.clone());
        (provider, orchestrator)
    }

    fn attempt(mode: FallbackMode) -> AuthAttempt {
        AuthAttempt {
            mode,
            title: "Test".into(),
            fallback_text: "Another way".into(),
            strength: AuthenticatorStrength::Weak,
        }
    }

    #[test]
    fn test_gate_rejects_second_begin() {
        let gate = AttemptGate::new();
        let permit = gate.begin().unwrap();
        assert!(gate.is_busy());

        let err = gate.begin().err().unwrap();
        assert_eq!(err.code, ErrorCode::AuthenticationInProgress);

        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.begin().is_ok());
    }

    #[tokio::test]
    async fn test_attempt_while_requesting_fails_fast_without_prompt() {
        let (provider, orchestrator) = setup();

        // Hold the gate as if another attempt were mid-flight
        let _permit = orchestrator.gate().begin().unwrap();

        let err = orchestrator
            .authenticate(attempt(FallbackMode::DeviceCredential))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationInProgress);
        // Platform state untouched
        assert_eq!(provider.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_gate_releases_on_every_terminal_outcome() {
        let (provider, orchestrator) = setup();

        provider.push_prompt(ScriptedPrompt::Succeed);
        provider.push_prompt(ScriptedPrompt::Fail(NativeError::UserCanceled));
        provider.push_prompt(ScriptedPrompt::DropResponder);

        // Success
        assert!(orchestrator
            .authenticate(attempt(FallbackMode::DeviceCredential))
            .await
            .is_ok());
        // Error
        let err = orchestrator
            .authenticate(attempt(FallbackMode::DeviceCredential))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserCancel);
        // Abandoned responder
        let err = orchestrator
            .authenticate(attempt(FallbackMode::DeviceCredential))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownError);

        // Every terminal outcome released the gate: all attempts accepted
        assert!(!orchestrator.gate().is_busy());
        assert!(orchestrator
            .authenticate(attempt(FallbackMode::DeviceCredential))
            .await
            .is_ok());
        assert_eq!(provider.prompt_count(), 4);
    }

    #[tokio::test]
    async fn test_sensor_retries_do_not_resolve() {
        let (provider, orchestrator) = setup();
        provider.push_prompt(ScriptedPrompt::RejectThenSucceed(3));

        // Retries stay inside the session; the caller sees one success
        assert!(orchestrator
            .authenticate(attempt(FallbackMode::DeviceCredential))
            .await
            .is_ok());
        assert_eq!(provider.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_negative_button_mapping_per_mode() {
        let (provider, orchestrator) = setup();

        provider.push_prompt(ScriptedPrompt::Fail(NativeError::NegativeButton));
        let err = orchestrator
            .authenticate(attempt(FallbackMode::Callback))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PressedOtherWay);

        provider.push_prompt(ScriptedPrompt::Fail(NativeError::NegativeButton));
        let err = orchestrator
            .authenticate(attempt(FallbackMode::DeviceCredential))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserCancel);

        provider.push_prompt(ScriptedPrompt::Fail(NativeError::NegativeButton));
        let err = orchestrator
            .authenticate(attempt(FallbackMode::Hide))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserCancel);
    }

    #[tokio::test]
    async fn test_credential_only_attempt() {
        let (provider, orchestrator) = setup();
        assert!(orchestrator.authenticate_credential().await.is_ok());
        assert_eq!(provider.prompt_count(), 1);
    }

    #[test]
    fn test_prompt_spec_authenticator_sets() {
        let spec = prompt_spec_for(&attempt(FallbackMode::DeviceCredential));
        assert!(spec.allow_device_credential);
        assert!(spec.negative_text.is_none());

        let spec = prompt_spec_for(&attempt(FallbackMode::Callback));
        assert!(!spec.allow_device_credential);
        assert_eq!(spec.negative_text.as_deref(), Some("Another way"));

        let spec = prompt_spec_for(&attempt(FallbackMode::Hide));
        assert!(!spec.allow_device_credential);
        assert!(spec.negative_text.is_none());
    }

    #[test]
    fn test_options_flow_into_attempt() {
        let opts = PromptOptions {
            title: Some("Confirm payment".into()),
            fallback_mode: Some(FallbackMode::Callback),
            fallback_text: Some("Use password".into()),
        };
        let attempt = AuthAttempt::from_options(&opts, AuthenticatorStrength::Weak);
        let spec = prompt_spec_for(&attempt);
        assert_eq!(spec.title, "Confirm payment");
        assert_eq!(spec.negative_text.as_deref(), Some("Use password"));
    }
}
