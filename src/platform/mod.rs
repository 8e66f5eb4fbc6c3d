//! Bioauth - Platform Provider Seam
//!
//! The orchestration core never talks to sensor hardware or secure
//! storage directly. It depends on one capability-provider interface;
//! platform-specific implementations (secure-enclave backed, software,
//! test double) are selected at build time.

pub mod software;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::types::AuthenticatorStrength;

/// Hardware feature flags for the supported sensor classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorFlags {
    pub fingerprint: bool,
    pub face: bool,
    pub iris: bool,
}

impl SensorFlags {
    pub fn any(&self) -> bool {
        self.fingerprint || self.face || self.iris
    }
}

/// Readiness of the biometric capability at a given strength.
///
/// Mirrors the platform capability-manager status space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Biometrics enrolled and ready to use
    Ready,
    /// No biometric hardware on the device
    NoHardware,
    /// Hardware present but currently unavailable (busy, disabled)
    HardwareUnavailable,
    /// Hardware present, nothing enrolled
    NoneEnrolled,
    /// A security update is required before biometrics can be used
    SecurityUpdateRequired,
    /// The requested strength is not supported on this platform version
    Unsupported,
    /// Platform could not determine the status
    Unknown,
}

/// Native prompt error signals, before normalization.
///
/// One variant per platform authentication-error code the normalizer
/// understands; everything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeError {
    /// No biometrics enrolled
    NoBiometrics,
    /// No biometric hardware
    HwNotPresent,
    /// Hardware temporarily unavailable
    HwUnavailable,
    /// Too many failed attempts - temporary lockout
    Lockout,
    /// Locked out until device-credential authentication
    LockoutPermanent,
    /// User dismissed the prompt
    UserCanceled,
    /// System dismissed the prompt
    Canceled,
    /// No storage space for the operation
    NoSpace,
    /// Prompt timed out
    Timeout,
    /// Sensor could not process the input
    UnableToProcess,
    /// Vendor-specific failure
    Vendor,
    /// User pressed the negative / alternative-action button
    NegativeButton,
    /// Unrecognized platform code
    Other(i32),
}

/// Opaque platform fault from keystore operations
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct PlatformFault(pub String);

impl PlatformFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Parameters for biometric-gated key generation.
///
/// The provider chooses its enclave's native elliptic-curve scheme;
/// only the gating policy is fixed here.
#[derive(Debug, Clone)]
pub struct KeySpec {
    /// Deterministic app-scoped alias
    pub alias: String,
    /// Every private-key operation requires a fresh authentication event
    pub auth_required: bool,
    /// Key becomes permanently unusable when the enrollment set changes
    pub invalidate_on_enrollment: bool,
    /// Assurance tier the gating authentication must meet
    pub strength: AuthenticatorStrength,
}

impl KeySpec {
    /// Standard biometric signing key: auth-required, Strong,
    /// invalidated on enrollment change.
    pub fn signing(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            auth_required: true,
            invalidate_on_enrollment: true,
            strength: AuthenticatorStrength::Strong,
        }
    }
}

/// A signing operation bound to a key but not yet fed input.
///
/// Created before authentication is requested; the authentication
/// challenge is bound to this object, so a successful check authorizes
/// exactly this context and no other. Consumed exactly once.
pub trait SigningContext: Send {
    /// Feed the payload and produce raw signature bytes
    fn finalize(self: Box<Self>, payload: &[u8]) -> Result<Vec<u8>, PlatformFault>;
}

/// What a prompt session ultimately resolved to
pub enum AttemptOutcome {
    /// Authentication succeeded; a bound signing context comes back
    /// authorized.
    Succeeded {
        crypto: Option<Box<dyn SigningContext>>,
    },
    /// Terminal platform error
    Error { error: NativeError, message: String },
}

/// Single-resolution handle the provider uses to deliver the outcome.
///
/// Terminal methods consume the responder, so a prompt session can
/// resolve at most once by construction. Sensor mismatches within the
/// same session go through `attempt_rejected`, which deliberately cannot
/// resolve the attempt. Dropping the responder unresolved surfaces as
/// `UnknownError` to the caller.
pub struct PromptResponder {
    tx: oneshot::Sender<AttemptOutcome>,
}

impl PromptResponder {
    /// Create a responder plus the receiver the orchestrator awaits
    pub fn channel() -> (Self, oneshot::Receiver<AttemptOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Resolve the attempt as succeeded
    pub fn succeed(self, crypto: Option<Box<dyn SigningContext>>) {
        let _ = self.tx.send(AttemptOutcome::Succeeded { crypto });
    }

    /// Resolve the attempt with a terminal platform error
    pub fn fail(self, error: NativeError, message: impl Into<String>) {
        let _ = self.tx.send(AttemptOutcome::Error {
            error,
            message: message.into(),
        });
    }

    /// Non-terminal retry signal: the sensor rejected this attempt but
    /// the session stays open and the user may try again.
    pub fn attempt_rejected(&self) {
        log::debug!("sensor mismatch - prompt session stays open");
    }
}

/// Prompt parameters handed to the provider
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub title: String,
    pub subtitle: Option<String>,
    /// Required biometric strength; `None` means the prompt accepts no
    /// biometric authenticator at all (device-credential-only).
    pub strength: Option<AuthenticatorStrength>,
    /// Union device credential into the allowed authenticator set
    pub allow_device_credential: bool,
    /// Text for the negative / alternative-action button. `None` asks
    /// the platform to suppress the control (honored where possible).
    pub negative_text: Option<String>,
}

/// The capability-provider interface.
///
/// Implementations own the UI-affine execution of the prompt and the
/// secure storage of key material. All methods must be callable from
/// any thread.
pub trait PlatformProvider: Send + Sync {
    /// Application identity used to derive the key alias
    fn app_id(&self) -> &str;

    /// Hardware feature flags; pure query of platform state
    fn sensors(&self) -> SensorFlags;

    /// Enrollment / readiness at the given strength; pure query
    fn capability(&self, strength: AuthenticatorStrength) -> CapabilityStatus;

    /// Show exactly one authentication prompt and resolve the responder
    /// exactly once. A bound signing context must be handed back in the
    /// success outcome.
    fn authenticate(
        &self,
        spec: PromptSpec,
        crypto: Option<Box<dyn SigningContext>>,
        responder: PromptResponder,
    );

    /// Generate the key pair described by `spec` inside secure storage
    fn generate_key(&self, spec: &KeySpec) -> Result<(), PlatformFault>;

    /// Whether a key exists under the alias
    fn contains_key(&self, alias: &str) -> Result<bool, PlatformFault>;

    /// Remove the key under the alias; absent keys are not an error here
    fn delete_key(&self, alias: &str) -> Result<(), PlatformFault>;

    /// Create a signing context bound to the key, not yet fed input.
    /// Fails if the key is absent or has been invalidated.
    fn begin_signing(&self, alias: &str) -> Result<Box<dyn SigningContext>, PlatformFault>;
}
