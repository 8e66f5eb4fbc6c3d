//! Bioauth - Software Platform Provider
//!
//! In-process provider with a software keystore and a scriptable sensor.
//! Serves as the desktop/dev implementation and as the mock platform
//! boundary for tests: prompt outcomes are scripted, prompts are counted,
//! and verifying keys are exposed so signatures can be checked.
//!
//! Unlike a secure enclave, key material lives in process memory; this
//! provider is not suitable where hardware backing is required.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use parking_lot::Mutex;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::platform::{
    CapabilityStatus, KeySpec, NativeError, PlatformFault, PlatformProvider, PromptResponder,
    PromptSpec, SensorFlags, SigningContext,
};
use crate::types::AuthenticatorStrength;

/// Sensor behavior configuration
#[derive(Debug, Clone)]
pub struct SensorConfig {
    /// Rejected attempts before the session resolves `Lockout`
    pub max_attempts: u8,
    /// Lockout window after too many failures (seconds)
    pub lockout_duration: i64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_duration: 30,
        }
    }
}

/// Scripted outcome for the next prompt session
pub enum ScriptedPrompt {
    /// Resolve success immediately
    Succeed,
    /// Resolve the given terminal error
    Fail(NativeError),
    /// Emit n non-terminal sensor rejections, then succeed (or lock out
    /// if the rejection budget is exhausted first)
    RejectThenSucceed(u8),
    /// Drop the responder without resolving (simulates a provider crash)
    DropResponder,
}

struct StoredKey {
    signing: SigningKey,
    invalidate_on_enrollment: bool,
    enrollment_generation: u64,
}

struct Inner {
    keys: HashMap<String, StoredKey>,
    script: VecDeque<ScriptedPrompt>,
    enrolled: bool,
    enrollment_generation: u64,
    failed_attempts: u8,
    locked_until: Option<DateTime<Utc>>,
}

/// Software provider: scriptable sensor + in-memory Ed25519 keystore
pub struct SoftwareProvider {
    app_id: String,
    sensors: SensorFlags,
    config: SensorConfig,
    inner: Mutex<Inner>,
    prompt_count: AtomicUsize,
}

impl SoftwareProvider {
    /// Provider with a fingerprint sensor and enrolled biometrics
    pub fn new(app_id: impl Into<String>) -> Self {
        Self::with_sensors(
            app_id,
            SensorFlags {
                fingerprint: true,
                face: false,
                iris: false,
            },
        )
    }

    /// Provider with specific hardware flags
    pub fn with_sensors(app_id: impl Into<String>, sensors: SensorFlags) -> Self {
        Self {
            app_id: app_id.into(),
            sensors,
            config: SensorConfig::default(),
            inner: Mutex::new(Inner {
                keys: HashMap::new(),
                script: VecDeque::new(),
                enrolled: sensors.any(),
                enrollment_generation: 0,
                failed_attempts: 0,
                locked_until: None,
            }),
            prompt_count: AtomicUsize::new(0),
        }
    }

    /// Provider with no biometric hardware at all
    pub fn without_hardware(app_id: impl Into<String>) -> Self {
        Self::with_sensors(app_id, SensorFlags::default())
    }

    /// Override the sensor configuration
    pub fn with_config(mut self, config: SensorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set whether any biometrics are enrolled. Changing the value bumps
    /// the enrollment generation, invalidating enrollment-bound keys.
    pub fn set_enrolled(&self, enrolled: bool) {
        let mut inner = self.inner.lock();
        if inner.enrolled != enrolled {
            inner.enrolled = enrolled;
            inner.enrollment_generation += 1;
        }
    }

    /// Simulate adding/removing a biometric enrollment (e.g. a new
    /// fingerprint). Keys created with `invalidate_on_enrollment` become
    /// permanently unusable.
    pub fn change_enrollment(&self) {
        self.inner.lock().enrollment_generation += 1;
    }

    /// Queue a scripted outcome for the next prompt session. With an
    /// empty script, prompts succeed when the sensor is usable.
    pub fn push_prompt(&self, outcome: ScriptedPrompt) {
        self.inner.lock().script.push_back(outcome);
    }

    /// Number of prompts shown so far
    pub fn prompt_count(&self) -> usize {
        self.prompt_count.load(Ordering::SeqCst)
    }

    /// Verifying key for the alias, if a key exists (test support)
    pub fn verifying_key(&self, alias: &str) -> Option<VerifyingKey> {
        self.inner
            .lock()
            .keys
            .get(alias)
            .map(|k| k.signing.verifying_key())
    }

    fn resolve_scripted(
        &self,
        inner: &mut Inner,
        outcome: ScriptedPrompt,
        crypto: Option<Box<dyn SigningContext>>,
        responder: PromptResponder,
    ) {
        match outcome {
            ScriptedPrompt::Succeed => {
                inner.failed_attempts = 0;
                responder.succeed(crypto);
            }
            ScriptedPrompt::Fail(error) => {
                if error == NativeError::Lockout {
                    inner.locked_until =
                        Some(Utc::now() + Duration::seconds(self.config.lockout_duration));
                }
                responder.fail(error, native_message(error));
            }
            ScriptedPrompt::RejectThenSucceed(n) => {
                for _ in 0..n {
                    responder.attempt_rejected();
                    inner.failed_attempts += 1;

                    if inner.failed_attempts >= self.config.max_attempts {
                        inner.locked_until =
                            Some(Utc::now() + Duration::seconds(self.config.lockout_duration));
                        responder.fail(NativeError::Lockout, native_message(NativeError::Lockout));
                        return;
                    }
                }
                inner.failed_attempts = 0;
                responder.succeed(crypto);
            }
            ScriptedPrompt::DropResponder => {
                drop(responder);
            }
        }
    }
}

impl PlatformProvider for SoftwareProvider {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn sensors(&self) -> SensorFlags {
        self.sensors
    }

    fn capability(&self, _strength: AuthenticatorStrength) -> CapabilityStatus {
        // Software sensors satisfy both tiers; readiness depends only on
        // hardware flags and enrollment.
        if !self.sensors.any() {
            return CapabilityStatus::NoHardware;
        }
        if !self.inner.lock().enrolled {
            return CapabilityStatus::NoneEnrolled;
        }
        CapabilityStatus::Ready
    }

    fn authenticate(
        &self,
        spec: PromptSpec,
        crypto: Option<Box<dyn SigningContext>>,
        responder: PromptResponder,
    ) {
        self.prompt_count.fetch_add(1, Ordering::SeqCst);
        log::debug!("prompt shown: {:?}", spec.title);

        let mut inner = self.inner.lock();

        if let Some(until) = inner.locked_until {
            if Utc::now() < until {
                responder.fail(NativeError::Lockout, native_message(NativeError::Lockout));
                return;
            }
            inner.locked_until = None;
            inner.failed_attempts = 0;
        }

        match inner.script.pop_front() {
            Some(outcome) => self.resolve_scripted(&mut inner, outcome, crypto, responder),
            None => {
                // Unscripted prompts behave like a cooperative user:
                // succeed when an allowed authenticator is usable.
                let biometric_usable = spec.strength.is_some() && inner.enrolled;
                if biometric_usable || spec.allow_device_credential || spec.strength.is_none() {
                    responder.succeed(crypto);
                } else {
                    responder.fail(
                        NativeError::NoBiometrics,
                        native_message(NativeError::NoBiometrics),
                    );
                }
            }
        }
    }

    fn generate_key(&self, spec: &KeySpec) -> Result<(), PlatformFault> {
        let mut inner = self.inner.lock();
        if inner.keys.contains_key(&spec.alias) {
            return Err(PlatformFault::new(format!(
                "alias already present: {}",
                spec.alias
            )));
        }

        let mut seed = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill_bytes(&mut *seed);
        let signing = SigningKey::from_bytes(&seed);

        let generation = inner.enrollment_generation;
        inner.keys.insert(
            spec.alias.clone(),
            StoredKey {
                signing,
                invalidate_on_enrollment: spec.invalidate_on_enrollment,
                enrollment_generation: generation,
            },
        );
        log::debug!("generated signing key under alias {}", spec.alias);
        Ok(())
    }

    fn contains_key(&self, alias: &str) -> Result<bool, PlatformFault> {
        Ok(self.inner.lock().keys.contains_key(alias))
    }

    fn delete_key(&self, alias: &str) -> Result<(), PlatformFault> {
        self.inner.lock().keys.remove(alias);
        Ok(())
    }

    fn begin_signing(&self, alias: &str) -> Result<Box<dyn SigningContext>, PlatformFault> {
        let inner = self.inner.lock();
        let key = inner
            .keys
            .get(alias)
            .ok_or_else(|| PlatformFault::new(format!("no key under alias: {alias}")))?;

        if key.invalidate_on_enrollment && key.enrollment_generation != inner.enrollment_generation
        {
            return Err(PlatformFault::new(
                "key permanently invalidated by enrollment change",
            ));
        }

        Ok(Box::new(SoftwareSigningContext {
            signing: key.signing.clone(),
        }))
    }
}

/// Signing context over a software Ed25519 key.
///
/// Consumed exactly once; the signing protocol only finalizes contexts
/// handed back from a successful authentication.
struct SoftwareSigningContext {
    signing: SigningKey,
}

impl SigningContext for SoftwareSigningContext {
    fn finalize(self: Box<Self>, payload: &[u8]) -> Result<Vec<u8>, PlatformFault> {
        Ok(self.signing.sign(payload).to_bytes().to_vec())
    }
}

fn native_message(error: NativeError) -> &'static str {
    match error {
        NativeError::NoBiometrics => "No biometric credentials enrolled",
        NativeError::HwNotPresent => "No biometric hardware available",
        NativeError::HwUnavailable => "Biometric hardware unavailable",
        NativeError::Lockout => "Too many attempts. Try again later.",
        NativeError::LockoutPermanent => "Too many attempts. Biometric sensor disabled.",
        NativeError::UserCanceled => "Authentication cancelled by user",
        NativeError::Canceled => "Authentication cancelled by system",
        NativeError::NoSpace => "Not enough storage to complete the operation",
        NativeError::Timeout => "Authentication timed out",
        NativeError::UnableToProcess => "Sensor was unable to process the input",
        NativeError::Vendor => "Vendor-specific sensor error",
        NativeError::NegativeButton => "Negative button pressed",
        NativeError::Other(_) => "Unrecognized platform error",
    }
}
