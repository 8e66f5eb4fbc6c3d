//! Bioauth - Signing Protocol
//!
//! Binds a signature operation to a successful authentication event.
//! The signing context is created before the prompt and is the object
//! the challenge is bound to, so a passing biometric/PIN check
//! authorizes exactly this context and no other. Strict ordering:
//! in-flight check, key existence, context creation, Strong
//! authentication, finalize. Never partial output; one prompt per call;
//! contexts are never reused.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{BiometricError, BioResult, ErrorCode};
use crate::keystore::BiometricKeystore;
use crate::orchestrator::{prompt_spec_for, Orchestrator};
use crate::types::{AuthAttempt, AuthenticatorStrength, PromptOptions};

/// Key-backed challenge signer
pub struct Signer<'a> {
    keystore: &'a BiometricKeystore,
    orchestrator: &'a Orchestrator,
}

impl<'a> Signer<'a> {
    pub fn new(keystore: &'a BiometricKeystore, orchestrator: &'a Orchestrator) -> Self {
        Self {
            keystore,
            orchestrator,
        }
    }

    /// Sign `payload` with the biometric key, gated by a fresh Strong
    /// authentication. Returns the signature as base64 (standard
    /// alphabet, no line wrapping).
    pub async fn sign(&self, payload: &[u8], options: &PromptOptions) -> BioResult<String> {
        // 1. Fail fast if an attempt is in flight; the permit is held
        //    through the whole call so the key check and the prompt run
        //    under the same gate acquisition.
        let permit = self.orchestrator.begin_attempt()?;

        // 2. The protocol never auto-creates a key.
        if !self.keystore.exists()? {
            return Err(ErrorCode::KeyNotFound.into());
        }

        // 3. Context bound to the key, not yet fed input. Creation fails
        //    here if the key was invalidated by an enrollment change.
        let context = self
            .orchestrator
            .provider()
            .begin_signing(self.keystore.alias())
            .map_err(|e| BiometricError::new(ErrorCode::SignatureFailed, e.0))?;

        // 4. Signing always authenticates at Strong, unlike availability
        //    probing.
        let attempt = AuthAttempt::from_options(options, AuthenticatorStrength::Strong);
        let mode = attempt.mode;
        let spec = prompt_spec_for(&attempt);
        let authorized = self
            .orchestrator
            .run(permit, spec, mode, Some(context))
            .await?;

        // 5. The authorized context consumes the payload exactly once.
        let context = authorized.ok_or_else(|| {
            BiometricError::new(
                ErrorCode::SignatureFailed,
                "Authentication succeeded but no signing context came back",
            )
        })?;
        let bytes = context
            .finalize(payload)
            .map_err(|e| BiometricError::new(ErrorCode::SignatureFailed, e.0))?;

        Ok(BASE64.encode(bytes))
    }
}
