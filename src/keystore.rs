//! Bioauth - Key Lifecycle Manager
//!
//! Creates, checks, and deletes the single biometric-gated key pair.
//! One alias per application identity, derived deterministically so a
//! reinstall does not silently pick up a different install's alias
//! (whether the platform keeps key material across installs is a
//! documented platform-dependent variance).

use std::sync::Arc;

use crate::error::{BiometricError, BioResult, ErrorCode};
use crate::platform::{KeySpec, PlatformProvider};

/// Suffix appended to the application identity to form the key alias
const ALIAS_SUFFIX: &str = ".biometric.privatekey";

/// Manages the app-scoped biometric signing key pair
pub struct BiometricKeystore {
    provider: Arc<dyn PlatformProvider>,
    alias: String,
}

impl BiometricKeystore {
    pub fn new(provider: Arc<dyn PlatformProvider>) -> Self {
        let alias = format!("{}{}", provider.app_id(), ALIAS_SUFFIX);
        Self { provider, alias }
    }

    /// The deterministic key alias for this application
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Create the biometric signing key pair.
    ///
    /// Deliberately not idempotent: fails with `KeyExists` if the alias
    /// is present. Callers must delete first, so key replacement is
    /// always an explicit decision. The key is generated auth-required
    /// and invalidated on enrollment change; private material never
    /// leaves secure storage.
    pub fn create_key(&self) -> BioResult<()> {
        if self.exists_inner()? {
            return Err(ErrorCode::KeyExists.into());
        }

        let spec = KeySpec::signing(&self.alias);
        self.provider
            .generate_key(&spec)
            .map_err(|e| BiometricError::new(ErrorCode::KeyCreationFailed, e.0))?;

        log::debug!("biometric key created under {}", self.alias);
        Ok(())
    }

    /// Whether the key exists. Platform faults surface as errors here;
    /// the API boundary degrades them to `exists: false` plus a code.
    pub fn exists(&self) -> BioResult<bool> {
        self.exists_inner()
    }

    /// Delete the key pair. Idempotent: deleting an absent key succeeds.
    pub fn delete_key(&self) -> BioResult<()> {
        self.provider
            .delete_key(&self.alias)
            .map_err(|e| BiometricError::new(ErrorCode::KeyDeletionFailed, e.0))?;

        log::debug!("biometric key deleted under {}", self.alias);
        Ok(())
    }

    fn exists_inner(&self) -> BioResult<bool> {
        self.provider
            .contains_key(&self.alias)
            .map_err(|e| BiometricError::unknown(e.0))
    }
}
