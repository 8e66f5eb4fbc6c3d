//! # Bioauth
//!
//! Unified biometric authentication and key-backed challenge signing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         BIOMETRIC API                        │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ CAPABILITY  │  │ ORCHESTRATOR │  │  SIGNING PROTOCOL  │  │
//! │  │ PROBER      │  │ (in-flight   │  │  (key-gated        │  │
//! │  │             │  │  gate)       │  │   signatures)      │  │
//! │  └──────┬──────┘  └──────┬───────┘  └─────────┬──────────┘  │
//! │         │                │                     │             │
//! │  ┌──────┴────────────────┴─────────────────────┴──────────┐ │
//! │  │         PLATFORM PROVIDER (capability interface)        │ │
//! │  │     sensors / prompt / secure keystore / signing ctx    │ │
//! │  └─────────────────────────────────────────────────────────┘ │
//! │                                                              │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ ERROR       │  │ KEY          │  │  SOFTWARE PROVIDER │  │
//! │  │ NORMALIZER  │  │ LIFECYCLE    │  │  (dev / tests)     │  │
//! │  └─────────────┘  └──────────────┘  └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - At most one authentication attempt in flight process-wide; a
//!   concurrent caller fails fast with `AuthenticationInProgress`.
//! - The private signing key is usable only through a signing context
//!   authorized by a fresh biometric/PIN check, and is invalidated when
//!   the enrollment set changes.
//! - Every platform failure normalizes to one stable canonical code;
//!   operations always resolve to structured results, never panics.

pub mod api;
pub mod capability;
pub mod error;
pub mod keystore;
pub mod normalize;
pub mod orchestrator;
pub mod platform;
pub mod signer;
pub mod types;

pub use api::BiometricApi;
pub use error::{BiometricError, BioResult, ErrorCode};
pub use keystore::BiometricKeystore;
pub use orchestrator::{AttemptGate, Orchestrator};
pub use platform::PlatformProvider;
pub use signer::Signer;
pub use types::{
    AuthResult, AuthenticatorStrength, AvailabilityResult, BiometricClass, FallbackMode,
    KeyExistsResult, OperationResult, PromptOptions, SignatureResult,
};

/// Bioauth version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }
}
