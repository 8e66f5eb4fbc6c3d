//! Bioauth - Capability Prober
//!
//! Inspects the platform for available sensor classes and composes the
//! priority choice. Pure function of platform state; safe to call
//! repeatedly and concurrently.

use crate::platform::PlatformProvider;
use crate::types::{AuthenticatorStrength, BiometricClass};

/// Probe the platform for the preferred biometric class.
///
/// Fixed priority: fingerprint > face > iris. Availability probing
/// always pairs the class with `Weak` so that the query never consumes
/// lockout attempts; `Strong` is reserved for key-backed signing and
/// requested there explicitly.
pub fn probe(provider: &dyn PlatformProvider) -> (BiometricClass, AuthenticatorStrength) {
    let sensors = provider.sensors();

    if !sensors.any() {
        return (BiometricClass::None, AuthenticatorStrength::Weak);
    }

    let class = if sensors.fingerprint {
        BiometricClass::Fingerprint
    } else if sensors.face {
        BiometricClass::FaceId
    } else {
        BiometricClass::Iris
    };

    (class, AuthenticatorStrength::Weak)
}
