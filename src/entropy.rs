//! System random number generator wrapper
//!
//! Token identifiers, ephemeral envelope keys and RSA-PSS salts all draw from
//! the operating system's CSPRNG. The OS source is thread-safe, so concurrent
//! issuances need no locking of their own.
//!
//! Every function that needs randomness takes `&mut (impl RngCore + CryptoRng)`
//! so tests can substitute a seeded generator.

use rand_core::{CryptoRng, OsRng, RngCore};

use crate::error::{Result, VisaError};

/// CSPRNG backed by the operating system
#[derive(Debug, Clone, Copy)]
pub struct SystemRng {
    // Zero-sized - all state lives in the OS
    _private: (),
}

impl SystemRng {
    /// Open the system RNG
    ///
    /// Reads a probe value first so a broken entropy source is reported at
    /// start-up rather than as a malformed token later.
    pub fn new() -> Result<Self> {
        let mut probe = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut probe)
            .map_err(|e| VisaError::Entropy(e.to_string()))?;

        // All zeros from a CSPRNG means the source is not actually producing output
        if probe == [0u8; 16] {
            return Err(VisaError::Entropy(
                "system RNG sanity check failed - returned all zeros".into(),
            ));
        }

        Ok(Self { _private: () })
    }
}

impl RngCore for SystemRng {
    fn next_u32(&mut self) -> u32 {
        OsRng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        OsRng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

impl CryptoRng for SystemRng {}
