use std::sync::Mutex;

use rand_core::{CryptoRng, OsRng, RngCore};

use crate::Error;

/// Source of unpredictable bytes used for salts.
///
/// Implementations are shared between threads, so filling must only need `&self`.
pub trait SecureRandom: Send + Sync {
    /// # Errors
    /// If the source could not produce enough entropy.
    fn fill(&self, buf: &mut [u8]) -> Result<(), Error>;
}

/// The operating system generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), Error> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| Error::Rng(e.to_string()))
    }
}

/// Any stateful cryptographic generator, serialized behind a lock.
impl<R> SecureRandom for Mutex<R>
where
    R: RngCore + CryptoRng + Send,
{
    fn fill(&self, buf: &mut [u8]) -> Result<(), Error> {
        let mut rng = self
            .lock()
            .map_err(|_| Error::Rng("generator lock poisoned".to_string()))?;
        rng.try_fill_bytes(buf).map_err(|e| Error::Rng(e.to_string()))
    }
}
