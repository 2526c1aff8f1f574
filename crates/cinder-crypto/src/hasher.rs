use base64::{prelude::BASE64_STANDARD, Engine};
use secstr::SecVec;
use tracing::debug;

use crate::{
    eq::ConstantTimeEq,
    format::{DecodeError, EncodedHash},
    kdf::{KeyDerivation, Pbkdf2},
    prf::Prf,
    settings::HashingSettings,
    Error,
};

/// Outcome of checking a password against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[repr(u8)]
pub enum Verification {
    Failed = 0,
    Success = 1,
    /// The password matched, but the hash was made with fewer iterations than
    /// currently configured and should be replaced.
    SuccessRehashNeeded = 2,
}

impl Verification {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Verification::Success | Verification::SuccessRehashNeeded
        )
    }
}

/// Why a stored hash did not verify. Never leaves this module.
#[derive(Debug, thiserror::Error)]
enum Rejection {
    #[error(transparent)]
    Format(#[from] DecodeError),

    #[error(transparent)]
    Derivation(#[from] Error),

    #[error("subkey mismatch")]
    Mismatch,
}

/// Hashes and verifies passwords with the given settings.
///
/// Holds no state between calls and can be shared between threads.
#[derive(Debug, Clone)]
pub struct PasswordHasher<K = Pbkdf2> {
    settings: HashingSettings,
    kdf: K,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashingSettings::default())
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new(settings: HashingSettings) -> Self {
        Self::with_kdf(settings, Pbkdf2)
    }
}

impl<K: KeyDerivation> PasswordHasher<K> {
    #[must_use]
    pub fn with_kdf(settings: HashingSettings, kdf: K) -> Self {
        Self { settings, kdf }
    }

    #[must_use]
    pub fn settings(&self) -> &HashingSettings {
        &self.settings
    }

    /// Whether a hash made with `iter_count` iterations is weaker than the current settings.
    #[must_use]
    pub fn is_stale(&self, iter_count: u32) -> bool {
        iter_count < self.settings.iter_count
    }

    /// Hashes a password with a fresh salt, returning the base64 encoded record.
    /// The empty password is valid input.
    ///
    /// # Errors
    /// - `Error::MissingArgument` if no password is given.
    /// - The settings could not produce a verifiable hash, see [`HashingSettings::validate`].
    /// - The random source or the key derivation failed.
    #[tracing::instrument(skip_all, fields(kdf = K::NAME, prf = %self.settings.prf, iter_count = self.settings.iter_count))]
    pub fn hash_password<'a>(&self, password: impl Into<Option<&'a str>>) -> Result<String, Error> {
        let password = password
            .into()
            .ok_or(Error::MissingArgument("password"))?;
        self.settings.validate()?;

        let mut salt = vec![0u8; self.settings.salt_size];
        self.settings.rng.fill(&mut salt)?;

        let mut subkey = SecVec::new(vec![0u8; self.settings.num_bytes_requested]);
        self.kdf.derive_key(
            password.as_bytes(),
            &salt,
            self.settings.prf,
            self.settings.iter_count,
            subkey.unsecure_mut(),
        )?;

        let encoded = EncodedHash::new(
            self.settings.prf.id(),
            self.settings.iter_count,
            &salt,
            subkey.unsecure(),
        )
        .encode()?;

        Ok(BASE64_STANDARD.encode(encoded))
    }

    /// Checks `provided_password` against a hash produced by [`Self::hash_password`].
    ///
    /// Any problem with the stored hash, including one that cannot be decoded or
    /// names an unsupported PRF, yields [`Verification::Failed`].
    ///
    /// # Errors
    /// `Error::MissingArgument` if either argument is absent.
    #[tracing::instrument(skip_all, fields(kdf = K::NAME))]
    pub fn verify_hashed_password<'h, 'p>(
        &self,
        hashed_password: impl Into<Option<&'h str>>,
        provided_password: impl Into<Option<&'p str>>,
    ) -> Result<Verification, Error> {
        let hashed_password = hashed_password
            .into()
            .ok_or(Error::MissingArgument("hashed_password"))?;
        let provided_password = provided_password
            .into()
            .ok_or(Error::MissingArgument("provided_password"))?;

        let outcome = match self.verify_encoded(hashed_password, provided_password) {
            Ok(iter_count) if self.is_stale(iter_count) => {
                debug!(
                    iter_count,
                    current = self.settings.iter_count,
                    "hash uses fewer iterations than configured"
                );
                Verification::SuccessRehashNeeded
            }
            Ok(_) => Verification::Success,
            Err(reason) => {
                debug!(%reason, "password verification failed");
                Verification::Failed
            }
        };

        Ok(outcome)
    }

    /// Returns the embedded iteration count if the password matches.
    fn verify_encoded(&self, hashed_password: &str, password: &str) -> Result<u32, Rejection> {
        let raw = BASE64_STANDARD
            .decode(hashed_password)
            .map_err(DecodeError::from)?;
        let encoded = EncodedHash::decode(&raw)?;
        let prf = Prf::try_from(encoded.prf_id)?;

        let mut actual = SecVec::new(vec![0u8; encoded.subkey.len()]);
        self.kdf.derive_key(
            password.as_bytes(),
            encoded.salt,
            prf,
            encoded.iter_count,
            actual.unsecure_mut(),
        )?;

        let actual = actual.unsecure();
        if !ConstantTimeEq::eq(&actual, &encoded.subkey) {
            return Err(Rejection::Mismatch);
        }

        Ok(encoded.iter_count)
    }
}
