use std::{fmt, sync::Arc};

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    format::{MAX_ITER_COUNT, MIN_SALT_LEN, MIN_SUBKEY_LEN},
    prf::Prf,
    rng::{OsRandom, SecureRandom},
    Error,
};

pub const DEFAULT_ITER_COUNT: u32 = 10_000;
pub const DEFAULT_SALT_SIZE: usize = 128 / 8;
pub const DEFAULT_NUM_BYTES_REQUESTED: usize = 256 / 8;

/// Parameters used for new hashes, and the bar old hashes are measured against.
#[derive(Clone)]
pub struct HashingSettings {
    pub prf: Prf,
    pub iter_count: u32,
    pub salt_size: usize,
    pub num_bytes_requested: usize,
    pub rng: Arc<dyn SecureRandom>,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            prf: Prf::default(),
            iter_count: DEFAULT_ITER_COUNT,
            salt_size: DEFAULT_SALT_SIZE,
            num_bytes_requested: DEFAULT_NUM_BYTES_REQUESTED,
            rng: Arc::new(OsRandom),
        }
    }
}

impl fmt::Debug for HashingSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashingSettings")
            .field("prf", &self.prf)
            .field("iter_count", &self.iter_count)
            .field("salt_size", &self.salt_size)
            .field("num_bytes_requested", &self.num_bytes_requested)
            .finish_non_exhaustive()
    }
}

impl HashingSettings {
    #[must_use]
    pub fn with_prf(self, prf: Prf) -> Self {
        Self { prf, ..self }
    }

    #[must_use]
    pub fn with_iter_count(self, iter_count: u32) -> Self {
        Self { iter_count, ..self }
    }

    #[must_use]
    pub fn with_salt_size(self, salt_size: usize) -> Self {
        Self { salt_size, ..self }
    }

    #[must_use]
    pub fn with_num_bytes_requested(self, num_bytes_requested: usize) -> Self {
        Self {
            num_bytes_requested,
            ..self
        }
    }

    #[must_use]
    pub fn with_rng(self, rng: Arc<dyn SecureRandom>) -> Self {
        Self { rng, ..self }
    }

    /// Checks that hashes produced with these settings would verify.
    ///
    /// # Errors
    /// If the iteration count is zero, or any parameter would be rejected on decode.
    pub fn validate(&self) -> Result<(), Error> {
        if self.iter_count == 0 {
            return Err(Error::InvalidIterations);
        }
        if self.iter_count > MAX_ITER_COUNT {
            return Err(Error::InvalidSettings(format!(
                "iteration count must be at most {MAX_ITER_COUNT}, got {}",
                self.iter_count
            )));
        }
        if self.salt_size < MIN_SALT_LEN || u32::try_from(self.salt_size).is_err() {
            return Err(Error::InvalidSettings(format!(
                "salt size must be between {MIN_SALT_LEN} and {} bytes, got {}",
                u32::MAX,
                self.salt_size
            )));
        }
        if self.num_bytes_requested < MIN_SUBKEY_LEN {
            return Err(Error::InvalidSettings(format!(
                "derived key must be at least {MIN_SUBKEY_LEN} bytes, got {}",
                self.num_bytes_requested
            )));
        }
        Ok(())
    }
}

/// File backed form of [`HashingSettings`].
#[derive(Validate, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    #[garde(skip)]
    pub prf: Prf,
    // Upper bound is `MAX_ITER_COUNT`.
    #[garde(range(min = 1, max = 2_147_483_647))]
    pub iter_count: u32,
    #[garde(range(min = 16, max = 1024))]
    pub salt_size: usize,
    #[garde(range(min = 16, max = 1024))]
    pub num_bytes_requested: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            prf: Prf::default(),
            iter_count: DEFAULT_ITER_COUNT,
            salt_size: DEFAULT_SALT_SIZE,
            num_bytes_requested: DEFAULT_NUM_BYTES_REQUESTED,
        }
    }
}

impl std::fmt::Display for HashingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ prf: {}, iter_count: {}, salt_size: {}, num_bytes_requested: {} }}",
            self.prf, self.iter_count, self.salt_size, self.num_bytes_requested
        )
    }
}

impl TryFrom<HashingConfig> for HashingSettings {
    type Error = Error;

    fn try_from(config: HashingConfig) -> Result<Self, Self::Error> {
        config
            .validate()
            .map_err(|report| Error::InvalidSettings(report.to_string()))?;

        Ok(HashingSettings::default()
            .with_prf(config.prf)
            .with_iter_count(config.iter_count)
            .with_salt_size(config.salt_size)
            .with_num_bytes_requested(config.num_bytes_requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = HashingSettings::default();
        assert_eq!(settings.prf, Prf::HmacSha256);
        assert_eq!(settings.iter_count, 10_000);
        assert_eq!(settings.salt_size, 16);
        assert_eq!(settings.num_bytes_requested, 32);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_builder_keeps_other_fields() {
        let settings = HashingSettings::default()
            .with_prf(Prf::HmacSha512)
            .with_iter_count(5000);
        assert_eq!(settings.prf, Prf::HmacSha512);
        assert_eq!(settings.iter_count, 5000);
        assert_eq!(settings.salt_size, DEFAULT_SALT_SIZE);
    }

    #[test]
    fn test_validate_rejects_unverifiable() {
        let base = HashingSettings::default();
        assert_eq!(
            base.clone().with_iter_count(0).validate(),
            Err(Error::InvalidIterations)
        );
        assert!(matches!(
            base.clone().with_iter_count(MAX_ITER_COUNT + 1).validate(),
            Err(Error::InvalidSettings(_))
        ));
        assert!(base.clone().with_iter_count(MAX_ITER_COUNT).validate().is_ok());
        assert!(matches!(
            base.clone().with_salt_size(8).validate(),
            Err(Error::InvalidSettings(_))
        ));
        assert!(matches!(
            base.with_num_bytes_requested(15).validate(),
            Err(Error::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_config_conversion() {
        let config = HashingConfig {
            prf: Prf::HmacSha1,
            iter_count: 20_000,
            ..HashingConfig::default()
        };
        let settings = HashingSettings::try_from(config).unwrap();
        assert_eq!(settings.prf, Prf::HmacSha1);
        assert_eq!(settings.iter_count, 20_000);
        assert_eq!(settings.num_bytes_requested, 32);
    }

    #[test]
    fn test_config_validation() {
        let config = HashingConfig {
            salt_size: 4,
            ..HashingConfig::default()
        };
        assert!(matches!(
            HashingSettings::try_from(config),
            Err(Error::InvalidSettings(_))
        ));

        let config = HashingConfig {
            iter_count: 0x8000_0000,
            ..HashingConfig::default()
        };
        assert!(config.validate().is_err());

        let config = HashingConfig {
            iter_count: MAX_ITER_COUNT,
            ..HashingConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_toml() {
        let config: HashingConfig = toml::from_str(
            r#"
            prf = "HmacSha512"
            iter_count = 600000
            "#,
        )
        .unwrap();
        assert_eq!(config.prf, Prf::HmacSha512);
        assert_eq!(config.iter_count, 600_000);
        assert_eq!(config.salt_size, DEFAULT_SALT_SIZE);
    }
}
