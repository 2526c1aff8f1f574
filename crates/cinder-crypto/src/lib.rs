pub mod eq;
pub mod format;
pub mod hasher;
pub mod kdf;
pub mod prf;
pub mod rng;
pub mod settings;

pub use hasher::{PasswordHasher, Verification};
pub use prf::Prf;
pub use settings::{HashingConfig, HashingSettings};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("unsupported prf identifier: {0}")]
    UnsupportedPrf(u32),

    #[error("iteration count must be at least 1")]
    InvalidIterations,

    #[error("requested output length must be at least 1 byte")]
    InvalidOutputLength,

    #[error("secure random source failed: {0}")]
    Rng(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("invalid hashing settings: {0}")]
    InvalidSettings(String),
}
