use serde::{Deserialize, Serialize};

use crate::Error;

/// Pseudorandom function used inside the PBKDF2 loop.
///
/// The discriminants are written into every encoded hash, so they must never change.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum Prf {
    HmacSha1 = 0,
    #[default]
    HmacSha256 = 1,
    HmacSha512 = 2,
}

impl Prf {
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

impl From<Prf> for u32 {
    fn from(prf: Prf) -> Self {
        prf.id()
    }
}

impl TryFrom<u32> for Prf {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Prf::HmacSha1),
            1 => Ok(Prf::HmacSha256),
            2 => Ok(Prf::HmacSha512),
            other => Err(Error::UnsupportedPrf(other)),
        }
    }
}
