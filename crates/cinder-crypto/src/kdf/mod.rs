use crate::{prf::Prf, Error};

pub mod pbkdf2;

pub use self::pbkdf2::Pbkdf2;

/// Password based key derivation, deterministic for fixed inputs.
pub trait KeyDerivation: Send + Sync {
    const NAME: &'static str;

    /// Derives `out.len()` bytes from the password and salt.
    ///
    /// # Errors
    /// If the parameters are rejected by the underlying primitive,
    /// e.g. a zero iteration count or an empty output buffer.
    fn derive_key(
        &self,
        password: &[u8],
        salt: &[u8],
        prf: Prf,
        iter_count: u32,
        out: &mut [u8],
    ) -> Result<(), Error>;
}
