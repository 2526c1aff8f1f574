use hmac::Hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use super::KeyDerivation;
use crate::{prf::Prf, Error};

/// PBKDF2 (RFC 8018) over the HMAC family selected by [`Prf`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbkdf2;

impl KeyDerivation for Pbkdf2 {
    const NAME: &'static str = "pbkdf2";

    fn derive_key(
        &self,
        password: &[u8],
        salt: &[u8],
        prf: Prf,
        iter_count: u32,
        out: &mut [u8],
    ) -> Result<(), Error> {
        if iter_count == 0 {
            return Err(Error::InvalidIterations);
        }
        if out.is_empty() {
            return Err(Error::InvalidOutputLength);
        }

        match prf {
            Prf::HmacSha1 => ::pbkdf2::pbkdf2::<Hmac<Sha1>>(password, salt, iter_count, out),
            Prf::HmacSha256 => ::pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iter_count, out),
            Prf::HmacSha512 => ::pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, iter_count, out),
        }
        .map_err(|e| Error::Derivation(e.to_string()))
    }
}
