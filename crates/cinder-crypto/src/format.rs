//! Self-describing binary layout of a stored password hash.
//!
//! ```text
//! +---------+------------+------------+-------------+------------+------------+
//! | version | prf id     | iterations | salt length | salt       | subkey     |
//! | 1 byte  | u32 BE     | u32 BE     | u32 BE      | salt len   | remainder  |
//! +---------+------------+------------+-------------+------------+------------+
//! ```
//!
//! The layout is persisted by callers and has to stay byte exact.

use base64::{prelude::BASE64_STANDARD, Engine};

use crate::{prf::Prf, Error};

/// Only recognized value of the leading version byte.
pub const FORMAT_VERSION: u8 = 0x01;

/// Version byte plus three big-endian `u32` fields.
pub const HEADER_LEN: usize = 13;

/// 128 bits, for both the salt and the subkey.
pub const MIN_SALT_LEN: usize = 16;
pub const MIN_SUBKEY_LEN: usize = 16;

/// Largest iteration count a record may carry, `i32::MAX`.
pub const MAX_ITER_COUNT: u32 = i32::MAX as u32;

const PRF_OFFSET: usize = 1;
const ITER_OFFSET: usize = 5;
const SALT_LEN_OFFSET: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("encoded hash is empty")]
    Empty,

    #[error("encoded hash too short for header: {0} bytes")]
    Truncated(usize),

    #[error("unknown format version: {0:#04x}")]
    UnknownVersion(u8),

    #[error("iteration count {0} exceeds {MAX_ITER_COUNT}")]
    IterationsOutOfRange(u32),

    #[error("salt too short: {0} bytes")]
    SaltTooShort(usize),

    #[error("declared salt length {declared} exceeds the {available} bytes available")]
    SaltOutOfBounds { declared: usize, available: usize },

    #[error("subkey too short: {0} bytes")]
    SubkeyTooShort(usize),
}

/// A decoded hash, borrowing salt and subkey from the raw buffer.
///
/// The PRF is kept as its raw identifier: an unknown id is still a well formed
/// record, it is the key derivation that cannot honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedHash<'a> {
    pub prf_id: u32,
    pub iter_count: u32,
    pub salt: &'a [u8],
    pub subkey: &'a [u8],
}

impl<'a> EncodedHash<'a> {
    #[must_use]
    pub fn new(prf_id: u32, iter_count: u32, salt: &'a [u8], subkey: &'a [u8]) -> Self {
        Self {
            prf_id,
            iter_count,
            salt,
            subkey,
        }
    }

    /// Serializes the record.
    ///
    /// # Errors
    /// If the salt length does not fit the `u32` length field.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let salt_len = salt_len_field(self.salt.len())?;

        let mut out = Vec::with_capacity(HEADER_LEN + self.salt.len() + self.subkey.len());
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&self.prf_id.to_be_bytes());
        out.extend_from_slice(&self.iter_count.to_be_bytes());
        out.extend_from_slice(&salt_len.to_be_bytes());
        out.extend_from_slice(self.salt);
        out.extend_from_slice(self.subkey);
        Ok(out)
    }

    /// Parses and validates a raw record.
    ///
    /// # Errors
    /// Returns the first structural problem found, see [`DecodeError`].
    pub fn decode(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        if bytes.len() < HEADER_LEN {
            return Err(DecodeError::Truncated(bytes.len()));
        }
        if bytes[0] != FORMAT_VERSION {
            return Err(DecodeError::UnknownVersion(bytes[0]));
        }

        let prf_id = read_u32(bytes, PRF_OFFSET);
        let iter_count = read_u32(bytes, ITER_OFFSET);
        let salt_len = read_u32(bytes, SALT_LEN_OFFSET) as usize;

        if iter_count > MAX_ITER_COUNT {
            return Err(DecodeError::IterationsOutOfRange(iter_count));
        }
        if salt_len < MIN_SALT_LEN {
            return Err(DecodeError::SaltTooShort(salt_len));
        }

        let body = &bytes[HEADER_LEN..];
        if salt_len > body.len() {
            return Err(DecodeError::SaltOutOfBounds {
                declared: salt_len,
                available: body.len(),
            });
        }

        let (salt, subkey) = body.split_at(salt_len);
        if subkey.len() < MIN_SUBKEY_LEN {
            return Err(DecodeError::SubkeyTooShort(subkey.len()));
        }

        Ok(Self {
            prf_id,
            iter_count,
            salt,
            subkey,
        })
    }
}

/// Owned summary of a stored hash, without its secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashInfo {
    pub prf: Option<Prf>,
    pub prf_id: u32,
    pub iter_count: u32,
    pub salt_len: usize,
    pub subkey_len: usize,
}

impl From<EncodedHash<'_>> for HashInfo {
    fn from(encoded: EncodedHash<'_>) -> Self {
        Self {
            prf: Prf::try_from(encoded.prf_id).ok(),
            prf_id: encoded.prf_id,
            iter_count: encoded.iter_count,
            salt_len: encoded.salt.len(),
            subkey_len: encoded.subkey.len(),
        }
    }
}

impl HashInfo {
    /// Decodes the text form of a stored hash.
    ///
    /// # Errors
    /// If the text is not base64 or the record is malformed.
    pub fn from_base64(hashed: &str) -> Result<Self, DecodeError> {
        let raw = BASE64_STANDARD.decode(hashed)?;
        Ok(EncodedHash::decode(&raw)?.into())
    }
}

impl std::fmt::Display for HashInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.prf {
            Some(prf) => write!(f, "prf: {prf}")?,
            None => write!(f, "prf: unsupported ({})", self.prf_id)?,
        }
        write!(
            f,
            ", iter_count: {}, salt: {} bytes, subkey: {} bytes",
            self.iter_count, self.salt_len, self.subkey_len
        )
    }
}

fn salt_len_field(len: usize) -> Result<u32, Error> {
    u32::try_from(len)
        .map_err(|_| Error::InvalidSettings(format!("salt length {len} exceeds {}", u32::MAX)))
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: [u8; 16] = [0xAA; 16];
    const SUBKEY: [u8; 32] = [0x55; 32];

    #[test]
    fn test_encode_layout() {
        let encoded = EncodedHash::new(1, 10_000, &SALT, &SUBKEY).encode().unwrap();

        assert_eq!(encoded.len(), HEADER_LEN + SALT.len() + SUBKEY.len());
        assert_eq!(
            &encoded[..HEADER_LEN],
            &[0x01u8, 0, 0, 0, 1, 0, 0, 0x27, 0x10, 0, 0, 0, 16]
        );
        assert_eq!(&encoded[HEADER_LEN..HEADER_LEN + 16], &SALT);
        assert_eq!(&encoded[HEADER_LEN + 16..], &SUBKEY);
    }

    #[test]
    fn test_decode() {
        let encoded = EncodedHash::new(2, 5000, &SALT, &SUBKEY).encode().unwrap();
        let decoded = EncodedHash::decode(&encoded).unwrap();

        assert_eq!(decoded.prf_id, 2);
        assert_eq!(decoded.iter_count, 5000);
        assert_eq!(decoded.salt, SALT);
        assert_eq!(decoded.subkey, SUBKEY);
    }

    #[test]
    fn test_decode_big_endian_fields() {
        let mut raw = vec![0x01, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x00, 0x00, 0, 0, 0, 16];
        raw.extend_from_slice(&SALT);
        raw.extend_from_slice(&SUBKEY[..16]);

        let decoded = EncodedHash::decode(&raw).unwrap();
        assert_eq!(decoded.prf_id, 0xDEAD_BEEF);
        assert_eq!(decoded.iter_count, 65_536);
        assert_eq!(decoded.subkey.len(), 16);
    }

    #[test]
    fn test_decode_empty_and_truncated() {
        assert_eq!(EncodedHash::decode(&[]), Err(DecodeError::Empty));

        let encoded = EncodedHash::new(1, 1, &SALT, &SUBKEY).encode().unwrap();
        assert_eq!(
            EncodedHash::decode(&encoded[..12]),
            Err(DecodeError::Truncated(12))
        );
    }

    #[test]
    fn test_decode_unknown_version() {
        let mut encoded = EncodedHash::new(1, 1, &SALT, &SUBKEY).encode().unwrap();
        encoded[0] = 0x00;
        assert_eq!(
            EncodedHash::decode(&encoded),
            Err(DecodeError::UnknownVersion(0x00))
        );
    }

    #[test]
    fn test_decode_short_salt() {
        let encoded = EncodedHash::new(1, 1, &SALT[..15], &SUBKEY).encode().unwrap();
        assert_eq!(
            EncodedHash::decode(&encoded),
            Err(DecodeError::SaltTooShort(15))
        );
    }

    #[test]
    fn test_decode_short_subkey() {
        let encoded = EncodedHash::new(1, 1, &SALT, &SUBKEY[..15]).encode().unwrap();
        assert_eq!(
            EncodedHash::decode(&encoded),
            Err(DecodeError::SubkeyTooShort(15))
        );
    }

    #[test]
    fn test_hash_info() {
        let encoded = EncodedHash::new(1, 5000, &SALT, &SUBKEY).encode().unwrap();
        let info = HashInfo::from_base64(&BASE64_STANDARD.encode(encoded)).unwrap();

        assert_eq!(info.prf, Some(Prf::HmacSha256));
        assert_eq!(info.iter_count, 5000);
        assert_eq!(info.salt_len, 16);
        assert_eq!(info.subkey_len, 32);
        assert_eq!(
            info.to_string(),
            "prf: HmacSha256, iter_count: 5000, salt: 16 bytes, subkey: 32 bytes"
        );

        let unsupported = EncodedHash::new(9, 1, &SALT, &SUBKEY).encode().unwrap();
        let info = HashInfo::from_base64(&BASE64_STANDARD.encode(unsupported)).unwrap();
        assert_eq!(info.prf, None);
        assert!(info.to_string().starts_with("prf: unsupported (9)"));

        assert!(matches!(
            HashInfo::from_base64("not base64!"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_iterations_out_of_range() {
        let encoded = EncodedHash::new(1, MAX_ITER_COUNT, &SALT, &SUBKEY).encode().unwrap();
        assert_eq!(EncodedHash::decode(&encoded).unwrap().iter_count, MAX_ITER_COUNT);

        for iter_count in [MAX_ITER_COUNT + 1, 0x8000_0000, u32::MAX] {
            let encoded = EncodedHash::new(1, iter_count, &SALT, &SUBKEY).encode().unwrap();
            assert_eq!(
                EncodedHash::decode(&encoded),
                Err(DecodeError::IterationsOutOfRange(iter_count))
            );
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_salt_len_field() {
        assert_eq!(salt_len_field(16), Ok(16));
        assert_eq!(salt_len_field(u32::MAX as usize), Ok(u32::MAX));
        assert!(matches!(
            salt_len_field(u32::MAX as usize + 1),
            Err(Error::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_decode_salt_past_end() {
        let mut encoded = EncodedHash::new(1, 1, &SALT, &SUBKEY).encode().unwrap();
        encoded[9..13].copy_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(
            EncodedHash::decode(&encoded),
            Err(DecodeError::SaltOutOfBounds {
                declared: u32::MAX as usize,
                available: SALT.len() + SUBKEY.len(),
            })
        );
    }
}
