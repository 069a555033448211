//! Shared, low-level building blocks: the base64url codec (component A),
//! digest/HMAC primitives (component D), and a constant-time comparator.

use std::fmt::Display;

use anyhow::bail;
use openssl::hash::MessageDigest;

use crate::error::JoseError;

/// Encode bytes as URL-safe base64 without padding.
///
/// Infallible for any input, as required by spec.md §4.1.
pub fn b64_encode(input: impl AsRef<[u8]>) -> String {
    base64::encode_config(input, base64::URL_SAFE_NO_PAD)
}

/// Append the URL-safe, unpadded base64 encoding of `input` to `buf`.
pub fn b64_encode_buf(input: impl AsRef<[u8]>, buf: &mut String) {
    base64::encode_config_buf(input, base64::URL_SAFE_NO_PAD, buf);
}

/// Decode a URL-safe, unpadded (or padded) base64 string.
///
/// Rejects any character outside the base64url alphabet. Accepts both
/// padded and unpadded input, per spec.md §4.1.
pub fn b64_decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, JoseError> {
    base64::decode_config(input, base64::URL_SAFE_NO_PAD).map_err(JoseError::DecodeError)
}

/// The three digest sizes this crate's algorithm table needs (spec.md §6.2).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn name(&self) -> &str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    pub(crate) fn message_digest(&self) -> MessageDigest {
        match self {
            Self::Sha256 => MessageDigest::sha256(),
            Self::Sha384 => MessageDigest::sha384(),
            Self::Sha512 => MessageDigest::sha512(),
        }
    }

    /// One-shot digest of `data`.
    pub fn digest(&self, data: &[u8]) -> Result<Vec<u8>, JoseError> {
        (|| -> anyhow::Result<Vec<u8>> {
            let digest = openssl::hash::hash(self.message_digest(), data)?;
            Ok(digest.to_vec())
        })()
        .map_err(JoseError::InvalidSignature)
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        fmt.write_str(self.name())
    }
}

/// One-shot HMAC of `data` under `key`, using the given digest.
pub fn hmac(hash: HashAlgorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>, JoseError> {
    (|| -> anyhow::Result<Vec<u8>> {
        if key.is_empty() {
            bail!("HMAC key must not be empty.");
        }
        let pkey = openssl::pkey::PKey::hmac(key)?;
        let mut signer = openssl::sign::Signer::new(hash.message_digest(), &pkey)?;
        signer.update(data)?;
        Ok(signer.sign_to_vec()?)
    })()
    .map_err(JoseError::InvalidSignature)
}

/// Constant-time byte comparison, used for HMAC signature verification
/// (spec.md §4.5's side-channel discipline).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && openssl::memcmp::eq(a, b)
}
