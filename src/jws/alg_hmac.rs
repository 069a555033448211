//! HS256/384/512 (spec.md §4.5).

use crate::error::JoseError;
use crate::jwk::SymmetricKey;
use crate::util::{self, HashAlgorithm};
use crate::Jwk;

pub fn sign(hash: HashAlgorithm, signing_input: &[u8], jwk: &Jwk) -> Result<Vec<u8>, JoseError> {
    let key = SymmetricKey::load(jwk)?;
    util::hmac(hash, key.as_bytes(), signing_input)
}

/// Recompute the HMAC and compare in constant time (spec.md §4.5's
/// side-channel discipline): "bytes equal and lengths equal ⇒ valid".
pub fn verify(
    hash: HashAlgorithm,
    signing_input: &[u8],
    signature: &[u8],
    jwk: &Jwk,
) -> Result<bool, JoseError> {
    let key = SymmetricKey::load(jwk)?;
    let expected = util::hmac(hash, key.as_bytes(), signing_input)?;
    Ok(util::constant_time_eq(&expected, signature))
}
