//! ES256/384/512 — ECDSA over P-256/384/521 (spec.md §4.5).
//!
//! The raw signature encoding is the fixed-length concatenation `R||S`,
//! each half left-zero-padded to the curve's coordinate byte length.
//! `openssl::ecdsa::EcdsaSig` natively produces/consumes `(r, s)` as a
//! pair of big integers, never ASN.1 DER, so no conversion step is needed
//! on either side — unlike a backend whose only entry point is the
//! high-level `Signer`/`Verifier` API, which does emit DER.

use anyhow::bail;
use openssl::bn::BigNum;
use openssl::ecdsa::EcdsaSig;

use crate::error::JoseError;
use crate::jwk::EcKeyMaterial;
use crate::util::HashAlgorithm;
use crate::Jwk;

pub fn sign(hash: HashAlgorithm, signing_input: &[u8], jwk: &Jwk) -> Result<Vec<u8>, JoseError> {
    let (material, curve) = EcKeyMaterial::load(jwk, true)?;
    (|| -> anyhow::Result<Vec<u8>> {
        let key = match material {
            EcKeyMaterial::Private(key) => key,
            EcKeyMaterial::Public(_) => bail!("A private EC key is required to sign."),
        };
        let digest = hash.digest(signing_input)?;
        let sig = EcdsaSig::sign(&digest, &key)?;

        let coord_len = curve.coordinate_len();
        let mut out = Vec::with_capacity(coord_len * 2);
        out.extend_from_slice(&sig.r().to_vec_padded(coord_len as i32)?);
        out.extend_from_slice(&sig.s().to_vec_padded(coord_len as i32)?);
        Ok(out)
    })()
    .map_err(JoseError::InvalidSignature)
}

pub fn verify(
    hash: HashAlgorithm,
    signing_input: &[u8],
    signature: &[u8],
    jwk: &Jwk,
) -> Result<bool, JoseError> {
    let (material, curve) = EcKeyMaterial::load(jwk, false)?;
    (|| -> anyhow::Result<bool> {
        let key = match material {
            EcKeyMaterial::Public(key) => key,
            EcKeyMaterial::Private(key) => {
                openssl::ec::EcKey::from_public_key(key.group(), key.public_key())?
            }
        };

        let coord_len = curve.coordinate_len();
        if signature.len() != coord_len * 2 {
            return Ok(false);
        }
        let r = BigNum::from_slice(&signature[..coord_len])?;
        let s = BigNum::from_slice(&signature[coord_len..])?;
        let sig = EcdsaSig::from_private_components(r, s)?;

        let digest = hash.digest(signing_input)?;
        Ok(sig.verify(&digest, &key)?)
    })()
    .map_err(JoseError::InvalidSignature)
}
