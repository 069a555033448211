//! RS256/384/512 — RSASSA-PKCS1-v1.5 (spec.md §4.5).

use anyhow::bail;
use openssl::pkey::PKey;
use openssl::sign::{Signer, Verifier};

use crate::error::JoseError;
use crate::jwk::RsaKeyMaterial;
use crate::util::HashAlgorithm;
use crate::Jwk;

pub fn sign(hash: HashAlgorithm, signing_input: &[u8], jwk: &Jwk) -> Result<Vec<u8>, JoseError> {
    let material = RsaKeyMaterial::load(jwk, true)?;
    (|| -> anyhow::Result<Vec<u8>> {
        let rsa = match material {
            RsaKeyMaterial::Private(rsa) => rsa,
            RsaKeyMaterial::Public(_) => bail!("A private RSA key is required to sign."),
        };
        let pkey = PKey::from_rsa(rsa)?;
        let mut signer = Signer::new(hash.message_digest(), &pkey)?;
        signer.update(signing_input)?;
        Ok(signer.sign_to_vec()?)
    })()
    .map_err(JoseError::InvalidSignature)
}

/// `sig.len() == modulus length in bytes` is the spec.md §8 S2 property;
/// `Verifier::verify` on a length mismatch simply returns `false` rather
/// than panicking, which this function relies on.
pub fn verify(
    hash: HashAlgorithm,
    signing_input: &[u8],
    signature: &[u8],
    jwk: &Jwk,
) -> Result<bool, JoseError> {
    let material = RsaKeyMaterial::load(jwk, false)?;
    (|| -> anyhow::Result<bool> {
        let rsa = match material {
            RsaKeyMaterial::Public(rsa) => rsa,
            RsaKeyMaterial::Private(rsa) => {
                openssl::rsa::Rsa::from_public_components(rsa.n().to_owned()?, rsa.e().to_owned()?)?
            }
        };
        let pkey = PKey::from_rsa(rsa)?;
        let mut verifier = Verifier::new(hash.message_digest(), &pkey)?;
        verifier.update(signing_input)?;
        Ok(verifier.verify(signature)?)
    })()
    .map_err(JoseError::InvalidSignature)
}
