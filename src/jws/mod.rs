//! The signature engine (component E, spec.md §4.5) and the closed
//! algorithm enumeration (spec.md §6.2, design note "Algorithm enumeration").

pub mod alg_ecdsa;
pub mod alg_hmac;
pub mod alg_rsa;

use crate::error::JoseError;
use crate::jwk::Jwk;
use crate::util::HashAlgorithm;

/// The `alg` header value, as a closed tagged variant.
///
/// `None` is a recognized parse state only — spec.md §4.5 forbids it as a
/// sign output, and verification of a `None`-tagged token requires an
/// explicit opt-in (spec.md §4.5, §8 property 8).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Algorithm {
    None,
    Hs256,
    Hs384,
    Hs512,
    Rs256,
    Rs384,
    Rs512,
    Es256,
    Es384,
    Es512,
}

impl Algorithm {
    /// The exact `alg` header string for this algorithm (spec.md §6.2).
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
        }
    }

    /// Map an `alg` header string to its algorithm.
    ///
    /// Case-sensitive (spec.md §6.2): an unrecognized string maps to
    /// `None`, never to an error here — the caller (the JWT header parser)
    /// is responsible for rejecting a `None`-with-signature combination
    /// per Invariant I-1, at header-parse time (spec.md §9, Open Question).
    pub fn from_name(name: &str) -> Self {
        match name {
            "HS256" => Self::Hs256,
            "HS384" => Self::Hs384,
            "HS512" => Self::Hs512,
            "RS256" => Self::Rs256,
            "RS384" => Self::Rs384,
            "RS512" => Self::Rs512,
            "ES256" => Self::Es256,
            "ES384" => Self::Es384,
            "ES512" => Self::Es512,
            _ => Self::None,
        }
    }

    fn hash(&self) -> Option<HashAlgorithm> {
        match self {
            Self::None => None,
            Self::Hs256 | Self::Rs256 | Self::Es256 => Some(HashAlgorithm::Sha256),
            Self::Hs384 | Self::Rs384 | Self::Es384 => Some(HashAlgorithm::Sha384),
            Self::Hs512 | Self::Rs512 | Self::Es512 => Some(HashAlgorithm::Sha512),
        }
    }
}

/// Compute the signature over `signing_input` with `jwk`, dispatching on
/// `alg` (spec.md §4.5).
///
/// `alg` must not be `Algorithm::None` — signing with `none` is rejected
/// (spec.md §4.5, §7).
pub fn sign(alg: Algorithm, signing_input: &[u8], jwk: &Jwk) -> Result<Vec<u8>, JoseError> {
    let hash = alg
        .hash()
        .ok_or_else(|| JoseError::UnsupportedSignatureAlgorithm(anyhow::anyhow!(
            "Signing with alg {:?} is not supported.",
            alg
        )))?;

    match alg {
        Algorithm::None => unreachable!("alg.hash() returned None above"),
        Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => {
            alg_hmac::sign(hash, signing_input, jwk)
        }
        Algorithm::Rs256 | Algorithm::Rs384 | Algorithm::Rs512 => {
            alg_rsa::sign(hash, signing_input, jwk)
        }
        Algorithm::Es256 | Algorithm::Es384 | Algorithm::Es512 => {
            alg_ecdsa::sign(hash, signing_input, jwk)
        }
    }
}

/// Verify `signature` over `signing_input` with `jwk`, dispatching on
/// `alg` (spec.md §4.5).
///
/// Never raises on adversarial input; any internal failure (malformed
/// key, malformed signature length) is folded into `Ok(false)` by the
/// caller in `Jwt::has_valid_signature`. `Algorithm::None` always
/// verifies to `false` here — the caller decides whether to honor an
/// explicit opt-in for unsigned tokens (spec.md §4.5).
pub fn verify(
    alg: Algorithm,
    signing_input: &[u8],
    signature: &[u8],
    jwk: &Jwk,
) -> Result<bool, JoseError> {
    let hash = match alg.hash() {
        Some(hash) => hash,
        None => return Ok(false),
    };

    match alg {
        Algorithm::None => unreachable!("alg.hash() returned None above"),
        Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => {
            alg_hmac::verify(hash, signing_input, signature, jwk)
        }
        Algorithm::Rs256 | Algorithm::Rs384 | Algorithm::Rs512 => {
            alg_rsa::verify(hash, signing_input, signature, jwk)
        }
        Algorithm::Es256 | Algorithm::Es384 | Algorithm::Es512 => {
            alg_ecdsa::verify(hash, signing_input, signature, jwk)
        }
    }
}
