//! The JWK key materializer (component C, spec.md §4.3).
//!
//! Keys built here have no lifecycle beyond the call that needed them:
//! every decoded secret byte buffer is wrapped in `Zeroizing` so it is
//! scrubbed the moment it goes out of scope, win or lose.

use anyhow::bail;
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, EcKey, EcPoint};
use openssl::nid::Nid;
use openssl::pkey::{Private, Public};
use openssl::rsa::Rsa;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::error::JoseError;
use crate::jwk::Jwk;

fn decode_param(jwk: &Jwk, name: &str) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    match jwk.parameter(name) {
        Some(Value::String(val)) => Ok(Zeroizing::new(base64::decode_config(
            val,
            base64::URL_SAFE_NO_PAD,
        )?)),
        Some(_) => bail!("A parameter {} must be a string.", name),
        None => bail!("A parameter {} is required.", name),
    }
}

fn decode_param_opt(jwk: &Jwk, name: &str) -> anyhow::Result<Option<Zeroizing<Vec<u8>>>> {
    match jwk.parameter(name) {
        Some(Value::String(val)) => Ok(Some(Zeroizing::new(base64::decode_config(
            val,
            base64::URL_SAFE_NO_PAD,
        )?))),
        Some(_) => bail!("A parameter {} must be a string.", name),
        None => Ok(None),
    }
}

fn big_num(bytes: &[u8]) -> anyhow::Result<BigNum> {
    Ok(BigNum::from_slice(bytes)?)
}

/// A symmetric (`kty: "oct"`) key: raw secret bytes.
pub struct SymmetricKey(Zeroizing<Vec<u8>>);

impl SymmetricKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `load_symmetric(jwk)` (spec.md §4.3).
    pub fn load(jwk: &Jwk) -> Result<Self, JoseError> {
        (|| -> anyhow::Result<Self> {
            match jwk.key_type() {
                "oct" => {}
                other => bail!("A parameter kty must be oct: {}", other),
            }
            let k = decode_param(jwk, "k")?;
            Ok(Self(k))
        })()
        .map_err(JoseError::InvalidKeyFormat)
    }
}

/// An RSA key, materialized either public-only or with its private
/// exponent and CRT parameters.
pub enum RsaKeyMaterial {
    Public(Rsa<Public>),
    Private(Rsa<Private>),
}

impl RsaKeyMaterial {
    /// `load_rsa(jwk, need_private)` (spec.md §4.3).
    ///
    /// Deliberate divergence: spec.md §4.3 requires only `n,e,d` for a
    /// private key and treats `p,q,dp,dq,qi` as set "when present", but
    /// `openssl::rsa::Rsa::from_private_components` has no entry point that
    /// takes less than the full CRT parameter set, and recovering `p,q` from
    /// `n,e,d` alone needs a general-purpose integer-factoring routine this
    /// crate does not implement (see DESIGN.md's `jwk/keys.rs` entry). A
    /// private RSA JWK must therefore supply all five CRT parameters.
    pub fn load(jwk: &Jwk, need_private: bool) -> Result<Self, JoseError> {
        (|| -> anyhow::Result<Self> {
            match jwk.key_type() {
                "RSA" => {}
                other => bail!("A parameter kty must be RSA: {}", other),
            }

            let n = decode_param(jwk, "n")?;
            let e = decode_param(jwk, "e")?;

            if !need_private {
                let rsa = Rsa::from_public_components(big_num(&n)?, big_num(&e)?)?;
                return Ok(Self::Public(rsa));
            }

            let d = decode_param(jwk, "d")?;
            let p = decode_param_opt(jwk, "p")?;
            let q = decode_param_opt(jwk, "q")?;
            let dp = decode_param_opt(jwk, "dp")?;
            let dq = decode_param_opt(jwk, "dq")?;
            let qi = decode_param_opt(jwk, "qi")?;

            let rsa = match (p, q, dp, dq, qi) {
                (Some(p), Some(q), Some(dp), Some(dq), Some(qi)) => Rsa::from_private_components(
                    big_num(&n)?,
                    big_num(&e)?,
                    big_num(&d)?,
                    big_num(&p)?,
                    big_num(&q)?,
                    big_num(&dp)?,
                    big_num(&dq)?,
                    big_num(&qi)?,
                )?,
                _ => bail!(
                    "CRT parameters p, q, dp, dq, qi are all required for a private RSA JWK \
                     (this backend cannot recover them from n, e, d alone)."
                ),
            };

            Ok(Self::Private(rsa))
        })()
        .map_err(JoseError::InvalidKeyFormat)
    }

    pub fn modulus_len(&self) -> usize {
        match self {
            Self::Public(rsa) => rsa.size() as usize,
            Self::Private(rsa) => rsa.size() as usize,
        }
    }
}

/// The three NIST curves this crate's ES* algorithms use (spec.md §4.3, §6.2).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    pub fn from_jwk_name(name: &str) -> Option<Self> {
        match name {
            "P-256" => Some(Self::P256),
            "P-384" => Some(Self::P384),
            "P-521" => Some(Self::P521),
            _ => None,
        }
    }

    fn nid(&self) -> Nid {
        match self {
            Self::P256 => Nid::X9_62_PRIME256V1,
            Self::P384 => Nid::SECP384R1,
            Self::P521 => Nid::SECP521R1,
        }
    }

    /// The fixed big-endian coordinate/half-signature length for this
    /// curve (32/48/66 bytes for P-256/384/521, spec.md §4.5).
    pub fn coordinate_len(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    fn group(&self) -> anyhow::Result<EcGroup> {
        Ok(EcGroup::from_curve_name(self.nid())?)
    }
}

/// An EC key, materialized either public-only or with its private scalar.
pub enum EcKeyMaterial {
    Public(EcKey<Public>),
    Private(EcKey<Private>),
}

impl EcKeyMaterial {
    /// `load_ec(jwk, need_private)` (spec.md §4.3).
    pub fn load(jwk: &Jwk, need_private: bool) -> Result<(Self, EcCurve), JoseError> {
        (|| -> anyhow::Result<(Self, EcCurve)> {
            match jwk.key_type() {
                "EC" => {}
                other => bail!("A parameter kty must be EC: {}", other),
            }

            let crv = match jwk.parameter("crv") {
                Some(Value::String(val)) => val.as_str(),
                Some(_) => bail!("A parameter crv must be a string."),
                None => bail!("A parameter crv is required."),
            };
            let curve = EcCurve::from_jwk_name(crv)
                .ok_or_else(|| anyhow::anyhow!("Unknown curve: {}", crv))?;
            let group = curve.group()?;
            let mut ctx = BigNumContext::new()?;

            let xy = match (decode_param_opt(jwk, "x")?, decode_param_opt(jwk, "y")?) {
                (Some(x), Some(y)) => Some((x, y)),
                (None, None) => None,
                _ => bail!("EC JWK must supply both x and y, or neither."),
            };

            if !need_private {
                let (x, y) = xy.ok_or_else(|| anyhow::anyhow!("A parameter x and y are required."))?;
                let mut point = EcPoint::new(&group)?;
                point.set_affine_coordinates_gfp(&group, &big_num(&x)?, &big_num(&y)?, &mut ctx)?;
                let key = EcKey::from_public_key(&group, &point)?;
                return Ok((Self::Public(key), curve));
            }

            let d = decode_param(jwk, "d")?;
            let d_bn = big_num(&d)?;

            let point = match xy {
                Some((x, y)) => {
                    let mut point = EcPoint::new(&group)?;
                    point.set_affine_coordinates_gfp(&group, &big_num(&x)?, &big_num(&y)?, &mut ctx)?;
                    point
                }
                // spec.md §4.3: recompute the public point from d·G when absent.
                None => {
                    let mut point = EcPoint::new(&group)?;
                    point.mul_generator(&group, &d_bn, &ctx)?;
                    point
                }
            };

            let key = EcKey::from_private_components(&group, &d_bn, &point)?;
            Ok((Self::Private(key), curve))
        })()
        .map_err(JoseError::InvalidKeyFormat)
    }
}
