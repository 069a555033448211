use thiserror::Error;

/// The error type returned by every fallible operation in this crate.
///
/// Matches the teacher's pattern of a single closed error enum: internal
/// helpers build up an `anyhow::Error` (so they can use `?` freely across
/// heterogeneous sources) and map it into one of these variants at the
/// public boundary.
#[derive(Error, Debug)]
pub enum JoseError {
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedSignatureAlgorithm(#[source] anyhow::Error),

    #[error("Invalid JWT format: {0}")]
    InvalidJwtFormat(#[source] anyhow::Error),

    #[error("Invalid JWK format: {0}")]
    InvalidJwkFormat(#[source] anyhow::Error),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(#[source] anyhow::Error),

    #[error("Invalid json: {0}")]
    InvalidJson(#[source] anyhow::Error),

    #[error("Invalid claim: {0}")]
    InvalidClaim(#[source] anyhow::Error),

    #[error("Invalid signature: {0}")]
    InvalidSignature(#[source] anyhow::Error),

    #[error(transparent)]
    OpensslError(#[from] openssl::error::ErrorStack),

    #[error(transparent)]
    DecodeError(#[from] base64::DecodeError),

    #[error("Generic error occured: {0}")]
    Generic(String),
}
