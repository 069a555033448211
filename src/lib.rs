//! Create, serialize, sign, and verify JSON Web Tokens in JWS Compact
//! Serialization form, with keys supplied as JSON Web Keys.
//!
//! Supported algorithms: HS256/384/512, RS256/384/512, ES256/384/512.
//! `none` is recognized only as an import-time parse state, never as a
//! sign target. JWE, key generation, JWKS discovery, and claim semantic
//! validation (`exp`/`nbf`/`iss`/`aud`) are out of scope; see `Jwt` for
//! the full public contract.
//!
//! ```
//! use jose_compact::{Algorithm, Jwk, Jwt};
//! use serde_json::Value;
//!
//! let mut jwk = Jwk::new("oct");
//! jwk.set_parameter("k", Some(Value::String(
//!     base64::encode_config(b"a-sufficiently-long-shared-secret-key", base64::URL_SAFE_NO_PAD),
//! ))).unwrap();
//!
//! let mut jwt = Jwt::new(None);
//! jwt.set_claim_string("sub", "1234567890");
//! jwt.sign(Algorithm::Hs256, &jwk).unwrap();
//!
//! let compact = jwt.export_string().unwrap();
//! let imported = jose_compact::Jwt::import_string(&compact).unwrap();
//! assert!(imported.has_valid_signature(&jwk));
//! ```

pub mod error;
pub mod header;
pub mod jwk;
pub mod jws;
pub mod jwt;

mod util;

pub use error::JoseError;
pub use header::JoseHeader;
pub use jwk::Jwk;
pub use jws::Algorithm;
pub use jwt::Jwt;
