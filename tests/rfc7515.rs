//! RFC 7515 Appendix A.1 HS256 vector (spec.md §8 scenario S1).
//!
//! The reference compact form is imported rather than re-signed from
//! scratch: its header text carries A.1's literal whitespace and member
//! order, which `serde_json`'s own serializer would not reproduce on a
//! fresh `sign()`. Importing exercises the property this scenario is
//! really about — verification rehashes the exact bytes that were signed,
//! not a re-serialization of the parsed tree (Invariant I-2).

use jose_compact::{Jwk, Jwt};
use serde_json::Value;

const RFC7515_A1_KEY: [u8; 64] = [
    3, 35, 53, 75, 43, 15, 165, 188, 131, 126, 6, 101, 119, 123, 166, 143, 90, 179, 40, 230, 240,
    84, 201, 40, 169, 15, 132, 178, 210, 80, 46, 191, 211, 251, 90, 146, 210, 6, 71, 239, 150,
    138, 180, 195, 119, 98, 61, 34, 61, 46, 33, 114, 5, 46, 79, 8, 192, 205, 154, 245, 103, 208,
    128, 163,
];

const RFC7515_A1_COMPACT: &str = "eyJ0eXAiOiJKV1QiLA0KICJhbGciOiJIUzI1NiJ9.\
eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAsDQogImh0dHA6Ly9leGFtcGxlLmNvbS9pc19yb290Ijp0cnVlfQ.\
dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

fn a1_key_jwk() -> Jwk {
    let mut jwk = Jwk::new("oct");
    jwk.set_parameter(
        "k",
        Some(Value::String(base64::encode_config(
            RFC7515_A1_KEY,
            base64::URL_SAFE_NO_PAD,
        ))),
    )
    .unwrap();
    jwk
}

#[test]
fn imported_a1_vector_verifies() {
    let jwk = a1_key_jwk();
    let jwt = Jwt::import_string(RFC7515_A1_COMPACT).expect("A.1 vector must parse");

    assert_eq!(jwt.get_claim_string("iss"), Some("joe"));
    assert_eq!(jwt.get_claim_number("exp"), Some(1300819380.0));
    assert_eq!(
        jwt.get_claim_value("http://example.com/is_root"),
        Some(&Value::Bool(true))
    );

    assert!(jwt.has_valid_signature(&jwk));
}

#[test]
fn a1_vector_round_trips_byte_for_byte() {
    let jwt = Jwt::import_string(RFC7515_A1_COMPACT).expect("A.1 vector must parse");
    assert_eq!(jwt.export_string().unwrap(), RFC7515_A1_COMPACT);
}

#[test]
fn flipping_a_claims_byte_breaks_verification() {
    // Byte index 3 of the claims segment ('p' -> 'D') still decodes to
    // valid UTF-8 and a valid JSON object (the `"iss"` key becomes
    // `"Css"`), so the parse succeeds and verification is what must
    // catch the tamper (spec.md §8 scenario S4).
    let jwk = a1_key_jwk();
    let mut segments: Vec<&str> = RFC7515_A1_COMPACT.split('.').collect();
    let mut claims_segment = segments[1].to_string();
    claims_segment.replace_range(3..4, "D");
    segments[1] = &claims_segment;
    let tampered = segments.join(".");

    let jwt = Jwt::import_string(&tampered).expect("still well-formed base64url/JSON");
    assert_eq!(jwt.get_claim_value("Css"), Some(&Value::String("joe".to_string())));
    assert!(!jwt.has_valid_signature(&jwk));
}
