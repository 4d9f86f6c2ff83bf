//! Firebase-style ID tokens signed with the test RSA key, plus a JWKS mock.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

pub const TEST_PROJECT: &str = "stylist-test";
pub const TEST_KID: &str = "test-key-1";
const TEST_PRIVATE_KEY: &str = include_str!("../../src/auth/testdata/session_test_key.pem");
const TEST_JWKS: &str = include_str!("../../src/auth/testdata/session_test_jwks.json");

pub fn id_token(project: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": "firebase-user-1",
        "email": "shopper@example.com",
        "aud": project,
        "iss": format!("https://securetoken.google.com/{}", project),
        "iat": now,
        "exp": now + 600,
    });

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY.as_bytes()).expect("Invalid test key");
    encode(&header, &claims, &key).expect("Failed to sign test token")
}

/// Serve the test JWKS at `/jwks`; returns the mock so it outlives the test body.
pub async fn mock_jwks(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/jwks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TEST_JWKS)
        .create_async()
        .await
}
