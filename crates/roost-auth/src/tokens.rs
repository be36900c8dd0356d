use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

const ISSUER: &str = "roost";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issue a signed access token for `user_id`, valid for `expires_in`.
/// The signing secret is process-wide configuration.
pub fn make_jwt(user_id: u64, secret: &str, expires_in: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        iss: ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| AuthError::Internal(err.to_string()))
}

/// Validate an access token and return the user ID it was issued to.
/// Checks signature, issuer, and expiry with zero leeway, so a token stops
/// validating at its expiry instant rather than some seconds later.
pub fn validate_jwt(token: &str, secret: &str) -> Result<u64, AuthError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthError::InvalidToken)?;

    data.claims
        .sub
        .parse::<u64>()
        .map_err(|_| AuthError::InvalidToken)
}

/// Mint an opaque refresh token: 256 bits from the OS RNG, hex-encoded.
/// There is nothing to verify in its structure; its secrecy is the whole
/// security property.
pub fn make_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
