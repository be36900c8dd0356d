use thiserror::Error;

/// Credential failures, split so the caller can tell "wrong password" and
/// "bad token" apart from machinery breakage without parsing messages.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password does not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Access token is malformed, forged, from another issuer, or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Hashing or signing machinery failed.
    #[error("credential processing failed: {0}")]
    Internal(String),
}
