use thiserror::Error;

/// The closed set of failures a store operation can surface.
///
/// Callers branch on the variant, never on message text, so the HTTP
/// boundary can map each kind to a status code deterministically.
#[derive(Debug, Error)]
pub enum DbError {
    /// The named entity is absent from the snapshot.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness rule was violated (duplicate email).
    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    /// The caller is authenticated but does not own the entity.
    #[error("user {user} does not own chirp {chirp}")]
    Forbidden { user: u64, chirp: u64 },

    /// The snapshot file could not be read or replaced.
    #[error("snapshot io failure: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file exists but does not parse.
    #[error("snapshot corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A previous holder of the store lock panicked.
    #[error("store lock poisoned")]
    LockPoisoned,
}
