//! Records persisted in the snapshot file. Distinct from the roost-types API
//! models so the hashed password stays inside the store layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: u64,
    pub body: String,
    pub author_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub hashed_password: String,
}

/// Server-side record of an opaque refresh token. The token string itself is
/// the lookup key; the record only carries ownership and expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub user_id: u64,
    pub expires_at: DateTime<Utc>,
}

/// The whole persisted state, written and replaced as one unit.
///
/// Every mapping defaults when absent so a file written before a field
/// existed still loads.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub chirps: BTreeMap<u64, Chirp>,
    #[serde(default)]
    pub users: BTreeMap<u64, User>,
    #[serde(default)]
    pub refresh_tokens: BTreeMap<String, RefreshToken>,
}
