use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::models::{Chirp, RefreshToken, User};
use crate::Database;

impl Database {
    // -- Chirps --

    /// IDs are 1 + the highest existing ID, so they stay unique and strictly
    /// increasing even after deletes.
    pub fn create_chirp(&self, body: &str, author_id: u64) -> Result<Chirp, DbError> {
        self.with_snapshot_mut(|snapshot| {
            let id = snapshot.chirps.keys().next_back().copied().unwrap_or(0) + 1;
            let chirp = Chirp {
                id,
                body: body.to_string(),
                author_id,
            };
            snapshot.chirps.insert(id, chirp.clone());
            Ok(chirp)
        })
    }

    pub fn get_chirp(&self, id: u64) -> Result<Chirp, DbError> {
        self.with_snapshot(|snapshot| {
            snapshot
                .chirps
                .get(&id)
                .cloned()
                .ok_or(DbError::NotFound("chirp"))
        })
    }

    /// All chirps, sorted ascending by ID at this boundary rather than by
    /// whatever order the backing map iterates in.
    pub fn chirps(&self) -> Result<Vec<Chirp>, DbError> {
        self.with_snapshot(|snapshot| {
            let mut chirps: Vec<Chirp> = snapshot.chirps.values().cloned().collect();
            chirps.sort_by_key(|chirp| chirp.id);
            Ok(chirps)
        })
    }

    /// Only the author may delete a chirp.
    pub fn delete_chirp(&self, id: u64, requesting_user: u64) -> Result<(), DbError> {
        self.with_snapshot_mut(|snapshot| {
            let chirp = snapshot.chirps.get(&id).ok_or(DbError::NotFound("chirp"))?;
            if chirp.author_id != requesting_user {
                return Err(DbError::Forbidden {
                    user: requesting_user,
                    chirp: id,
                });
            }
            snapshot.chirps.remove(&id);
            Ok(())
        })
    }

    // -- Users --

    pub fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DbError> {
        self.with_snapshot_mut(|snapshot| {
            if snapshot.users.values().any(|user| user.email == email) {
                return Err(DbError::AlreadyExists("user"));
            }
            let id = snapshot.users.keys().next_back().copied().unwrap_or(0) + 1;
            let user = User {
                id,
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            };
            snapshot.users.insert(id, user.clone());
            Ok(user)
        })
    }

    pub fn update_user(
        &self,
        id: u64,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, DbError> {
        self.with_snapshot_mut(|snapshot| {
            let user = snapshot
                .users
                .get_mut(&id)
                .ok_or(DbError::NotFound("user"))?;
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            Ok(user.clone())
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<User, DbError> {
        self.with_snapshot(|snapshot| {
            snapshot
                .users
                .values()
                .find(|user| user.email == email)
                .cloned()
                .ok_or(DbError::NotFound("user"))
        })
    }

    // -- Refresh tokens --

    pub fn save_refresh_token(
        &self,
        user_id: u64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.with_snapshot_mut(|snapshot| {
            snapshot
                .refresh_tokens
                .insert(token.to_string(), RefreshToken { user_id, expires_at });
            Ok(())
        })
    }

    /// Resolve a refresh token to its owner. Unknown and expired tokens are
    /// indistinguishable to the caller. Redemption does not consume the
    /// token; it stays valid until it expires or is revoked.
    pub fn user_for_refresh_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<User, DbError> {
        self.with_snapshot(|snapshot| {
            let record = snapshot
                .refresh_tokens
                .get(token)
                .ok_or(DbError::NotFound("refresh token"))?;
            if now >= record.expires_at {
                return Err(DbError::NotFound("refresh token"));
            }
            snapshot
                .users
                .get(&record.user_id)
                .cloned()
                .ok_or(DbError::NotFound("user"))
        })
    }

    pub fn revoke_refresh_token(&self, token: &str) -> Result<(), DbError> {
        self.with_snapshot_mut(|snapshot| {
            snapshot
                .refresh_tokens
                .remove(token)
                .map(|_| ())
                .ok_or(DbError::NotFound("refresh token"))
        })
    }
}
