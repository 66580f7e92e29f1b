//! In-memory implementation of every repository trait.
//!
//! Single-process only. Mirrors the PostgreSQL schema semantics that the
//! handlers rely on: unique emails and cascade deletes on reset.

use super::{ChirpRepository, RefreshTokenRepository, UserRepository};
use crate::{
    auth::RefreshRecord,
    error::AppError,
    models::{
        chirp::{Chirp, SortOrder},
        user::{User, UserCredential},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

struct StoredUser {
    user: User,
    hashed_password: String,
}

struct StoredChirp {
    seq: u64,
    chirp: Chirp,
}

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, StoredUser>,
    emails: DashMap<String, Uuid>,
    refresh_tokens: DashMap<String, RefreshRecord>,
    chirps: DashMap<Uuid, StoredChirp>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let id = Uuid::new_v4();
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(_) => return Err(AppError::Conflict("email already exists".into())),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let now = Utc::now();
        let user = User {
            id,
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            is_chirpy_red: false,
        };
        self.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                hashed_password: hashed_password.to_string(),
            },
        );

        Ok(user)
    }

    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredential>, AppError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        Ok(self.users.get(&id).map(|stored| UserCredential {
            id,
            hashed_password: stored.hashed_password.clone(),
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, AppError> {
        let Some(old_email) = self.users.get(&id).map(|stored| stored.user.email.clone()) else {
            return Ok(None);
        };

        if old_email != email {
            match self.emails.entry(email.to_string()) {
                Entry::Occupied(_) => {
                    return Err(AppError::Conflict("email already exists".into()))
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.emails.remove(&old_email);
        }

        Ok(self.users.get_mut(&id).map(|mut stored| {
            stored.user.email = email.to_string();
            stored.user.updated_at = Utc::now();
            stored.hashed_password = hashed_password.to_string();
            stored.user.clone()
        }))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .users
            .get_mut(&id)
            .map(|mut stored| {
                stored.user.is_chirpy_red = true;
                stored.user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let count = self.users.len() as u64;
        self.users.clear();
        self.emails.clear();
        self.refresh_tokens.clear();
        self.chirps.clear();
        Ok(count)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn store(&self, record: &RefreshRecord) -> Result<(), AppError> {
        self.refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<RefreshRecord>, AppError> {
        Ok(self
            .refresh_tokens
            .get(token_hash)
            .map(|record| record.value().clone()))
    }

    async fn mark_revoked(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        Ok(self
            .refresh_tokens
            .get_mut(token_hash)
            .map(|mut record| {
                record.revoked_at.get_or_insert(at);
                record.updated_at = at;
            })
            .is_some())
    }
}

#[async_trait]
impl ChirpRepository for MemoryStore {
    async fn create(&self, body: &str, user_id: Uuid) -> Result<Chirp, AppError> {
        if !self.users.contains_key(&user_id) {
            return Err(AppError::not_found("user"));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.chirps.insert(
            chirp.id,
            StoredChirp {
                seq,
                chirp: chirp.clone(),
            },
        );

        Ok(chirp)
    }

    async fn list(
        &self,
        author_id: Option<Uuid>,
        sort: SortOrder,
    ) -> Result<Vec<Chirp>, AppError> {
        let mut chirps: Vec<(DateTime<Utc>, u64, Chirp)> = self
            .chirps
            .iter()
            .filter(|entry| author_id.map_or(true, |author| entry.chirp.user_id == author))
            .map(|entry| (entry.chirp.created_at, entry.seq, entry.chirp.clone()))
            .collect();

        chirps.sort_by_key(|(created_at, seq, _)| (*created_at, *seq));
        if sort == SortOrder::Desc {
            chirps.reverse();
        }

        Ok(chirps.into_iter().map(|(_, _, chirp)| chirp).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Chirp>, AppError> {
        Ok(self.chirps.get(&id).map(|entry| entry.chirp.clone()))
    }

    async fn find_owner(&self, id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(self.chirps.get(&id).map(|entry| entry.chirp.user_id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.chirps.remove(&id).is_some())
    }
}
