use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::auth::password::{Hasher, PasswordError};
use crate::database::models::{User, UserProfile};
use crate::validation::{as_object, ValidationError};

pub const MIN_PASSWORD_LENGTH: usize = 6;

const USERNAME_REQUIRED: &str = "Username is required.";
const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters.";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Username already exists.")]
    DuplicateUsername,

    /// Deliberately the same for unknown users and wrong passwords
    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Username/password pair taken from a request body
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks shape only: both fields present and strings, username non-empty.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let payload = as_object(payload)?;

        let username = match payload.get("username") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(ValidationError::field("username", USERNAME_REQUIRED)),
        };
        let password = match payload.get("password") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err(ValidationError::field("password", PASSWORD_TOO_SHORT)),
        };

        Ok(Self { username, password })
    }
}

struct UserTable {
    next_id: u64,
    users: BTreeMap<u64, User>,
    by_username: HashMap<String, u64>,
}

impl UserTable {
    fn find(&self, username: &str) -> Option<&User> {
        self.by_username
            .get(username)
            .and_then(|id| self.users.get(id))
    }
}

/// Registered accounts, held in memory for the life of the process
pub struct CredentialStore {
    table: RwLock<UserTable>,
    hasher: Hasher,
    /// Verified against when the username is unknown, so both failure paths
    /// cost one hash verification.
    dummy_hash: String,
}

impl CredentialStore {
    pub fn new(hasher: Hasher) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash_blocking("pinbox-unknown-user")?;
        Ok(Self {
            table: RwLock::new(UserTable {
                next_id: 1,
                users: BTreeMap::new(),
                by_username: HashMap::new(),
            }),
            hasher,
            dummy_hash,
        })
    }

    pub async fn register(&self, credentials: Credentials) -> Result<UserProfile, CredentialError> {
        let Credentials { username, password } = credentials;

        if username.is_empty() {
            return Err(ValidationError::field("username", USERNAME_REQUIRED).into());
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::field("password", PASSWORD_TOO_SHORT).into());
        }

        if self.table.read().await.by_username.contains_key(&username) {
            tracing::debug!("Registration rejected, username {} taken", username);
            return Err(CredentialError::DuplicateUsername);
        }

        let password_hash = self.hasher.hash(password).await?;

        // Re-check: another registration may have claimed the name while hashing
        let mut table = self.table.write().await;
        if table.by_username.contains_key(&username) {
            return Err(CredentialError::DuplicateUsername);
        }

        let id = table.next_id;
        table.next_id += 1;
        let user = User {
            id,
            username: username.clone(),
            password_hash,
        };
        let profile = UserProfile::from(&user);
        table.by_username.insert(username, id);
        table.users.insert(id, user);

        tracing::info!("Registered user {} (id {})", profile.username, profile.id);
        Ok(profile)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let user = self.table.read().await.find(username).cloned();

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let valid = self.hasher.verify(password.to_string(), hash).await?;

        match user {
            Some(user) if valid => {
                tracing::info!("User {} logged in", user.username);
                Ok(user)
            }
            _ => {
                tracing::debug!("Failed login attempt for {}", username);
                Err(CredentialError::InvalidCredentials)
            }
        }
    }
}
