//! Authentication principal contract.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::IdentityError;

/// Request to create an authentication principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrincipal {
    pub login_id: String,
    pub secret: String,
    pub display_name: String,
    pub disabled: bool,
}

/// Principal created by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub login_id: String,
    pub display_name: String,
    pub disabled: bool,
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Creates a principal. Fails with [`IdentityError::DuplicateLogin`]
    /// when the login id is already taken.
    async fn create_principal(&self, request: NewPrincipal) -> Result<Principal, IdentityError>;
}

pub fn hash_secret(secret: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| IdentityError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}


#[derive(Debug, Default)]
struct State {
    by_login: HashMap<String, Principal>,
    reject_remaining: usize,
}

/// Identity provider backed by an in-process map.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    state: Mutex<State>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider where the given logins are already registered.
    pub fn with_existing_logins<I, S>(logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let by_login = logins
            .into_iter()
            .map(|login| {
                let login_id = login.into();
                let principal = Principal {
                    id: Uuid::new_v4().simple().to_string(),
                    login_id: login_id.clone(),
                    display_name: String::new(),
                    disabled: false,
                };
                (login_id, principal)
            })
            .collect();

        Self {
            state: Mutex::new(State {
                by_login,
                reject_remaining: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next `times` requests fail as a provider rejection.
    pub fn reject_next(&self, times: usize) {
        self.state().reject_remaining += times;
    }

    pub fn principal(&self, login_id: &str) -> Option<Principal> {
        self.state().by_login.get(login_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().by_login.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityService for MemoryIdentity {
    async fn create_principal(&self, request: NewPrincipal) -> Result<Principal, IdentityError> {
        let mut state = self.state();

        if state.reject_remaining > 0 {
            state.reject_remaining -= 1;
            return Err(IdentityError::Rejected(format!(
                "transient failure for {}",
                request.login_id
            )));
        }

        if state.by_login.contains_key(&request.login_id) {
            return Err(IdentityError::DuplicateLogin(request.login_id));
        }

        let principal = Principal {
            id: Uuid::new_v4().simple().to_string(),
            login_id: request.login_id.clone(),
            display_name: request.display_name,
            disabled: request.disabled,
        };
        state.by_login.insert(request.login_id, principal.clone());

        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(login: &str) -> NewPrincipal {
        NewPrincipal {
            login_id: login.to_string(),
            secret: "password123".to_string(),
            display_name: "Test".to_string(),
            disabled: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_reject_duplicate() {
        let identity = MemoryIdentity::new();

        let first = identity.create_principal(request("a@example.com")).await.unwrap();
        assert_eq!(first.login_id, "a@example.com");
        assert!(!first.disabled);

        let err = identity
            .create_principal(request("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::DuplicateLogin(ref l) if l == "a@example.com"));
        assert_eq!(identity.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_logins_and_rejections() {
        let identity = MemoryIdentity::with_existing_logins(["taken@example.com"]);
        identity.reject_next(1);

        assert!(matches!(
            identity.create_principal(request("new@example.com")).await,
            Err(IdentityError::Rejected(_))
        ));
        assert!(matches!(
            identity.create_principal(request("taken@example.com")).await,
            Err(IdentityError::DuplicateLogin(_))
        ));
        assert!(identity.create_principal(request("new@example.com")).await.is_ok());
        assert!(identity.principal("new@example.com").is_some());
    }

    #[test]
    fn test_hash_secret_is_salted() {
        use argon2::{PasswordHash, PasswordVerifier};

        let first = hash_secret("password123").unwrap();
        let second = hash_secret("password123").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));

        let parsed = PasswordHash::new(&first).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"password123", &parsed)
                .is_ok()
        );
    }
}
