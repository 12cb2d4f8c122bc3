//! Backend selection and connection.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, bail};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use social::database::{PgDocumentStore, PgIdentity, ensure_schema};
use social::{DocumentStore, IdentityService, MemoryIdentity, MemoryStore};

use crate::api::{FirebaseAuth, FirebaseClient, FirestoreStore};

/// The collaborators a run writes through.
#[derive(Clone)]
pub struct SeedServices {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityService>,
}

impl SeedServices {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityService>) -> Self {
        Self { store, identity }
    }

    /// Fresh in-process store and identity service.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryIdentity::new()))
    }
}

/// Where seeded records go.
#[derive(Clone, PartialEq, Eq)]
pub enum Backend {
    /// In-process store, discarded at exit.
    Memory,
    Postgres {
        database_url: String,
    },
    Firebase {
        project_id: String,
        access_token: String,
    },
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Memory => f.write_str("Memory"),
            Backend::Postgres { .. } => f.write_str("Postgres"),
            Backend::Firebase { project_id, .. } => f
                .debug_struct("Firebase")
                .field("project_id", project_id)
                .finish_non_exhaustive(),
        }
    }
}

impl Backend {
    /// Reads the backend from `SEED_BACKEND` and its credentials.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let kind = lookup("SEED_BACKEND").unwrap_or_else(|| "memory".to_string());

        match kind.to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "postgres" => Ok(Backend::Postgres {
                database_url: lookup("DATABASE_URL")
                    .context("DATABASE_URL must be set for the postgres backend")?,
            }),
            "firebase" => Ok(Backend::Firebase {
                project_id: lookup("FIREBASE_PROJECT_ID")
                    .context("FIREBASE_PROJECT_ID must be set for the firebase backend")?,
                access_token: lookup("FIREBASE_ACCESS_TOKEN")
                    .context("FIREBASE_ACCESS_TOKEN must be set for the firebase backend")?,
            }),
            other => bail!("Unknown SEED_BACKEND '{other}' (expected memory, postgres, or firebase)"),
        }
    }

    /// Connects to the backend. Postgres tables are created if missing.
    pub async fn connect(&self) -> anyhow::Result<SeedServices> {
        match self {
            Backend::Memory => {
                info!("Using in-memory backend");
                Ok(SeedServices::in_memory())
            }
            Backend::Postgres { database_url } => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(database_url)
                    .await
                    .context("Failed to connect to database")?;
                ensure_schema(&pool)
                    .await
                    .context("Failed to create seed tables")?;
                info!("Connected to database");

                Ok(SeedServices::new(
                    Arc::new(PgDocumentStore::new(pool.clone())),
                    Arc::new(PgIdentity::new(pool)),
                ))
            }
            Backend::Firebase {
                project_id,
                access_token,
            } => {
                let client = FirebaseClient::new(project_id, access_token);
                info!(project_id = %project_id, "Using Firebase backend");

                Ok(SeedServices::new(
                    Arc::new(FirestoreStore::new(client.clone())),
                    Arc::new(FirebaseAuth::new(client)),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_memory() {
        assert_eq!(Backend::from_lookup(lookup(&[])).unwrap(), Backend::Memory);
    }

    #[test]
    fn test_postgres_requires_url() {
        assert!(Backend::from_lookup(lookup(&[("SEED_BACKEND", "postgres")])).is_err());

        let backend = Backend::from_lookup(lookup(&[
            ("SEED_BACKEND", "Postgres"),
            ("DATABASE_URL", "postgres://localhost/green"),
        ]))
        .unwrap();
        assert_eq!(
            backend,
            Backend::Postgres {
                database_url: "postgres://localhost/green".into()
            }
        );
    }

    #[test]
    fn test_firebase_requires_credentials() {
        let missing_token = Backend::from_lookup(lookup(&[
            ("SEED_BACKEND", "firebase"),
            ("FIREBASE_PROJECT_ID", "green-app"),
        ]));
        assert!(missing_token.is_err());

        let backend = Backend::from_lookup(lookup(&[
            ("SEED_BACKEND", "firebase"),
            ("FIREBASE_PROJECT_ID", "green-app"),
            ("FIREBASE_ACCESS_TOKEN", "secret-token"),
        ]))
        .unwrap();
        assert!(!format!("{backend:?}").contains("secret-token"));
    }

    #[test]
    fn test_unknown_backend() {
        let err = Backend::from_lookup(lookup(&[("SEED_BACKEND", "mongo")])).unwrap_err();
        assert!(err.to_string().contains("mongo"));
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let services = Backend::Memory.connect().await.unwrap();
        let id = services
            .store
            .put("users", social::DocKey::Auto, social::Document::new())
            .await
            .unwrap();
        assert!(!id.is_empty());
    }
}
