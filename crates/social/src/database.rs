//! Postgres-backed document store and identity provider.
//!
//! Documents live in a single JSONB table keyed by `(collection, id)`.
//! Principals live in their own table with argon2-hashed secrets.

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::errors::{IdentityError, StoreError};
use crate::identity::{IdentityService, NewPrincipal, Principal, hash_secret};
use crate::store::{DocKey, Document, DocumentStore};

/// Creates the `documents` and `principals` tables if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data JSONB NOT NULL,
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS principals (
            id UUID PRIMARY KEY,
            login_id TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            secret_hash TEXT NOT NULL,
            disabled BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Document schema ready");
    Ok(())
}

#[derive(Clone, Debug)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn put(
        &self,
        collection: &str,
        key: DocKey,
        document: Document,
    ) -> Result<String, StoreError> {
        let id = key.resolve_with(|| Uuid::new_v4().simple().to_string());
        let data = serde_json::Value::Object(document.values()).to_string();
        let stamped: Vec<String> = document
            .server_timestamp_fields()
            .into_iter()
            .map(str::to_string)
            .collect();

        // Server timestamps are merged in from NOW() so they reflect write time.
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3::jsonb || (
                SELECT COALESCE(jsonb_object_agg(field, to_jsonb(NOW())), '{}'::jsonb)
                FROM unnest($4::text[]) AS field
            ))
            ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(data)
        .bind(stamped)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = jsonb_set(
                data,
                ARRAY[$3::text],
                to_jsonb(COALESCE((data ->> $3::text)::bigint, 0) + $4)
            )
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct PgIdentity {
    pool: PgPool,
}

impl PgIdentity {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityService for PgIdentity {
    async fn create_principal(&self, request: NewPrincipal) -> Result<Principal, IdentityError> {
        let id = Uuid::new_v4();
        let secret_hash = hash_secret(&request.secret)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO principals (id, login_id, display_name, secret_hash, disabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(&request.login_id)
        .bind(&request.display_name)
        .bind(&secret_hash)
        .bind(request.disabled)
        .bind(OffsetDateTime::now_utc())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(Principal {
                id: id.to_string(),
                login_id: request.login_id,
                display_name: request.display_name,
                disabled: request.disabled,
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(IdentityError::DuplicateLogin(request.login_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
