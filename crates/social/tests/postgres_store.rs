//! Integration tests for the Postgres document store and identity provider.
//!
//! These tests need a reachable PostgreSQL database:
//!
//! Run with: `DATABASE_URL=postgres://... cargo nextest run -p social postgres`
//!
//! Every test writes under a unique collection name or login, so they can
//! safely run against a development database.

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use uuid::Uuid;

use social::database::{PgDocumentStore, PgIdentity, ensure_schema};
use social::{DocKey, Document, DocumentStore, IdentityError, IdentityService, NewPrincipal, StoreError};

/// Get database pool, skipping tests if DATABASE_URL is not set.
async fn get_test_pool() -> Option<PgPool> {
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    match PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
    {
        Ok(pool) => {
            ensure_schema(&pool).await.expect("Failed to create schema");
            Some(pool)
        }
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            None
        }
    }
}

async fn cleanup_collection(pool: &PgPool, collection: &str) {
    let _ = sqlx::query("DELETE FROM documents WHERE collection = $1")
        .bind(collection)
        .execute(pool)
        .await;
}

#[tokio::test]
async fn test_put_stamps_and_increments() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let store = PgDocumentStore::new(pool.clone());
    let collection = format!("posts_{}", Uuid::new_v4().simple());

    let id = store
        .put(
            &collection,
            DocKey::Auto,
            Document::new()
                .set("content", "hello")
                .set("commentCount", 0)
                .server_timestamp("createdAt"),
        )
        .await
        .expect("put failed");

    store
        .increment(&collection, &id, "commentCount", 1)
        .await
        .expect("increment failed");
    store
        .increment(&collection, &id, "commentCount", 1)
        .await
        .expect("increment failed");

    let row: (i64, bool) = sqlx::query_as(
        r#"
        SELECT (data ->> 'commentCount')::bigint, data ? 'createdAt'
        FROM documents WHERE collection = $1 AND id = $2
        "#,
    )
    .bind(&collection)
    .bind(&id)
    .fetch_one(&pool)
    .await
    .expect("document missing");

    assert_eq!(row.0, 2);
    assert!(row.1, "createdAt should be set by the store");

    cleanup_collection(&pool, &collection).await;
}

#[tokio::test]
async fn test_named_put_is_idempotent_and_missing_increment_fails() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let store = PgDocumentStore::new(pool.clone());
    let collection = format!("likes_{}", Uuid::new_v4().simple());

    for _ in 0..2 {
        store
            .put(&collection, DocKey::named("u1_p1"), Document::new().set("userId", "u1"))
            .await
            .expect("put failed");
    }

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = $1")
        .bind(&collection)
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(count.0, 1);

    let err = store
        .increment(&collection, "missing", "commentCount", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    cleanup_collection(&pool, &collection).await;
}

#[tokio::test]
async fn test_duplicate_login_rejected() {
    let Some(pool) = get_test_pool().await else {
        return;
    };
    let identity = PgIdentity::new(pool.clone());
    let login_id = format!("test-{}@example.com", Uuid::new_v4());

    let request = NewPrincipal {
        login_id: login_id.clone(),
        secret: "password123".to_string(),
        display_name: "Test User".to_string(),
        disabled: false,
    };

    identity
        .create_principal(request.clone())
        .await
        .expect("first principal should succeed");
    let err = identity.create_principal(request).await.unwrap_err();
    assert!(matches!(err, IdentityError::DuplicateLogin(_)));

    let _ = sqlx::query("DELETE FROM principals WHERE login_id = $1")
        .bind(&login_id)
        .execute(&pool)
        .await;
}
