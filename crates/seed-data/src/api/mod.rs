//! Firebase REST backends.
//!
//! Writes documents through the Firestore `documents:commit` endpoint and
//! creates principals through the Identity Toolkit admin endpoint, both
//! authenticated with an OAuth2 bearer token.

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;

use social::{
    DocKey, Document, DocumentStore, IdentityError, IdentityService, NewPrincipal, Principal,
    StoreError,
};

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Length of client-generated document ids.
const AUTO_ID_LEN: usize = 20;

/// Identity Toolkit error codes for an email that is already registered.
const DUPLICATE_CODES: [&str; 2] = ["EMAIL_EXISTS", "DUPLICATE_EMAIL"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Shared HTTP client and credentials for one Firebase project.
#[derive(Clone)]
pub struct FirebaseClient {
    http: Client,
    project_id: String,
    access_token: String,
    firestore_base: String,
    identity_base: String,
}

impl FirebaseClient {
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            project_id: project_id.into(),
            access_token: access_token.into(),
            firestore_base: FIRESTORE_BASE_URL.to_string(),
            identity_base: IDENTITY_BASE_URL.to_string(),
        }
    }

    /// Points the client at other endpoints, e.g. the local emulators.
    pub fn with_base_urls(
        mut self,
        firestore_base: impl Into<String>,
        identity_base: impl Into<String>,
    ) -> Self {
        self.firestore_base = firestore_base.into();
        self.identity_base = identity_base.into();
        self
    }

    /// Resource name of the default database's document root.
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_root())
    }

    /// Commits a batch of writes atomically.
    async fn commit(&self, writes: Vec<Value>) -> Result<(), ApiError> {
        let url = format!("{}/{}:commit", self.firestore_base, self.documents_root());
        self.post(&url, &json!({ "writes": writes })).await?;
        Ok(())
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Rejected { status, body })
    }
}

/// Encodes a JSON value in Firestore's typed value format.
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}

fn to_firestore_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect()
}

/// Builds the write for a whole-document put.
///
/// Server timestamp fields become `REQUEST_TIME` transforms applied in the
/// same write.
pub fn put_write(name: &str, document: &Document) -> Value {
    let transforms: Vec<Value> = document
        .server_timestamp_fields()
        .into_iter()
        .map(|field| json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }))
        .collect();

    let mut write = json!({
        "update": { "name": name, "fields": to_firestore_fields(&document.values()) },
    });
    if !transforms.is_empty() {
        write["updateTransforms"] = Value::Array(transforms);
    }
    write
}

/// Builds the write for a numeric increment on an existing document.
pub fn increment_write(name: &str, field: &str, by: i64) -> Value {
    json!({
        "transform": {
            "document": name,
            "fieldTransforms": [
                { "fieldPath": field, "increment": { "integerValue": by.to_string() } }
            ],
        },
        "currentDocument": { "exists": true },
    })
}

/// Random alphanumeric id in the style of Firestore client ids.
pub fn auto_id(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

/// Document store backed by Cloud Firestore.
pub struct FirestoreStore {
    client: FirebaseClient,
}

impl FirestoreStore {
    pub fn new(client: FirebaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn put(
        &self,
        collection: &str,
        key: DocKey,
        document: Document,
    ) -> Result<String, StoreError> {
        let id = key.resolve_with(|| auto_id(&mut rand::thread_rng()));
        let name = self.client.document_name(collection, &id);

        self.client
            .commit(vec![put_write(&name, &document)])
            .await
            .map_err(StoreError::remote)?;

        debug!(collection, id = %id, "Committed document");
        Ok(id)
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<(), StoreError> {
        let name = self.client.document_name(collection, id);

        match self.client.commit(vec![increment_write(&name, field, by)]).await {
            Ok(()) => Ok(()),
            Err(ApiError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })
            }
            Err(e) => Err(StoreError::remote(e)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

/// Identity service backed by Firebase Authentication.
pub struct FirebaseAuth {
    client: FirebaseClient,
}

impl FirebaseAuth {
    pub fn new(client: FirebaseClient) -> Self {
        Self { client }
    }
}

/// Whether an Identity Toolkit error body reports an existing email.
pub fn is_duplicate_login(body: &str) -> bool {
    DUPLICATE_CODES.iter().any(|code| body.contains(code))
}

#[async_trait]
impl IdentityService for FirebaseAuth {
    async fn create_principal(&self, request: NewPrincipal) -> Result<Principal, IdentityError> {
        let url = format!(
            "{}/projects/{}/accounts",
            self.client.identity_base, self.client.project_id
        );
        let body = json!({
            "email": request.login_id,
            "password": request.secret,
            "displayName": request.display_name,
            "disabled": request.disabled,
        });

        let response = match self.client.post(&url, &body).await {
            Ok(response) => response,
            Err(ApiError::Rejected { body, .. }) if is_duplicate_login(&body) => {
                return Err(IdentityError::DuplicateLogin(request.login_id));
            }
            Err(ApiError::Rejected { status, body }) => {
                return Err(IdentityError::Rejected(format!("{status}: {body}")));
            }
            Err(e) => return Err(IdentityError::remote(e)),
        };

        let created: SignUpResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::remote(ApiError::Request(e)))?;

        Ok(Principal {
            id: created.local_id,
            login_id: request.login_id,
            display_name: request.display_name,
            disabled: request.disabled,
        })
    }
}
