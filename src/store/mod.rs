use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::store::model::{Document, DocumentList};

pub mod model;

/// Generate a store document identifier ahead of the write, so callers can
/// embed it in the record body.
pub fn unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Document visibility primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Readable by anyone, including unauthenticated clients.
    ReadAny,
}

impl Permission {
    pub fn to_wire(&self) -> String {
        match self {
            Permission::ReadAny => r#"read("any")"#.to_string(),
        }
    }
}

/// Equality filter over a document attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal { attribute: String, value: Value },
}

impl Query {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::Equal {
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }

    /// Serialize to the store's query string form, e.g. `equal("code",["PL"])`.
    pub fn to_wire(&self) -> String {
        match self {
            Query::Equal { attribute, value } => {
                format!("equal({},[{}])", json!(attribute), value)
            }
        }
    }
}

/// Write and filtered-read access to the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
        permissions: &[Permission],
    ) -> Result<Document>;

    async fn list_documents(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList>;
}

#[derive(Clone)]
pub struct AppwriteClient {
    http: Client,
    endpoint: Url,
    project_id: String,
    api_key: String,
    database_id: String,
}

impl fmt::Debug for AppwriteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppwriteClient")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("database_id", &self.database_id)
            .finish_non_exhaustive()
    }
}

impl AppwriteClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let endpoint = Url::parse(&cfg.store.endpoint).context("invalid store endpoint URL")?;
        Ok(Self::with_endpoint(
            endpoint,
            cfg.store.project_id.clone(),
            cfg.store.api_key.clone(),
            cfg.store.database_id.clone(),
        ))
    }

    pub fn with_endpoint(
        endpoint: Url,
        project_id: String,
        api_key: String,
        database_id: String,
    ) -> Self {
        let http = Client::builder()
            .user_agent("footsync/0.1")
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            endpoint,
            project_id,
            api_key,
            database_id,
        }
    }

    fn documents_url(&self, collection_id: &str) -> Result<Url> {
        self.endpoint
            .join(&format!(
                "databases/{}/collections/{}/documents",
                self.database_id, collection_id
            ))
            .context("invalid store endpoint URL")
    }

    pub fn build_create_request(
        &self,
        collection_id: &str,
        body: &Value,
    ) -> Result<reqwest::Request> {
        let url = self.documents_url(collection_id)?;
        self.http
            .post(url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .build()
            .context("failed to build store request")
    }

    pub fn build_list_request(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<reqwest::Request> {
        let url = self.documents_url(collection_id)?;
        let params: Vec<(&str, String)> =
            queries.iter().map(|q| ("queries[]", q.to_wire())).collect();
        self.http
            .get(url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .query(&params)
            .build()
            .context("failed to build store request")
    }
}

/// Request body for a document create, shaped as the store expects it.
pub fn build_create_document_body(
    document_id: &str,
    data: Value,
    permissions: &[Permission],
) -> Value {
    let permissions: Vec<String> = permissions.iter().map(Permission::to_wire).collect();
    json!({
        "documentId": document_id,
        "data": data,
        "permissions": permissions,
    })
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn create_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
        permissions: &[Permission],
    ) -> Result<Document> {
        let body = build_create_document_body(document_id, data, permissions);
        let request = self.build_create_request(collection_id, &body)?;
        debug!(url = %request.url(), document_id, "creating document");

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach document store")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("store error {}: {}", status, body));
        }

        res.json::<Document>()
            .await
            .context("invalid store response JSON")
    }

    async fn list_documents(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        let request = self.build_list_request(collection_id, queries)?;
        debug!(url = %request.url(), "listing documents");

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach document store")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("store error {}: {}", status, body));
        }

        res.json::<DocumentList>()
            .await
            .context("invalid store response JSON")
    }
}
