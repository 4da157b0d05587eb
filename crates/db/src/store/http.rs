//! Reqwest-backed document store adapter.
//!
//! Owns transport details only: URL layout, bearer auth, timeout and HTTP
//! status mapping, and JSON decoding of documents.

use async_trait::async_trait;
use homebase_config::StoreSettings;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Document, DocumentStore, Fields, Query, StoreError, StoreResult};

#[derive(Serialize)]
struct WriteBody<'a> {
    fields: &'a Fields,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
}

impl HttpDocumentStore {
    pub fn new(settings: &StoreSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self::with_client(client, &settings.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/documents/{}",
            self.base_url,
            urlencoding::encode(collection)
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> StoreResult<Vec<u8>> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(%status, what, "document store response");
        if !status.is_success() {
            return Err(map_status_error(status, what, &body));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn get(&self, token: &str, collection: &str, id: &str) -> StoreResult<Document> {
        let what = format!("{collection}/{id}");
        let body = self
            .send(
                self.client
                    .get(self.document_url(collection, id))
                    .bearer_auth(token),
                &what,
            )
            .await?;
        serde_json::from_slice(&body)
            .map_err(|e| StoreError::Decode(format!("{what}: {e}")))
    }

    async fn create(
        &self,
        token: &str,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> StoreResult<()> {
        let what = format!("{collection}/{id}");
        self.send(
            self.client
                .post(self.collection_url(collection))
                .query(&[("documentId", id)])
                .bearer_auth(token)
                .json(&WriteBody { fields: &fields }),
            &what,
        )
        .await?;
        Ok(())
    }

    async fn patch(
        &self,
        token: &str,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> StoreResult<()> {
        let what = format!("{collection}/{id}");
        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask", k.as_str()))
            .collect();
        self.send(
            self.client
                .patch(self.document_url(collection, id))
                .query(&mask)
                .bearer_auth(token)
                .json(&WriteBody { fields: &fields }),
            &what,
        )
        .await?;
        Ok(())
    }

    async fn query(
        &self,
        token: &str,
        collection: &str,
        query: &Query,
    ) -> StoreResult<Vec<Document>> {
        let what = format!("{collection}:query");
        let body = self
            .send(
                self.client
                    .post(format!("{}:query", self.collection_url(collection)))
                    .bearer_auth(token)
                    .json(query),
                &what,
            )
            .await?;
        let response: QueryResponse = serde_json::from_slice(&body)
            .map_err(|e| StoreError::Decode(format!("{what}: {e}")))?;
        Ok(response.documents)
    }
}

fn map_transport_error(error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::Timeout(error.to_string())
    } else if error.is_decode() {
        StoreError::Decode(error.to_string())
    } else {
        StoreError::Unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, what: &str, body: &[u8]) -> StoreError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("{what}: status {}", status.as_u16())
    } else {
        format!("{what}: status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::CONFLICT => StoreError::AlreadyExists(message),
        StatusCode::FORBIDDEN => StoreError::PermissionDenied(message),
        StatusCode::UNAUTHORIZED => StoreError::Unauthenticated(message),
        StatusCode::TOO_MANY_REQUESTS => StoreError::RateLimited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StoreError::Timeout(message),
        _ if status.is_client_error() => StoreError::InvalidRequest(message),
        _ => StoreError::Unavailable(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
