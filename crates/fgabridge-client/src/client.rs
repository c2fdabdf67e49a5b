//! The OpenFGA API client.
//!
//! One instance is shared by every request handler in the process. All state
//! is immutable after construction; store-scoped calls name their target
//! store explicitly, so interleaved requests against different stores never
//! observe each other.

use crate::error::FgaError;
use crate::models::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the OpenFGA HTTP API.
#[derive(Debug, Clone)]
pub struct OpenFgaClient {
    http: reqwest::Client,
    api_url: String,
    store_id: Option<String>,
    authorization_model_id: Option<String>,
}

impl OpenFgaClient {
    /// Build a client for `api_url` (e.g. `http://localhost:8080`).
    ///
    /// `store_id` becomes the default target for store-scoped calls that do
    /// not name one; `authorization_model_id` is attached to query requests
    /// that do not carry their own.
    pub fn new(
        api_url: impl Into<String>,
        store_id: Option<String>,
        authorization_model_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FgaError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            store_id,
            authorization_model_id,
        })
    }

    /// The default store id, when one is configured.
    pub fn store_id(&self) -> Option<&str> {
        self.store_id.as_deref()
    }

    /// Resolve the target store for a call: the explicit override when
    /// given, otherwise the configured default.
    fn target_store<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str, FgaError> {
        explicit
            .or(self.store_id.as_deref())
            .ok_or(FgaError::MissingStore)
    }

    fn model_id(&self, explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| self.authorization_model_id.clone())
    }

    // Store management -----------------------------------------------------

    pub async fn list_stores(
        &self,
        page_size: Option<u32>,
        continuation_token: Option<&str>,
    ) -> Result<ListStoresResponse, FgaError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(size) = page_size {
            query.push(("page_size", size.to_string()));
        }
        if let Some(token) = continuation_token {
            query.push(("continuation_token", token.to_string()));
        }
        self.get_json("/stores", &query).await
    }

    pub async fn create_store(&self, name: &str) -> Result<CreateStoreResponse, FgaError> {
        self.post_json("/stores", &serde_json::json!({ "name": name }))
            .await
    }

    pub async fn get_store(&self, store_id: &str) -> Result<Store, FgaError> {
        self.get_json(&format!("/stores/{store_id}"), &[]).await
    }

    pub async fn delete_store(&self, store_id: &str) -> Result<(), FgaError> {
        let url = format!("{}/stores/{store_id}", self.api_url);
        let response = self.http.delete(url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    // Queries ---------------------------------------------------------------

    pub async fn check(
        &self,
        store_id: Option<&str>,
        mut request: CheckRequest,
    ) -> Result<CheckResponse, FgaError> {
        let store = self.target_store(store_id)?;
        request.authorization_model_id = self.model_id(request.authorization_model_id);
        self.post_json(&format!("/stores/{store}/check"), &request)
            .await
    }

    pub async fn list_objects(
        &self,
        store_id: Option<&str>,
        mut request: ListObjectsRequest,
    ) -> Result<ListObjectsResponse, FgaError> {
        let store = self.target_store(store_id)?;
        request.authorization_model_id = self.model_id(request.authorization_model_id);
        self.post_json(&format!("/stores/{store}/list-objects"), &request)
            .await
    }

    pub async fn list_users(
        &self,
        store_id: Option<&str>,
        mut request: ListUsersRequest,
    ) -> Result<ListUsersResponse, FgaError> {
        let store = self.target_store(store_id)?;
        request.authorization_model_id = self.model_id(request.authorization_model_id);
        self.post_json(&format!("/stores/{store}/list-users"), &request)
            .await
    }

    /// Which of `relations` does `user` hold on `object`? Evaluated as one
    /// `check` per candidate relation; results keep the input order.
    pub async fn list_relations(
        &self,
        store_id: Option<&str>,
        user: &str,
        relations: &[String],
        object: &str,
    ) -> Result<Vec<String>, FgaError> {
        let mut held = Vec::new();
        for relation in relations {
            let request = CheckRequest {
                tuple_key: TupleKey::new(user, relation.clone(), object),
                authorization_model_id: None,
            };
            let response = self.check(store_id, request).await?;
            if response.is_allowed() {
                held.push(relation.clone());
            }
        }
        Ok(held)
    }

    // Relationship tuples ---------------------------------------------------

    pub async fn read_tuples(
        &self,
        store_id: &str,
        request: &ReadRequest,
    ) -> Result<ReadResponse, FgaError> {
        self.post_json(&format!("/stores/{store_id}/read"), request)
            .await
    }

    pub async fn write_tuples(
        &self,
        store_id: &str,
        request: &WriteRequest,
    ) -> Result<(), FgaError> {
        let url = format!("{}/stores/{store_id}/write", self.api_url);
        let response = self.http.post(url).json(request).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    // Authorization models --------------------------------------------------

    pub async fn write_authorization_model(
        &self,
        store_id: &str,
        model: &serde_json::Value,
    ) -> Result<WriteAuthorizationModelResponse, FgaError> {
        self.post_json(&format!("/stores/{store_id}/authorization-models"), model)
            .await
    }

    pub async fn read_authorization_models(
        &self,
        store_id: &str,
        page_size: Option<u32>,
        continuation_token: Option<&str>,
    ) -> Result<ReadAuthorizationModelsResponse, FgaError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(size) = page_size {
            query.push(("page_size", size.to_string()));
        }
        if let Some(token) = continuation_token {
            query.push(("continuation_token", token.to_string()));
        }
        self.get_json(&format!("/stores/{store_id}/authorization-models"), &query)
            .await
    }

    pub async fn get_authorization_model(
        &self,
        store_id: &str,
        model_id: &str,
    ) -> Result<GetAuthorizationModelResponse, FgaError> {
        self.get_json(
            &format!("/stores/{store_id}/authorization-models/{model_id}"),
            &[],
        )
        .await
    }

    // Request plumbing ------------------------------------------------------

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FgaError> {
        let url = format!("{}{}", self.api_url, path);
        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FgaError> {
        let url = format!("{}{}", self.api_url, path);
        let response = self.http.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FgaError> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| FgaError::Decode(e.to_string()))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FgaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    body
                }
            });

        Err(FgaError::Api {
            status: status.as_u16(),
            code: parsed.code,
            message,
        })
    }
}
