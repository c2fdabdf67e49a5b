//! Request and response bodies for the OpenFGA HTTP API.
//!
//! Response types are deliberately lax: every field is `Option` or defaults
//! to empty, so partial or unfamiliar backend payloads decode instead of
//! erroring. Only transport-level failures propagate as errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `(user, relation, object)` fact, optionally carrying a condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TupleKey {
    pub user: String,
    pub relation: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl TupleKey {
    pub fn new(
        user: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            relation: relation.into(),
            object: object.into(),
            condition: None,
        }
    }
}

/// Store metadata as the backend reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListStoresResponse {
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStoreResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRequest {
    pub tuple_key: TupleKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_model_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub allowed: Option<bool>,
}

impl CheckResponse {
    /// Absent `allowed` counts as a denial.
    pub fn is_allowed(&self) -> bool {
        self.allowed.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListObjectsRequest {
    #[serde(rename = "type")]
    pub object_type: String,
    pub relation: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_model_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListObjectsResponse {
    #[serde(default)]
    pub objects: Vec<String>,
}

/// Object reference used by `list-users`.
#[derive(Debug, Clone, Serialize)]
pub struct FgaObjectRef {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
}

/// User-type filter used by `list-users`.
#[derive(Debug, Clone, Serialize)]
pub struct UserTypeFilter {
    #[serde(rename = "type")]
    pub user_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListUsersRequest {
    pub object: FgaObjectRef,
    pub relation: String,
    pub user_filters: Vec<UserTypeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_model_id: Option<String>,
}

/// One user entry in a `list-users` response; exactly one variant is set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FgaUser {
    #[serde(default)]
    pub object: Option<UserObject>,
    #[serde(default)]
    pub userset: Option<UserSet>,
    #[serde(default)]
    pub wildcard: Option<Wildcard>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserObject {
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSet {
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wildcard {
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
}

impl FgaUser {
    /// Human-readable identifier for result strings.
    pub fn display_id(&self) -> Option<String> {
        if let Some(object) = &self.object {
            return object.id.clone();
        }
        if let Some(userset) = &self.userset {
            if let (Some(object_type), Some(id), Some(relation)) =
                (&userset.object_type, &userset.id, &userset.relation)
            {
                return Some(format!("{object_type}:{id}#{relation}"));
            }
        }
        if let Some(wildcard) = &self.wildcard {
            if let Some(object_type) = &wildcard.object_type {
                return Some(format!("{object_type}:*"));
            }
        }
        None
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersResponse {
    #[serde(default)]
    pub users: Vec<FgaUser>,
}

/// Partial tuple-key filter for `read`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadTupleFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl ReadTupleFilter {
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.relation.is_none() && self.object.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuple_key: Option<ReadTupleFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tuple {
    #[serde(default)]
    pub key: Option<TupleKey>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadResponse {
    #[serde(default)]
    pub tuples: Vec<Tuple>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteTuples {
    pub tuple_keys: Vec<TupleKey>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writes: Option<WriteTuples>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletes: Option<WriteTuples>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_model_id: Option<String>,
}

/// Authorization model metadata; `type_definitions` is kept untyped since
/// the bridge only reports on models, it never evaluates them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub type_definitions: Vec<Value>,
    #[serde(default)]
    pub conditions: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadAuthorizationModelsResponse {
    #[serde(default)]
    pub authorization_models: Vec<AuthorizationModel>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetAuthorizationModelResponse {
    #[serde(default)]
    pub authorization_model: Option<AuthorizationModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriteAuthorizationModelResponse {
    #[serde(default)]
    pub authorization_model_id: Option<String>,
}

/// Error body the backend sends on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
