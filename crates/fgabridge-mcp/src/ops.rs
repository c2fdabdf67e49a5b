//! Tool operations.
//!
//! One async function per tool. Every operation follows the same shape:
//! read arguments, call the backend, format the outcome. Backend failures
//! are converted into `"Error <doing-x>: <cause>"` strings here, so a
//! dispatch that reaches an operation always produces a result string and
//! never a transport fault.

use crate::format;
use fgabridge_client::models::{
    CheckRequest, FgaObjectRef, ListObjectsRequest, ListUsersRequest, ReadRequest, ReadTupleFilter,
    TupleKey, UserTypeFilter, WriteRequest, WriteTuples,
};
use fgabridge_client::OpenFgaClient;
use serde_json::{Map, Value};

/// Read-only view over a tool's argument bag.
///
/// Dispatch has already verified that required keys are present; accessors
/// here stay permissive about value types, mirroring the loosely-typed
/// envelope agents send.
pub struct ToolArgs<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> ToolArgs<'a> {
    pub fn new(args: &'a Value) -> Self {
        Self {
            map: args.as_object(),
        }
    }

    pub fn str(&self, key: &str) -> Option<&'a str> {
        self.map.and_then(|m| m.get(key)).and_then(Value::as_str)
    }

    pub fn u32(&self, key: &str) -> Option<u32> {
        self.map
            .and_then(|m| m.get(key))
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    }

    pub fn value(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key))
    }

    fn owned_str(&self, key: &str) -> Option<String> {
        self.str(key).map(String::from)
    }
}

pub async fn check(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let user = args.str("user").unwrap_or_default();
    let relation = args.str("relation").unwrap_or_default();
    let object = args.str("object").unwrap_or_default();

    let request = CheckRequest {
        tuple_key: TupleKey::new(user, relation, object),
        authorization_model_id: args.owned_str("authorization_model_id"),
    };

    match client.check(args.str("store_id"), request).await {
        Ok(response) => format::check(user, relation, object, response.is_allowed()),
        Err(e) => format!("Error checking relation: {e}"),
    }
}

pub async fn list_objects(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let user = args.str("user").unwrap_or_default();
    let relation = args.str("relation").unwrap_or_default();
    let object_type = args.str("type").unwrap_or_default();

    let request = ListObjectsRequest {
        object_type: object_type.to_string(),
        relation: relation.to_string(),
        user: user.to_string(),
        authorization_model_id: args.owned_str("authorization_model_id"),
    };

    match client.list_objects(args.str("store_id"), request).await {
        Ok(response) => format::list_objects(user, relation, &response.objects),
        Err(e) => format!("Error listing related objects: {e}"),
    }
}

pub async fn list_relations(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let user = args.str("user").unwrap_or_default();
    let object = args.str("object").unwrap_or_default();
    let candidates: Vec<String> = args
        .str("relations")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect();

    match client
        .list_relations(args.str("store_id"), user, &candidates, object)
        .await
    {
        Ok(held) => format::list_relations(user, &held, object),
        Err(e) => format!("Error listing relations: {e}"),
    }
}

pub async fn list_users(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let object = args.str("object").unwrap_or_default();
    let object_type = args.str("type").unwrap_or_default();
    let relation = args.str("relation").unwrap_or_default();

    let request = ListUsersRequest {
        object: FgaObjectRef {
            object_type: object_type.to_string(),
            id: object.to_string(),
        },
        relation: relation.to_string(),
        user_filters: vec![UserTypeFilter {
            user_type: "user".to_string(),
        }],
        authorization_model_id: args.owned_str("authorization_model_id"),
    };

    match client.list_users(args.str("store_id"), request).await {
        Ok(response) => {
            let users: Vec<String> = response
                .users
                .iter()
                .filter_map(|user| user.display_id())
                .collect();
            format::list_users(&users, relation, object)
        }
        Err(e) => format!("Error listing users: {e}"),
    }
}

pub async fn list_stores(client: &OpenFgaClient, _args: &ToolArgs<'_>) -> String {
    match client.list_stores(None, None).await {
        Ok(response) => format::list_stores(&response.stores),
        Err(e) => format!("Error listing stores: {e}"),
    }
}

pub async fn create_store(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let name = args.str("name").unwrap_or_default();
    match client.create_store(name).await {
        Ok(response) => format::create_store(name, response.id.as_deref()),
        Err(e) => format!("Error creating store: {e}"),
    }
}

pub async fn get_store(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let store_id = args.str("store_id").unwrap_or_default();
    match client.get_store(store_id).await {
        Ok(store) => format::store_details(store_id, &store),
        Err(e) => format!("Error retrieving store: {e}"),
    }
}

pub async fn delete_store(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let store_id = args.str("store_id").unwrap_or_default();
    match client.delete_store(store_id).await {
        Ok(()) => format::delete_store(store_id),
        Err(e) => format!("Error deleting store: {e}"),
    }
}

pub async fn get_store_id_by_name(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let name = args.str("name").unwrap_or_default();

    let mut continuation_token: Option<String> = None;
    loop {
        match client
            .list_stores(None, continuation_token.as_deref())
            .await
        {
            Ok(response) => {
                if let Some(store) = response
                    .stores
                    .iter()
                    .find(|store| store.name.as_deref() == Some(name))
                {
                    return format::store_id_by_name(name, store.id.as_deref());
                }
                match response.continuation_token.filter(|t| !t.is_empty()) {
                    Some(token) => continuation_token = Some(token),
                    None => return format::store_id_by_name(name, None),
                }
            }
            Err(e) => return format!("Error retrieving store ID: {e}"),
        }
    }
}

pub async fn write_authorization_model(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let store_id = args.str("store_id").unwrap_or_default();
    let model = match args.value("auth_model_data") {
        Some(value) if value.is_object() => value,
        _ => return "Error creating authorization model: auth_model_data must be a JSON object"
            .to_string(),
    };

    match client.write_authorization_model(store_id, model).await {
        Ok(response) => {
            format::write_authorization_model(response.authorization_model_id.as_deref())
        }
        Err(e) => format!("Error creating authorization model: {e}"),
    }
}

pub async fn read_authorization_models(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let store_id = args.str("store_id").unwrap_or_default();
    match client
        .read_authorization_models(store_id, args.u32("page_size"), args.str("continuation_token"))
        .await
    {
        Ok(response) => format::read_authorization_models(&response.authorization_models),
        Err(e) => format!("Error reading authorization models: {e}"),
    }
}

pub async fn get_authorization_model(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let store_id = args.str("store_id").unwrap_or_default();
    let model_id = args.str("authorization_model_id").unwrap_or_default();
    match client.get_authorization_model(store_id, model_id).await {
        Ok(response) => {
            format::authorization_model_details(model_id, response.authorization_model.as_ref())
        }
        Err(e) => format!("Error retrieving authorization model: {e}"),
    }
}

pub async fn get_latest_authorization_model_id(
    client: &OpenFgaClient,
    args: &ToolArgs<'_>,
) -> String {
    let store_id = args.str("store_id").unwrap_or_default();
    // Models are returned newest-first; the first entry is the latest.
    match client
        .read_authorization_models(store_id, Some(1), None)
        .await
    {
        Ok(response) => {
            let latest = response
                .authorization_models
                .first()
                .and_then(|model| model.id.as_deref());
            format::latest_authorization_model_id(store_id, latest)
        }
        Err(e) => format!("Error retrieving latest authorization model ID: {e}"),
    }
}

pub async fn read_relation_tuples(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let store_id = args.str("store_id").unwrap_or_default();

    let object = match (args.str("object"), args.str("object_type")) {
        (Some(object), _) => Some(object.to_string()),
        // A bare type filters every object of that type.
        (None, Some(object_type)) => Some(format!("{object_type}:")),
        (None, None) => None,
    };
    let filter = ReadTupleFilter {
        user: args.owned_str("user"),
        relation: args.owned_str("relation"),
        object,
    };

    let request = ReadRequest {
        tuple_key: (!filter.is_empty()).then_some(filter),
        page_size: args.u32("page_size"),
        continuation_token: args.owned_str("continuation_token"),
    };

    match client.read_tuples(store_id, &request).await {
        Ok(response) => format::read_relation_tuples(&response.tuples),
        Err(e) => format!("Error reading relation tuples: {e}"),
    }
}

pub async fn write_relation_tuples(client: &OpenFgaClient, args: &ToolArgs<'_>) -> String {
    let store_id = args.str("store_id").unwrap_or_default();

    let raw_tuples = match args.value("tuples").and_then(Value::as_array) {
        Some(tuples) => tuples,
        None => return "Error writing relation tuples: tuples must be a JSON array".to_string(),
    };

    let mut tuple_keys = Vec::with_capacity(raw_tuples.len());
    for (index, raw) in raw_tuples.iter().enumerate() {
        match parse_tuple(raw) {
            Ok(key) => tuple_keys.push(key),
            Err(field) => {
                return format!(
                    "Error writing relation tuples: tuple {index} is missing required field '{field}'"
                );
            }
        }
    }

    let count = tuple_keys.len();
    let request = WriteRequest {
        writes: Some(WriteTuples { tuple_keys }),
        deletes: None,
        authorization_model_id: args.owned_str("authorization_model_id"),
    };

    match client.write_tuples(store_id, &request).await {
        Ok(()) => format::write_relation_tuples(count),
        Err(e) => format!("Error writing relation tuples: {e}"),
    }
}

fn parse_tuple(raw: &Value) -> Result<TupleKey, &'static str> {
    let user = raw
        .get("user")
        .and_then(Value::as_str)
        .ok_or("user")?;
    let relation = raw
        .get("relation")
        .and_then(Value::as_str)
        .ok_or("relation")?;
    let object = raw
        .get("object")
        .and_then(Value::as_str)
        .ok_or("object")?;

    let mut key = TupleKey::new(user, relation, object);
    key.condition = raw.get("condition").filter(|c| !c.is_null()).cloned();
    Ok(key)
}
