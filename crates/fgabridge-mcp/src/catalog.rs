//! The fixed tool catalog.
//!
//! Each entry pairs the MCP tool definition (name, description, input
//! schema, shown to agents by `tools/list`) with the required-argument list
//! that dispatch enforces before an operation runs.

use crate::protocol::ToolDefinition;
use serde_json::json;
use std::collections::HashMap;

/// A registered tool: its public definition plus dispatch metadata.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub definition: ToolDefinition,
    pub required: &'static [&'static str],
}

/// Registry of the tools this server exposes.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full catalog the bridge serves.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for spec in builtin_tools() {
            registry.register(spec);
        }
        registry
    }

    pub fn register(&mut self, spec: ToolSpec) {
        self.tools.insert(spec.definition.name.clone(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn list(&self) -> Vec<&ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|s| &s.definition).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn tool(
    name: &str,
    description: &str,
    properties: serde_json::Value,
    required: &'static [&'static str],
) -> ToolSpec {
    ToolSpec {
        definition: ToolDefinition {
            name: name.to_string(),
            description: Some(description.to_string()),
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        },
        required,
    }
}

fn builtin_tools() -> Vec<ToolSpec> {
    vec![
        tool(
            "check",
            "Check if a user has a relation to an object",
            json!({
                "user": { "type": "string", "description": "User to check, e.g. 'user:anne'" },
                "relation": { "type": "string", "description": "Relation to check" },
                "object": { "type": "string", "description": "Object to check, e.g. 'document:report1'" },
                "store_id": { "type": "string", "description": "Store to query (defaults to the configured store)" },
                "authorization_model_id": { "type": "string", "description": "Model to evaluate against" },
            }),
            &["user", "relation", "object"],
        ),
        tool(
            "list_objects",
            "List objects of a type that a user has a relation to",
            json!({
                "user": { "type": "string" },
                "relation": { "type": "string" },
                "type": { "type": "string", "description": "Object type to list" },
                "store_id": { "type": "string" },
            }),
            &["user", "relation", "type"],
        ),
        tool(
            "list_relations",
            "Which of the given relations does a user have with an object",
            json!({
                "user": { "type": "string" },
                "relations": { "type": "string", "description": "Comma-separated candidate relations" },
                "object": { "type": "string" },
                "store_id": { "type": "string" },
            }),
            &["user", "relations", "object"],
        ),
        tool(
            "list_users",
            "List users that have a given relationship with an object",
            json!({
                "object": { "type": "string", "description": "Object to inspect, e.g. 'report1'" },
                "type": { "type": "string", "description": "Type of the object" },
                "relation": { "type": "string" },
                "store_id": { "type": "string" },
            }),
            &["object", "type", "relation"],
        ),
        tool("list_stores", "List all stores", json!({}), &[]),
        tool(
            "create_store",
            "Create a new store",
            json!({ "name": { "type": "string", "description": "Name of the store to create" } }),
            &["name"],
        ),
        tool(
            "get_store",
            "Get details of a store",
            json!({ "store_id": { "type": "string" } }),
            &["store_id"],
        ),
        tool(
            "delete_store",
            "Delete a store",
            json!({ "store_id": { "type": "string" } }),
            &["store_id"],
        ),
        tool(
            "get_store_id_by_name",
            "Look up a store ID by its name",
            json!({ "name": { "type": "string" } }),
            &["name"],
        ),
        tool(
            "write_authorization_model",
            "Create a new authorization model in a store",
            json!({
                "store_id": { "type": "string" },
                "auth_model_data": {
                    "type": "object",
                    "description": "Model body: schema_version, type_definitions, optional conditions",
                },
            }),
            &["store_id", "auth_model_data"],
        ),
        tool(
            "read_authorization_models",
            "List authorization models in a store",
            json!({
                "store_id": { "type": "string" },
                "continuation_token": { "type": "string" },
                "page_size": { "type": "integer" },
            }),
            &["store_id"],
        ),
        tool(
            "get_authorization_model",
            "Get a specific authorization model",
            json!({
                "store_id": { "type": "string" },
                "authorization_model_id": { "type": "string" },
            }),
            &["store_id", "authorization_model_id"],
        ),
        tool(
            "get_latest_authorization_model_id",
            "Get the ID of the most recent authorization model in a store",
            json!({ "store_id": { "type": "string" } }),
            &["store_id"],
        ),
        tool(
            "read_relation_tuples",
            "Read relationship tuples from a store, optionally filtered",
            json!({
                "store_id": { "type": "string" },
                "user": { "type": "string" },
                "relation": { "type": "string" },
                "object": { "type": "string" },
                "object_type": { "type": "string", "description": "Filter by object type when no full object is given" },
                "continuation_token": { "type": "string" },
                "page_size": { "type": "integer" },
            }),
            &["store_id"],
        ),
        tool(
            "write_relation_tuples",
            "Write relationship tuples to a store",
            json!({
                "store_id": { "type": "string" },
                "tuples": {
                    "type": "array",
                    "description": "Tuples to write; each needs user, relation and object",
                    "items": {
                        "type": "object",
                        "properties": {
                            "user": { "type": "string" },
                            "relation": { "type": "string" },
                            "object": { "type": "string" },
                            "condition": { "type": "object" },
                        },
                        "required": ["user", "relation", "object"],
                    },
                },
                "authorization_model_id": { "type": "string" },
            }),
            &["store_id", "tuples"],
        ),
    ]
}
