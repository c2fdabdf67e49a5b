//! Tool dispatch.
//!
//! `dispatch` is the single entry point both transports use: it resolves
//! the tool name against the catalog, verifies the required arguments are
//! present, and only then runs the operation. Failures at this boundary are
//! typed (`DispatchError`) and map to 4xx responses; failures inside an
//! operation come back as ordinary result strings instead.

use crate::catalog::ToolRegistry;
use crate::ops::{self, ToolArgs};
use fgabridge_client::OpenFgaClient;
use serde_json::Value;
use thiserror::Error;

/// Rejections raised before an operation runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unsupported tool: {0}")]
    UnsupportedTool(String),

    #[error("{}", missing_args_message(.tool, .missing))]
    MissingArguments {
        tool: String,
        missing: Vec<String>,
    },
}

fn missing_args_message(tool: &str, missing: &[String]) -> String {
    match missing {
        [single] => format!("Missing required arg '{single}' for {tool}"),
        _ => format!("Missing required args for {tool}: {}", missing.join(", ")),
    }
}

/// Resolve `name` and run it with `args` against `client`.
pub async fn dispatch(
    client: &OpenFgaClient,
    registry: &ToolRegistry,
    name: &str,
    args: &Value,
) -> Result<String, DispatchError> {
    let spec = registry
        .get(name)
        .ok_or_else(|| DispatchError::UnsupportedTool(name.to_string()))?;

    let missing: Vec<String> = spec
        .required
        .iter()
        .filter(|key| {
            args.as_object()
                .and_then(|map| map.get(**key))
                .map(Value::is_null)
                .unwrap_or(true)
        })
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DispatchError::MissingArguments {
            tool: name.to_string(),
            missing,
        });
    }

    let args = ToolArgs::new(args);
    let result = match name {
        "check" => ops::check(client, &args).await,
        "list_objects" => ops::list_objects(client, &args).await,
        "list_relations" => ops::list_relations(client, &args).await,
        "list_users" => ops::list_users(client, &args).await,
        "list_stores" => ops::list_stores(client, &args).await,
        "create_store" => ops::create_store(client, &args).await,
        "get_store" => ops::get_store(client, &args).await,
        "delete_store" => ops::delete_store(client, &args).await,
        "get_store_id_by_name" => ops::get_store_id_by_name(client, &args).await,
        "write_authorization_model" => ops::write_authorization_model(client, &args).await,
        "read_authorization_models" => ops::read_authorization_models(client, &args).await,
        "get_authorization_model" => ops::get_authorization_model(client, &args).await,
        "get_latest_authorization_model_id" => {
            ops::get_latest_authorization_model_id(client, &args).await
        }
        "read_relation_tuples" => ops::read_relation_tuples(client, &args).await,
        "write_relation_tuples" => ops::write_relation_tuples(client, &args).await,
        other => return Err(DispatchError::UnsupportedTool(other.to_string())),
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    // A client pointed at a closed port: any accidental backend call fails
    // loudly instead of passing.
    fn unreachable_client() -> OpenFgaClient {
        OpenFgaClient::new(
            "http://127.0.0.1:1",
            Some("S0".to_string()),
            None,
            Duration::from_millis(200),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let client = unreachable_client();
        let registry = ToolRegistry::builtin();

        let err = dispatch(&client, &registry, "frobnicate", &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err, DispatchError::UnsupportedTool("frobnicate".to_string()));
        assert_eq!(err.to_string(), "Unsupported tool: frobnicate");
    }

    #[tokio::test]
    async fn missing_arguments_are_rejected_before_any_call() {
        let client = unreachable_client();
        let registry = ToolRegistry::builtin();

        let err = dispatch(&client, &registry, "check", &json!({ "user": "u" }))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required args for check: relation, object"
        );
    }

    #[tokio::test]
    async fn single_missing_argument_uses_singular_message() {
        let client = unreachable_client();
        let registry = ToolRegistry::builtin();

        let err = dispatch(&client, &registry, "get_store", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required arg 'store_id' for get_store");

        let err = dispatch(&client, &registry, "create_store", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required arg 'name' for create_store");
    }

    #[tokio::test]
    async fn null_argument_counts_as_missing() {
        let client = unreachable_client();
        let registry = ToolRegistry::builtin();

        let err = dispatch(
            &client,
            &registry,
            "check",
            &json!({ "user": "u", "relation": null, "object": "o" }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Missing required arg 'relation' for check");
    }

    #[tokio::test]
    async fn operation_failures_come_back_as_result_strings() {
        let client = unreachable_client();
        let registry = ToolRegistry::builtin();

        let result = dispatch(
            &client,
            &registry,
            "check",
            &json!({ "user": "u", "relation": "r", "object": "o" }),
        )
        .await
        .unwrap();

        assert!(
            result.starts_with("Error checking relation:"),
            "unexpected result: {result}"
        );
    }
}
