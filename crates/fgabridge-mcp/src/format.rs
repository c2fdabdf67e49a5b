//! Result-string formatting.
//!
//! Every tool resolves to a single human-readable string; agents parse
//! nothing else. The exact wording here is a compatibility contract with
//! existing consumers, including the degenerate trailing space when
//! `list_objects` finds nothing. All functions are pure.

use chrono::{DateTime, Utc};
use fgabridge_client::models::{AuthorizationModel, Store, Tuple};

pub fn check(user: &str, relation: &str, object: &str, allowed: bool) -> String {
    if allowed {
        format!("{user} has the relation {relation} to {object}")
    } else {
        format!("{user} does not have the relation {relation} to {object}")
    }
}

pub fn list_objects(user: &str, relation: &str, objects: &[String]) -> String {
    format!(
        "{user} has a {relation} relationship with {}",
        objects.join(", ")
    )
}

pub fn list_relations(user: &str, relations: &[String], object: &str) -> String {
    format!(
        "{user} has the {} relationships with {object}",
        relations.join(", ")
    )
}

pub fn list_users(users: &[String], relation: &str, object: &str) -> String {
    if users.is_empty() {
        format!("No users found with the {relation} relationship with {object}")
    } else {
        format!(
            "{} have the {relation} relationship with {object}",
            users.join(", ")
        )
    }
}

pub fn list_stores(stores: &[Store]) -> String {
    if stores.is_empty() {
        return "No stores found".to_string();
    }

    let lines: Vec<String> = stores
        .iter()
        .map(|store| {
            format!(
                "ID: {}, Name: {}, Created: {}",
                store.id.as_deref().unwrap_or(""),
                store.name.as_deref().unwrap_or(""),
                timestamp(store.created_at.as_ref()),
            )
        })
        .collect();

    format!("Found stores:\n{}", lines.join("\n"))
}

pub fn create_store(name: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("Store '{name}' created successfully with ID: {id}"),
        None => format!("Store '{name}' created successfully, but no ID was returned"),
    }
}

pub fn store_details(store_id: &str, store: &Store) -> String {
    if store.id.is_none() && store.name.is_none() {
        return format!("Store with ID '{store_id}' found, but no details were returned");
    }

    let mut parts = vec![
        format!("ID: {}", store.id.as_deref().unwrap_or("")),
        format!("Name: {}", store.name.as_deref().unwrap_or("")),
    ];
    if let Some(created) = store.created_at.as_ref() {
        parts.push(format!("Created: {}", timestamp(Some(created))));
    }
    if let Some(updated) = store.updated_at.as_ref() {
        parts.push(format!("Updated: {}", timestamp(Some(updated))));
    }

    format!("Store details:\n{}", parts.join(", "))
}

pub fn delete_store(store_id: &str) -> String {
    format!("Store with ID '{store_id}' has been successfully deleted")
}

pub fn store_id_by_name(name: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("Store '{name}' has ID: {id}"),
        None => format!("No store found with name '{name}'"),
    }
}

pub fn write_authorization_model(id: Option<&str>) -> String {
    match id {
        Some(id) => format!("Authorization model successfully created with ID: {id}"),
        None => "Authorization model successfully created, but no ID was returned".to_string(),
    }
}

pub fn read_authorization_models(models: &[AuthorizationModel]) -> String {
    if models.is_empty() {
        return "No authorization models found".to_string();
    }

    let lines: Vec<String> = models
        .iter()
        .map(|model| {
            format!(
                "ID: {}, Schema Version: {}",
                model.id.as_deref().unwrap_or(""),
                model.schema_version.as_deref().unwrap_or(""),
            )
        })
        .collect();

    format!("Found authorization models:\n{}", lines.join("\n"))
}

pub fn authorization_model_details(model_id: &str, model: Option<&AuthorizationModel>) -> String {
    match model {
        Some(model) if model.id.is_some() || model.schema_version.is_some() => format!(
            "Authorization model details:\nID: {}, Schema Version: {}, Type definitions: {}",
            model.id.as_deref().unwrap_or(""),
            model.schema_version.as_deref().unwrap_or(""),
            model.type_definitions.len(),
        ),
        _ => format!("Authorization model with ID '{model_id}' found, but no details were returned"),
    }
}

pub fn latest_authorization_model_id(store_id: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("Latest authorization model ID: {id}"),
        None => format!("No authorization models found in store '{store_id}'"),
    }
}

pub fn read_relation_tuples(tuples: &[Tuple]) -> String {
    let lines: Vec<String> = tuples
        .iter()
        .filter_map(|tuple| tuple.key.as_ref())
        .map(|key| {
            format!(
                "user: {}, relation: {}, object: {}",
                key.user, key.relation, key.object
            )
        })
        .collect();

    if lines.is_empty() {
        return "No relation tuples found".to_string();
    }

    format!("Found relation tuples:\n{}", lines.join("\n"))
}

pub fn write_relation_tuples(count: usize) -> String {
    format!("Successfully wrote {count} relation tuple(s)")
}

fn timestamp(value: Option<&DateTime<Utc>>) -> String {
    value.map(|v| v.to_rfc3339()).unwrap_or_default()
}
