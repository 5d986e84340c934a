//! Wire schema layer: payload validation on the way in, serialization on the
//! way out.
//!
//! `load` checks a JSON payload against the entity's declared fields and
//! returns either a normalized field map or the full list of field errors.
//! `serialize_record` dumps a record, optionally populating nested child
//! collections from the store; `serialize_listing` dumps many records under an
//! optional projection.

use crate::error::FieldError;
use crate::model::{resource_spec, EntityKind, FieldType, Record};
use crate::store::RecordStore;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// How strict `load` is about identity and nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// PUT payloads: `id` and nested collections are allowed.
    Update,
    /// POST payloads: flat create; `id` and nested collections are rejected.
    Create,
}

/// Validate a wire payload for `kind` and return the normalized field map.
///
/// All problems are collected, not just the first, so a 422 response can name
/// every offending field. Nested payload errors carry an indexed path such as
/// `analyses[1].name`.
pub fn load(
    kind: EntityKind,
    payload: &Value,
    mode: LoadMode,
) -> Result<Map<String, Value>, Vec<FieldError>> {
    let mut errors = Vec::new();
    let data = load_object(kind, payload, mode, "", &mut errors);
    if errors.is_empty() {
        Ok(data.unwrap_or_default())
    } else {
        Err(errors)
    }
}

fn load_object(
    kind: EntityKind,
    payload: &Value,
    mode: LoadMode,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Map<String, Value>> {
    let object = match payload.as_object() {
        Some(object) => object,
        None => {
            errors.push(FieldError::new(
                if path.is_empty() { "_payload" } else { path },
                "expected a JSON object",
            ));
            return None;
        }
    };

    let spec = resource_spec(kind);
    let mut data = Map::new();

    for (key, value) in object {
        let at = |field: &str| {
            if path.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", path, field)
            }
        };

        if key == "id" {
            if mode == LoadMode::Create {
                errors.push(FieldError::new(at("id"), "id is assigned by the server"));
            } else if value.as_i64().is_none() {
                errors.push(FieldError::new(at("id"), "expected an integer identifier"));
            } else {
                data.insert(key.clone(), value.clone());
            }
            continue;
        }

        if let Some(field) = spec.scalar(key) {
            match check_scalar(field.ty, value) {
                Ok(()) => {
                    data.insert(key.clone(), value.clone());
                }
                Err(message) => errors.push(FieldError::new(at(key), message)),
            }
            continue;
        }

        if spec.is_nested_field(key) {
            if mode == LoadMode::Create {
                errors.push(FieldError::new(
                    at(key),
                    "nested collections are not accepted on create",
                ));
                continue;
            }
            let child = spec
                .nested
                .iter()
                .find(|n| n.field == key)
                .map(|n| n.child)
                .unwrap_or(kind);
            match value.as_array() {
                Some(items) => {
                    let mut normalized = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        let item_path = format!("{}[{}]", at(key), index);
                        if let Some(map) =
                            load_object(child, item, LoadMode::Update, &item_path, errors)
                        {
                            normalized.push(Value::Object(map));
                        }
                    }
                    data.insert(key.clone(), Value::Array(normalized));
                }
                None => errors.push(FieldError::new(at(key), "expected an array of objects")),
            }
            continue;
        }

        errors.push(FieldError::unknown(at(key)));
    }

    Some(data)
}

fn check_scalar(ty: FieldType, value: &Value) -> Result<(), &'static str> {
    match (ty, value) {
        (_, Value::Null) => Ok(()),
        (FieldType::Text, Value::String(_)) => Ok(()),
        (FieldType::Text, _) => Err("expected a string or null"),
        (FieldType::Float, Value::Number(_)) => Ok(()),
        (FieldType::Float, _) => Err("expected a number or null"),
    }
}

/// Serialize one record. With `deep` set, declared nested collections are
/// fetched from the store and embedded, recursively.
pub async fn serialize_record<S: RecordStore>(
    store: &S,
    record: &Record,
    deep: bool,
) -> anyhow::Result<Value> {
    serialize_inner(store, record, deep).await
}

fn serialize_inner<'a, S: RecordStore>(
    store: &'a S,
    record: &'a Record,
    deep: bool,
) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send + 'a>> {
    Box::pin(async move {
        let mut value = record.to_value()?;
        if deep {
            let spec = resource_spec(record.kind());
            if let Value::Object(object) = &mut value {
                for nested in spec.nested {
                    let children = store
                        .children_of(nested.child, record.kind(), record.id())
                        .await?;
                    let mut items = Vec::with_capacity(children.len());
                    for child in &children {
                        items.push(serialize_inner(store, child, true).await?);
                    }
                    object.insert(nested.field.to_string(), Value::Array(items));
                }
            }
        }
        Ok(value)
    })
}

/// Serialize a list page, restricted to the projection fields when declared.
pub fn serialize_listing(
    records: &[Record],
    only: Option<&[&str]>,
) -> anyhow::Result<Value> {
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let mut value = record.to_value()?;
        if let (Some(only), Value::Object(object)) = (only, &mut value) {
            object.retain(|key, _| only.contains(&key.as_str()));
        }
        items.push(value);
    }
    Ok(Value::Array(items))
}
