//! Generic update-or-create over a nested object graph.
//!
//! The outer call owns the one `Transaction` and commits exactly once; the
//! recursion only stages. Any lookup or validation failure anywhere in the
//! tree surfaces before commit, so the store never sees a partial graph.

use crate::error::{ApiError, FieldError};
use crate::model::{resource_spec, EntityKind, Id, Record};
use crate::store::{RecordStore, Transaction};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// Upsert `data` as a record of `kind`, cascading through declared nested
/// collections, and commit the whole tree atomically. Returns the root.
///
/// `id` is the explicitly addressed target (PUT path id); when absent, the
/// payload's own `id` decides between update and create.
pub async fn upsert_tree<S: RecordStore>(
    store: &S,
    kind: EntityKind,
    data: &Map<String, Value>,
    id: Option<Id>,
) -> Result<Record, ApiError> {
    let mut txn = Transaction::new();
    let record = upsert_node(store, kind, data, id, &mut txn).await?;
    txn.stage(record.clone());

    let staged = txn.staged_count();
    store.commit(txn).await?;
    log::info!("upserted {} {} ({} record(s) in one commit)", kind, record.id(), staged);
    Ok(record)
}

fn upsert_node<'a, S: RecordStore>(
    store: &'a S,
    kind: EntityKind,
    data: &'a Map<String, Value>,
    id: Option<Id>,
    txn: &'a mut Transaction,
) -> Pin<Box<dyn Future<Output = Result<Record, ApiError>> + Send + 'a>> {
    Box::pin(async move {
        let spec = resource_spec(kind);

        // No id anywhere means create; a given id must resolve.
        let id = id.or_else(|| data.get("id").and_then(Value::as_i64));
        let mut record = match id {
            None => store.new_record(kind).await?,
            Some(id) => store
                .find(kind, id)
                .await?
                .ok_or(ApiError::NotFound { kind, id: Some(id) })?,
        };

        for (key, value) in data {
            if key == "id" || spec.is_nested_field(key) {
                continue;
            }
            record
                .set_field(key, value)
                .map_err(|e| ApiError::Validation(vec![e]))?;
        }

        let parent_id = record.id();
        for nested in spec.nested {
            let Some(value) = data.get(nested.field) else {
                // Absent collection leaves the relation untouched.
                continue;
            };
            let items = value
                .as_array()
                .ok_or_else(|| bad_collection(nested.field))?;
            let mut keep = Vec::with_capacity(items.len());
            for item in items {
                let child_data = item.as_object().ok_or_else(|| bad_collection(nested.field))?;
                let mut child = upsert_node(store, nested.child, child_data, None, txn).await?;
                child
                    .set_parent(kind, parent_id)
                    .map_err(|e| ApiError::Validation(vec![e]))?;
                keep.push(child.id());
                txn.stage(child);
            }
            // Previously linked children missing from the payload are
            // detached at commit, never deleted.
            txn.replace_relation(nested.child, kind, parent_id, keep);
        }

        Ok(record)
    })
}

fn bad_collection(field: &str) -> ApiError {
    ApiError::Validation(vec![FieldError::new(field, "expected an array of objects")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{load, LoadMode};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn payload(kind: EntityKind, value: serde_json::Value) -> Map<String, Value> {
        load(kind, &value, LoadMode::Update).unwrap()
    }

    async fn seed(store: &MemoryStore, records: Vec<Record>) {
        let mut txn = Transaction::new();
        for record in records {
            txn.stage(record);
        }
        store.commit(txn).await.unwrap();
    }

    fn study(id: Id, name: &str) -> Record {
        let mut r = Record::new(EntityKind::Study, id);
        r.set_field("name", &json!(name)).unwrap();
        r
    }

    fn analysis(id: Id, name: &str, study_id: Option<Id>) -> Record {
        let mut r = Record::new(EntityKind::Analysis, id);
        r.set_field("name", &json!(name)).unwrap();
        if let Some(study_id) = study_id {
            r.set_parent(EntityKind::Study, study_id).unwrap();
        }
        r
    }

    #[tokio::test]
    async fn nested_put_updates_creates_and_links_in_one_commit() {
        let store = MemoryStore::new();
        seed(
            &store,
            vec![study(5, "orig"), analysis(9, "A2", Some(5))],
        )
        .await;

        let data = payload(
            EntityKind::Study,
            json!({
                "id": 5,
                "name": "X",
                "analyses": [{"name": "A1"}, {"id": 9, "name": "A2-updated"}]
            }),
        );
        let root = upsert_tree(&store, EntityKind::Study, &data, Some(5))
            .await
            .unwrap();
        assert_eq!(root.id(), 5);
        assert_eq!(root.field("name"), Some(json!("X")));

        let children = store
            .children_of(EntityKind::Analysis, EntityKind::Study, 5)
            .await
            .unwrap();
        assert_eq!(children.len(), 2);

        let updated = store.find(EntityKind::Analysis, 9).await.unwrap().unwrap();
        assert_eq!(updated.field("name"), Some(json!("A2-updated")));
        assert_eq!(updated.parent_of(EntityKind::Study), Some(5));

        let created = children.iter().find(|c| c.id() != 9).unwrap();
        assert_eq!(created.field("name"), Some(json!("A1")));
        assert_eq!(created.parent_of(EntityKind::Study), Some(5));
    }

    #[tokio::test]
    async fn replaying_a_full_payload_is_idempotent() {
        let store = MemoryStore::new();
        seed(
            &store,
            vec![
                study(5, "orig"),
                analysis(8, "A1", Some(5)),
                analysis(9, "A2", Some(5)),
            ],
        )
        .await;

        let data = payload(
            EntityKind::Study,
            json!({
                "id": 5,
                "name": "renamed",
                "analyses": [{"id": 8, "name": "A1"}, {"id": 9, "name": "A2"}]
            }),
        );
        upsert_tree(&store, EntityKind::Study, &data, Some(5))
            .await
            .unwrap();
        let first = store
            .children_of(EntityKind::Analysis, EntityKind::Study, 5)
            .await
            .unwrap();

        upsert_tree(&store, EntityKind::Study, &data, Some(5))
            .await
            .unwrap();
        let second = store
            .children_of(EntityKind::Analysis, EntityKind::Study, 5)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count(EntityKind::Analysis), 2);
    }

    #[tokio::test]
    async fn unresolvable_nested_id_aborts_the_whole_tree() {
        let store = MemoryStore::new();
        seed(&store, vec![study(5, "orig")]).await;

        let data = payload(
            EntityKind::Study,
            json!({
                "id": 5,
                "name": "should-not-stick",
                "analyses": [{"name": "fresh"}, {"id": 999, "name": "ghost"}]
            }),
        );
        let err = upsert_tree(&store, EntityKind::Study, &data, Some(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::NotFound { kind: EntityKind::Analysis, id: Some(999) }
        ));

        // Nothing committed: root untouched, no children materialized.
        let root = store.find(EntityKind::Study, 5).await.unwrap().unwrap();
        assert_eq!(root.field("name"), Some(json!("orig")));
        assert_eq!(store.count(EntityKind::Analysis), 0);
    }

    #[tokio::test]
    async fn creating_a_deep_tree_assigns_ids_and_links_every_level() {
        let store = MemoryStore::new();
        let data = payload(
            EntityKind::Study,
            json!({
                "name": "deep",
                "analyses": [{
                    "name": "a",
                    "points": [{"x": 1.0, "y": 2.0, "z": 3.0, "values": [{"kind": "z", "value": 4.5}]}],
                    "images": [{"path": "img.nii.gz"}]
                }]
            }),
        );
        let root = upsert_tree(&store, EntityKind::Study, &data, None)
            .await
            .unwrap();

        let analyses = store
            .children_of(EntityKind::Analysis, EntityKind::Study, root.id())
            .await
            .unwrap();
        assert_eq!(analyses.len(), 1);
        let points = store
            .children_of(EntityKind::Point, EntityKind::Analysis, analyses[0].id())
            .await
            .unwrap();
        assert_eq!(points.len(), 1);
        let values = store
            .children_of(EntityKind::PointValue, EntityKind::Point, points[0].id())
            .await
            .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].field("value"), Some(json!(4.5)));
        assert_eq!(
            store
                .children_of(EntityKind::Image, EntityKind::Analysis, analyses[0].id())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn omitted_children_are_detached_not_deleted() {
        let store = MemoryStore::new();
        seed(
            &store,
            vec![study(5, "s"), analysis(9, "A2", Some(5))],
        )
        .await;

        let data = payload(
            EntityKind::Study,
            json!({"id": 5, "analyses": []}),
        );
        upsert_tree(&store, EntityKind::Study, &data, Some(5))
            .await
            .unwrap();

        assert!(store
            .children_of(EntityKind::Analysis, EntityKind::Study, 5)
            .await
            .unwrap()
            .is_empty());
        let orphan = store.find(EntityKind::Analysis, 9).await.unwrap().unwrap();
        assert_eq!(orphan.parent_of(EntityKind::Study), None);
    }

    #[tokio::test]
    async fn absent_collection_key_leaves_the_relation_alone() {
        let store = MemoryStore::new();
        seed(
            &store,
            vec![study(5, "s"), analysis(9, "A2", Some(5))],
        )
        .await;

        let data = payload(EntityKind::Study, json!({"id": 5, "name": "renamed"}));
        upsert_tree(&store, EntityKind::Study, &data, Some(5))
            .await
            .unwrap();

        let children = store
            .children_of(EntityKind::Analysis, EntityKind::Study, 5)
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
    }
}
