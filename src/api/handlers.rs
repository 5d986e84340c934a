use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::logic::{list_records, upsert_tree, ListParams};
use crate::model::{resource_spec, EntityKind, Id};
use crate::schema::{self, LoadMode};
use crate::store::{RecordStore, Transaction};

pub type AppState<S> = Arc<S>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// Shared object/list operations; the per-resource handlers below only bind an
// entity kind to a route.

async fn fetch_one<S: RecordStore>(store: &S, kind: EntityKind, id: Id) -> Result<Json<Value>, ApiError> {
    let record = store
        .find(kind, id)
        .await?
        .ok_or(ApiError::NotFound { kind, id: Some(id) })?;
    Ok(Json(schema::serialize_record(store, &record, true).await?))
}

async fn update_one<S: RecordStore>(
    store: &S,
    kind: EntityKind,
    id: Id,
    payload: Value,
) -> Result<Json<Value>, ApiError> {
    let data = schema::load(kind, &payload, LoadMode::Update).map_err(ApiError::Validation)?;

    let body_id = data.get("id").and_then(Value::as_i64);
    if body_id != Some(id) {
        return Err(ApiError::IdentityMismatch { path: id, body: body_id });
    }

    let record = upsert_tree(store, kind, &data, Some(id)).await?;
    Ok(Json(schema::serialize_record(store, &record, true).await?))
}

async fn list_page<S: RecordStore>(
    store: &S,
    kind: EntityKind,
    params: ListParams,
) -> Result<Json<Value>, ApiError> {
    let records = list_records(store, kind, &params).await?;
    let only = resource_spec(kind).only;
    Ok(Json(schema::serialize_listing(&records, only)?))
}

async fn create_one<S: RecordStore>(
    store: &S,
    kind: EntityKind,
    payload: Value,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let data = schema::load(kind, &payload, LoadMode::Create).map_err(ApiError::Validation)?;

    let mut record = store.new_record(kind).await?;
    for (key, value) in &data {
        record
            .set_field(key, value)
            .map_err(|e| ApiError::Validation(vec![e]))?;
    }

    let mut txn = Transaction::new();
    txn.stage(record.clone());
    store.commit(txn).await?;
    log::info!("created {} {}", kind, record.id());

    let body = schema::serialize_record(store, &record, true).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

macro_rules! object_resource {
    ($get:ident, $put:ident, $kind:expr) => {
        pub async fn $get<S: RecordStore>(
            State(store): State<AppState<S>>,
            Path(id): Path<Id>,
        ) -> Result<Json<Value>, ApiError> {
            fetch_one(store.as_ref(), $kind, id).await
        }

        pub async fn $put<S: RecordStore>(
            State(store): State<AppState<S>>,
            Path(id): Path<Id>,
            RequestJson(payload): RequestJson<Value>,
        ) -> Result<Json<Value>, ApiError> {
            update_one(store.as_ref(), $kind, id, payload).await
        }
    };
}

macro_rules! list_resource {
    ($list:ident, $create:ident, $kind:expr) => {
        pub async fn $list<S: RecordStore>(
            State(store): State<AppState<S>>,
            Query(params): Query<ListParams>,
        ) -> Result<Json<Value>, ApiError> {
            list_page(store.as_ref(), $kind, params).await
        }

        pub async fn $create<S: RecordStore>(
            State(store): State<AppState<S>>,
            RequestJson(payload): RequestJson<Value>,
        ) -> Result<(StatusCode, Json<Value>), ApiError> {
            create_one(store.as_ref(), $kind, payload).await
        }
    };
}

object_resource!(get_dataset, put_dataset, EntityKind::Dataset);
object_resource!(get_study, put_study, EntityKind::Study);
object_resource!(get_analysis, put_analysis, EntityKind::Analysis);
object_resource!(get_condition, put_condition, EntityKind::Condition);
object_resource!(get_image, put_image, EntityKind::Image);
object_resource!(get_point, put_point, EntityKind::Point);
object_resource!(get_point_value, put_point_value, EntityKind::PointValue);

list_resource!(list_studies, create_study, EntityKind::Study);
list_resource!(list_analyses, create_analysis, EntityKind::Analysis);
list_resource!(list_images, create_image, EntityKind::Image);
