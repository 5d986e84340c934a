use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use coord_db_rust::routes::create_router;
use coord_db_rust::store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    create_router().with_state(Arc::new(MemoryStore::new()))
}

async fn send(app: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn get_missing_record_is_404() {
    let app = app();
    let (status, body) = send(&app, "GET", "/studies/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("study 42 not found"));
}

#[tokio::test]
async fn post_creates_a_flat_record() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/studies",
        Some(json!({"name": "fresh", "doi": "10.1/x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], json!("fresh"));
    assert_eq!(body["analyses"], json!([]));
    let id = body["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/studies/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["doi"], json!("10.1/x"));
}

#[tokio::test]
async fn post_rejects_nested_collections_and_client_ids() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/studies",
        Some(json!({"id": 7, "name": "x", "analyses": [{"name": "a"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["field_errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"id"));
    assert!(fields.contains(&"analyses"));
}

#[tokio::test]
async fn put_cascades_through_nested_analyses() {
    let app = app();
    let (_, study) = send(&app, "POST", "/studies", Some(json!({"name": "orig"}))).await;
    let study_id = study["id"].as_i64().unwrap();
    let (_, analysis) = send(&app, "POST", "/analyses", Some(json!({"name": "A2"}))).await;
    let analysis_id = analysis["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/studies/{study_id}"),
        Some(json!({
            "id": study_id,
            "name": "X",
            "analyses": [{"name": "A1"}, {"id": analysis_id, "name": "A2-updated"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], json!("X"));
    let analyses = updated["analyses"].as_array().unwrap();
    assert_eq!(analyses.len(), 2);
    assert!(analyses
        .iter()
        .any(|a| a["name"] == json!("A2-updated") && a["id"] == json!(analysis_id)));
    assert!(analyses
        .iter()
        .all(|a| a["study_id"] == json!(study_id)));
}

#[tokio::test]
async fn put_with_mismatched_id_is_422_and_writes_nothing() {
    let app = app();
    let (_, study) = send(&app, "POST", "/studies", Some(json!({"name": "orig"}))).await;
    let study_id = study["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/studies/{study_id}"),
        Some(json!({"id": study_id + 1, "name": "evil"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Missing body id is a mismatch too.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/studies/{study_id}"),
        Some(json!({"name": "evil"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, fetched) = send(&app, "GET", &format!("/studies/{study_id}"), None).await;
    assert_eq!(fetched["name"], json!("orig"));
}

#[tokio::test]
async fn put_reports_field_errors_with_nested_paths() {
    let app = app();
    let (_, study) = send(&app, "POST", "/studies", Some(json!({"name": "orig"}))).await;
    let study_id = study["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/studies/{study_id}"),
        Some(json!({"id": study_id, "analyses": [{"name": 12}]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["field_errors"][0]["field"],
        json!("analyses[0].name")
    );
}

#[tokio::test]
async fn list_searches_projects_and_caps_page_size() {
    let app = app();
    for name in ["Visual ABC", "auditory abc", "motor"] {
        send(&app, "POST", "/studies", Some(json!({"name": name}))).await;
    }

    let (status, body) = send(&app, "GET", "/studies?search=abc&sort=name", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Projection: only the declared fields appear on list output.
    for item in items {
        assert!(item.get("id").is_some());
        assert!(item.get("created_at").is_some());
        assert!(item.get("analyses").is_none());
    }

    let (status, body) = send(&app, "GET", "/studies?page_size=1000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, _) = send(&app, "GET", "/studies?page=50", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A page number at the i64 limit must 404, not overflow.
    let (status, _) = send(
        &app,
        "GET",
        "/studies?page=9223372036854775807",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Integer desc flags are accepted alongside booleans.
    let (status, body) = send(&app, "GET", "/studies?sort=name&desc=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["motor", "auditory abc", "Visual ABC"]);
}

#[tokio::test]
async fn nulled_fields_keep_their_key_in_get_output() {
    let app = app();
    let (_, study) = send(
        &app,
        "POST",
        "/studies",
        Some(json!({"name": "s", "doi": "10.1/x"})),
    )
    .await;
    let study_id = study["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/studies/{study_id}"),
        Some(json!({"id": study_id, "doi": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = send(&app, "GET", &format!("/studies/{study_id}"), None).await;
    assert_eq!(fetched.get("doi"), Some(&Value::Null));
}

#[tokio::test]
async fn list_on_empty_store_is_404() {
    let app = app();
    let (status, _) = send(&app, "GET", "/images", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_sort_column_is_rejected() {
    let app = app();
    send(&app, "POST", "/studies", Some(json!({"name": "s"}))).await;
    let (status, body) = send(&app, "GET", "/studies?sort=citations", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"][0]["field"], json!("sort"));
}

#[tokio::test]
async fn get_returns_the_full_nested_tree() {
    let app = app();
    let (_, study) = send(&app, "POST", "/studies", Some(json!({"name": "deep"}))).await;
    let study_id = study["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/studies/{study_id}"),
        Some(json!({
            "id": study_id,
            "analyses": [{
                "name": "a",
                "points": [{"x": 1.0, "y": 2.0, "z": 3.0, "values": [{"kind": "z", "value": 4.5}]}]
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, tree) = send(&app, "GET", &format!("/studies/{study_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let point = &tree["analyses"][0]["points"][0];
    assert_eq!(point["x"], json!(1.0));
    assert_eq!(point["values"][0]["value"], json!(4.5));
}
