use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::RecordStore;

pub fn create_router<S: RecordStore + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Object resources
        .route("/datasets/:id", get(handlers::get_dataset::<S>))
        .route("/datasets/:id", put(handlers::put_dataset::<S>))
        .route("/studies/:id", get(handlers::get_study::<S>))
        .route("/studies/:id", put(handlers::put_study::<S>))
        .route("/analyses/:id", get(handlers::get_analysis::<S>))
        .route("/analyses/:id", put(handlers::put_analysis::<S>))
        .route("/conditions/:id", get(handlers::get_condition::<S>))
        .route("/conditions/:id", put(handlers::put_condition::<S>))
        .route("/images/:id", get(handlers::get_image::<S>))
        .route("/images/:id", put(handlers::put_image::<S>))
        .route("/points/:id", get(handlers::get_point::<S>))
        .route("/points/:id", put(handlers::put_point::<S>))
        .route("/point-values/:id", get(handlers::get_point_value::<S>))
        .route("/point-values/:id", put(handlers::put_point_value::<S>))
        // List resources
        .route("/studies", get(handlers::list_studies::<S>))
        .route("/studies", post(handlers::create_study::<S>))
        .route("/analyses", get(handlers::list_analyses::<S>))
        .route("/analyses", post(handlers::create_analysis::<S>))
        .route("/images", get(handlers::list_images::<S>))
        .route("/images", post(handlers::create_image::<S>))
}
