//! List request pipeline: translate query parameters into a store query,
//! execute it, and enforce the empty-page rule.

use crate::error::{ApiError, FieldError};
use crate::model::{resource_spec, EntityKind, Filter, ListQuery, Record, DEFAULT_PAGE_SIZE};
use crate::store::RecordStore;
use serde::{Deserialize, Deserializer};

/// Wire parameters of a list request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub desc: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// Query-string flag accepting both boolean and 0/1 spellings.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid flag value: {}",
            other
        ))),
    }
}

/// Build the store query for `kind` from request parameters.
pub fn build_query(kind: EntityKind, params: &ListParams) -> Result<ListQuery, ApiError> {
    let spec = resource_spec(kind);
    let mut query = ListQuery::new(kind);

    if let Some(term) = params.search.as_deref() {
        let mut filters = Vec::new();
        if !spec.search_fields.is_empty() {
            filters.push(Filter::contains(spec.search_fields, term));
        }
        if let Some(hook) = spec.custom_search {
            filters.push(hook(term));
        }
        query = match filters.len() {
            0 => query,
            1 => query.filter(filters.remove(0)),
            _ => query.filter(Filter::Or(filters)),
        };
    }

    let column = params.sort.as_deref().unwrap_or("created_at");
    let sortable = column == "created_at" || column == "id" || spec.scalar(column).is_some();
    if !sortable {
        return Err(ApiError::Validation(vec![FieldError::new(
            "sort",
            format!("{} is not a sortable column of {}", column, kind),
        )]));
    }
    // Newest first by default, ascending for any explicit column.
    let descending = params.desc.unwrap_or(column == "created_at");
    query = query.order_by(column, descending);

    Ok(query.paginate(
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    ))
}

/// Execute a list request. An empty result page is a `NotFound`.
pub async fn list_records<S: RecordStore>(
    store: &S,
    kind: EntityKind,
    params: &ListParams,
) -> Result<Vec<Record>, ApiError> {
    let query = build_query(kind, params)?;
    log::debug!(
        "listing {} page={} page_size={} search={:?}",
        kind,
        query.page,
        query.page_size,
        params.search
    );
    let records = store.execute(query).await?;
    if records.is_empty() {
        return Err(ApiError::NotFound { kind, id: None });
    }
    Ok(records)
}
