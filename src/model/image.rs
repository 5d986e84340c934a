use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A statistical map produced by an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: Id,
    pub analysis_id: Option<Id>,
    pub path: Option<String>,
    pub space: Option<String>,
    pub value_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Image {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            analysis_id: None,
            path: None,
            space: None,
            value_type: None,
            created_at: Utc::now(),
        }
    }
}
