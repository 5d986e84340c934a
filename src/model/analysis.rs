use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single analysis within a study; owns images and points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: Id,
    pub study_id: Option<Id>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            study_id: None,
            name: None,
            description: None,
            created_at: Utc::now(),
        }
    }
}
