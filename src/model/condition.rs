use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An experimental condition referenced by analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: Id,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Condition {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            name: None,
            description: None,
            created_at: Utc::now(),
        }
    }
}
