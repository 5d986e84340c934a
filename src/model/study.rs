use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published study; owns a collection of analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub id: Id,
    pub name: Option<String>,
    pub description: Option<String>,
    pub doi: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Study {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            name: None,
            description: None,
            doi: None,
            created_at: Utc::now(),
        }
    }
}
