use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A curated collection of studies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Id,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            name: None,
            description: None,
            created_at: Utc::now(),
        }
    }
}
