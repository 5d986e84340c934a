use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An activation coordinate reported by an analysis; owns point values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: Id,
    pub analysis_id: Option<Id>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub space: Option<String>,
    pub kind: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Point {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            analysis_id: None,
            x: None,
            y: None,
            z: None,
            space: None,
            kind: None,
            created_at: Utc::now(),
        }
    }
}

/// A scalar statistic attached to a point (e.g. a z-score).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointValue {
    pub id: Id,
    pub point_id: Option<Id>,
    pub kind: Option<String>,
    pub value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl PointValue {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            point_id: None,
            kind: None,
            value: None,
            created_at: Utc::now(),
        }
    }
}
