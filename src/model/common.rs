use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned record identifier, unique per entity kind.
pub type Id = i64;

/// The closed set of entity types served by this API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Dataset,
    Study,
    Analysis,
    Condition,
    Image,
    Point,
    PointValue,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Dataset => "dataset",
            EntityKind::Study => "study",
            EntityKind::Analysis => "analysis",
            EntityKind::Condition => "condition",
            EntityKind::Image => "image",
            EntityKind::Point => "point",
            EntityKind::PointValue => "point_value",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
