use crate::error::FieldError;
use crate::model::{Analysis, Condition, Dataset, EntityKind, Id, Image, Point, PointValue, Study};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

/// A single stored row of any entity kind.
///
/// Field access goes through an explicit per-kind whitelist rather than any
/// reflective mechanism; unknown names are a `FieldError`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Dataset(Dataset),
    Study(Study),
    Analysis(Analysis),
    Condition(Condition),
    Image(Image),
    Point(Point),
    PointValue(PointValue),
}

impl Record {
    pub fn new(kind: EntityKind, id: Id) -> Self {
        match kind {
            EntityKind::Dataset => Record::Dataset(Dataset::new(id)),
            EntityKind::Study => Record::Study(Study::new(id)),
            EntityKind::Analysis => Record::Analysis(Analysis::new(id)),
            EntityKind::Condition => Record::Condition(Condition::new(id)),
            EntityKind::Image => Record::Image(Image::new(id)),
            EntityKind::Point => Record::Point(Point::new(id)),
            EntityKind::PointValue => Record::PointValue(PointValue::new(id)),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Dataset(_) => EntityKind::Dataset,
            Record::Study(_) => EntityKind::Study,
            Record::Analysis(_) => EntityKind::Analysis,
            Record::Condition(_) => EntityKind::Condition,
            Record::Image(_) => EntityKind::Image,
            Record::Point(_) => EntityKind::Point,
            Record::PointValue(_) => EntityKind::PointValue,
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Record::Dataset(r) => r.id,
            Record::Study(r) => r.id,
            Record::Analysis(r) => r.id,
            Record::Condition(r) => r.id,
            Record::Image(r) => r.id,
            Record::Point(r) => r.id,
            Record::PointValue(r) => r.id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Record::Dataset(r) => r.created_at,
            Record::Study(r) => r.created_at,
            Record::Analysis(r) => r.created_at,
            Record::Condition(r) => r.created_at,
            Record::Image(r) => r.created_at,
            Record::Point(r) => r.created_at,
            Record::PointValue(r) => r.created_at,
        }
    }

    /// Read a field by wire name. Returns `None` for unknown names.
    pub fn field(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return Some(json!(self.id()));
        }
        if name == "created_at" {
            return Some(json!(self.created_at().to_rfc3339()));
        }
        match self {
            Record::Dataset(r) => match name {
                "name" => Some(opt_text(&r.name)),
                "description" => Some(opt_text(&r.description)),
                _ => None,
            },
            Record::Study(r) => match name {
                "name" => Some(opt_text(&r.name)),
                "description" => Some(opt_text(&r.description)),
                "doi" => Some(opt_text(&r.doi)),
                _ => None,
            },
            Record::Analysis(r) => match name {
                "study_id" => Some(opt_id(&r.study_id)),
                "name" => Some(opt_text(&r.name)),
                "description" => Some(opt_text(&r.description)),
                _ => None,
            },
            Record::Condition(r) => match name {
                "name" => Some(opt_text(&r.name)),
                "description" => Some(opt_text(&r.description)),
                _ => None,
            },
            Record::Image(r) => match name {
                "analysis_id" => Some(opt_id(&r.analysis_id)),
                "path" => Some(opt_text(&r.path)),
                "space" => Some(opt_text(&r.space)),
                "value_type" => Some(opt_text(&r.value_type)),
                _ => None,
            },
            Record::Point(r) => match name {
                "analysis_id" => Some(opt_id(&r.analysis_id)),
                "x" => Some(opt_float(&r.x)),
                "y" => Some(opt_float(&r.y)),
                "z" => Some(opt_float(&r.z)),
                "space" => Some(opt_text(&r.space)),
                "kind" => Some(opt_text(&r.kind)),
                _ => None,
            },
            Record::PointValue(r) => match name {
                "point_id" => Some(opt_id(&r.point_id)),
                "kind" => Some(opt_text(&r.kind)),
                "value" => Some(opt_float(&r.value)),
                _ => None,
            },
        }
    }

    /// Apply one scalar field from a wire value.
    ///
    /// `id`, parent links and nested collections are managed elsewhere and are
    /// rejected here like any other unknown name.
    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<(), FieldError> {
        match self {
            Record::Dataset(r) => match name {
                "name" => set_text(&mut r.name, name, value),
                "description" => set_text(&mut r.description, name, value),
                _ => Err(FieldError::unknown(name)),
            },
            Record::Study(r) => match name {
                "name" => set_text(&mut r.name, name, value),
                "description" => set_text(&mut r.description, name, value),
                "doi" => set_text(&mut r.doi, name, value),
                _ => Err(FieldError::unknown(name)),
            },
            Record::Analysis(r) => match name {
                "name" => set_text(&mut r.name, name, value),
                "description" => set_text(&mut r.description, name, value),
                _ => Err(FieldError::unknown(name)),
            },
            Record::Condition(r) => match name {
                "name" => set_text(&mut r.name, name, value),
                "description" => set_text(&mut r.description, name, value),
                _ => Err(FieldError::unknown(name)),
            },
            Record::Image(r) => match name {
                "path" => set_text(&mut r.path, name, value),
                "space" => set_text(&mut r.space, name, value),
                "value_type" => set_text(&mut r.value_type, name, value),
                _ => Err(FieldError::unknown(name)),
            },
            Record::Point(r) => match name {
                "x" => set_float(&mut r.x, name, value),
                "y" => set_float(&mut r.y, name, value),
                "z" => set_float(&mut r.z, name, value),
                "space" => set_text(&mut r.space, name, value),
                "kind" => set_text(&mut r.kind, name, value),
                _ => Err(FieldError::unknown(name)),
            },
            Record::PointValue(r) => match name {
                "kind" => set_text(&mut r.kind, name, value),
                "value" => set_float(&mut r.value, name, value),
                _ => Err(FieldError::unknown(name)),
            },
        }
    }

    /// The id of this record's parent of the given kind, if such a link exists.
    pub fn parent_of(&self, parent: EntityKind) -> Option<Id> {
        match (self, parent) {
            (Record::Analysis(r), EntityKind::Study) => r.study_id,
            (Record::Image(r), EntityKind::Analysis) => r.analysis_id,
            (Record::Point(r), EntityKind::Analysis) => r.analysis_id,
            (Record::PointValue(r), EntityKind::Point) => r.point_id,
            _ => None,
        }
    }

    /// Link this record to a parent of the given kind.
    pub fn set_parent(&mut self, parent: EntityKind, id: Id) -> Result<(), FieldError> {
        match (&mut *self, parent) {
            (Record::Analysis(r), EntityKind::Study) => r.study_id = Some(id),
            (Record::Image(r), EntityKind::Analysis) => r.analysis_id = Some(id),
            (Record::Point(r), EntityKind::Analysis) => r.analysis_id = Some(id),
            (Record::PointValue(r), EntityKind::Point) => r.point_id = Some(id),
            (record, parent) => {
                return Err(FieldError::new(
                    parent.as_str(),
                    format!("{} records cannot belong to a {}", record.kind(), parent),
                ))
            }
        }
        Ok(())
    }

    /// Remove the link to a parent of the given kind, if present.
    pub fn clear_parent(&mut self, parent: EntityKind) {
        match (&mut *self, parent) {
            (Record::Analysis(r), EntityKind::Study) => r.study_id = None,
            (Record::Image(r), EntityKind::Analysis) => r.analysis_id = None,
            (Record::Point(r), EntityKind::Analysis) => r.analysis_id = None,
            (Record::PointValue(r), EntityKind::Point) => r.point_id = None,
            _ => {}
        }
    }

    /// Serialize to a JSON object (flat; nested collections are populated by
    /// the schema layer).
    pub fn to_value(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn opt_text(v: &Option<String>) -> Value {
    v.clone().map(Value::String).unwrap_or(Value::Null)
}

fn opt_float(v: &Option<f64>) -> Value {
    v.map(|f| json!(f)).unwrap_or(Value::Null)
}

fn opt_id(v: &Option<Id>) -> Value {
    v.map(|i| json!(i)).unwrap_or(Value::Null)
}

fn set_text(slot: &mut Option<String>, field: &str, value: &Value) -> Result<(), FieldError> {
    match value {
        Value::Null => {
            *slot = None;
            Ok(())
        }
        Value::String(s) => {
            *slot = Some(s.clone());
            Ok(())
        }
        _ => Err(FieldError::new(field, "expected a string or null")),
    }
}

fn set_float(slot: &mut Option<f64>, field: &str, value: &Value) -> Result<(), FieldError> {
    match value {
        Value::Null => {
            *slot = None;
            Ok(())
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                *slot = Some(f);
                Ok(())
            }
            None => Err(FieldError::new(field, "expected a finite number")),
        },
        _ => Err(FieldError::new(field, "expected a number or null")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_fields_round_trip_through_the_whitelist() {
        let mut record = Record::new(EntityKind::Study, 1);
        record.set_field("name", &json!("A study")).unwrap();
        record.set_field("doi", &json!("10.1000/xyz")).unwrap();
        assert_eq!(record.field("name"), Some(json!("A study")));
        assert_eq!(record.field("doi"), Some(json!("10.1000/xyz")));

        record.set_field("doi", &Value::Null).unwrap();
        assert_eq!(record.field("doi"), Some(Value::Null));
    }

    #[test]
    fn cleared_fields_serialize_as_explicit_nulls() {
        let mut record = Record::new(EntityKind::Study, 1);
        record.set_field("doi", &json!("10.1000/xyz")).unwrap();
        record.set_field("doi", &Value::Null).unwrap();

        let value = record.to_value().unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("doi"));
        assert_eq!(object["doi"], Value::Null);
        // Never-set fields keep their key too, so GET output is shape-stable.
        assert_eq!(object["name"], Value::Null);
    }

    #[test]
    fn unknown_and_mistyped_fields_are_rejected() {
        let mut record = Record::new(EntityKind::Study, 1);
        let err = record.set_field("publisher", &json!("x")).unwrap_err();
        assert_eq!(err.field, "publisher");

        let err = record.set_field("name", &json!(3)).unwrap_err();
        assert_eq!(err.field, "name");
        assert!(err.message.contains("string"));
    }

    #[test]
    fn parent_links_only_exist_where_declared() {
        let mut analysis = Record::new(EntityKind::Analysis, 2);
        analysis.set_parent(EntityKind::Study, 7).unwrap();
        assert_eq!(analysis.parent_of(EntityKind::Study), Some(7));

        analysis.clear_parent(EntityKind::Study);
        assert_eq!(analysis.parent_of(EntityKind::Study), None);

        let mut dataset = Record::new(EntityKind::Dataset, 3);
        assert!(dataset.set_parent(EntityKind::Study, 7).is_err());
    }
}
