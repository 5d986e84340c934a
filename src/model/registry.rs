use crate::model::{EntityKind, Filter};

/// Wire type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Float,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

/// A nested collection field and the entity kind its elements carry.
#[derive(Debug, Clone, Copy)]
pub struct NestedField {
    pub field: &'static str,
    pub child: EntityKind,
}

/// Per-entity-kind resource declaration: scalar fields, nested collections,
/// searchable fields, optional list projection and optional custom search
/// hook. Resolved statically; there is no runtime name-to-type lookup.
pub struct ResourceSpec {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
    pub nested: &'static [NestedField],
    pub search_fields: &'static [&'static str],
    pub only: Option<&'static [&'static str]>,
    pub custom_search: Option<fn(&str) -> Filter>,
}

impl ResourceSpec {
    pub fn is_nested_field(&self, name: &str) -> bool {
        self.nested.iter().any(|n| n.field == name)
    }

    pub fn scalar(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Text,
    }
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Float,
    }
}

static DATASET: ResourceSpec = ResourceSpec {
    kind: EntityKind::Dataset,
    fields: &[text("name"), text("description")],
    nested: &[],
    search_fields: &[],
    only: None,
    custom_search: None,
};

static STUDY: ResourceSpec = ResourceSpec {
    kind: EntityKind::Study,
    fields: &[text("name"), text("description"), text("doi")],
    nested: &[NestedField {
        field: "analyses",
        child: EntityKind::Analysis,
    }],
    search_fields: &["name", "description"],
    only: Some(&["id", "name", "description", "doi", "created_at"]),
    custom_search: None,
};

static ANALYSIS: ResourceSpec = ResourceSpec {
    kind: EntityKind::Analysis,
    fields: &[text("name"), text("description")],
    nested: &[
        NestedField {
            field: "images",
            child: EntityKind::Image,
        },
        NestedField {
            field: "points",
            child: EntityKind::Point,
        },
    ],
    search_fields: &["name", "description"],
    only: None,
    custom_search: Some(parent_study_search),
};

static CONDITION: ResourceSpec = ResourceSpec {
    kind: EntityKind::Condition,
    fields: &[text("name"), text("description")],
    nested: &[],
    search_fields: &[],
    only: None,
    custom_search: None,
};

static IMAGE: ResourceSpec = ResourceSpec {
    kind: EntityKind::Image,
    fields: &[text("path"), text("space"), text("value_type")],
    nested: &[],
    search_fields: &["path", "space", "value_type"],
    only: None,
    custom_search: None,
};

static POINT: ResourceSpec = ResourceSpec {
    kind: EntityKind::Point,
    fields: &[
        float("x"),
        float("y"),
        float("z"),
        text("space"),
        text("kind"),
    ],
    nested: &[NestedField {
        field: "values",
        child: EntityKind::PointValue,
    }],
    search_fields: &[],
    only: None,
    custom_search: None,
};

static POINT_VALUE: ResourceSpec = ResourceSpec {
    kind: EntityKind::PointValue,
    fields: &[text("kind"), float("value")],
    nested: &[],
    search_fields: &[],
    only: None,
    custom_search: None,
};

/// Analyses are also searchable through their parent study's name.
fn parent_study_search(term: &str) -> Filter {
    Filter::ParentContains {
        parent: EntityKind::Study,
        fields: vec!["name".to_string()],
        term: term.to_string(),
    }
}

pub fn resource_spec(kind: EntityKind) -> &'static ResourceSpec {
    match kind {
        EntityKind::Dataset => &DATASET,
        EntityKind::Study => &STUDY,
        EntityKind::Analysis => &ANALYSIS,
        EntityKind::Condition => &CONDITION,
        EntityKind::Image => &IMAGE,
        EntityKind::Point => &POINT,
        EntityKind::PointValue => &POINT_VALUE,
    }
}
