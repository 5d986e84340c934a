use crate::model::EntityKind;

/// A predicate over records of one entity kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Case-insensitive substring match, OR'd across the named fields.
    Contains {
        fields: Vec<String>,
        term: String,
    },
    /// Match records whose linked parent of `parent` kind has a field
    /// containing the term (used by custom search hooks).
    ParentContains {
        parent: EntityKind,
        fields: Vec<String>,
        term: String,
    },
    Or(Vec<Filter>),
}

impl Filter {
    pub fn contains(fields: &[&str], term: &str) -> Self {
        Filter::Contains {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            term: term.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub column: String,
    pub descending: bool,
}

/// A fully built list query, executed by the record store.
///
/// Built with the chainable `filter` / `order_by` / `paginate` methods; the
/// defaults match a bare list request (newest first, first page of 20).
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub kind: EntityKind,
    pub filter: Option<Filter>,
    pub sort: SortSpec,
    pub page: i64,
    pub page_size: i64,
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

impl ListQuery {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            filter: None,
            sort: SortSpec {
                column: "created_at".to_string(),
                descending: true,
            },
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, column: &str, descending: bool) -> Self {
        self.sort = SortSpec {
            column: column.to_string(),
            descending,
        };
        self
    }

    /// 1-indexed pagination; the page size is clamped to 1..=100.
    pub fn paginate(mut self, page: i64, page_size: i64) -> Self {
        self.page = page.max(1);
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn offset(&self) -> usize {
        // Saturating: an absurd page number becomes an empty page, not a
        // multiply overflow.
        (self.page - 1).saturating_mul(self.page_size) as usize
    }
}
