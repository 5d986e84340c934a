use crate::model::{EntityKind, Id, ListQuery, Record};
use anyhow::Result;

/// Full replacement of one parent's child collection: children of `child`
/// kind linked to `parent_id` but absent from `keep` are detached at commit.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationReplacement {
    pub child: EntityKind,
    pub parent: EntityKind,
    pub parent_id: Id,
    pub keep: Vec<Id>,
}

/// An explicit staging transaction. Records accumulate here and become
/// visible only when the store commits the whole set; dropping an uncommitted
/// transaction discards every staged write.
#[derive(Debug, Default)]
pub struct Transaction {
    staged: Vec<Record>,
    replacements: Vec<RelationReplacement>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, record: Record) {
        self.staged.push(record);
    }

    pub fn replace_relation(
        &mut self,
        child: EntityKind,
        parent: EntityKind,
        parent_id: Id,
        keep: Vec<Id>,
    ) {
        self.replacements.push(RelationReplacement {
            child,
            parent,
            parent_id,
            keep,
        });
    }

    pub fn staged(&self) -> &[Record] {
        &self.staged
    }

    pub fn replacements(&self) -> &[RelationReplacement] {
        &self.replacements
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }
}

/// The transactional record store consumed by the resource layer.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up one record by kind and id.
    async fn find(&self, kind: EntityKind, id: Id) -> Result<Option<Record>>;

    /// Build a fresh record of `kind` with a store-assigned id. The record is
    /// not visible until staged and committed.
    async fn new_record(&self, kind: EntityKind) -> Result<Record>;

    /// Records of `child` kind linked to the given parent, ordered by id.
    async fn children_of(
        &self,
        child: EntityKind,
        parent: EntityKind,
        parent_id: Id,
    ) -> Result<Vec<Record>>;

    /// Execute a list query: filter, sort, paginate.
    async fn execute(&self, query: ListQuery) -> Result<Vec<Record>>;

    /// Atomically apply every staged write and relation replacement.
    async fn commit(&self, txn: Transaction) -> Result<()>;
}
