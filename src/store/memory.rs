use crate::model::{EntityKind, Filter, Id, ListQuery, Record};
use crate::store::traits::{RecordStore, Transaction};
use anyhow::Result;
use itertools::Itertools;
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

type Tables = HashMap<EntityKind, BTreeMap<Id, Record>>;

/// In-memory transactional record store.
///
/// All writes for one transaction are applied under a single write lock, so a
/// committed upsert tree becomes visible as a whole or not at all. Reads take
/// the read lock only.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

struct Inner {
    tables: Tables,
    next_id: Id,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                tables: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored records of one kind (test and seed reporting).
    pub fn count(&self, kind: EntityKind) -> usize {
        self.inner
            .read()
            .tables
            .get(&kind)
            .map(|t| t.len())
            .unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn find(&self, kind: EntityKind, id: Id) -> Result<Option<Record>> {
        let inner = self.inner.read();
        Ok(inner.tables.get(&kind).and_then(|t| t.get(&id)).cloned())
    }

    async fn new_record(&self, kind: EntityKind) -> Result<Record> {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        Ok(Record::new(kind, id))
    }

    async fn children_of(
        &self,
        child: EntityKind,
        parent: EntityKind,
        parent_id: Id,
    ) -> Result<Vec<Record>> {
        let inner = self.inner.read();
        let rows = inner
            .tables
            .get(&child)
            .map(|table| {
                table
                    .values()
                    .filter(|r| r.parent_of(parent) == Some(parent_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn execute(&self, query: ListQuery) -> Result<Vec<Record>> {
        let inner = self.inner.read();
        let empty = BTreeMap::new();
        let table = inner.tables.get(&query.kind).unwrap_or(&empty);

        let mut rows: Vec<Record> = table
            .values()
            .filter(|record| match &query.filter {
                Some(filter) => matches(&inner.tables, record, filter),
                None => true,
            })
            .cloned()
            .sorted_by(|a, b| compare_records(a, b, &query.sort.column))
            .collect();
        if query.sort.descending {
            rows.reverse();
        }

        let start = query.offset();
        if start >= rows.len() {
            return Ok(Vec::new());
        }
        let end = (start + query.page_size as usize).min(rows.len());
        Ok(rows[start..end].to_vec())
    }

    async fn commit(&self, txn: Transaction) -> Result<()> {
        let mut inner = self.inner.write();
        let staged = txn.staged_count();

        for record in txn.staged() {
            // Keep the id sequence ahead of any client-supplied ids.
            if record.id() >= inner.next_id {
                inner.next_id = record.id() + 1;
            }
            inner
                .tables
                .entry(record.kind())
                .or_default()
                .insert(record.id(), record.clone());
        }

        for replacement in txn.replacements() {
            if let Some(table) = inner.tables.get_mut(&replacement.child) {
                for record in table.values_mut() {
                    if record.parent_of(replacement.parent) == Some(replacement.parent_id)
                        && !replacement.keep.contains(&record.id())
                    {
                        record.clear_parent(replacement.parent);
                    }
                }
            }
        }

        log::debug!("committed {} staged record(s)", staged);
        Ok(())
    }
}

fn matches(tables: &Tables, record: &Record, filter: &Filter) -> bool {
    match filter {
        Filter::Contains { fields, term } => {
            let term = term.to_lowercase();
            fields
                .iter()
                .any(|field| field_contains(record, field, &term))
        }
        Filter::ParentContains {
            parent,
            fields,
            term,
        } => {
            let term = term.to_lowercase();
            match record
                .parent_of(*parent)
                .and_then(|id| tables.get(parent).and_then(|t| t.get(&id)))
            {
                Some(parent_record) => fields
                    .iter()
                    .any(|field| field_contains(parent_record, field, &term)),
                None => false,
            }
        }
        Filter::Or(filters) => filters.iter().any(|f| matches(tables, record, f)),
    }
}

fn field_contains(record: &Record, field: &str, term_lower: &str) -> bool {
    match record.field(field) {
        Some(Value::String(s)) => s.to_lowercase().contains(term_lower),
        _ => false,
    }
}

fn compare_records(a: &Record, b: &Record, column: &str) -> Ordering {
    match column {
        "created_at" => a.created_at().cmp(&b.created_at()),
        "id" => a.id().cmp(&b.id()),
        _ => compare_values(a.field(column), b.field(column)),
    }
}

// Nulls first, then numbers, then strings; mirrors a relational ORDER BY
// closely enough for the scalar columns this model declares.
fn compare_values(a: Option<Value>, b: Option<Value>) -> Ordering {
    fn rank(v: &Option<Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(_) => 3,
        }
    }
    match (&a, &b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(&a).cmp(&rank(&b)),
    }
}
