use crate::db::StoreError;
use crate::models::results::{DeleteResult, InsertOneResult, UpdateResult};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A stored JSON object. Every persisted document carries a string `_id`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, Value),
    ContainsIgnoreCase(String, String),
}

/// Conjunction of field conditions. Paths may be dotted (`buyer.email`).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn eq(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(path.to_string(), value.into()));
        self
    }

    pub fn contains_ignore_case(mut self, path: &str, needle: &str) -> Self {
        self.conditions.push(Condition::ContainsIgnoreCase(
            path.to_string(),
            needle.to_lowercase(),
        ));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(path, expected) => lookup(doc, path) == Some(expected),
            Condition::ContainsIgnoreCase(path, needle) => lookup(doc, path)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(needle.as_str())),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: &str, order: SortOrder) -> Self {
        Sort {
            field: field.to_string(),
            order,
        }
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = compare_values(lookup(a, &self.field), lookup(b, &self.field));
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

// Missing and null first, then numbers, then strings, then everything else.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(_) => 3,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// One named collection of JSON documents, backed by a sled tree keyed by `_id`.
#[derive(Clone)]
pub struct Collection {
    tree: sled::Tree,
    db: sled::Db,
}

impl Collection {
    pub fn new(tree: sled::Tree, db: sled::Db) -> Self {
        Collection { tree, db }
    }

    fn decode(key: &[u8], bytes: &[u8]) -> Result<Document, StoreError> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(doc) => Ok(doc),
            _ => Err(StoreError::Corrupt(String::from_utf8_lossy(key).into_owned())),
        }
    }

    /// Monotonic ids, so key order is insertion order.
    fn next_id(&self) -> Result<String, StoreError> {
        Ok(format!("{:024x}", self.db.generate_id()?))
    }

    pub fn insert_one(&self, mut doc: Document) -> Result<InsertOneResult, StoreError> {
        let id = self.next_id()?;
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        self.tree.insert(id.as_bytes(), serde_json::to_vec(&doc)?)?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    /// All matching documents, in natural order unless `sort` is given.
    pub fn find(&self, filter: &Filter, sort: Option<&Sort>) -> Result<Vec<Document>, StoreError> {
        let mut docs = Vec::new();
        for entry in self.tree.iter() {
            let (key, bytes) = entry?;
            let doc = Self::decode(&key, &bytes)?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }

        if let Some(sort) = sort {
            docs.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(docs)
    }

    pub fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        for entry in self.tree.iter() {
            let (key, bytes) = entry?;
            let doc = Self::decode(&key, &bytes)?;
            if filter.matches(&doc) {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        self.tree
            .get(id.as_bytes())?
            .map(|bytes| Self::decode(id.as_bytes(), &bytes))
            .transpose()
    }

    /// `$set` the given top-level fields on the document with `id`. With `upsert`,
    /// a missing document is created from the fields under that id.
    pub fn update_by_id(
        &self,
        id: &str,
        mut fields: Document,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        fields.remove(ID_FIELD);

        self.read_modify_write(id, |current| match current {
            Some(existing) => {
                let mut updated = existing.clone();
                updated.extend(fields.clone());
                if updated == existing {
                    Ok((None, UpdateResult::matched(false)))
                } else {
                    Ok((Some(updated), UpdateResult::matched(true)))
                }
            }
            None if upsert => {
                let mut created = fields.clone();
                created.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
                Ok((Some(created), UpdateResult::upserted(id.to_string())))
            }
            None => Ok((None, UpdateResult::unmatched())),
        })
    }

    /// `$inc` a numeric field; a missing field counts as zero.
    pub fn increment(&self, id: &str, field: &str, by: i64) -> Result<UpdateResult, StoreError> {
        self.read_modify_write(id, |current| {
            let Some(mut doc) = current else {
                return Ok((None, UpdateResult::unmatched()));
            };

            let value = match doc.get(field) {
                None | Some(Value::Null) => 0,
                Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                    StoreError::Corrupt(format!("{id}: non-integer `{field}`"))
                })?,
                Some(_) => {
                    return Err(StoreError::Corrupt(format!("{id}: non-numeric `{field}`")));
                }
            };
            let value = value
                .checked_add(by)
                .ok_or_else(|| StoreError::Corrupt(format!("{id}: `{field}` overflow")))?;
            doc.insert(field.to_string(), Value::from(value));
            Ok((Some(doc), UpdateResult::matched(true)))
        })
    }

    pub fn delete_by_id(&self, id: &str) -> Result<DeleteResult, StoreError> {
        let removed = self.tree.remove(id.as_bytes())?;
        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: u64::from(removed.is_some()),
        })
    }

    /// Compare-and-swap loop over one document. `apply` returns the replacement
    /// (or `None` to leave the key untouched) plus the outcome to report; it is
    /// re-run if another writer changed the document in between.
    fn read_modify_write<T, F>(&self, id: &str, mut apply: F) -> Result<T, StoreError>
    where
        F: FnMut(Option<Document>) -> Result<(Option<Document>, T), StoreError>,
    {
        loop {
            let current = self.tree.get(id.as_bytes())?;
            let doc = current
                .as_ref()
                .map(|bytes| Self::decode(id.as_bytes(), bytes))
                .transpose()?;

            let (replacement, outcome) = apply(doc)?;
            let Some(replacement) = replacement else {
                return Ok(outcome);
            };

            let encoded = serde_json::to_vec(&replacement)?;
            if self
                .tree
                .compare_and_swap(id.as_bytes(), current, Some(encoded))?
                .is_ok()
            {
                return Ok(outcome);
            }
        }
    }
}
