//! In-memory document store

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use shared::{Cursor, Filter, FilterOp, Page, Sort, SortDirection};
use tokio::sync::RwLock;

use super::{ensure_id, Document, DocumentStore, KeysetPosition, StoreError};

/// Collections kept in process memory, in insertion order
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string, values of
/// other types compare equal within their rank.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn field<'a>(record: &'a Document, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&Value::Null)
}

fn same_type(a: &Value, b: &Value) -> bool {
    type_rank(a) == type_rank(b)
}

fn matches(record: &Document, filter: &Filter) -> Result<bool, StoreError> {
    let actual = field(record, &filter.field);
    let expected = &filter.value;
    let ordered = |want: fn(Ordering) -> bool| {
        same_type(actual, expected) && want(compare_values(actual, expected))
    };

    Ok(match filter.op {
        FilterOp::Eq => ordered(Ordering::is_eq),
        FilterOp::Ne => !ordered(Ordering::is_eq),
        FilterOp::Gt => ordered(Ordering::is_gt),
        FilterOp::Gte => ordered(Ordering::is_ge),
        FilterOp::Lt => ordered(Ordering::is_lt),
        FilterOp::Lte => ordered(Ordering::is_le),
        FilterOp::In => {
            let options = expected
                .as_array()
                .ok_or_else(|| StoreError::UnsupportedFilter(filter.field.clone()))?;
            options
                .iter()
                .any(|option| same_type(actual, option) && compare_values(actual, option).is_eq())
        }
        FilterOp::Contains => {
            let needle = expected
                .as_str()
                .ok_or_else(|| StoreError::UnsupportedFilter(filter.field.clone()))?;
            actual
                .as_str()
                .map(|hay| hay.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false)
        }
    })
}

fn record_id(record: &Document) -> &str {
    field(record, shared::ID_FIELD).as_str().unwrap_or_default()
}

/// Ordering of `(value, id)` keys in the requested direction
fn keyset_order(
    direction: SortDirection,
    (a_value, a_id): (&Value, &str),
    (b_value, b_id): (&Value, &str),
) -> Ordering {
    let ascending = compare_values(a_value, b_value).then_with(|| a_id.cmp(b_id));
    match direction {
        SortDirection::Asc => ascending,
        SortDirection::Desc => ascending.reverse(),
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        sort: &Sort,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> Result<Page<Document>, StoreError> {
        let position = cursor
            .map(|c| KeysetPosition::decode(c, sort))
            .transpose()?;

        let collections = self.collections.read().await;
        let records = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let mut selected = Vec::new();
        for record in records {
            let mut keep = true;
            for filter in filters {
                if !matches(record, filter)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                selected.push(record);
            }
        }

        selected.sort_by(|a, b| {
            keyset_order(
                sort.direction,
                (field(a, &sort.field), record_id(a)),
                (field(b, &sort.field), record_id(b)),
            )
        });

        let limit = limit as usize;
        let mut items: Vec<Document> = selected
            .into_iter()
            .filter(|record| match &position {
                Some(after) => keyset_order(
                    sort.direction,
                    (field(record, &sort.field), record_id(record)),
                    (&after.value, after.id.as_str()),
                )
                .is_gt(),
                None => true,
            })
            .take(limit + 1)
            .cloned()
            .collect();

        let has_more = items.len() > limit;
        items.truncate(limit);

        let next_cursor = match (has_more, items.last()) {
            (true, Some(last)) => Some(KeysetPosition::after(last, sort).encode()?),
            _ => None,
        };

        Ok(Page {
            items,
            next_cursor,
            has_more,
        })
    }

    async fn insert(&self, collection: &str, mut record: Document) -> Result<String, StoreError> {
        let id = ensure_id(&mut record);
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();

        if records.iter().any(|existing| record_id(existing) == id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id,
            });
        }
        records.push(record);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| record_id(r) == id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (key, value) in partial {
            if key != shared::ID_FIELD {
                record.insert(key, value);
            }
        }
        Ok(())
    }
}
