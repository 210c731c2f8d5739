//! Query model shared by the query builder and the document stores

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Cursor, SortDirection, TenantId};

/// Document field holding the owning tenant
pub const TENANT_FIELD: &str = "tenantId";
/// Document field holding the soft-delete flag
pub const ACTIVE_FIELD: &str = "isActive";
/// Document identifier field
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Fields only the query builder may filter on
pub const RESERVED_FILTER_FIELDS: &[&str] = &[TENANT_FIELD, ACTIVE_FIELD];

/// Comparison operators understood by every document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Value must be an array; matches any element
    In,
    /// Case-insensitive substring match on string fields
    Contains,
}

/// A single `(field, operator, value)` predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn contains(field: impl Into<String>, needle: &str) -> Self {
        Self::new(field, FilterOp::Contains, needle)
    }

    pub fn one_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOp::In, Value::Array(values))
    }

    pub fn tenant(tenant_id: &TenantId) -> Self {
        Self::eq(TENANT_FIELD, tenant_id.as_str())
    }

    pub fn active() -> Self {
        Self::eq(ACTIVE_FIELD, true)
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_FILTER_FIELDS.contains(&self.field.as_str())
    }
}

/// Sort key and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// A fully scoped query ready to hand to a document store.
///
/// Filters are conjunctive and their order is significant: stores that pick
/// compound indexes by declaration order rely on the tenant predicate coming
/// first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub sort: Sort,
    pub cursor: Option<Cursor>,
    pub limit: u32,
}

impl QuerySpec {
    /// Same query positioned at `cursor`
    pub fn at_cursor(&self, cursor: Option<Cursor>) -> QuerySpec {
        QuerySpec {
            cursor,
            ..self.clone()
        }
    }

    /// Same filters and limit, different ordering, back at the first page
    pub fn with_sort(&self, sort: Sort) -> QuerySpec {
        QuerySpec {
            sort,
            cursor: None,
            ..self.clone()
        }
    }

    pub fn tenant_filter(&self) -> Option<&Filter> {
        self.filters.iter().find(|f| f.field == TENANT_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_filters() {
        assert!(Filter::tenant(&TenantId::from("biz-1")).is_reserved());
        assert!(Filter::active().is_reserved());
        assert!(!Filter::eq("name", "Tornillo").is_reserved());
    }

    #[test]
    fn test_at_cursor_leaves_original_untouched() {
        let spec = QuerySpec {
            collection: "products".to_string(),
            filters: vec![Filter::active()],
            sort: Sort::asc("name"),
            cursor: None,
            limit: 20,
        };

        let next = spec.at_cursor(Some(Cursor::new("abc")));

        assert_eq!(spec.cursor, None);
        assert_eq!(next.cursor, Some(Cursor::new("abc")));
        assert_eq!(next.filters, spec.filters);
    }

    #[test]
    fn test_with_sort_resets_cursor() {
        let spec = QuerySpec {
            collection: "products".to_string(),
            filters: vec![],
            sort: Sort::asc("name"),
            cursor: Some(Cursor::new("abc")),
            limit: 10,
        };

        let resorted = spec.with_sort(Sort::desc("createdAt"));
        assert!(resorted.cursor.is_none());
        assert_eq!(resorted.sort.direction, SortDirection::Desc);
    }
}
