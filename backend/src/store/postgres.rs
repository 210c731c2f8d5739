//! PostgreSQL document store
//!
//! Every collection lives in the `documents` table as `(collection, id, body
//! JSONB)`. Filters compare `body -> field` against JSONB parameters so the
//! semantics match the in-memory store for scalar values.

use async_trait::async_trait;
use serde_json::Value;
use shared::{Cursor, Filter, FilterOp, Page, Sort, SortDirection};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

use super::{ensure_id, Document, DocumentStore, KeysetPosition, StoreError};

#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Escape LIKE metacharacters in a user supplied needle
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) -> Result<(), StoreError> {
    let comparison = match filter.op {
        FilterOp::Eq => " = ",
        FilterOp::Ne => " IS DISTINCT FROM ",
        FilterOp::Gt => " > ",
        FilterOp::Gte => " >= ",
        FilterOp::Lt => " < ",
        FilterOp::Lte => " <= ",
        FilterOp::In => {
            let options = filter
                .value
                .as_array()
                .ok_or_else(|| StoreError::UnsupportedFilter(filter.field.clone()))?;
            if options.is_empty() {
                qb.push("FALSE");
                return Ok(());
            }
            qb.push("body -> ").push_bind(filter.field.clone()).push(" IN (");
            let mut list = qb.separated(", ");
            for option in options {
                list.push_bind(Json(option.clone()));
            }
            list.push_unseparated(")");
            return Ok(());
        }
        FilterOp::Contains => {
            let needle = filter
                .value
                .as_str()
                .ok_or_else(|| StoreError::UnsupportedFilter(filter.field.clone()))?;
            qb.push("body ->> ")
                .push_bind(filter.field.clone())
                .push(" ILIKE ")
                .push_bind(like_pattern(needle));
            return Ok(());
        }
    };

    qb.push("body -> ")
        .push_bind(filter.field.clone())
        .push(comparison)
        .push_bind(Json(filter.value.clone()));
    Ok(())
}

fn direction_sql(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
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

        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());

        for filter in filters {
            qb.push(" AND ");
            push_filter(&mut qb, filter)?;
        }

        if let Some(after) = position {
            let op = match sort.direction {
                SortDirection::Asc => " > ",
                SortDirection::Desc => " < ",
            };
            qb.push(" AND (body -> ")
                .push_bind(sort.field.clone())
                .push(", id)")
                .push(op)
                .push("(")
                .push_bind(Json(after.value))
                .push(", ")
                .push_bind(after.id)
                .push(")");
        }

        let direction = direction_sql(sort.direction);
        qb.push(" ORDER BY body -> ")
            .push_bind(sort.field.clone())
            .push(format!(" {direction}, id {direction} LIMIT "))
            .push_bind(i64::from(limit) + 1);

        let rows: Vec<Json<Value>> = qb.build_query_scalar().fetch_all(&self.db).await?;

        let limit = limit as usize;
        let has_more = rows.len() > limit;
        let mut items = Vec::with_capacity(rows.len().min(limit));
        for Json(body) in rows.into_iter().take(limit) {
            match body {
                Value::Object(record) => items.push(record),
                _ => {
                    return Err(StoreError::Unavailable(format!(
                        "non-object document in {}",
                        collection
                    )))
                }
            }
        }

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

        let result = sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Json(Value::Object(record)))
            .execute(&self.db)
            .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate {
                    collection: collection.to_string(),
                    id,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, collection: &str, id: &str, mut partial: Document) -> Result<(), StoreError> {
        partial.remove(shared::ID_FIELD);

        let result = sqlx::query(
            "UPDATE documents SET body = body || $3, updated_at = NOW() WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(partial)))
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
