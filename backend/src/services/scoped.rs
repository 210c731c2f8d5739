//! Tenant-scoped repository shared by the catalog services

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use shared::{
    Filter, Page, PageRequest, QuerySpec, ScopedEntity, Sort, TenantId, ACTIVE_FIELD, ID_FIELD,
};

use crate::error::{AppError, AppResult};
use crate::models::Caller;
use crate::services::pagination::{decode_document, FetchOutcome, PageAccumulator};
use crate::services::query_builder::{ScopedQueryBuilder, WriteIntent};
use crate::store::{Document, DocumentStore, StoreError};

/// A page reached by index navigation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedPage<T> {
    pub index: usize,
    pub items: Vec<T>,
    pub has_more: bool,
}

/// Serialize a typed input into a store document
pub fn to_document<S: Serialize>(value: &S) -> AppResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal("payload is not an object".to_string())),
        Err(e) => Err(AppError::QueryFailed(StoreError::Serialization(e))),
    }
}

pub struct ScopedRepository<T: ScopedEntity> {
    store: Arc<dyn DocumentStore>,
    queries: ScopedQueryBuilder,
    _entity: PhantomData<fn() -> T>,
}

impl<T: ScopedEntity> Clone for ScopedRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            queries: self.queries.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: ScopedEntity> ScopedRepository<T> {
    pub fn new(store: Arc<dyn DocumentStore>, queries: ScopedQueryBuilder) -> Self {
        Self {
            store,
            queries,
            _entity: PhantomData,
        }
    }

    pub fn queries(&self) -> &ScopedQueryBuilder {
        &self.queries
    }

    async fn execute(&self, spec: &QuerySpec) -> AppResult<Page<T>> {
        let page = self.store.run(spec).await.map_err(|e| match e {
            e @ (StoreError::InvalidCursor | StoreError::UnsupportedFilter(_)) => AppError::from(e),
            other => {
                tracing::warn!(collection = %spec.collection, "Query failed: {}", other);
                AppError::QueryFailed(other)
            }
        })?;
        page.try_map(decode_document::<T>)
    }

    /// One page of active records visible to the caller
    pub async fn list(
        &self,
        caller: &Caller,
        filters: Vec<Filter>,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> AppResult<Page<T>> {
        let spec = self.queries.build_query::<T>(caller, filters, sort, page)?;
        self.execute(&spec).await
    }

    /// Page `index` (zero based) of the listing, re-walked from the start
    pub async fn page_at(
        &self,
        caller: &Caller,
        filters: Vec<Filter>,
        sort: Option<Sort>,
        limit: Option<u32>,
        index: usize,
    ) -> AppResult<IndexedPage<T>> {
        let spec = self.queries.build_query::<T>(
            caller,
            filters,
            sort,
            PageRequest {
                cursor: None,
                limit,
            },
        )?;
        let mut pages = PageAccumulator::<T>::new(spec);
        let items = pages.fetch_page_at_index(self.store.as_ref(), index).await?;
        Ok(IndexedPage {
            index,
            items,
            has_more: pages.has_more(),
        })
    }

    /// Query over every record the tenant owns, deactivated ones included.
    /// Only for uniqueness checks; nothing read this way goes back to a caller.
    fn tenant_wide(&self, tenant: &TenantId, filters: Vec<Filter>, limit: u32) -> QuerySpec {
        let mut scoped = Vec::with_capacity(filters.len() + 1);
        scoped.push(Filter::tenant(tenant));
        scoped.extend(filters);
        QuerySpec {
            collection: T::COLLECTION.to_string(),
            filters: scoped,
            sort: Sort::asc(ID_FIELD),
            cursor: None,
            limit,
        }
    }

    /// Whether any record of the tenant, active or not, matches `filters`
    pub async fn exists_in_tenant(
        &self,
        tenant: &TenantId,
        filters: Vec<Filter>,
    ) -> AppResult<bool> {
        let spec = self.tenant_wide(tenant, filters, 1);
        Ok(!self.execute(&spec).await?.items.is_empty())
    }

    /// Every record of the tenant, active or not, matching `filters`
    pub async fn scan_tenant(
        &self,
        tenant: &TenantId,
        filters: Vec<Filter>,
    ) -> AppResult<Vec<T>> {
        let mut pages = PageAccumulator::<T>::new(self.tenant_wide(tenant, filters, 100));
        while pages.fetch_next(self.store.as_ref()).await? != FetchOutcome::Exhausted {}
        Ok(pages.items().to_vec())
    }

    /// An active record visible to the caller
    pub async fn get(&self, caller: &Caller, id: &str) -> AppResult<T> {
        let spec = self.queries.build_lookup::<T>(caller, id)?;
        self.execute(&spec)
            .await?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(T::LABEL.to_string()))
    }

    /// Insert a record into the caller's single effective tenant
    pub async fn create(&self, caller: &Caller, payload: Document) -> AppResult<T> {
        let mut record = self
            .queries
            .tag_for_write(caller, WriteIntent::Create, payload)?;
        let id = uuid::Uuid::new_v4().to_string();
        record.insert(shared::ID_FIELD.to_string(), Value::String(id.clone()));

        let entity = decode_document::<T>(record.clone())?;
        self.store
            .insert(T::COLLECTION, record)
            .await
            .map_err(AppError::QueryFailed)?;

        tracing::info!(collection = T::COLLECTION, id = %id, tenant_id = %entity.tenant_id(), "Record created");
        Ok(entity)
    }

    /// Apply a partial update to a visible record
    pub async fn update(&self, caller: &Caller, id: &str, partial: Document) -> AppResult<T> {
        let existing = self.get(caller, id).await?;
        let partial = self.queries.tag_for_write(
            caller,
            WriteIntent::Update {
                existing_tenant: existing.tenant_id(),
            },
            partial,
        )?;

        let mut merged = to_document(&existing)?;
        merged.extend(partial.clone());
        let entity = decode_document::<T>(merged)?;

        self.store
            .update(T::COLLECTION, id, partial)
            .await
            .map_err(AppError::from)?;

        tracing::info!(collection = T::COLLECTION, id = %id, "Record updated");
        Ok(entity)
    }

    /// Soft delete: the record stays but drops out of every scoped read
    pub async fn deactivate(&self, caller: &Caller, id: &str) -> AppResult<()> {
        let mut partial = Document::new();
        partial.insert(ACTIVE_FIELD.to_string(), Value::Bool(false));
        self.update(caller, id, partial).await?;

        tracing::info!(collection = T::COLLECTION, id = %id, "Record deactivated");
        Ok(())
    }
}
