//! Scoped query construction
//!
//! Every read of a tenant-owned collection goes through [`ScopedQueryBuilder::build_query`],
//! which prepends the tenant and active-flag predicates, and every write goes
//! through [`ScopedQueryBuilder::tag_for_write`], which stamps or guards the
//! tenant tag.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use shared::{
    validate_page_limit, validate_sort_field, EffectiveTenant, Filter, PageRequest, QuerySpec,
    ScopedEntity, Sort, TenantId, ACTIVE_FIELD, CREATED_AT_FIELD, ID_FIELD, TENANT_FIELD,
    UPDATED_AT_FIELD,
};

use crate::config::PaginationConfig;
use crate::error::{AppError, AppResult};
use crate::models::Caller;
use crate::services::tenant_context::TenantContext;
use crate::store::Document;

/// What a payload is about to do
#[derive(Debug, Clone, Copy)]
pub enum WriteIntent<'a> {
    Create,
    /// Modify a record currently owned by `existing_tenant`
    Update { existing_tenant: &'a TenantId },
}

#[derive(Clone)]
pub struct ScopedQueryBuilder {
    tenants: Arc<TenantContext>,
    pagination: PaginationConfig,
}

impl ScopedQueryBuilder {
    pub fn new(tenants: Arc<TenantContext>, pagination: PaginationConfig) -> Self {
        Self { tenants, pagination }
    }

    pub fn build_query<T: ScopedEntity>(
        &self,
        caller: &Caller,
        entity_filters: Vec<Filter>,
        sort: Option<Sort>,
        page: PageRequest,
    ) -> AppResult<QuerySpec> {
        // A missing selection outranks anything wrong with the request itself
        let effective = self.tenants.resolve_effective_tenant(caller)?;

        if let Some(reserved) = entity_filters.iter().find(|f| f.is_reserved()) {
            tracing::warn!(user_id = %caller.user_id, field = %reserved.field, "Rejected filter on reserved field");
            return Err(AppError::Validation {
                field: reserved.field.clone(),
                message: format!("Filtering on {} is not allowed", reserved.field),
                message_es: format!("No se permite filtrar por {}", reserved.field),
            });
        }

        let sort = sort.unwrap_or_else(|| Sort::asc(T::DISPLAY_NAME_FIELD));
        validate_sort_field(&sort.field, T::SORTABLE_FIELDS).map_err(|msg| AppError::Validation {
            field: "sort".to_string(),
            message: msg.to_string(),
            message_es: format!("No se puede ordenar por {}", sort.field),
        })?;

        let limit = self.resolve_limit(page.limit)?;

        let mut filters = Vec::with_capacity(entity_filters.len() + 2);
        if let EffectiveTenant::Single(tenant_id) = &effective {
            filters.push(Filter::tenant(tenant_id));
        }
        filters.push(Filter::active());
        filters.extend(entity_filters);

        tracing::debug!(
            collection = T::COLLECTION,
            ?effective,
            filters = filters.len(),
            "Built scoped query"
        );

        Ok(QuerySpec {
            collection: T::COLLECTION.to_string(),
            filters,
            sort,
            cursor: page.cursor,
            limit,
        })
    }

    /// Scoped query matching a single record by id
    pub fn build_lookup<T: ScopedEntity>(&self, caller: &Caller, id: &str) -> AppResult<QuerySpec> {
        let mut spec = self.build_query::<T>(caller, Vec::new(), None, PageRequest::first(1))?;
        spec.filters.push(Filter::eq(ID_FIELD, id));
        Ok(spec)
    }

    fn resolve_limit(&self, requested: Option<u32>) -> AppResult<u32> {
        let max = self.pagination.max_page_size;
        let limit = requested.unwrap_or(self.pagination.default_page_size).min(max);
        validate_page_limit(limit, max).map_err(|msg| {
            AppError::validation("limit", msg, "El tamaño de página debe ser al menos 1")
        })?;
        Ok(limit)
    }

    /// The single tenant a write from this caller lands in
    pub fn write_tenant(&self, caller: &Caller) -> AppResult<TenantId> {
        match self.tenants.resolve_effective_tenant(caller) {
            Ok(EffectiveTenant::Single(tenant_id)) => Ok(tenant_id),
            Ok(EffectiveTenant::All) | Err(AppError::TenantSelectionRequired) => {
                tracing::warn!(user_id = %caller.user_id, "Write attempted without a single tenant");
                Err(AppError::NoTenantContext)
            }
            Err(e) => Err(e),
        }
    }

    /// Stamp or guard the tenant tag of a payload about to be written
    pub fn tag_for_write(
        &self,
        caller: &Caller,
        intent: WriteIntent<'_>,
        mut payload: Document,
    ) -> AppResult<Document> {
        let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        match intent {
            WriteIntent::Create => {
                let tenant_id = self.write_tenant(caller)?;
                payload.insert(TENANT_FIELD.to_string(), Value::String(tenant_id.to_string()));
                payload.insert(ACTIVE_FIELD.to_string(), Value::Bool(true));
                payload.insert(CREATED_AT_FIELD.to_string(), now.clone());
                payload.insert(UPDATED_AT_FIELD.to_string(), now);
            }
            WriteIntent::Update { existing_tenant } => {
                match self.tenants.resolve_effective_tenant(caller) {
                    Ok(EffectiveTenant::Single(tenant_id)) if &tenant_id != existing_tenant => {
                        // Not visible to this caller
                        return Err(AppError::NotFound("Record".to_string()));
                    }
                    Ok(_) => {}
                    Err(AppError::TenantSelectionRequired) => return Err(AppError::NoTenantContext),
                    Err(e) => return Err(e),
                }

                if let Some(requested) = payload.remove(TENANT_FIELD) {
                    if requested.as_str() != Some(existing_tenant.as_str()) {
                        tracing::warn!(
                            user_id = %caller.user_id,
                            "Rejected tenant reassignment"
                        );
                        return Err(AppError::TenantReassignment);
                    }
                }
                payload.remove(ID_FIELD);
                payload.remove(CREATED_AT_FIELD);
                payload.insert(UPDATED_AT_FIELD.to_string(), now);
            }
        }

        Ok(payload)
    }
}
