//! Cursor pagination state
//!
//! A [`PageAccumulator`] walks one scoped query forward page by page and keeps
//! the entities it has seen, deduplicated by id. There is no backward cursor:
//! jumping to an earlier page re-walks from the first page, which is O(n) in
//! the page index.

use std::collections::HashSet;

use shared::{Cursor, Page, QuerySpec, ScopedEntity, Sort};

use crate::error::{AppError, AppResult};
use crate::store::{Document, DocumentStore, StoreError};

/// A fetch handed out by [`PageAccumulator::begin_fetch`]
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub token: u64,
    pub spec: QuerySpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was folded in; `added` entities were new
    Applied { added: usize },
    /// The result belonged to a superseded request and was dropped
    Stale,
    /// Nothing left to fetch
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct PageAccumulator<T: ScopedEntity> {
    base: QuerySpec,
    cursor: Option<Cursor>,
    has_more: bool,
    pages_loaded: usize,
    accumulated: Vec<T>,
    seen: HashSet<String>,
    current_page: Vec<T>,
    request_token: u64,
}

pub(crate) fn decode_document<T: ScopedEntity>(document: Document) -> AppResult<T> {
    serde_json::from_value(serde_json::Value::Object(document))
        .map_err(|e| AppError::QueryFailed(StoreError::Serialization(e)))
}

impl<T: ScopedEntity> PageAccumulator<T> {
    pub fn new(spec: QuerySpec) -> Self {
        Self {
            cursor: spec.cursor.clone(),
            base: spec,
            has_more: true,
            pages_loaded: 0,
            accumulated: Vec::new(),
            seen: HashSet::new(),
            current_page: Vec::new(),
            request_token: 0,
        }
    }

    /// Back to the first page under a new ordering
    pub fn reset(&mut self, sort: Sort) {
        let spec = self.base.with_sort(sort);
        self.reset_with(spec);
    }

    /// Back to the first page of a different query (filters changed)
    pub fn reset_with(&mut self, spec: QuerySpec) {
        self.cursor = spec.cursor.clone();
        self.base = spec;
        self.has_more = true;
        self.pages_loaded = 0;
        self.accumulated.clear();
        self.seen.clear();
        self.current_page.clear();
        // Anything in flight now belongs to the old query
        self.request_token += 1;
    }

    pub fn items(&self) -> &[T] {
        &self.accumulated
    }

    /// Entities the most recent page added
    pub fn current_page(&self) -> &[T] {
        &self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.base
    }

    /// Start a fetch for the next page. Only the newest ticket can be applied.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.request_token += 1;
        FetchTicket {
            token: self.request_token,
            spec: self.base.at_cursor(self.cursor.clone()),
        }
    }

    /// Fold a fetched page in, unless `token` has been superseded
    pub fn apply_page(&mut self, token: u64, page: Page<Document>) -> AppResult<FetchOutcome> {
        if token != self.request_token {
            tracing::debug!(token, current = self.request_token, "Dropping stale page");
            return Ok(FetchOutcome::Stale);
        }

        // Decode everything before touching state
        let decoded = page
            .items
            .into_iter()
            .map(decode_document::<T>)
            .collect::<AppResult<Vec<T>>>()?;

        let mut fresh = Vec::with_capacity(decoded.len());
        for entity in decoded {
            if self.seen.insert(entity.id().to_string()) {
                fresh.push(entity);
            }
        }

        let added = fresh.len();
        self.accumulated.extend(fresh.iter().cloned());
        self.current_page = fresh;
        self.cursor = page.next_cursor;
        self.has_more = page.has_more && self.cursor.is_some();
        self.pages_loaded += 1;

        Ok(FetchOutcome::Applied { added })
    }

    /// Fetch and fold in the next page. On failure the state is unchanged.
    pub async fn fetch_next(&mut self, store: &dyn DocumentStore) -> AppResult<FetchOutcome> {
        if !self.has_more {
            return Ok(FetchOutcome::Exhausted);
        }

        let ticket = self.begin_fetch();
        let page = store.run(&ticket.spec).await.map_err(|e| {
            tracing::warn!(collection = %ticket.spec.collection, "Page fetch failed: {}", e);
            AppError::QueryFailed(e)
        })?;
        self.apply_page(ticket.token, page)
    }

    /// Re-walk from the first page up to `target` (zero based) and return it.
    ///
    /// The walk runs on a scratch copy; the accumulator only takes its state
    /// when every page loaded.
    pub async fn fetch_page_at_index(
        &mut self,
        store: &dyn DocumentStore,
        target: usize,
    ) -> AppResult<Vec<T>> {
        let mut scratch = PageAccumulator::new(self.base.at_cursor(None));
        scratch.request_token = self.request_token;

        while scratch.pages_loaded <= target {
            if scratch.fetch_next(store).await? == FetchOutcome::Exhausted {
                return Err(AppError::NotFound("Page".to_string()));
            }
        }

        *self = scratch;
        Ok(self.current_page.clone())
    }
}
