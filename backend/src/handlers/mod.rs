//! HTTP handlers

pub mod business;
pub mod category;
pub mod health;
pub mod product;
pub mod selection;
pub mod warehouse;

pub use business::*;
pub use category::*;
pub use health::*;
pub use product::*;
pub use selection::*;
pub use warehouse::*;

use serde::Deserialize;
use shared::{Cursor, PageRequest, Sort, SortDirection};

use crate::error::{AppError, AppResult};

/// Paging and ordering query parameters shared by every listing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn sort(&self) -> AppResult<Option<Sort>> {
        let direction = match self.direction.as_deref() {
            Some(raw) => raw.parse::<SortDirection>().map_err(|msg| {
                AppError::validation("direction", msg, "La dirección debe ser 'asc' o 'desc'")
            })?,
            None => SortDirection::Asc,
        };
        Ok(self.sort.as_ref().map(|field| Sort::new(field.clone(), direction)))
    }

    pub fn page(&self) -> PageRequest {
        PageRequest {
            cursor: self.cursor.clone().map(Cursor::new),
            limit: self.limit,
        }
    }
}
