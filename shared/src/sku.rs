//! SKU code generation
//!
//! Codes have the shape `LOC-CLS[-ATTR...]-NNNN`, e.g. `WH1-ELE-NEG-M-0001`:
//!
//! - `LOC`: warehouse code, upper-cased alphanumerics, exactly 3 characters
//! - `CLS`: category name upper-cased, reduced to `A-Z`, exactly 3 characters
//! - `ATTR`: optional color and size short codes, upper-cased alphanumerics
//! - `NNNN`: session sequence, zero-padded to 4 digits
//!
//! Short segments are left-padded with `X`, long ones truncated. Uniqueness
//! only holds within one session's counter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::TenantId;

pub const LOCATION_CODE_WIDTH: usize = 3;
pub const CLASSIFICATION_CODE_WIDTH: usize = 3;
pub const SEQUENCE_WIDTH: usize = 4;
const PAD_CHAR: char = 'X';
const SEPARATOR: &str = "-";

/// Where the item is stocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationContext {
    pub warehouse_code: String,
}

/// Classification of the item being coded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationAttributes {
    /// Category display name
    pub category: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// A generated SKU
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuCode(String);

impl SkuCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Everything before the sequence, separator included (`WH1-ELE-NEG-M-`)
    pub fn prefix(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(at) => &self.0[..at + SEPARATOR.len()],
            None => "",
        }
    }
}

/// Sequence of `code` when it is `prefix` followed only by digits
pub fn sequence_of(code: &str, prefix: &str) -> Option<u32> {
    let digits = code.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for SkuCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn fit_width(code: String, width: usize) -> String {
    let len = code.chars().count();
    if len >= width {
        code.chars().take(width).collect()
    } else {
        let mut padded: String = std::iter::repeat(PAD_CHAR).take(width - len).collect();
        padded.push_str(&code);
        padded
    }
}

/// Fixed-width location segment
pub fn location_code(warehouse_code: &str) -> String {
    let cleaned: String = warehouse_code
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    fit_width(cleaned, LOCATION_CODE_WIDTH)
}

/// Three letter classification segment derived from a category name
pub fn classification_code(category_name: &str) -> String {
    let letters: String = category_name
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .collect();
    fit_width(letters, CLASSIFICATION_CODE_WIDTH)
}

/// Attribute short code, `None` when nothing printable remains
pub fn attribute_code(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build the SKU for `sequence`. Pure: the same inputs always give the same code.
pub fn generate(
    tenant: Option<&TenantId>,
    location: Option<&LocationContext>,
    attributes: &ClassificationAttributes,
    sequence: u32,
) -> Result<SkuCode, DomainError> {
    if non_blank(tenant.map(TenantId::as_str)).is_none() {
        return Err(DomainError::MissingContext("tenant"));
    }
    let warehouse_code = non_blank(location.map(|l| l.warehouse_code.as_str()))
        .ok_or(DomainError::MissingContext("location"))?;
    let category = non_blank(attributes.category.as_deref())
        .ok_or(DomainError::MissingContext("classification"))?;

    let mut segments = vec![location_code(warehouse_code), classification_code(category)];
    segments.extend(
        [attributes.color.as_deref(), attributes.size.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(attribute_code),
    );
    segments.push(format!("{:0width$}", sequence, width = SEQUENCE_WIDTH));

    Ok(SkuCode(segments.join(SEPARATOR)))
}

/// Per-session monotonic sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuCounter {
    next: u32,
}

impl Default for SkuCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl SkuCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Make sure the next code uses a sequence above `taken`
    pub fn advance_past(&mut self, taken: u32) {
        self.next = self.next.max(taken.saturating_add(1));
    }

    /// Sequence the next successful generation will use
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Generate with the current sequence; the counter only moves on success
    pub fn generate(
        &mut self,
        tenant: Option<&TenantId>,
        location: Option<&LocationContext>,
        attributes: &ClassificationAttributes,
    ) -> Result<SkuCode, DomainError> {
        let code = generate(tenant, location, attributes, self.next)?;
        self.next = self.next.saturating_add(1);
        Ok(code)
    }
}
