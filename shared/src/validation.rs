//! Validation utilities for inventory input

use rust_decimal::Decimal;

pub const MAX_NAME_LENGTH: usize = 120;
pub const MAX_ATTRIBUTE_CODE_LENGTH: usize = 3;

// ============================================================================
// Entity Field Validations
// ============================================================================

/// Validate a display name (1-120 characters after trimming)
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required");
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err("Name must be at most 120 characters");
    }
    Ok(())
}

/// Validate warehouse code format (exactly 3 uppercase alphanumeric)
pub fn validate_warehouse_code(code: &str) -> Result<(), &'static str> {
    if code.len() != crate::sku::LOCATION_CODE_WIDTH {
        return Err("Warehouse code must be exactly 3 characters");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Warehouse code must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate a color/size short code (1-3 alphanumeric)
pub fn validate_attribute_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Attribute code cannot be empty");
    }
    if code.chars().count() > MAX_ATTRIBUTE_CODE_LENGTH {
        return Err("Attribute code must be at most 3 characters");
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Attribute code must be alphanumeric only");
    }
    Ok(())
}

/// Validate a unit price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate an on-hand quantity
pub fn validate_stock_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("Stock quantity cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Query Validations
// ============================================================================

/// Validate a requested page size
pub fn validate_page_limit(limit: u32, max: u32) -> Result<(), &'static str> {
    if limit == 0 {
        return Err("Page size must be at least 1");
    }
    if limit > max {
        return Err("Page size exceeds the maximum allowed");
    }
    Ok(())
}

/// Validate that a sort field is one the collection allows
pub fn validate_sort_field(field: &str, allowed: &[&str]) -> Result<(), &'static str> {
    if allowed.contains(&field) {
        Ok(())
    } else {
        Err("Sorting by this field is not supported")
    }
}

/// Validate a tenant identifier (non-empty, no whitespace)
pub fn validate_tenant_id(tenant_id: &str) -> Result<(), &'static str> {
    if tenant_id.is_empty() {
        return Err("Tenant id is required");
    }
    if tenant_id.chars().any(char::is_whitespace) {
        return Err("Tenant id cannot contain whitespace");
    }
    Ok(())
}
