//! WebAssembly module for the inventory platform
//!
//! Provides client-side computation for:
//! - SKU previews while filling in the product form
//! - Classification and location codes
//! - Tenant selection validity (the browser holds the session record)
//! - Offline input validation

use chrono::{Duration, TimeZone, Utc};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::sku::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Preview the SKU for a product form.
///
/// `sequence` is the session counter value the server will use next, as
/// served by `GET /api/v1/products/next-sequence`.
#[wasm_bindgen]
pub fn generate_sku_code(
    tenant_id: &str,
    warehouse_code: &str,
    category_name: &str,
    color: Option<String>,
    size: Option<String>,
    sequence: u32,
) -> Result<String, JsValue> {
    preview_sku(tenant_id, warehouse_code, category_name, color, size, sequence)
        .map_err(|e| JsValue::from_str(&e))
}

fn preview_sku(
    tenant_id: &str,
    warehouse_code: &str,
    category_name: &str,
    color: Option<String>,
    size: Option<String>,
    sequence: u32,
) -> Result<String, String> {
    let tenant = TenantId::from(tenant_id);
    let location = LocationContext {
        warehouse_code: warehouse_code.to_string(),
    };
    let attributes = ClassificationAttributes {
        category: Some(category_name.to_string()),
        color,
        size,
    };
    generate(Some(&tenant), Some(&location), &attributes, sequence)
        .map(SkuCode::into_string)
        .map_err(|e| e.to_string())
}

/// Three letter code derived from a category name
#[wasm_bindgen]
pub fn category_classification_code(category_name: &str) -> String {
    classification_code(category_name)
}

/// Fixed-width location code derived from a warehouse code
#[wasm_bindgen]
pub fn warehouse_location_code(warehouse_code: &str) -> String {
    location_code(warehouse_code)
}

/// Check a persisted selection record against the current clock
#[wasm_bindgen]
pub fn is_selection_valid(selection_json: &str) -> bool {
    let now_ms = js_sys::Date::now() as i64;
    selection_valid_at(selection_json, now_ms, SELECTION_TTL_HOURS)
}

/// Check a persisted selection record at `now_ms` (epoch milliseconds)
pub fn selection_valid_at(selection_json: &str, now_ms: i64, ttl_hours: i64) -> bool {
    let Ok(selection) = serde_json::from_str::<TenantSelection>(selection_json) else {
        return false;
    };
    let Some(now) = Utc.timestamp_millis_opt(now_ms).single() else {
        return false;
    };
    selection.is_valid_at(now, Duration::hours(ttl_hours))
}

/// Key under which the browser keeps the session selection
#[wasm_bindgen]
pub fn selection_storage_key() -> String {
    SELECTION_STORAGE_KEY.to_string()
}

/// Validate warehouse code format
#[wasm_bindgen]
pub fn is_valid_warehouse_code(code: &str) -> bool {
    validate_warehouse_code(code).is_ok()
}

/// Validate color/size short code
#[wasm_bindgen]
pub fn is_valid_attribute_code(code: &str) -> bool {
    validate_attribute_code(code).is_ok()
}

/// Validate a display name
#[wasm_bindgen]
pub fn is_valid_name(name: &str) -> bool {
    validate_name(name).is_ok()
}

/// Log message to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;

    #[test]
    fn test_sku_preview() {
        let code = preview_sku(
            "biz-1",
            "WH1",
            "Electrónicos",
            Some("NEG".to_string()),
            Some("M".to_string()),
            1,
        )
        .unwrap();
        assert_eq!(code, "WH1-ELE-NEG-M-0001");
    }

    #[test]
    fn test_sku_preview_missing_context() {
        assert!(preview_sku("", "WH1", "Ropa", None, None, 1).is_err());
        assert!(preview_sku("biz-1", " ", "Ropa", None, None, 1).is_err());
        assert!(preview_sku("biz-1", "WH1", "", None, None, 1).is_err());
    }

    #[test]
    fn test_codes() {
        assert_eq!(category_classification_code("tv"), "XTV");
        assert_eq!(warehouse_location_code("wh1"), "WH1");
    }

    #[test]
    fn test_selection_validity() {
        let selected_at = 1_700_000_000_000i64;
        let single = format!(r#"{{"tenantId":"biz-42","showAll":false,"timestamp":{selected_at}}}"#);
        let all = format!(r#"{{"tenantId":null,"showAll":true,"timestamp":{selected_at}}}"#);
        let unset = format!(r#"{{"tenantId":null,"showAll":false,"timestamp":{selected_at}}}"#);

        assert!(selection_valid_at(&single, selected_at + HOUR_MS, 24));
        assert!(selection_valid_at(&all, selected_at + 23 * HOUR_MS, 24));
        assert!(!selection_valid_at(&single, selected_at + 24 * HOUR_MS, 24));
        assert!(!selection_valid_at(&unset, selected_at, 24));
        assert!(!selection_valid_at("not json", selected_at, 24));
    }

    #[test]
    fn test_validation_helpers() {
        assert!(is_valid_warehouse_code("WH1"));
        assert!(!is_valid_warehouse_code("wh1"));
        assert!(is_valid_attribute_code("NEG"));
        assert!(!is_valid_attribute_code("NEGRO"));
        assert!(is_valid_name("Bodega central"));
        assert!(!is_valid_name(""));
    }
}
