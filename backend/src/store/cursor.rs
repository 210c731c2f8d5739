//! Keyset cursor encoding
//!
//! A cursor is URL-safe base64 of `{"f": field, "d": direction, "v": value, "id": id}`,
//! the sort key and id of the last item on the page. Cursors are bound to the
//! sort they were produced under.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{Cursor, Sort, SortDirection};

use super::{Document, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeysetPosition {
    #[serde(rename = "f")]
    pub field: String,
    #[serde(rename = "d")]
    pub direction: SortDirection,
    #[serde(rename = "v")]
    pub value: Value,
    pub id: String,
}

impl KeysetPosition {
    /// Position just after `record` under `sort`
    pub fn after(record: &Document, sort: &Sort) -> Self {
        Self {
            field: sort.field.clone(),
            direction: sort.direction,
            value: record.get(&sort.field).cloned().unwrap_or(Value::Null),
            id: record
                .get(shared::ID_FIELD)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn encode(&self) -> Result<Cursor, StoreError> {
        let json = serde_json::to_vec(self)?;
        Ok(Cursor::new(URL_SAFE_NO_PAD.encode(json)))
    }

    /// Decode a cursor and check it belongs to `sort`
    pub fn decode(cursor: &Cursor, sort: &Sort) -> Result<Self, StoreError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(cursor.as_str())
            .map_err(|_| StoreError::InvalidCursor)?;
        let position: KeysetPosition =
            serde_json::from_slice(&bytes).map_err(|_| StoreError::InvalidCursor)?;

        if position.field != sort.field || position.direction != sort.direction {
            return Err(StoreError::InvalidCursor);
        }
        Ok(position)
    }
}
