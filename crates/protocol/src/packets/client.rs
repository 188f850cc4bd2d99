//! Client -> server bodies.

use crate::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /api/pixels` body.
///
/// Coordinates stay signed here; bounds are checked by the server against
/// its configured grid, so a negative value is an out-of-bounds request
/// rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRequest {
    pub x: i64,
    pub y: i64,
    pub color: String,
}

impl PlaceRequest {
    pub fn new(x: i64, y: i64, color: impl Into<String>) -> Self {
        Self { x, y, color: color.into() }
    }

    /// Validate an arbitrary JSON body.
    ///
    /// `x` and `y` must be JSON integers (`5.0` and `"5"` are rejected) and
    /// `color` a string that is not blank.
    pub fn from_value(body: &Value) -> Result<Self, ProtocolError> {
        let object = body.as_object().ok_or(ProtocolError::NotAnObject)?;

        let x = object
            .get("x")
            .and_then(Value::as_i64)
            .ok_or(ProtocolError::NotAnInteger("x"))?;
        let y = object
            .get("y")
            .and_then(Value::as_i64)
            .ok_or(ProtocolError::NotAnInteger("y"))?;
        let color = object
            .get("color")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(ProtocolError::MissingColor)?;

        Ok(Self::new(x, y, color))
    }

    /// Parse and validate raw request bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_slice(data)?;
        Self::from_value(&value)
    }
}
