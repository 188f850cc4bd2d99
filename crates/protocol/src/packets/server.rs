//! Server -> client bodies.

use crate::packets::messages;
use crate::{GridSize, Pixel, ProtocolError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `200` body of `POST /api/pixels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    pub success: bool,
    pub pixel: Pixel,
    pub message: String,
    /// Full cooldown window in seconds, for the client countdown.
    pub cooldown_time: u64,
}

impl PlaceResponse {
    pub fn placed(pixel: Pixel, cooldown_time: u64) -> Self {
        Self {
            success: true,
            pixel,
            message: messages::PIXEL_PLACED.to_string(),
            cooldown_time,
        }
    }
}

/// `GET /api/cooldown` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownStatus {
    pub in_cooldown: bool,
    /// Seconds left, rounded up. Zero when not in cooldown.
    pub remaining_time: u64,
    pub cooldown_time: u64,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_time: Option<u64>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            remaining_time: None,
            cooldown_time: None,
        }
    }

    /// `429` body for an identity still inside its cooldown window.
    pub fn cooldown(remaining_time: u64, cooldown_time: u64) -> Self {
        Self {
            error: messages::COOLDOWN_ACTIVE.to_string(),
            message: Some(messages::COOLDOWN_WAIT.to_string()),
            remaining_time: Some(remaining_time),
            cooldown_time: Some(cooldown_time),
        }
    }
}

/// `GET /api` body: service description and the grid the server enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub status: String,
    pub endpoints: BTreeMap<String, String>,
    pub grid: GridSize,
    /// Which pixel store backs the canvas (`memory` or `file`).
    pub storage: String,
}

/// Client-side classification of a `POST /api/pixels` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed(PlaceResponse),
    RateLimited {
        message: String,
        remaining_time: u64,
        cooldown_time: u64,
    },
    Rejected {
        status: u16,
        error: String,
    },
}

impl PlaceOutcome {
    /// Interpret a status code and raw body.
    ///
    /// Error bodies that are not valid JSON still classify as `Rejected`,
    /// since a proxy in front of the server may answer with plain text.
    pub fn from_response(status: u16, body: &str) -> Result<Self, ProtocolError> {
        match status {
            200..=299 => Ok(Self::Placed(serde_json::from_str(body)?)),
            429 => {
                let body: ErrorBody = serde_json::from_str(body)?;
                Ok(Self::RateLimited {
                    message: body.message.unwrap_or(body.error),
                    remaining_time: body.remaining_time.unwrap_or(0),
                    cooldown_time: body.cooldown_time.unwrap_or(0),
                })
            }
            400..=599 => {
                let error = serde_json::from_str::<ErrorBody>(body)
                    .map(|b| b.error)
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                Ok(Self::Rejected { status, error })
            }
            other => Err(ProtocolError::UnexpectedStatus(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cooldown_body_shape() {
        let value = serde_json::to_value(ErrorBody::cooldown(290, 300)).unwrap();
        assert_eq!(
            value,
            json!({
                "error": messages::COOLDOWN_ACTIVE,
                "message": messages::COOLDOWN_WAIT,
                "remainingTime": 290,
                "cooldownTime": 300,
            })
        );
    }

    #[test]
    fn test_plain_error_omits_optional_fields() {
        let value = serde_json::to_value(ErrorBody::new(messages::INVALID_DATA)).unwrap();
        assert_eq!(value, json!({"error": messages::INVALID_DATA}));
    }

    #[test]
    fn test_status_uses_camel_case() {
        let status = CooldownStatus {
            in_cooldown: true,
            remaining_time: 12,
            cooldown_time: 300,
        };
        let value = serde_json::to_value(status).unwrap();
        assert_eq!(value, json!({"inCooldown": true, "remainingTime": 12, "cooldownTime": 300}));
    }

    #[test]
    fn test_outcome_placed() {
        let body = json!({
            "success": true,
            "pixel": {
                "x": 5, "y": 5, "color": "#ff0000", "owner": "IP_127_0_0_1",
                "timestamp": "2024-01-01T00:00:00Z"
            },
            "message": messages::PIXEL_PLACED,
            "cooldownTime": 300
        });
        let outcome = PlaceOutcome::from_response(200, &body.to_string()).unwrap();
        match outcome {
            PlaceOutcome::Placed(resp) => {
                assert_eq!(resp.pixel.x, 5);
                assert_eq!(resp.cooldown_time, 300);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_outcome_rate_limited() {
        let body = serde_json::to_string(&ErrorBody::cooldown(42, 300)).unwrap();
        let outcome = PlaceOutcome::from_response(429, &body).unwrap();
        assert_eq!(
            outcome,
            PlaceOutcome::RateLimited {
                message: messages::COOLDOWN_WAIT.to_string(),
                remaining_time: 42,
                cooldown_time: 300,
            }
        );
    }

    #[test]
    fn test_outcome_rejected_with_text_body() {
        let outcome = PlaceOutcome::from_response(502, "Bad Gateway").unwrap();
        assert_eq!(
            outcome,
            PlaceOutcome::Rejected {
                status: 502,
                error: "HTTP 502".to_string()
            }
        );
        assert!(matches!(
            PlaceOutcome::from_response(302, ""),
            Err(ProtocolError::UnexpectedStatus(302))
        ));
    }
}
