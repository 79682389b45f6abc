use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";
pub const RELAYED_MESSAGE: &str = "data relayed";

/// Body returned by `POST /api/input`.
/// Wire: `{ "status": "success", "message": "data relayed" }`
///
/// Success means "accepted for relay", not "delivered".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressAck {
    pub status: String,
    pub message: String,
}

impl IngressAck {
    pub fn success() -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: RELAYED_MESSAGE.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
        }
    }
}
