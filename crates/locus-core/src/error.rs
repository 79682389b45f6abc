use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Subscriber already registered: {id}")]
    DuplicateSubscriber { id: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Payload must be a JSON object, got {kind}")]
    PayloadNotObject { kind: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LocusError {
    /// Short error code string, used in logs and HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            LocusError::Config(_) => "CONFIG_ERROR",
            LocusError::DuplicateSubscriber { .. } => "DUPLICATE_SUBSCRIBER",
            LocusError::InvalidPayload(_) => "INVALID_PAYLOAD",
            LocusError::PayloadNotObject { .. } => "PAYLOAD_NOT_OBJECT",
            LocusError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, LocusError>;
