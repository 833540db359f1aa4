use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Invalid device topology: {0}")]
    InvalidTopology(String),

    #[error("Endpoint {0} declared more than once")]
    DuplicateEndpoint(u8),

    #[error("Unknown device profile: {0}")]
    UnknownProfile(String),

    #[error("Attribute 0x{attribute_id:04X} expects a {expected} value")]
    UnexpectedValueType {
        attribute_id: u16,
        expected: &'static str,
    },

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
