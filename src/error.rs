use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum FabulaError {
    #[error("Cycle detected on the backward path at node '{node}'")]
    CycleDetected { node: String },
    #[error("Duplicate node name: {0}")]
    DuplicateNode(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<JsonError> for FabulaError {
    fn from(src: JsonError) -> FabulaError {
        FabulaError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}
