#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed scene document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate element id: {id}")]
    DuplicateId { id: String },
    #[error("element {id} has unsupported type {kind:?}")]
    UnknownType { id: String, kind: String },
    #[error("arrow {id} needs at least two points, found {count}")]
    TooFewPoints { id: String, count: usize },
}

pub type Result<T> = std::result::Result<T, DocumentError>;
