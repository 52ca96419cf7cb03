//! 场景存储错误定义

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Scene not found: {0}")]
    SceneNotFound(i32),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Object name already in use: {0}")]
    DuplicateName(String),

    #[error("Invalid object: {0}")]
    InvalidObject(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}
