//! 构造引擎错误定义

use geoloc_core::error::ShapeError;
use geoloc_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action {0} creates no object type")]
    InvalidAction(String),

    #[error("No action is active")]
    NoActiveAction,

    #[error("Waiting for the store to confirm the previous object")]
    AwaitingStore,

    #[error("No free name left for action {0}")]
    NoFreeName(String),

    #[error("Nothing to select at the cursor")]
    NoMatch,

    #[error("The current argument expects an expression")]
    ExpressionExpected,

    #[error("The current argument does not accept an expression")]
    NotExpressionSlot,

    #[error("Invalid expression: {}", .0.join("; "))]
    InvalidExpression(Vec<String>),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("No scene is open")]
    NoScene,
}

pub type EngineResult<T> = Result<T, EngineError>;
