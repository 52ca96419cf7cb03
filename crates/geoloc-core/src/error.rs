//! 图形模型错误定义

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Invalid object type: {0}")]
    InvalidObjectType(String),

    #[error("Missing property '{key}' on {object}")]
    MissingProperty { object: String, key: String },

    #[error("Invalid coordinate literal: {0}")]
    InvalidCoordinate(String),

    #[error("Referenced object not found: {0}")]
    UnresolvedReference(String),

    #[error("Object '{0}' does not define a point")]
    NotAPoint(String),

    #[error("Object '{0}' does not define a line")]
    NotALine(String),

    #[error("Object '{0}' must be a line through two points")]
    NotLineAB(String),

    #[error("Lines '{0}' and '{1}' are parallel")]
    ParallelLines(String, String),

    #[error("Expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("Argument {index} has the wrong kind for {object_type}")]
    ArgumentKind { index: usize, object_type: String },
}

impl ShapeError {
    /// 为缺少属性的错误补上对象名
    pub fn with_object(self, name: &str) -> Self {
        match self {
            ShapeError::MissingProperty { object, key } if object.is_empty() => {
                ShapeError::MissingProperty {
                    object: name.to_string(),
                    key,
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_object_fills_missing_name() {
        let err = ShapeError::MissingProperty {
            object: String::new(),
            key: "line1".to_string(),
        }
        .with_object("angle1");
        assert_eq!(err.to_string(), "Missing property 'line1' on angle1");

        let named = ShapeError::MissingProperty {
            object: "a".to_string(),
            key: "k".to_string(),
        };
        assert_eq!(named.clone().with_object("b"), named);

        let other = ShapeError::NotAPoint("A".to_string());
        assert_eq!(other.clone().with_object("b"), other);
    }
}
