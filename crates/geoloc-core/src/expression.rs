//! 表达式标识符提取与依赖分析
//!
//! 用户输入的公式（如 `d(A, X) + t`、`A.x + 1`）不在本地求值，
//! 这里只做静态分析：找出公式引用了哪些场景对象。

use crate::coords::is_coordinate;
use crate::shape::{str_property, ObjectType, PersistedObject};
use regex_lite::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// 公式中的标识符分类
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierExtraction {
    /// 后接 `(` 的标识符
    pub function_names: Vec<String>,
    /// 独立出现的标识符（场景对象名）
    pub object_names: Vec<String>,
    /// 前有 `.`、后无 `(` 的标识符
    pub field_names: Vec<String>,
    /// 前有 `.`、后接 `(` 的标识符
    pub method_names: Vec<String>,
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[a-zA-Z_]\w*\b").expect("identifier pattern is valid"))
}

/// 提取公式中的标识符，各类别内去重并排序
pub fn extract_identifiers(expression: &str) -> IdentifierExtraction {
    let mut functions = BTreeSet::new();
    let mut objects = BTreeSet::new();
    let mut fields = BTreeSet::new();
    let mut methods = BTreeSet::new();

    for m in identifier_pattern().find_iter(expression) {
        let identifier = m.as_str().to_string();
        let preceded_by_dot = expression[..m.start()].trim_end().ends_with('.');
        let followed_by_paren = expression[m.end()..].trim_start().starts_with('(');

        match (preceded_by_dot, followed_by_paren) {
            (true, true) => methods.insert(identifier),
            (true, false) => fields.insert(identifier),
            (false, true) => functions.insert(identifier),
            (false, false) => objects.insert(identifier),
        };
    }

    IdentifierExtraction {
        function_names: functions.into_iter().collect(),
        object_names: objects.into_iter().collect(),
        field_names: fields.into_iter().collect(),
        method_names: methods.into_iter().collect(),
    }
}

/// 检查括号是否配对
pub fn parentheses_balanced(expression: &str) -> bool {
    let mut depth = 0i32;
    for c in expression.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// 对象直接依赖的其他对象名（去重、排序）
pub fn dependencies(object: &PersistedObject) -> Vec<String> {
    let props = &object.properties;
    let mut deps = BTreeSet::new();

    let mut reference = |key: &str| {
        if let Some(value) = str_property(props, key) {
            if !is_coordinate(value) {
                deps.insert(value.trim().to_string());
            }
        }
    };

    match object.object_type {
        ObjectType::FixedPoint | ObjectType::FreePoint | ObjectType::Parameter => {}
        ObjectType::SlidingPoint => reference("constraining_object_name"),
        ObjectType::IntersectionPoint => {
            reference("object_name_1");
            reference("object_name_2");
        }
        ObjectType::Midpoint
        | ObjectType::LineAB
        | ObjectType::PpBisector
        | ObjectType::TwoPointDistanceInvariant => {
            reference("point1");
            reference("point2");
        }
        ObjectType::Projection
        | ObjectType::Reflection
        | ObjectType::PpToLine
        | ObjectType::PlToLine
        | ObjectType::PointToLineDistanceInvariant => {
            reference("point");
            reference("line");
        }
        ObjectType::TwoLineAngleInvariant => {
            reference("line1");
            reference("line2");
        }
        ObjectType::Locus => reference("point"),
        ObjectType::ScaledVectorPoint => {
            reference("point1");
            reference("point2");
            if let Some(k) = str_property(props, "k") {
                deps.extend(extract_identifiers(k).object_names);
            }
        }
        ObjectType::ComputedPoint => {
            for key in ["x_expr", "y_expr"] {
                if let Some(expr) = str_property(props, key) {
                    deps.extend(extract_identifiers(expr).object_names);
                }
            }
        }
        ObjectType::Invariant => {
            if let Some(formula) = str_property(props, "formula") {
                deps.extend(extract_identifiers(formula).object_names);
            }
        }
    }

    deps.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Properties;
    use serde_json::json;

    fn object(object_type: ObjectType, props: serde_json::Value) -> PersistedObject {
        let properties: Properties = serde_json::from_value(props).unwrap();
        PersistedObject::new("obj", object_type, properties)
    }

    #[test]
    fn test_extract_identifiers() {
        let ids = extract_identifiers("d(A, X) + A.x + lineB.n.dot(C) + t^2");
        assert_eq!(ids.function_names, vec!["d"]);
        assert_eq!(ids.object_names, vec!["A", "C", "X", "lineB", "t"]);
        assert_eq!(ids.field_names, vec!["n", "x"]);
        assert_eq!(ids.method_names, vec!["dot"]);
    }

    #[test]
    fn test_parentheses_balanced() {
        assert!(parentheses_balanced("d(A, (B))"));
        assert!(!parentheses_balanced("d(A, B"));
        assert!(!parentheses_balanced(")("));
    }

    #[test]
    fn test_dependencies_skip_coordinate_literals() {
        let obj = object(ObjectType::LineAB, json!({"point1": "0,0", "point2": "B"}));
        assert_eq!(dependencies(&obj), vec!["B"]);
    }

    #[test]
    fn test_dependencies_from_formulas() {
        let obj = object(
            ObjectType::ScaledVectorPoint,
            json!({"k": "sqrt(2)*t", "k_value": 0.0, "point1": "A", "point2": "3,4"}),
        );
        assert_eq!(dependencies(&obj), vec!["A", "t"]);

        let obj = object(ObjectType::Invariant, json!({"formula": "d(A, X)"}));
        assert_eq!(dependencies(&obj), vec!["A", "X"]);
    }

    #[test]
    fn test_dependencies_of_intersection() {
        let obj = object(
            ObjectType::IntersectionPoint,
            json!({"object_name_1": "lineA", "object_name_2": "lineB"}),
        );
        assert_eq!(dependencies(&obj), vec!["lineA", "lineB"]);
    }
}
