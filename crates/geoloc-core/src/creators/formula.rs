//! 公式类与无几何对象工厂：计算点、参数、公式不变量、轨迹

use super::{
    point_argument, point_label, put_point, required_str, ArgumentValue, BuildResult, ShapeCreator,
};
use crate::coords::{format_coordinate, parse_coordinate};
use crate::error::ShapeError;
use crate::math::Point2;
use crate::shape::{str_property, ObjectType, Properties, Shape, ShapeGeometry};
use serde_json::Value;
use std::sync::Arc;

fn expression_at(args: &[ArgumentValue], index: usize) -> Option<(&str, Option<f64>)> {
    match args.get(index) {
        Some(ArgumentValue::Expression { text, value }) => Some((text.as_str(), *value)),
        _ => None,
    }
}

/// 由 x、y 两个表达式确定的点
///
/// 表达式本身交给场景存储求值，这里只保存初始值 `value`。
pub struct ComputedPointCreator;

impl ShapeCreator for ComputedPointCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::ComputedPoint
    }

    fn arity(&self) -> usize {
        2
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        let mut properties = Properties::new();
        let x = expression_at(args, 0);
        let y = expression_at(args, 1);
        if let Some((text, _)) = x {
            properties.insert("x_expr".to_string(), Value::String(text.to_string()));
        }
        if let Some((text, _)) = y {
            properties.insert("y_expr".to_string(), Value::String(text.to_string()));
        }
        if let (Some((_, Some(vx))), Some((_, Some(vy)))) = (x, y) {
            properties.insert(
                "value".to_string(),
                Value::String(format_coordinate(&Point2::new(vx, vy))),
            );
        }
        properties
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        _shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        let value = str_property(properties, "value").and_then(parse_coordinate);
        Ok(vec![
            ArgumentValue::Expression {
                text: required_str(properties, "x_expr")?.to_string(),
                value: value.map(|p| p.x),
            },
            ArgumentValue::Expression {
                text: required_str(properties, "y_expr")?.to_string(),
                value: value.map(|p| p.y),
            },
        ])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        let result = match (expression_at(args, 0), expression_at(args, 1)) {
            (Some((_, Some(x))), Some((_, Some(y)))) => {
                BuildResult::Complete(ShapeGeometry::Point(Point2::new(x, y)))
            }
            _ => BuildResult::Empty,
        };
        Ok(result)
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "({}, {})",
            str_property(properties, "x_expr").unwrap_or("?"),
            str_property(properties, "y_expr").unwrap_or("?")
        )
    }
}

/// 自由参数（无参数、无几何）
pub struct ParameterCreator;

impl ShapeCreator for ParameterCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::Parameter
    }

    fn arity(&self) -> usize {
        0
    }

    fn properties_from(&self, _args: &[ArgumentValue]) -> Properties {
        Properties::new()
    }

    fn arguments_from(
        &self,
        _properties: &Properties,
        _shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        Ok(Vec::new())
    }

    fn build(&self, _args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(BuildResult::Complete(ShapeGeometry::None))
    }

    fn describe(&self, _properties: &Properties) -> String {
        "parameter".to_string()
    }
}

/// 公式不变量 `formula = const`
pub struct InvariantCreator;

impl ShapeCreator for InvariantCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::Invariant
    }

    fn arity(&self) -> usize {
        1
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        let mut properties = Properties::new();
        if let Some((text, _)) = expression_at(args, 0) {
            properties.insert("formula".to_string(), Value::String(text.to_string()));
        }
        properties
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        _shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        Ok(vec![ArgumentValue::Expression {
            text: required_str(properties, "formula")?.to_string(),
            value: None,
        }])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        let result = match expression_at(args, 0) {
            Some(_) => BuildResult::Complete(ShapeGeometry::None),
            None => BuildResult::Empty,
        };
        Ok(result)
    }

    fn describe(&self, properties: &Properties) -> String {
        format!("{} = const", str_property(properties, "formula").unwrap_or("?"))
    }
}

/// 轨迹：记录生成点，曲线由场景存储采样
pub struct LocusCreator;

impl ShapeCreator for LocusCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::Locus
    }

    fn arity(&self) -> usize {
        1
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        let mut properties = Properties::new();
        put_point(&mut properties, "point", args.first());
        properties
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        Ok(vec![point_argument(properties, "point", shapes)?])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        let result = match args.first() {
            Some(ArgumentValue::DefinedPoint { .. }) => BuildResult::Complete(ShapeGeometry::None),
            _ => BuildResult::Empty,
        };
        Ok(result)
    }

    fn describe(&self, properties: &Properties) -> String {
        format!("Plot {}", point_label(properties, "point"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{creator_for, resolve_shape};
    use super::*;
    use crate::shape::PersistedObject;
    use serde_json::json;

    #[test]
    fn test_computed_point_from_properties() {
        let obj = PersistedObject::new(
            "X",
            ObjectType::ComputedPoint,
            props(json!({"x_expr": "A.x + 1", "y_expr": "2", "value": "3, 2"})),
        );
        let shape = resolve_shape(&obj, &[]).unwrap();
        assert_eq!(shape.defined_point(), Some(Point2::new(3.0, 2.0)));
        assert_eq!(shape.description(), "(A.x + 1, 2)");
    }

    #[test]
    fn test_computed_point_properties_from_expressions() {
        let creator = creator_for(ObjectType::ComputedPoint);
        let args = vec![
            ArgumentValue::Expression {
                text: "t".to_string(),
                value: Some(0.5),
            },
            ArgumentValue::Expression {
                text: "2*t".to_string(),
                value: Some(1.0),
            },
        ];
        let properties = creator.properties_from(&args);
        assert_eq!(properties["x_expr"], json!("t"));
        assert_eq!(properties["y_expr"], json!("2*t"));
        assert_eq!(properties["value"], json!("0.5,1"));
        assert_eq!(
            creator.build(&args).unwrap(),
            BuildResult::Complete(ShapeGeometry::Point(Point2::new(0.5, 1.0)))
        );
        assert_eq!(creator.build(&args[..1]).unwrap(), BuildResult::Empty);
    }

    #[test]
    fn test_parameter_has_no_geometry() {
        let obj = PersistedObject::new("t", ObjectType::Parameter, Properties::new());
        let shape = resolve_shape(&obj, &[]).unwrap();
        assert_eq!(*shape.geometry(), ShapeGeometry::None);
        assert_eq!(shape.description(), "parameter");
    }

    #[test]
    fn test_invariant_description() {
        let obj = PersistedObject::new(
            "invA",
            ObjectType::Invariant,
            props(json!({"formula": "d(A, X) + d(B, X)"})),
        );
        let shape = resolve_shape(&obj, &[]).unwrap();
        assert_eq!(shape.description(), "d(A, X) + d(B, X) = const");
    }

    #[test]
    fn test_locus() {
        let shapes = vec![point_shape("X", ObjectType::SlidingPoint, 1.0, 0.0)];
        let creator = creator_for(ObjectType::Locus);
        let args = creator
            .arguments_from(&props(json!({"point": "X"})), &shapes)
            .unwrap();
        assert_eq!(
            creator.build(&args).unwrap(),
            BuildResult::Complete(ShapeGeometry::None)
        );
        assert_eq!(creator.describe(&creator.properties_from(&args)), "Plot X");
    }
}
