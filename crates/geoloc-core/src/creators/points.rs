//! 点类对象工厂

use super::{
    arg_point, build_point_and_line, build_two_points, line_parts, name_label,
    point_and_line_arguments, point_and_line_properties, point_argument, point_label, put_point,
    required_str, ArgumentValue, BuildResult, ShapeCreator,
};
use crate::coords::{display_coordinate, format_coordinate, parse_coordinate};
use crate::error::ShapeError;
use crate::geometry::{intersect, midpoint, project, reflect, scaled_vector_point};
use crate::math::Point2;
use crate::shape::{str_property, ObjectType, Properties, Shape, ShapeGeometry};
use serde_json::Value;
use std::sync::Arc;

/// 读取 `value` 坐标字面量
fn literal_value(properties: &Properties) -> Result<Point2, ShapeError> {
    let raw = required_str(properties, "value")?;
    parse_coordinate(raw).ok_or_else(|| ShapeError::InvalidCoordinate(raw.to_string()))
}

fn value_label(properties: &Properties) -> String {
    str_property(properties, "value")
        .and_then(parse_coordinate)
        .map(|p| display_coordinate(&p))
        .unwrap_or_else(|| "?".to_string())
}

fn single_point_properties(args: &[ArgumentValue]) -> Properties {
    let mut properties = Properties::new();
    if let Some(p) = arg_point(args, 0) {
        properties.insert("value".to_string(), Value::String(format_coordinate(&p)));
    }
    properties
}

fn single_point_build(args: &[ArgumentValue]) -> BuildResult {
    match arg_point(args, 0) {
        Some(p) => BuildResult::Complete(ShapeGeometry::Point(p)),
        None => BuildResult::Empty,
    }
}

// ========== 固定点 / 自由点 ==========

pub struct FixedPointCreator;

impl ShapeCreator for FixedPointCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::FixedPoint
    }

    fn arity(&self) -> usize {
        1
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        single_point_properties(args)
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        _shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        Ok(vec![ArgumentValue::GridPoint(literal_value(properties)?)])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(single_point_build(args))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!("fixed {}", value_label(properties))
    }
}

pub struct FreePointCreator;

impl ShapeCreator for FreePointCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::FreePoint
    }

    fn arity(&self) -> usize {
        1
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        single_point_properties(args)
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        _shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        Ok(vec![ArgumentValue::GridPoint(literal_value(properties)?)])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(single_point_build(args))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!("free {}", value_label(properties))
    }
}

// ========== 中点 ==========

pub struct MidpointCreator;

impl ShapeCreator for MidpointCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::Midpoint
    }

    fn arity(&self) -> usize {
        2
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        let mut properties = Properties::new();
        put_point(&mut properties, "point1", args.first());
        put_point(&mut properties, "point2", args.get(1));
        properties
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        Ok(vec![
            point_argument(properties, "point1", shapes)?,
            point_argument(properties, "point2", shapes)?,
        ])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(build_two_points(args, |p1, p2| {
            ShapeGeometry::Point(midpoint(&p1, &p2))
        }))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "midpoint({}, {})",
            point_label(properties, "point1"),
            point_label(properties, "point2")
        )
    }
}

// ========== 交点 ==========

pub struct IntersectionPointCreator;

impl ShapeCreator for IntersectionPointCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::IntersectionPoint
    }

    fn arity(&self) -> usize {
        1
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        let mut properties = Properties::new();
        if let Some(ArgumentValue::Intersection { line1, line2, .. }) = args.first() {
            properties.insert("object_name_1".to_string(), Value::String(line1.clone()));
            properties.insert("object_name_2".to_string(), Value::String(line2.clone()));
        }
        properties
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        let (line1, l1, _) = line_parts(properties, "object_name_1", shapes)?;
        let (line2, l2, _) = line_parts(properties, "object_name_2", shapes)?;
        let point = intersect(&l1, &l2)
            .ok_or_else(|| ShapeError::ParallelLines(line1.clone(), line2.clone()))?;
        Ok(vec![ArgumentValue::Intersection {
            line1,
            line2,
            point,
        }])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(single_point_build(args))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "{} ∩ {}",
            name_label(properties, "object_name_1"),
            name_label(properties, "object_name_2")
        )
    }
}

// ========== 直线上的点 ==========

pub struct SlidingPointCreator;

impl ShapeCreator for SlidingPointCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::SlidingPoint
    }

    fn arity(&self) -> usize {
        1
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        let mut properties = Properties::new();
        if let Some(ArgumentValue::Sliding { line, point }) = args.first() {
            properties.insert("value".to_string(), Value::String(format_coordinate(point)));
            properties.insert(
                "constraining_object_name".to_string(),
                Value::String(line.clone()),
            );
        }
        properties
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        let point = literal_value(properties)?;
        let (line, _, _) = line_parts(properties, "constraining_object_name", shapes)?;
        Ok(vec![ArgumentValue::Sliding { line, point }])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(single_point_build(args))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!("on {}", name_label(properties, "constraining_object_name"))
    }
}

// ========== 投影 / 反射 ==========

pub struct ProjectionCreator;

impl ShapeCreator for ProjectionCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::Projection
    }

    fn arity(&self) -> usize {
        2
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        point_and_line_properties(args)
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        point_and_line_arguments(properties, shapes)
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(build_point_and_line(args, |p, line| {
            project(&p, &line).map(ShapeGeometry::Point)
        }))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "projection of {} onto {}",
            point_label(properties, "point"),
            name_label(properties, "line")
        )
    }
}

pub struct ReflectionCreator;

impl ShapeCreator for ReflectionCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::Reflection
    }

    fn arity(&self) -> usize {
        2
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        point_and_line_properties(args)
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        point_and_line_arguments(properties, shapes)
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(build_point_and_line(args, |p, line| {
            reflect(&p, &line).map(ShapeGeometry::Point)
        }))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "reflection of {} across {}",
            point_label(properties, "point"),
            name_label(properties, "line")
        )
    }
}

// ========== 比例向量点 P1 + k(P2 - P1) ==========

pub struct ScaledVectorPointCreator;

impl ScaledVectorPointCreator {
    /// 参数顺序：k 表达式、point1、point2
    fn k_value(args: &[ArgumentValue]) -> Option<f64> {
        match args.first() {
            Some(ArgumentValue::Expression { value, .. }) => *value,
            _ => None,
        }
    }
}

impl ShapeCreator for ScaledVectorPointCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::ScaledVectorPoint
    }

    fn arity(&self) -> usize {
        3
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        let mut properties = Properties::new();
        if let Some(ArgumentValue::Expression { text, value }) = args.first() {
            properties.insert("k".to_string(), Value::String(text.clone()));
            properties.insert("k_value".to_string(), Value::from(value.unwrap_or(0.0)));
        }
        put_point(&mut properties, "point1", args.get(1));
        put_point(&mut properties, "point2", args.get(2));
        properties
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        let text = required_str(properties, "k")?.to_string();
        let value = properties.get("k_value").and_then(Value::as_f64);
        Ok(vec![
            ArgumentValue::Expression { text, value },
            point_argument(properties, "point1", shapes)?,
            point_argument(properties, "point2", shapes)?,
        ])
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        let k = Self::k_value(args);
        let result = match (k, arg_point(args, 1), arg_point(args, 2)) {
            (Some(k), Some(p1), Some(p2)) => {
                BuildResult::Complete(ShapeGeometry::Point(scaled_vector_point(&p1, &p2, k)))
            }
            (_, Some(p1), None) => BuildResult::Incomplete(p1),
            _ => BuildResult::Empty,
        };
        Ok(result)
    }

    fn describe(&self, properties: &Properties) -> String {
        let k = properties
            .get("k_value")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let p1 = point_label(properties, "point1");
        let p2 = point_label(properties, "point2");
        format!("{p1} + k({p2}-{p1}), k={k:.2}")
    }
}
