//! 距离/角度不变量工厂

use super::{
    build_point_and_line, build_two_points, line_parts, name_label, point_and_line_arguments,
    point_and_line_properties, point_argument, point_label, put_line, put_point, ArgumentValue,
    BuildResult, ShapeCreator,
};
use crate::error::ShapeError;
use crate::geometry::{intersect, project};
use crate::shape::{ObjectType, Properties, Shape, ShapeGeometry};
use std::sync::Arc;

/// 距离不变量的类型重判
///
/// 两点距离不变量的第二个参数解析为直线时，转为点线距离不变量。
/// 参数列表不变，`properties_from` 按新类型写出 `point`/`line`。
pub fn reclassify_distance_invariant(
    object_type: ObjectType,
    args: &[ArgumentValue],
) -> ObjectType {
    match (object_type, args.get(1)) {
        (ObjectType::TwoPointDistanceInvariant, Some(ArgumentValue::Line { .. })) => {
            ObjectType::PointToLineDistanceInvariant
        }
        _ => object_type,
    }
}

/// 两点距离不变量
pub struct TwoPointDistanceInvariantCreator;

impl ShapeCreator for TwoPointDistanceInvariantCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::TwoPointDistanceInvariant
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
        Ok(build_two_points(args, ShapeGeometry::Segment))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "d({}, {}) = const",
            point_label(properties, "point1"),
            point_label(properties, "point2")
        )
    }
}

/// 点到直线距离不变量，几何为点到其垂足的线段
pub struct PointToLineDistanceInvariantCreator;

impl ShapeCreator for PointToLineDistanceInvariantCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::PointToLineDistanceInvariant
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
            project(&p, &line).map(|foot| ShapeGeometry::Segment(p, foot))
        }))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "d({}, {}) = const",
            point_label(properties, "point"),
            name_label(properties, "line")
        )
    }
}

/// 两直线夹角不变量
///
/// 两条直线都必须是过两点的直线且不平行，否则报错（不退化）。
/// 几何为两直线交点，作为显示锚点。
pub struct TwoLineAngleInvariantCreator;

impl TwoLineAngleInvariantCreator {
    fn check_line_ab(index: usize, arg: &ArgumentValue) -> Result<(), ShapeError> {
        match arg {
            ArgumentValue::Line {
                object_type: ObjectType::LineAB,
                ..
            } => Ok(()),
            ArgumentValue::Line { name, .. } => Err(ShapeError::NotLineAB(name.clone())),
            _ => Err(ShapeError::ArgumentKind {
                index,
                object_type: ObjectType::TwoLineAngleInvariant.to_string(),
            }),
        }
    }
}

impl ShapeCreator for TwoLineAngleInvariantCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::TwoLineAngleInvariant
    }

    fn arity(&self) -> usize {
        2
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        let mut properties = Properties::new();
        put_line(&mut properties, "line1", args.first());
        put_line(&mut properties, "line2", args.get(1));
        properties
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        let mut args = Vec::with_capacity(2);
        for key in ["line1", "line2"] {
            let (name, line, object_type) = line_parts(properties, key, shapes)?;
            args.push(ArgumentValue::Line {
                name,
                line,
                object_type,
            });
        }
        Ok(args)
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        for (index, arg) in args.iter().enumerate() {
            Self::check_line_ab(index, arg)?;
        }

        match (args.first(), args.get(1)) {
            (
                Some(ArgumentValue::Line {
                    name: name1,
                    line: l1,
                    ..
                }),
                Some(ArgumentValue::Line {
                    name: name2,
                    line: l2,
                    ..
                }),
            ) => {
                let anchor = intersect(l1, l2)
                    .ok_or_else(|| ShapeError::ParallelLines(name1.clone(), name2.clone()))?;
                Ok(BuildResult::Complete(ShapeGeometry::Point(anchor)))
            }
            _ => Ok(BuildResult::Empty),
        }
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "angle({}, {}) = const",
            name_label(properties, "line1"),
            name_label(properties, "line2")
        )
    }

    fn strict(&self) -> bool {
        true
    }
}
