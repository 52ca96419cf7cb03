//! 直线类对象工厂

use super::{
    build_point_and_line, build_two_points, name_label, point_and_line_arguments,
    point_and_line_properties, point_argument, point_label, put_point, ArgumentValue, BuildResult,
    ShapeCreator,
};
use crate::error::ShapeError;
use crate::geometry::{parallel_to_line, perpendicular_bisector, perpendicular_to_line, Line};
use crate::shape::{ObjectType, Properties, Shape, ShapeGeometry};
use std::sync::Arc;

fn two_point_properties(args: &[ArgumentValue]) -> Properties {
    let mut properties = Properties::new();
    put_point(&mut properties, "point1", args.first());
    put_point(&mut properties, "point2", args.get(1));
    properties
}

fn two_point_arguments(
    properties: &Properties,
    shapes: &[Arc<Shape>],
) -> Result<Vec<ArgumentValue>, ShapeError> {
    Ok(vec![
        point_argument(properties, "point1", shapes)?,
        point_argument(properties, "point2", shapes)?,
    ])
}

/// 过两点的直线
pub struct LineAbCreator;

impl ShapeCreator for LineAbCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::LineAB
    }

    fn arity(&self) -> usize {
        2
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        two_point_properties(args)
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        two_point_arguments(properties, shapes)
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(build_two_points(args, |p1, p2| {
            ShapeGeometry::Line(Line::through(p1, p2))
        }))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "line({}, {})",
            point_label(properties, "point1"),
            point_label(properties, "point2")
        )
    }
}

/// 两点的中垂线
pub struct PpBisectorCreator;

impl ShapeCreator for PpBisectorCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::PpBisector
    }

    fn arity(&self) -> usize {
        2
    }

    fn properties_from(&self, args: &[ArgumentValue]) -> Properties {
        two_point_properties(args)
    }

    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError> {
        two_point_arguments(properties, shapes)
    }

    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError> {
        Ok(build_two_points(args, |p1, p2| {
            ShapeGeometry::Line(perpendicular_bisector(&p1, &p2))
        }))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "bisector({}, {})",
            point_label(properties, "point1"),
            point_label(properties, "point2")
        )
    }
}

/// 过点垂直于直线
pub struct PpToLineCreator;

impl ShapeCreator for PpToLineCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::PpToLine
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
            Some(ShapeGeometry::Line(perpendicular_to_line(&p, &line)))
        }))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "perpendicular to {} through {}",
            name_label(properties, "line"),
            point_label(properties, "point")
        )
    }
}

/// 过点平行于直线
pub struct PlToLineCreator;

impl ShapeCreator for PlToLineCreator {
    fn object_type(&self) -> ObjectType {
        ObjectType::PlToLine
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
            Some(ShapeGeometry::Line(parallel_to_line(&p, &line)))
        }))
    }

    fn describe(&self, properties: &Properties) -> String {
        format!(
            "parallel to {} through {}",
            name_label(properties, "line"),
            point_label(properties, "point")
        )
    }
}
