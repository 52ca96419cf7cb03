//! 参数捕捉
//!
//! 根据光标位置，把一个参数槽解析为具体的参数值。
//! 参数槽声明了按优先级排列的候选类型，第一个命中的类型胜出：
//! - 网格点 (GridPoint)
//! - 已定义点 (AnyDefinedPoint / MobilePoint)
//! - 已定义点或网格点 (AnyDefinedOrGridPoint)
//! - 两直线交点 (IntersectionPoint)
//! - 直线上的网格点 (SlidingPoint)
//! - 直线 (Line)
//!
//! 已被占用的点（互斥类型对象的点、本次构造已选的点）不能再次命中。

use crate::creators::ArgumentValue;
use crate::geometry::{intersect_with_tolerance, Line};
use crate::math::{nearest_lattice_point, points_coincide, Point2, EPSILON};
use crate::shape::{ObjectType, Shape};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 参数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgumentType {
    GridPoint,
    /// 非固定点的已定义点
    MobilePoint,
    AnyDefinedPoint,
    AnyDefinedOrGridPoint,
    IntersectionPoint,
    SlidingPoint,
    Line,
}

impl ArgumentType {
    pub fn name(&self) -> &'static str {
        match self {
            ArgumentType::GridPoint => "GridPoint",
            ArgumentType::MobilePoint => "MobilePoint",
            ArgumentType::AnyDefinedPoint => "AnyDefinedPoint",
            ArgumentType::AnyDefinedOrGridPoint => "AnyDefinedOrGridPoint",
            ArgumentType::IntersectionPoint => "IntersectionPoint",
            ArgumentType::SlidingPoint => "SlidingPoint",
            ArgumentType::Line => "Line",
        }
    }

    /// 该类型是否解析为一个点
    pub fn is_point(&self) -> bool {
        !matches!(self, ArgumentType::Line)
    }
}

/// 捕捉配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// 捕捉容差（逻辑坐标）
    pub tolerance: f64,
    /// 交点距光标的最大距离
    pub intersection_tolerance: f64,
    /// 网格间距
    pub grid_spacing: f64,
    /// 平行判定容差
    pub parallel_epsilon: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.15,
            intersection_tolerance: 0.25,
            grid_spacing: 1.0,
            parallel_epsilon: EPSILON,
        }
    }
}

/// 捕捉结果
#[derive(Debug, Clone, PartialEq)]
pub struct SnapMatch {
    /// 命中的候选类型
    pub argument_type: ArgumentType,
    /// 解析得到的参数值
    pub value: ArgumentValue,
    /// 需要高亮的已有对象
    pub highlight: Vec<String>,
    /// 被引用对象的类型（网格点为 None）
    pub object_type: Option<ObjectType>,
}

impl SnapMatch {
    fn new(argument_type: ArgumentType, value: ArgumentValue, object_type: Option<ObjectType>) -> Self {
        let highlight = value.referenced_names();
        Self {
            argument_type,
            value,
            highlight,
            object_type,
        }
    }
}

/// 参数捕捉引擎
#[derive(Debug, Clone, Default)]
pub struct SnapEngine {
    config: SnapConfig,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SnapConfig {
        &mut self.config
    }

    /// 解析一个参数槽
    ///
    /// # 参数
    /// - `cursor`: 光标的逻辑坐标
    /// - `candidates`: 按优先级排列的候选类型
    /// - `exclusive`: 其点位不可复用的对象类型
    /// - `shapes`: 场景中已提交的对象
    /// - `collected`: 本次构造已收集的参数
    pub fn resolve(
        &self,
        cursor: Point2,
        candidates: &[ArgumentType],
        exclusive: &[ObjectType],
        shapes: &[Arc<Shape>],
        collected: &[ArgumentValue],
    ) -> Option<SnapMatch> {
        let occupied = occupied_points(exclusive, shapes, collected);

        candidates.iter().find_map(|candidate| {
            let found = match candidate {
                ArgumentType::GridPoint => self.snap_to_grid(cursor, &occupied),
                ArgumentType::AnyDefinedPoint => {
                    self.snap_to_defined_point(cursor, shapes, &occupied, ArgumentType::AnyDefinedPoint)
                }
                ArgumentType::MobilePoint => {
                    self.snap_to_defined_point(cursor, shapes, &occupied, ArgumentType::MobilePoint)
                }
                ArgumentType::AnyDefinedOrGridPoint => self
                    .snap_to_defined_point(cursor, shapes, &occupied, ArgumentType::AnyDefinedPoint)
                    .or_else(|| self.snap_to_grid(cursor, &occupied)),
                ArgumentType::IntersectionPoint => {
                    self.snap_to_intersection(cursor, shapes, &occupied)
                }
                ArgumentType::SlidingPoint => self.snap_to_sliding(cursor, shapes, &occupied),
                ArgumentType::Line => self.snap_to_line(cursor, shapes, collected),
            };
            found.map(|m| SnapMatch {
                argument_type: *candidate,
                ..m
            })
        })
    }

    /// 网格点捕捉
    fn snap_to_grid(&self, cursor: Point2, occupied: &[Point2]) -> Option<SnapMatch> {
        let grid = nearest_lattice_point(&cursor, self.config.grid_spacing);
        if (grid - cursor).norm() >= self.config.tolerance || is_occupied(&grid, occupied) {
            return None;
        }
        Some(SnapMatch::new(
            ArgumentType::GridPoint,
            ArgumentValue::GridPoint(grid),
            None,
        ))
    }

    /// 已定义点捕捉：取最近的点，再检查容差与占用
    fn snap_to_defined_point(
        &self,
        cursor: Point2,
        shapes: &[Arc<Shape>],
        occupied: &[Point2],
        kind: ArgumentType,
    ) -> Option<SnapMatch> {
        let mobile_only = kind == ArgumentType::MobilePoint;
        let (shape, point, dist) = shapes
            .iter()
            .filter(|s| {
                if mobile_only {
                    s.object_type().is_mobile_point()
                } else {
                    s.object_type().is_point()
                }
            })
            .filter_map(|s| s.defined_point().map(|p| (s, p, (p - cursor).norm())))
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))?;

        if dist >= self.config.tolerance || is_occupied(&point, occupied) {
            return None;
        }

        Some(SnapMatch::new(
            kind,
            ArgumentValue::DefinedPoint {
                name: shape.name().to_string(),
                point,
            },
            Some(shape.object_type()),
        ))
    }

    /// 交点捕捉：距光标最近的两条直线
    fn snap_to_intersection(
        &self,
        cursor: Point2,
        shapes: &[Arc<Shape>],
        occupied: &[Point2],
    ) -> Option<SnapMatch> {
        let nearest = lines_by_distance(cursor, shapes);
        let (first, l1, d1) = nearest.first()?;
        let (second, l2, d2) = nearest.get(1)?;
        if *d1 >= self.config.tolerance || *d2 >= self.config.tolerance {
            return None;
        }

        let point = intersect_with_tolerance(l1, l2, self.config.parallel_epsilon)?;
        if (point - cursor).norm() >= self.config.intersection_tolerance
            || is_occupied(&point, occupied)
        {
            return None;
        }

        Some(SnapMatch::new(
            ArgumentType::IntersectionPoint,
            ArgumentValue::Intersection {
                line1: first.name().to_string(),
                line2: second.name().to_string(),
                point,
            },
            None,
        ))
    }

    /// 直线上的网格点：网格点与直线须同时命中
    fn snap_to_sliding(
        &self,
        cursor: Point2,
        shapes: &[Arc<Shape>],
        occupied: &[Point2],
    ) -> Option<SnapMatch> {
        let grid = match self.snap_to_grid(cursor, occupied)?.value {
            ArgumentValue::GridPoint(p) => p,
            _ => return None,
        };
        let (shape, _, dist) = lines_by_distance(cursor, shapes).into_iter().next()?;
        if dist >= self.config.tolerance {
            return None;
        }

        Some(SnapMatch::new(
            ArgumentType::SlidingPoint,
            ArgumentValue::Sliding {
                line: shape.name().to_string(),
                point: grid,
            },
            Some(shape.object_type()),
        ))
    }

    /// 直线捕捉，跳过本次构造已选过的直线
    fn snap_to_line(
        &self,
        cursor: Point2,
        shapes: &[Arc<Shape>],
        collected: &[ArgumentValue],
    ) -> Option<SnapMatch> {
        let (shape, line, dist) = lines_by_distance(cursor, shapes)
            .into_iter()
            .find(|(shape, line, _)| {
                !collected.iter().any(|arg| match arg {
                    ArgumentValue::Line {
                        name,
                        line: chosen,
                        ..
                    } => name == shape.name() || chosen.coincides_with(line),
                    _ => false,
                })
            })?;
        if dist >= self.config.tolerance {
            return None;
        }

        Some(SnapMatch::new(
            ArgumentType::Line,
            ArgumentValue::Line {
                name: shape.name().to_string(),
                line,
                object_type: shape.object_type(),
            },
            Some(shape.object_type()),
        ))
    }
}

/// 被占用的点
fn occupied_points(
    exclusive: &[ObjectType],
    shapes: &[Arc<Shape>],
    collected: &[ArgumentValue],
) -> Vec<Point2> {
    shapes
        .iter()
        .filter(|s| exclusive.contains(&s.object_type()))
        .filter_map(|s| s.defined_point())
        .chain(collected.iter().filter_map(ArgumentValue::point))
        .collect()
}

fn is_occupied(p: &Point2, occupied: &[Point2]) -> bool {
    occupied.iter().any(|o| points_coincide(p, o))
}

/// 场景中的直线，按到光标的距离升序
fn lines_by_distance(
    cursor: Point2,
    shapes: &[Arc<Shape>],
) -> Vec<(&Arc<Shape>, Line, f64)> {
    let mut lines: Vec<_> = shapes
        .iter()
        .filter_map(|s| s.defined_line().map(|l| (s, l, l.distance_to_point(&cursor))))
        .collect();
    lines.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
    lines
}
