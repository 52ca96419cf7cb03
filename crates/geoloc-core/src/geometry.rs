//! 几何内核
//!
//! 无状态的点/直线运算：
//! - 点到直线距离、点到线段距离
//! - 直线求交
//! - 投影、反射
//! - 中垂线、垂线、平行线
//! - 缩放向量点
//!
//! 直线以「线上一点 + 法向量」表示：`{p : n·(p - point) = 0}`。
//! 法向量不要求单位长度；零法向量表示退化直线，所有距离查询返回 +∞。

use crate::math::{Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};

/// 直线（点法式）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// 直线上的一点
    pub point: Point2,
    /// 法向量
    pub n: Vector2,
}

impl Line {
    pub fn new(point: Point2, n: Vector2) -> Self {
        Self { point, n }
    }

    /// 过两点的直线
    ///
    /// 法向量取方向向量逆时针旋转 90°，即 `(-d.y, d.x)`。
    pub fn through(p1: Point2, p2: Point2) -> Self {
        let d = p2 - p1;
        Self::new(p1, Vector2::new(-d.y, d.x))
    }

    /// 方向向量（未归一化）
    pub fn direction(&self) -> Vector2 {
        Vector2::new(self.n.y, -self.n.x)
    }

    /// 是否退化（法向量为零）
    pub fn is_degenerate(&self) -> bool {
        self.n.norm_squared() == 0.0
    }

    /// 点到直线的距离，退化直线返回 +∞
    pub fn distance_to_point(&self, p: &Point2) -> f64 {
        distance_point_to_line(p, self)
    }

    /// 是否与另一直线表示同一条几何直线
    pub fn coincides_with(&self, other: &Line) -> bool {
        let cross = self.n.x * other.n.y - self.n.y * other.n.x;
        cross.abs() < EPSILON && other.distance_to_point(&self.point) < 1e-9
    }
}

/// 点到直线的距离：`|n·(p - point)| / |n|`
pub fn distance_point_to_line(p: &Point2, line: &Line) -> f64 {
    let len = line.n.norm();
    if len == 0.0 {
        return f64::INFINITY;
    }
    line.n.dot(&(p - line.point)).abs() / len
}

/// 两直线交点
///
/// 求解 `n_i · p = n_i · point_i`，行列式绝对值小于 1e-10 视为平行，返回 None。
pub fn intersect(l1: &Line, l2: &Line) -> Option<Point2> {
    intersect_with_tolerance(l1, l2, EPSILON)
}

/// 指定平行判定容差的求交
pub fn intersect_with_tolerance(l1: &Line, l2: &Line, parallel_epsilon: f64) -> Option<Point2> {
    let det = l1.n.x * l2.n.y - l1.n.y * l2.n.x;
    if det.abs() < parallel_epsilon {
        return None;
    }

    let c1 = l1.n.dot(&l1.point.coords);
    let c2 = l2.n.dot(&l2.point.coords);

    // Cramer 法则
    let x = (c1 * l2.n.y - l1.n.y * c2) / det;
    let y = (l1.n.x * c2 - c1 * l2.n.x) / det;
    Some(Point2::new(x, y))
}

/// 点在直线上的垂直投影：`p - (n·(p - point)/|n|²)·n`
pub fn project(p: &Point2, line: &Line) -> Option<Point2> {
    let len_sq = line.n.norm_squared();
    if len_sq == 0.0 {
        return None;
    }
    let t = line.n.dot(&(p - line.point)) / len_sq;
    Some(p - line.n * t)
}

/// 点关于直线的反射：`p - 2(n·(p - point)/|n|²)·n`
pub fn reflect(p: &Point2, line: &Line) -> Option<Point2> {
    let len_sq = line.n.norm_squared();
    if len_sq == 0.0 {
        return None;
    }
    let t = line.n.dot(&(p - line.point)) / len_sq;
    Some(p - line.n * (2.0 * t))
}

/// 两点中点
pub fn midpoint(p1: &Point2, p2: &Point2) -> Point2 {
    nalgebra::center(p1, p2)
}

/// 中垂线：过中点，以线段向量为法向量
pub fn perpendicular_bisector(p1: &Point2, p2: &Point2) -> Line {
    Line::new(midpoint(p1, p2), p2 - p1)
}

/// 过给定点垂直于参考直线的直线
///
/// 新直线的法向量为参考法向量旋转 90°，因此其方向与参考法向量一致。
pub fn perpendicular_to_line(through: &Point2, line: &Line) -> Line {
    Line::new(*through, Vector2::new(line.n.y, -line.n.x))
}

/// 过给定点平行于参考直线的直线
pub fn parallel_to_line(through: &Point2, line: &Line) -> Line {
    Line::new(*through, line.n)
}

/// 缩放向量点：`p1 + k·(p2 - p1)`，k 不做截断
pub fn scaled_vector_point(p1: &Point2, p2: &Point2, k: f64) -> Point2 {
    p1 + (p2 - p1) * k
}

/// 点到线段的距离（参数 t 截断到 [0, 1]）
pub fn distance_point_to_segment(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let v = b - a;
    let len_sq = v.norm_squared();
    if len_sq < EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&v) / len_sq).clamp(0.0, 1.0);
    let closest = a + v * t;
    (p - closest).norm()
}
