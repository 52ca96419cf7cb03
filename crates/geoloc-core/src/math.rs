//! 数学基础类型
//!
//! 基于 nalgebra，坐标均为逻辑坐标（非像素）。

/// 二维点
pub type Point2 = nalgebra::Point2<f64>;

/// 二维向量
pub type Vector2 = nalgebra::Vector2<f64>;

/// 通用浮点容差
pub const EPSILON: f64 = 1e-10;

/// 判断两点是否重合（在容差内）
pub fn points_coincide(a: &Point2, b: &Point2) -> bool {
    (a - b).norm() < 1e-9
}

/// 最近的整数网格点
pub fn nearest_lattice_point(p: &Point2, spacing: f64) -> Point2 {
    Point2::new(
        (p.x / spacing).round() * spacing,
        (p.y / spacing).round() * spacing,
    )
}
