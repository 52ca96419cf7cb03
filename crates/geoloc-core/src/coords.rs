//! 坐标/引用字符串解析
//!
//! 属性值中的点参数有两种形式：
//! - 坐标字面量: `2,3` 或 `-1.5, 4`
//! - 对象引用: `A`、`lineB`
//!
//! 匹配数值对模式的按坐标解析，其余一律视为对象名。

use crate::math::Point2;
use regex_lite::Regex;
use std::sync::OnceLock;

/// 解析后的点参数
#[derive(Debug, Clone, PartialEq)]
pub enum PointRef {
    /// 坐标字面量
    Literal(Point2),
    /// 对象引用
    Named(String),
}

fn coordinate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$")
            .expect("coordinate pattern is valid")
    })
}

/// 尝试把字符串解析为坐标字面量
pub fn parse_coordinate(input: &str) -> Option<Point2> {
    let caps = coordinate_pattern().captures(input)?;
    let x = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let y = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some(Point2::new(x, y))
}

/// 是否为坐标字面量
pub fn is_coordinate(input: &str) -> bool {
    coordinate_pattern().is_match(input)
}

/// 解析点参数
pub fn parse_point_ref(input: &str) -> PointRef {
    match parse_coordinate(input) {
        Some(p) => PointRef::Literal(p),
        None => PointRef::Named(input.trim().to_string()),
    }
}

/// 格式化坐标字面量
///
/// 整数坐标输出为 `2,3`，其余保留原始精度。
pub fn format_coordinate(p: &Point2) -> String {
    format!("{},{}", format_number(p.x), format_number(p.y))
}

/// 用于显示的坐标：`(2, 3)`
pub fn display_coordinate(p: &Point2) -> String {
    format!("({}, {})", format_number(p.x), format_number(p.y))
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        // 避免输出 -0
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("2,3"), Some(Point2::new(2.0, 3.0)));
        assert_eq!(parse_coordinate(" -1.5 , 4 "), Some(Point2::new(-1.5, 4.0)));
        assert_eq!(parse_coordinate("A"), None);
        assert_eq!(parse_coordinate("2,"), None);
        assert_eq!(parse_coordinate("2,3,4"), None);
    }

    #[test]
    fn test_parse_point_ref() {
        assert_eq!(parse_point_ref("0,0"), PointRef::Literal(Point2::origin()));
        assert_eq!(parse_point_ref("lineA"), PointRef::Named("lineA".to_string()));
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(&Point2::new(4.0, 0.0)), "4,0");
        assert_eq!(format_coordinate(&Point2::new(-0.0, -2.0)), "0,-2");
        assert_eq!(format_coordinate(&Point2::new(0.5, 1.0)), "0.5,1");
        assert_eq!(display_coordinate(&Point2::new(2.0, 3.0)), "(2, 3)");
    }
}
