//! Geoloc 核心
//!
//! 交互式几何构造的纯逻辑部分，不涉及渲染与存储。
//!
//! # 架构设计
//!
//! - `geometry`: 无状态的点/直线运算
//! - `shape`: 存储对象 (`PersistedObject`) 与解析后的图形 (`Shape`)
//! - `creators`: 每种对象类型一个工厂，在参数、属性包、图形之间转换
//! - `snap`: 把光标位置解析为参数值
//! - `expression`: 公式的标识符提取与依赖分析
//!
//! # 示例
//!
//! ```rust
//! use geoloc_core::prelude::*;
//!
//! let line = Line::through(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
//! assert_eq!(line.n, Vector2::new(0.0, 4.0));
//! ```

pub mod coords;
pub mod creators;
pub mod error;
pub mod expression;
pub mod geometry;
pub mod math;
pub mod shape;
pub mod snap;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::coords::{format_coordinate, parse_coordinate, parse_point_ref, PointRef};
    pub use crate::creators::{
        creator_for, reclassify_distance_invariant, resolve_shape, shape_from_arguments,
        ArgumentValue, BuildResult, ShapeCreator,
    };
    pub use crate::error::ShapeError;
    pub use crate::expression::{dependencies, extract_identifiers, parentheses_balanced};
    pub use crate::geometry::Line;
    pub use crate::math::{Point2, Vector2, EPSILON};
    pub use crate::shape::{
        ObjectType, PersistedObject, Properties, Shape, ShapeGeometry, ShapeState,
    };
    pub use crate::snap::{ArgumentType, SnapConfig, SnapEngine, SnapMatch};
}
