//! 图形模型
//!
//! - `PersistedObject`: 存储/传输用的属性包
//! - `Shape`: 属性包在当前场景下解析得到的几何快照
//!
//! `Shape` 是不可变值，状态变化时生成新值（`with_state`），
//! 持有旧引用的使用方始终看到一致的快照。

use crate::error::ShapeError;
use crate::geometry::Line;
use crate::math::Point2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 属性包
pub type Properties = BTreeMap<String, Value>;

/// 对象类型（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    FixedPoint,
    FreePoint,
    Midpoint,
    IntersectionPoint,
    SlidingPoint,
    Projection,
    Reflection,
    ScaledVectorPoint,
    ComputedPoint,
    LineAB,
    PpBisector,
    PpToLine,
    PlToLine,
    Parameter,
    TwoPointDistanceInvariant,
    PointToLineDistanceInvariant,
    TwoLineAngleInvariant,
    Invariant,
    Locus,
}

impl ObjectType {
    pub const ALL: [ObjectType; 19] = [
        ObjectType::FixedPoint,
        ObjectType::FreePoint,
        ObjectType::Midpoint,
        ObjectType::IntersectionPoint,
        ObjectType::SlidingPoint,
        ObjectType::Projection,
        ObjectType::Reflection,
        ObjectType::ScaledVectorPoint,
        ObjectType::ComputedPoint,
        ObjectType::LineAB,
        ObjectType::PpBisector,
        ObjectType::PpToLine,
        ObjectType::PlToLine,
        ObjectType::Parameter,
        ObjectType::TwoPointDistanceInvariant,
        ObjectType::PointToLineDistanceInvariant,
        ObjectType::TwoLineAngleInvariant,
        ObjectType::Invariant,
        ObjectType::Locus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::FixedPoint => "FixedPoint",
            ObjectType::FreePoint => "FreePoint",
            ObjectType::Midpoint => "Midpoint",
            ObjectType::IntersectionPoint => "IntersectionPoint",
            ObjectType::SlidingPoint => "SlidingPoint",
            ObjectType::Projection => "Projection",
            ObjectType::Reflection => "Reflection",
            ObjectType::ScaledVectorPoint => "ScaledVectorPoint",
            ObjectType::ComputedPoint => "ComputedPoint",
            ObjectType::LineAB => "LineAB",
            ObjectType::PpBisector => "PpBisector",
            ObjectType::PpToLine => "PpToLine",
            ObjectType::PlToLine => "PlToLine",
            ObjectType::Parameter => "Parameter",
            ObjectType::TwoPointDistanceInvariant => "TwoPointDistanceInvariant",
            ObjectType::PointToLineDistanceInvariant => "PointToLineDistanceInvariant",
            ObjectType::TwoLineAngleInvariant => "TwoLineAngleInvariant",
            ObjectType::Invariant => "Invariant",
            ObjectType::Locus => "Locus",
        }
    }

    /// 是否为点类对象（可被点参数引用）
    pub fn is_point(&self) -> bool {
        matches!(
            self,
            ObjectType::FixedPoint
                | ObjectType::FreePoint
                | ObjectType::Midpoint
                | ObjectType::IntersectionPoint
                | ObjectType::SlidingPoint
                | ObjectType::Projection
                | ObjectType::Reflection
                | ObjectType::ScaledVectorPoint
                | ObjectType::ComputedPoint
        )
    }

    /// 是否为可动点（非固定点的点类对象，可作为轨迹的生成点）
    pub fn is_mobile_point(&self) -> bool {
        self.is_point() && *self != ObjectType::FixedPoint
    }

    /// 是否为直线类对象
    pub fn is_line(&self) -> bool {
        matches!(
            self,
            ObjectType::LineAB | ObjectType::PpBisector | ObjectType::PpToLine | ObjectType::PlToLine
        )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectType {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| ShapeError::InvalidObjectType(s.to_string()))
    }
}

/// 图形显示状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeState {
    #[default]
    Default,
    /// 用户选中
    Selected,
    /// 悬停建议
    Suggested,
    /// 选中且悬停建议
    SuggestedSelected,
    /// 未完成的预览
    Hinted,
    /// 已完全解析但尚未提交的预览
    BeingAdded,
}

impl ShapeState {
    pub fn is_selected(&self) -> bool {
        matches!(self, ShapeState::Selected | ShapeState::SuggestedSelected)
    }

    pub fn is_suggested(&self) -> bool {
        matches!(self, ShapeState::Suggested | ShapeState::SuggestedSelected)
    }

    /// 设置/清除悬停建议标记，保留选中标记
    pub fn with_suggested(self, suggested: bool) -> ShapeState {
        match (self, suggested) {
            (ShapeState::Default, true) => ShapeState::Suggested,
            (ShapeState::Selected, true) => ShapeState::SuggestedSelected,
            (ShapeState::Suggested, false) => ShapeState::Default,
            (ShapeState::SuggestedSelected, false) => ShapeState::Selected,
            (state, _) => state,
        }
    }

    /// 切换选中标记，保留悬停建议标记
    pub fn toggled_selection(self) -> ShapeState {
        match self {
            ShapeState::Default => ShapeState::Selected,
            ShapeState::Selected => ShapeState::Default,
            ShapeState::Suggested => ShapeState::SuggestedSelected,
            ShapeState::SuggestedSelected => ShapeState::Suggested,
            state => state,
        }
    }
}

/// 解析后的几何
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ShapeGeometry {
    /// 无几何（参数、公式不变量、轨迹，或引用无法解析）
    #[default]
    None,
    Point(Point2),
    Line(Line),
    /// 线段类（距离不变量）
    Segment(Point2, Point2),
}

/// 存储用的对象表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedObject {
    pub name: String,
    pub object_type: ObjectType,
    #[serde(default)]
    pub properties: Properties,
}

impl PersistedObject {
    pub fn new(name: impl Into<String>, object_type: ObjectType, properties: Properties) -> Self {
        Self {
            name: name.into(),
            object_type,
            properties,
        }
    }

    /// 读取字符串属性
    pub fn str_property(&self, key: &str) -> Result<&str, ShapeError> {
        str_property(&self.properties, key).ok_or_else(|| ShapeError::MissingProperty {
            object: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// 读取数值属性
    pub fn number_property(&self, key: &str) -> Result<f64, ShapeError> {
        self.properties
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| ShapeError::MissingProperty {
                object: self.name.clone(),
                key: key.to_string(),
            })
    }
}

/// 从属性包读取字符串
pub fn str_property<'a>(properties: &'a Properties, key: &str) -> Option<&'a str> {
    properties.get(key).and_then(Value::as_str)
}

/// 解析后的场景对象
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    name: String,
    object_type: ObjectType,
    properties: Properties,
    description: String,
    state: ShapeState,
    geometry: ShapeGeometry,
}

impl Shape {
    pub fn new(
        name: impl Into<String>,
        object_type: ObjectType,
        properties: Properties,
        description: String,
        geometry: ShapeGeometry,
    ) -> Self {
        Self {
            name: name.into(),
            object_type,
            properties,
            description,
            state: ShapeState::Default,
            geometry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> ShapeState {
        self.state
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    /// 点类对象的坐标；锚点型不变量（角度不变量）也返回其锚点
    pub fn defined_point(&self) -> Option<Point2> {
        match self.geometry {
            ShapeGeometry::Point(p) => Some(p),
            _ => None,
        }
    }

    /// 直线类对象的直线
    pub fn defined_line(&self) -> Option<Line> {
        match self.geometry {
            ShapeGeometry::Line(l) => Some(l),
            _ => None,
        }
    }

    /// 线段类对象的端点
    pub fn segment(&self) -> Option<(Point2, Point2)> {
        match self.geometry {
            ShapeGeometry::Segment(a, b) => Some((a, b)),
            _ => None,
        }
    }

    /// 生成状态不同的新快照
    pub fn with_state(&self, state: ShapeState) -> Shape {
        Shape {
            state,
            ..self.clone()
        }
    }

    /// 还原为存储表示
    pub fn to_persisted(&self) -> PersistedObject {
        PersistedObject::new(self.name.clone(), self.object_type, self.properties.clone())
    }
}
