//! 图形工厂
//!
//! 每种对象类型对应一个 `ShapeCreator`，负责三种表示之间的转换：
//! - 构造过程中收集的参数值 (`ArgumentValue`)
//! - 存储用的属性包 (`Properties`)
//! - 解析后的 `Shape`
//!
//! 工厂按对象类型穷尽匹配分发，新增类型而未实现工厂将无法编译。

mod formula;
mod invariants;
mod lines;
mod points;

pub use formula::{ComputedPointCreator, InvariantCreator, LocusCreator, ParameterCreator};
pub use invariants::{
    reclassify_distance_invariant, PointToLineDistanceInvariantCreator,
    TwoLineAngleInvariantCreator, TwoPointDistanceInvariantCreator,
};
pub use lines::{LineAbCreator, PlToLineCreator, PpBisectorCreator, PpToLineCreator};
pub use points::{
    FixedPointCreator, FreePointCreator, IntersectionPointCreator, MidpointCreator,
    ProjectionCreator, ReflectionCreator, ScaledVectorPointCreator, SlidingPointCreator,
};

use crate::coords::{display_coordinate, format_coordinate, parse_point_ref, PointRef};
use crate::error::ShapeError;
use crate::geometry::Line;
use crate::math::Point2;
use crate::shape::{str_property, ObjectType, PersistedObject, Properties, Shape, ShapeGeometry};
use serde_json::Value;
use std::sync::Arc;

/// 一个参数槽解析得到的值
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// 网格点（坐标字面量）
    GridPoint(Point2),
    /// 已有的点对象
    DefinedPoint { name: String, point: Point2 },
    /// 已有的直线对象
    Line {
        name: String,
        line: Line,
        object_type: ObjectType,
    },
    /// 两条直线的交点
    Intersection {
        line1: String,
        line2: String,
        point: Point2,
    },
    /// 直线上的网格点
    Sliding { line: String, point: Point2 },
    /// 用户输入的表达式及其初始值
    Expression { text: String, value: Option<f64> },
}

impl ArgumentValue {
    /// 参数隐含的点坐标
    pub fn point(&self) -> Option<Point2> {
        match self {
            ArgumentValue::GridPoint(p) => Some(*p),
            ArgumentValue::DefinedPoint { point, .. } => Some(*point),
            ArgumentValue::Intersection { point, .. } => Some(*point),
            ArgumentValue::Sliding { point, .. } => Some(*point),
            ArgumentValue::Line { .. } | ArgumentValue::Expression { .. } => None,
        }
    }

    pub fn line(&self) -> Option<&Line> {
        match self {
            ArgumentValue::Line { line, .. } => Some(line),
            _ => None,
        }
    }

    /// 作为点参数写入属性包的字符串：坐标字面量或对象名
    pub fn point_reference(&self) -> Option<String> {
        match self {
            ArgumentValue::GridPoint(p) => Some(format_coordinate(p)),
            ArgumentValue::DefinedPoint { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    /// 参数引用到的已有对象名（用于高亮）
    pub fn referenced_names(&self) -> Vec<String> {
        match self {
            ArgumentValue::GridPoint(_) | ArgumentValue::Expression { .. } => Vec::new(),
            ArgumentValue::DefinedPoint { name, .. } => vec![name.clone()],
            ArgumentValue::Line { name, .. } => vec![name.clone()],
            ArgumentValue::Intersection { line1, line2, .. } => vec![line1.clone(), line2.clone()],
            ArgumentValue::Sliding { line, .. } => vec![line.clone()],
        }
    }
}

/// 构建结果
#[derive(Debug, Clone, PartialEq)]
pub enum BuildResult {
    /// 参数足够，几何完全确定
    Complete(ShapeGeometry),
    /// 多参数构造中只有第一个点已知，返回该点作为占位
    Incomplete(Point2),
    /// 无可显示的内容
    Empty,
}

/// 图形工厂接口
pub trait ShapeCreator: Send + Sync {
    fn object_type(&self) -> ObjectType;

    /// 需要的参数个数
    fn arity(&self) -> usize;

    /// 由（可能不完整的）参数列表生成属性包
    fn properties_from(&self, args: &[ArgumentValue]) -> Properties;

    /// 由属性包反解参数（编辑已有对象时使用）
    fn arguments_from(
        &self,
        properties: &Properties,
        shapes: &[Arc<Shape>],
    ) -> Result<Vec<ArgumentValue>, ShapeError>;

    /// 由参数生成几何
    fn build(&self, args: &[ArgumentValue]) -> Result<BuildResult, ShapeError>;

    /// 显示用描述
    fn describe(&self, properties: &Properties) -> String;

    /// 引用无法解析时是否必须报错（而不是退化为空几何）
    fn strict(&self) -> bool {
        false
    }
}

static FIXED_POINT: FixedPointCreator = FixedPointCreator;
static FREE_POINT: FreePointCreator = FreePointCreator;
static MIDPOINT: MidpointCreator = MidpointCreator;
static INTERSECTION_POINT: IntersectionPointCreator = IntersectionPointCreator;
static SLIDING_POINT: SlidingPointCreator = SlidingPointCreator;
static PROJECTION: ProjectionCreator = ProjectionCreator;
static REFLECTION: ReflectionCreator = ReflectionCreator;
static SCALED_VECTOR_POINT: ScaledVectorPointCreator = ScaledVectorPointCreator;
static COMPUTED_POINT: ComputedPointCreator = ComputedPointCreator;
static LINE_AB: LineAbCreator = LineAbCreator;
static PP_BISECTOR: PpBisectorCreator = PpBisectorCreator;
static PP_TO_LINE: PpToLineCreator = PpToLineCreator;
static PL_TO_LINE: PlToLineCreator = PlToLineCreator;
static PARAMETER: ParameterCreator = ParameterCreator;
static TWO_POINT_DISTANCE: TwoPointDistanceInvariantCreator = TwoPointDistanceInvariantCreator;
static POINT_TO_LINE_DISTANCE: PointToLineDistanceInvariantCreator =
    PointToLineDistanceInvariantCreator;
static TWO_LINE_ANGLE: TwoLineAngleInvariantCreator = TwoLineAngleInvariantCreator;
static INVARIANT: InvariantCreator = InvariantCreator;
static LOCUS: LocusCreator = LocusCreator;

/// 获取对象类型对应的工厂
pub fn creator_for(object_type: ObjectType) -> &'static dyn ShapeCreator {
    match object_type {
        ObjectType::FixedPoint => &FIXED_POINT,
        ObjectType::FreePoint => &FREE_POINT,
        ObjectType::Midpoint => &MIDPOINT,
        ObjectType::IntersectionPoint => &INTERSECTION_POINT,
        ObjectType::SlidingPoint => &SLIDING_POINT,
        ObjectType::Projection => &PROJECTION,
        ObjectType::Reflection => &REFLECTION,
        ObjectType::ScaledVectorPoint => &SCALED_VECTOR_POINT,
        ObjectType::ComputedPoint => &COMPUTED_POINT,
        ObjectType::LineAB => &LINE_AB,
        ObjectType::PpBisector => &PP_BISECTOR,
        ObjectType::PpToLine => &PP_TO_LINE,
        ObjectType::PlToLine => &PL_TO_LINE,
        ObjectType::Parameter => &PARAMETER,
        ObjectType::TwoPointDistanceInvariant => &TWO_POINT_DISTANCE,
        ObjectType::PointToLineDistanceInvariant => &POINT_TO_LINE_DISTANCE,
        ObjectType::TwoLineAngleInvariant => &TWO_LINE_ANGLE,
        ObjectType::Invariant => &INVARIANT,
        ObjectType::Locus => &LOCUS,
    }
}

/// 将存储对象解析为 `Shape`
///
/// 引用无法解析时返回空几何的 `Shape`；严格类型（角度不变量）直接返回错误。
pub fn resolve_shape(object: &PersistedObject, shapes: &[Arc<Shape>]) -> Result<Shape, ShapeError> {
    let creator = creator_for(object.object_type);
    let description = creator.describe(&object.properties);

    let arguments = creator
        .arguments_from(&object.properties, shapes)
        .and_then(|args| check_arity(creator, args))
        .map_err(|e| e.with_object(&object.name));

    let geometry = match arguments {
        Ok(args) => match creator.build(&args)? {
            BuildResult::Complete(geometry) => geometry,
            BuildResult::Incomplete(_) | BuildResult::Empty => ShapeGeometry::None,
        },
        Err(e) if creator.strict() => return Err(e),
        Err(e) => {
            tracing::warn!("Object '{}' resolved without geometry: {}", object.name, e);
            ShapeGeometry::None
        }
    };

    Ok(Shape::new(
        object.name.clone(),
        object.object_type,
        object.properties.clone(),
        description,
        geometry,
    ))
}

/// 由参数直接构造 `Shape`（用于预览）
pub fn shape_from_arguments(
    name: &str,
    object_type: ObjectType,
    args: &[ArgumentValue],
) -> Result<(BuildResult, Shape), ShapeError> {
    let creator = creator_for(object_type);
    if args.len() > creator.arity() {
        return Err(ShapeError::ArgumentCount {
            expected: creator.arity(),
            actual: args.len(),
        });
    }
    let properties = creator.properties_from(args);
    let description = creator.describe(&properties);
    let result = creator.build(args)?;
    let geometry = match &result {
        BuildResult::Complete(g) => *g,
        BuildResult::Incomplete(p) => ShapeGeometry::Point(*p),
        BuildResult::Empty => ShapeGeometry::None,
    };
    let shape = Shape::new(name, object_type, properties, description, geometry);
    Ok((result, shape))
}

// ========== 工厂共用的辅助函数 ==========

fn check_arity(
    creator: &dyn ShapeCreator,
    args: Vec<ArgumentValue>,
) -> Result<Vec<ArgumentValue>, ShapeError> {
    if args.len() == creator.arity() {
        Ok(args)
    } else {
        Err(ShapeError::ArgumentCount {
            expected: creator.arity(),
            actual: args.len(),
        })
    }
}

pub(crate) fn find_shape<'a>(shapes: &'a [Arc<Shape>], name: &str) -> Option<&'a Arc<Shape>> {
    shapes.iter().find(|s| s.name() == name)
}

pub(crate) fn required_str<'a>(properties: &'a Properties, key: &str) -> Result<&'a str, ShapeError> {
    str_property(properties, key).ok_or_else(|| ShapeError::MissingProperty {
        object: String::new(),
        key: key.to_string(),
    })
}

/// 解析点参数属性：坐标字面量或点对象
pub(crate) fn point_argument(
    properties: &Properties,
    key: &str,
    shapes: &[Arc<Shape>],
) -> Result<ArgumentValue, ShapeError> {
    match parse_point_ref(required_str(properties, key)?) {
        PointRef::Literal(p) => Ok(ArgumentValue::GridPoint(p)),
        PointRef::Named(name) => {
            let shape = find_shape(shapes, &name)
                .ok_or_else(|| ShapeError::UnresolvedReference(name.clone()))?;
            let point = shape
                .defined_point()
                .ok_or_else(|| ShapeError::NotAPoint(name.clone()))?;
            Ok(ArgumentValue::DefinedPoint { name, point })
        }
    }
}

/// 解析直线参数属性，返回（名称，直线，对象类型）
pub(crate) fn line_parts(
    properties: &Properties,
    key: &str,
    shapes: &[Arc<Shape>],
) -> Result<(String, Line, ObjectType), ShapeError> {
    let name = required_str(properties, key)?.trim().to_string();
    let shape =
        find_shape(shapes, &name).ok_or_else(|| ShapeError::UnresolvedReference(name.clone()))?;
    let line = shape
        .defined_line()
        .ok_or_else(|| ShapeError::NotALine(name.clone()))?;
    Ok((name, line, shape.object_type()))
}

pub(crate) fn line_argument(
    properties: &Properties,
    key: &str,
    shapes: &[Arc<Shape>],
) -> Result<ArgumentValue, ShapeError> {
    let (name, line, object_type) = line_parts(properties, key, shapes)?;
    Ok(ArgumentValue::Line {
        name,
        line,
        object_type,
    })
}

/// 将点参数写入属性包
pub(crate) fn put_point(properties: &mut Properties, key: &str, arg: Option<&ArgumentValue>) {
    if let Some(reference) = arg.and_then(ArgumentValue::point_reference) {
        properties.insert(key.to_string(), Value::String(reference));
    }
}

/// 将直线参数写入属性包
pub(crate) fn put_line(properties: &mut Properties, key: &str, arg: Option<&ArgumentValue>) {
    if let Some(ArgumentValue::Line { name, .. }) = arg {
        properties.insert(key.to_string(), Value::String(name.clone()));
    }
}

/// 点参数的显示文本：对象名或 `(x, y)`
pub(crate) fn point_label(properties: &Properties, key: &str) -> String {
    match str_property(properties, key).map(parse_point_ref) {
        Some(PointRef::Literal(p)) => display_coordinate(&p),
        Some(PointRef::Named(name)) => name,
        None => "?".to_string(),
    }
}

pub(crate) fn name_label(properties: &Properties, key: &str) -> String {
    str_property(properties, key).unwrap_or("?").to_string()
}

/// 依次取出各参数的点坐标
pub(crate) fn arg_point(args: &[ArgumentValue], index: usize) -> Option<Point2> {
    args.get(index).and_then(ArgumentValue::point)
}

pub(crate) fn arg_line(args: &[ArgumentValue], index: usize) -> Option<Line> {
    args.get(index).and_then(ArgumentValue::line).copied()
}

/// 两点型构造的通用构建逻辑：两点齐备时完成，只有第一点时给出占位
pub(crate) fn build_two_points(
    args: &[ArgumentValue],
    complete: impl FnOnce(Point2, Point2) -> ShapeGeometry,
) -> BuildResult {
    match (arg_point(args, 0), arg_point(args, 1)) {
        (Some(p1), Some(p2)) => BuildResult::Complete(complete(p1, p2)),
        (Some(p1), None) => BuildResult::Incomplete(p1),
        _ => BuildResult::Empty,
    }
}

/// 点 + 直线型构造的属性包：`point`、`line`
pub(crate) fn point_and_line_properties(args: &[ArgumentValue]) -> Properties {
    let mut properties = Properties::new();
    put_point(&mut properties, "point", args.first());
    put_line(&mut properties, "line", args.get(1));
    properties
}

pub(crate) fn point_and_line_arguments(
    properties: &Properties,
    shapes: &[Arc<Shape>],
) -> Result<Vec<ArgumentValue>, ShapeError> {
    Ok(vec![
        point_argument(properties, "point", shapes)?,
        line_argument(properties, "line", shapes)?,
    ])
}

/// 点 + 直线型构造的通用构建逻辑
pub(crate) fn build_point_and_line(
    args: &[ArgumentValue],
    complete: impl FnOnce(Point2, Line) -> Option<ShapeGeometry>,
) -> BuildResult {
    match (arg_point(args, 0), arg_line(args, 1)) {
        (Some(p), Some(line)) => complete(p, line)
            .map(BuildResult::Complete)
            .unwrap_or(BuildResult::Empty),
        (Some(p), None) => BuildResult::Incomplete(p),
        _ => BuildResult::Empty,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_type_has_matching_creator() {
        for t in ObjectType::ALL {
            assert_eq!(creator_for(t).object_type(), t);
        }
    }

    #[test]
    fn test_resolve_degrades_on_missing_reference() {
        let obj = PersistedObject::new(
            "X",
            ObjectType::Midpoint,
            props(json!({"point1": "A", "point2": "0,0"})),
        );
        let shape = resolve_shape(&obj, &[]).unwrap();
        assert_eq!(*shape.geometry(), ShapeGeometry::None);
        assert_eq!(shape.description(), "midpoint(A, (0, 0))");
    }

    #[test]
    fn test_resolve_against_existing_shapes() {
        let shapes = vec![point_shape("A", ObjectType::FreePoint, 2.0, 2.0)];
        let obj = PersistedObject::new(
            "X",
            ObjectType::Midpoint,
            props(json!({"point1": "A", "point2": "0,0"})),
        );
        let shape = resolve_shape(&obj, &shapes).unwrap();
        assert_eq!(shape.defined_point(), Some(Point2::new(1.0, 1.0)));
    }

    #[test]
    fn test_shape_from_partial_arguments_is_marker() {
        let args = vec![ArgumentValue::GridPoint(Point2::new(3.0, 1.0))];
        let (result, shape) = shape_from_arguments("lineA", ObjectType::LineAB, &args).unwrap();
        assert_eq!(result, BuildResult::Incomplete(Point2::new(3.0, 1.0)));
        assert_eq!(shape.defined_point(), Some(Point2::new(3.0, 1.0)));
    }

    #[test]
    fn test_shape_from_too_many_arguments() {
        let args = vec![
            ArgumentValue::GridPoint(Point2::new(0.0, 0.0)),
            ArgumentValue::GridPoint(Point2::new(2.0, 0.0)),
            ArgumentValue::GridPoint(Point2::new(4.0, 0.0)),
        ];
        assert_eq!(
            shape_from_arguments("M", ObjectType::Midpoint, &args).err(),
            Some(ShapeError::ArgumentCount {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_projection_arguments_match_arity() {
        let shapes = vec![
            point_shape("A", ObjectType::FreePoint, 2.0, 2.0),
            line_shape("lineA", ObjectType::LineAB, (0.0, 0.0), (4.0, 0.0)),
        ];
        let obj = PersistedObject::new(
            "P",
            ObjectType::Projection,
            props(json!({"point": "A", "line": "lineA"})),
        );
        let shape = resolve_shape(&obj, &shapes).unwrap();
        assert_eq!(shape.defined_point(), Some(Point2::new(2.0, 0.0)));
        let args = creator_for(ObjectType::Projection)
            .arguments_from(&obj.properties, &shapes)
            .unwrap();
        assert_eq!(args.len(), creator_for(ObjectType::Projection).arity());
    }
}
