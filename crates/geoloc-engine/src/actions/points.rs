//! 点类动作

use super::{other_point_names, DEFINED_OR_GRID_POINT_HINT};
use crate::action::{ActionDefinition, ActionGroup, ArgumentSlot};
use geoloc_core::shape::ObjectType;
use geoloc_core::snap::ArgumentType;

/// 网格点不可与这些点重合
const GRID_EXCLUSIVE: [ObjectType; 5] = [
    ObjectType::FixedPoint,
    ObjectType::FreePoint,
    ObjectType::Midpoint,
    ObjectType::SlidingPoint,
    ObjectType::IntersectionPoint,
];

pub(super) fn fixed_point() -> ActionDefinition {
    ActionDefinition::new("FixedPoint", ActionGroup::Points, ObjectType::FixedPoint)
        .description("Fixed point: a point with constant integer coordinates")
        .slot(
            ArgumentSlot::new(vec![ArgumentType::GridPoint], "Select a point on the grid")
                .exclusive(&GRID_EXCLUSIVE),
        )
        .names(('A'..='K').map(String::from))
}

pub(super) fn free_point() -> ActionDefinition {
    ActionDefinition::new("FreePoint", ActionGroup::Points, ObjectType::FreePoint)
        .description("Free point: the initial position of a point subject to future constraints")
        .slot(
            ArgumentSlot::new(vec![ArgumentType::GridPoint], "Select a point on the grid")
                .exclusive(&GRID_EXCLUSIVE),
        )
        .names(other_point_names())
}

pub(super) fn midpoint() -> ActionDefinition {
    ActionDefinition::new("Midpoint", ActionGroup::Points, ObjectType::Midpoint)
        .description("Midpoint: the point halfway between two given points")
        .slot(defined_or_grid_point(1, 2))
        .slot(defined_or_grid_point(2, 2))
        .names(other_point_names())
}

pub(super) fn intersection_point() -> ActionDefinition {
    ActionDefinition::new(
        "IntersectionPoint",
        ActionGroup::Points,
        ObjectType::IntersectionPoint,
    )
    .description("Intersection point: the point where two lines meet")
    .slot(
        ArgumentSlot::new(
            vec![ArgumentType::IntersectionPoint],
            "Select a point common to two lines",
        )
        .exclusive(&[ObjectType::IntersectionPoint]),
    )
    .names(other_point_names())
}

pub(super) fn sliding_point() -> ActionDefinition {
    ActionDefinition::new("SlidingPoint", ActionGroup::Points, ObjectType::SlidingPoint)
        .description("Sliding point: the initial position of a point constrained to a line")
        .slot(
            ArgumentSlot::new(vec![ArgumentType::SlidingPoint], "Select a point on a line").exclusive(&[
                ObjectType::SlidingPoint,
                ObjectType::FreePoint,
                ObjectType::FixedPoint,
                ObjectType::IntersectionPoint,
            ]),
        )
        .names(other_point_names())
}

pub(super) fn projection() -> ActionDefinition {
    ActionDefinition::new("Projection", ActionGroup::Points, ObjectType::Projection)
        .description(
            "Projection: the point on a line that is the perpendicular projection of a given point onto the line",
        )
        .slot(ArgumentSlot::new(
            vec![ArgumentType::AnyDefinedOrGridPoint],
            "Select the point to be projected (an already defined point or a point on the grid) (1 of 2)",
        ))
        .slot(ArgumentSlot::new(
            vec![ArgumentType::Line],
            "Select the line to be projected onto (2 of 2)",
        ))
        .names(other_point_names())
}

pub(super) fn reflection() -> ActionDefinition {
    ActionDefinition::new("Reflection", ActionGroup::Points, ObjectType::Reflection)
        .description(
            "Reflection: the point on the other side of a line that is the reflection of a given point across the line",
        )
        .slot(ArgumentSlot::new(
            vec![ArgumentType::AnyDefinedOrGridPoint],
            "Select the point to be reflected (an already defined point or a point on the grid) (1 of 2)",
        ))
        .slot(ArgumentSlot::new(
            vec![ArgumentType::Line],
            "Select the line to be reflected across (2 of 2)",
        ))
        .names(other_point_names())
}

pub(super) fn scaled_vector_point() -> ActionDefinition {
    ActionDefinition::new(
        "ScaledVectorPoint",
        ActionGroup::Points,
        ObjectType::ScaledVectorPoint,
    )
    .description("Scaled vector point: a point X defined by the vector relation AX = k AB for chosen A and B")
    .slot(ArgumentSlot::expression(
        "Enter the expression for the scaling coefficient k (1 of 3)",
    ))
    .slot(ArgumentSlot::new(
        vec![ArgumentType::AnyDefinedOrGridPoint],
        "Choose the start point (A) of the reference vector (2 of 3)",
    ))
    .slot(ArgumentSlot::new(
        vec![ArgumentType::AnyDefinedOrGridPoint],
        "Choose the end point (B) of the reference vector (3 of 3)",
    ))
    .names(other_point_names())
}

pub(super) fn computed_point() -> ActionDefinition {
    ActionDefinition::new("ComputedPoint", ActionGroup::Points, ObjectType::ComputedPoint)
        .description("Computed point: a point defined by custom X and Y expressions")
        .slot(ArgumentSlot::expression(
            "Enter the expression for the X coordinate of the point (may include parameters and reference objects) (1 of 2)",
        ))
        .slot(ArgumentSlot::expression(
            "Enter the expression for the Y coordinate of the point (may include parameters and reference objects) (2 of 2)",
        ))
        .names(other_point_names())
}

/// 第 `index` 个（共 `total` 个）已有点或网格点参数
pub(super) fn defined_or_grid_point(index: usize, total: usize) -> ArgumentSlot {
    ArgumentSlot::new(
        vec![ArgumentType::AnyDefinedOrGridPoint],
        format!("{} ({} of {})", DEFINED_OR_GRID_POINT_HINT, index, total),
    )
}
