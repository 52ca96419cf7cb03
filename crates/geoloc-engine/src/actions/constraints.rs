//! 参数、约束与轨迹动作

use super::points::defined_or_grid_point;
use crate::action::{ActionDefinition, ActionGroup, ArgumentSlot};
use geoloc_core::shape::ObjectType;
use geoloc_core::snap::ArgumentType;

fn invariant_names() -> impl Iterator<Item = String> {
    ('A'..='K').map(|c| format!("inv{}", c))
}

pub(super) fn parameter() -> ActionDefinition {
    ActionDefinition::new("Parameter", ActionGroup::Parameters, ObjectType::Parameter)
        .description("Parameter: a free variable with 0 initial value, to use in an Invariant")
        .names(('t'..='w').map(String::from))
}

pub(super) fn distance_invariant() -> ActionDefinition {
    ActionDefinition::new(
        "DistanceInvariant",
        ActionGroup::Constraints,
        ObjectType::TwoPointDistanceInvariant,
    )
    .also(ObjectType::PointToLineDistanceInvariant)
    .description(
        "Distance Invariant: specifies that the distance from a point to another point or line is constant",
    )
    .slot(defined_or_grid_point(1, 2))
    .slot(ArgumentSlot::new(
        vec![ArgumentType::AnyDefinedOrGridPoint, ArgumentType::Line],
        "Select an already defined point or a point on the grid, or a line (2 of 2)",
    ))
    .names(invariant_names())
}

pub(super) fn angle_invariant() -> ActionDefinition {
    ActionDefinition::new(
        "AngleInvariant",
        ActionGroup::Constraints,
        ObjectType::TwoLineAngleInvariant,
    )
    .description("Angle Invariant: specifies that the angle between two lines is constant")
    .slot(ArgumentSlot::new(vec![ArgumentType::Line], "Select a line (1 of 2)"))
    .slot(ArgumentSlot::new(vec![ArgumentType::Line], "Select a line (2 of 2)"))
    .names(invariant_names())
}

pub(super) fn invariant() -> ActionDefinition {
    ActionDefinition::new("Invariant", ActionGroup::Constraints, ObjectType::Invariant)
        .description(
            "Custom invariant: a relation of the form F(object1, object2,..) = C that constrains defined objects (free points, etc.). C is the initial value of the expression.",
        )
        .slot(ArgumentSlot::expression(
            "Enter the formula for the invariant, e.g., d(A, X)",
        ))
        .names(invariant_names())
}

pub(super) fn locus() -> ActionDefinition {
    ActionDefinition::new("Locus", ActionGroup::Locus, ObjectType::Locus)
        .description(
            "Locus: pick a point to display the curve (all positions of that point satisfying the constraints)",
        )
        .slot(
            ArgumentSlot::new(
                vec![ArgumentType::MobilePoint],
                "Select an already defined mobile (i.e., not fixed) point",
            )
            .exclusive(&[ObjectType::Locus]),
        )
        .names(('A'..='K').map(|c| format!("locus{}", c)))
}
