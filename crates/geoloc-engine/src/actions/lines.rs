//! 直线类动作

use super::points::defined_or_grid_point;
use crate::action::{ActionDefinition, ActionGroup, ArgumentSlot};
use geoloc_core::shape::ObjectType;
use geoloc_core::snap::ArgumentType;

fn line_names() -> impl Iterator<Item = String> {
    ('A'..='K').map(|c| format!("line{}", c))
}

pub(super) fn line_ab() -> ActionDefinition {
    ActionDefinition::new("LineAB", ActionGroup::Lines, ObjectType::LineAB)
        .description("Line: a line passing through two given points")
        .slot(defined_or_grid_point(1, 2))
        .slot(defined_or_grid_point(2, 2))
        .names(line_names())
}

pub(super) fn pp_bisector() -> ActionDefinition {
    ActionDefinition::new("PpBisector", ActionGroup::Lines, ObjectType::PpBisector)
        .description("Perpendicular bisector: the line consisting of points equidistant to two given points")
        .slot(defined_or_grid_point(1, 2))
        .slot(defined_or_grid_point(2, 2))
        .names(line_names())
}

pub(super) fn pp_to_line() -> ActionDefinition {
    ActionDefinition::new("PpToLine", ActionGroup::Lines, ObjectType::PpToLine)
        .description("Perpendicular to a line: a line through the given point perpendicular to the given line")
        .slot(defined_or_grid_point(1, 2))
        .slot(ArgumentSlot::new(vec![ArgumentType::Line], "Select a line (2 of 2)"))
        .names(line_names())
}

pub(super) fn pl_to_line() -> ActionDefinition {
    ActionDefinition::new("PlToLine", ActionGroup::Lines, ObjectType::PlToLine)
        .description("Parallel to a line: a line through the given point parallel to the given line")
        .slot(defined_or_grid_point(1, 2))
        .slot(ArgumentSlot::new(vec![ArgumentType::Line], "Select a line (2 of 2)"))
        .names(line_names())
}
