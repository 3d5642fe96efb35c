//! Direct resolution
//!
//! Widgets whose anchors only lead to already known values are placed
//! without the solver. Resolution runs to a fixpoint; every placed axis
//! stores final anchor values that later widgets can build on, and the
//! emitter turns resolved axes into constants.

use crate::model::{
    AnchorId, AnchorType, DimensionBehavior, LayoutGraph, MatchConstraintDefault, Widget, WidgetId,
    WidgetKind,
};

use super::barrier;
use super::constraints::known_value;
use super::guideline;
use super::types::Axis;

/// Place everything that can be placed directly. Returns the number of
/// resolved widgets per axis.
pub(crate) fn resolve(graph: &mut LayoutGraph, scope: WidgetId, fixed: [bool; 2]) -> [usize; 2] {
    let children: Vec<WidgetId> = graph.children(scope).to_vec();
    let mut counts = [0usize; 2];
    loop {
        let mut changed = false;
        for &id in &children {
            for axis in Axis::BOTH {
                if graph[id].pass.resolved[axis.index()] {
                    continue;
                }
                let Some((start, extent)) = placement(graph, scope, fixed, id, axis) else {
                    continue;
                };
                commit(graph, id, axis, start, extent);
                counts[axis.index()] += 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    counts
}

/// Start and extent of a widget on an axis, when they follow from known values
fn placement(
    graph: &LayoutGraph,
    scope: WidgetId,
    fixed: [bool; 2],
    id: WidgetId,
    axis: Axis,
) -> Option<(i32, i32)> {
    let widget = &graph[id];
    match &widget.kind {
        WidgetKind::Guideline(g) if g.axis() == axis => {
            guideline::position(graph, g, scope, fixed[axis.index()]).map(|p| (p, 0))
        }
        WidgetKind::Barrier(b) if b.side().axis() == axis => {
            barrier::position(graph, b, scope, fixed).map(|p| (p, 0))
        }
        WidgetKind::Leaf | WidgetKind::Container(_) | WidgetKind::Flow(_) => {
            widget_placement(graph, scope, fixed, widget, axis)
        }
        _ => None,
    }
}

fn widget_placement(
    graph: &LayoutGraph,
    scope: WidgetId,
    fixed: [bool; 2],
    widget: &Widget,
    axis: Axis,
) -> Option<(i32, i32)> {
    let id = widget.id();
    if widget.is_gone() || widget.ratio.is_some() || graph.is_in_chain(id, axis) {
        return None;
    }
    if axis == Axis::Vertical && widget.anchor(AnchorType::Baseline).is_connected() {
        return None;
    }
    let begin = widget.begin(axis);
    let end = widget.end(axis);
    if begin.target.is_some() && begin.target == end.target {
        return None;
    }

    // Known edge a side is attached to, margin included
    let side_value = |anchor: AnchorId, sign: i32| -> Option<Option<i32>> {
        match graph.anchor(anchor)?.target {
            None => Some(None),
            Some(target) => {
                let value = known_value(graph, scope, fixed, target)?;
                Some(Some(value + sign * graph.margin(anchor)))
            }
        }
    };
    let begin_value = side_value(begin.id(), 1)?;
    let end_value = side_value(end.id(), -1)?;
    let size = widget.length(axis);

    match widget.behavior(axis) {
        DimensionBehavior::Fixed | DimensionBehavior::WrapContent => {
            match (begin_value, end_value) {
                (None, None) => Some((widget.frame.start(axis), size)),
                (Some(b), None) => Some((b, size)),
                (None, Some(e)) => Some((e - size, size)),
                (Some(b), Some(e)) => {
                    let slack = (e - b - size) as f32;
                    let offset = (slack * widget.bias(axis) + 0.5).floor() as i32;
                    Some((b + offset, size))
                }
            }
        }
        DimensionBehavior::MatchConstraint => {
            let mc = widget.match_constraint(axis);
            let spread =
                widget.pass.resolved_default[axis.index()] == MatchConstraintDefault::Spread;
            let unbounded = mc.min == 0 && mc.max == 0;
            match (begin_value, end_value) {
                (Some(b), Some(e)) if spread && unbounded && e >= b => Some((b, e - b)),
                _ => None,
            }
        }
        DimensionBehavior::MatchParent => {
            if !fixed[axis.index()] {
                return None;
            }
            let span = graph[scope].frame.extent(axis);
            let start = begin.raw_margin();
            Some((start, (span - end.raw_margin() - start).max(0)))
        }
    }
}

/// Store a placement in the frame and in the final anchor values
fn commit(graph: &mut LayoutGraph, id: WidgetId, axis: Axis, start: i32, extent: i32) {
    let widget = &mut graph[id];
    *widget.start_mut(axis) = start;
    if !widget.kind.is_helper() {
        *widget.extent_mut(axis) = extent;
    }
    widget.pass.resolved[axis.index()] = true;
    widget.anchor_mut(AnchorType::begin(axis)).final_value = Some(start);
    widget.anchor_mut(AnchorType::end(axis)).final_value = Some(start + extent);
    widget.anchor_mut(AnchorType::center(axis)).final_value = Some(start + extent / 2);
    if axis == Axis::Vertical && widget.has_baseline {
        let baseline = start + widget.baseline_distance;
        widget.anchor_mut(AnchorType::Baseline).final_value = Some(baseline);
    }
    tracing::debug!(widget = %id, %axis, start, extent, "resolved directly");
}
