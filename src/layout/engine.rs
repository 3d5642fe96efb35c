//! Container layout
//!
//! [`LayoutGraph::layout`] lays out a container and everything below it.
//! Nested containers go first so their parent sees them at their final
//! size. Each container then runs the solve loop:
//!
//! 1. measure content-sized children, wire flows, mark barrier references
//!    and resolve dimension ratios
//! 2. estimate wrap-content extents from independent groups (optional)
//! 3. per pass: resolve what can be resolved directly, emit the rest into
//!    a fresh solver, minimize and read the frames back
//! 4. when a wrap-content axis turns out too small for its children, or
//!    larger than the host bound, size it and run another pass
//!
//! The loop stops when a pass changes nothing or the iteration cap is hit.

use std::collections::HashMap;

use crate::model::{AnchorType, DimensionBehavior, LayoutGraph, WidgetId};

use super::barrier;
use super::constraints::{apply_frame, resolve_ratio, Emitter};
use super::direct;
use super::error::LayoutError;
use super::flow;
use super::grouping;
use super::measure::{measure_children, IntrinsicSizes, Measurer};
use super::solver::{CassowarySolver, LinearSolver};
use super::types::{Axis, LayoutReport};

impl LayoutGraph {
    /// Lay out the container `root` and all of its descendants.
    ///
    /// Content-sized widgets are measured through `measurer`. Frames are
    /// written back into the widgets, relative to their parent.
    pub fn layout(
        &mut self,
        root: WidgetId,
        measurer: &mut dyn Measurer,
    ) -> Result<LayoutReport, LayoutError> {
        let widget = self.widget(root).ok_or(LayoutError::UnknownWidget(root))?;
        if !widget.kind.is_container() {
            return Err(LayoutError::not_a_container(root));
        }
        let span = tracing::debug_span!("layout", root = %root);
        let _enter = span.enter();

        let report = layout_scope(self, root, measurer, [false, false]);
        if report.converged {
            tracing::debug!(iterations = report.iterations, frame = %report.frame, "layout done");
        }
        Ok(report)
    }

    /// Lay out `root` taking every widget's current size as its content size
    pub fn layout_with_frames(&mut self, root: WidgetId) -> Result<LayoutReport, LayoutError> {
        self.layout(root, &mut IntrinsicSizes::new())
    }
}

/// Clear the per-call state of the children of `scope`
fn reset_pass(graph: &mut LayoutGraph, scope: WidgetId) {
    let children: Vec<WidgetId> = graph.children(scope).to_vec();
    for id in children {
        let widget = &mut graph[id];
        widget.pass = Default::default();
        for anchor in widget.anchors.iter_mut() {
            anchor.final_value = None;
        }
    }
}

/// Forget direct placements on one axis after the scope changed size
fn clear_resolved(graph: &mut LayoutGraph, scope: WidgetId, axis: Axis) {
    let children: Vec<WidgetId> = graph.children(scope).to_vec();
    for id in children {
        let widget = &mut graph[id];
        widget.pass.resolved[axis.index()] = false;
        for kind in [AnchorType::begin(axis), AnchorType::end(axis), AnchorType::center(axis)] {
            widget.anchor_mut(kind).final_value = None;
        }
        if axis == Axis::Vertical {
            widget.anchor_mut(AnchorType::Baseline).final_value = None;
        }
    }
}

/// Extent the children need on `axis`: the furthest end edge, plus the
/// margin of ends attached to the scope's own end
fn needed_extent(graph: &LayoutGraph, scope: WidgetId, axis: Axis) -> i32 {
    let scope_end = graph[scope].anchor_id(AnchorType::end(axis));
    graph
        .children(scope)
        .iter()
        .map(|id| &graph[*id])
        .filter(|w| !w.is_gone() && !w.kind.is_helper())
        .map(|w| {
            let end = w.end(axis);
            let margin = if end.target() == Some(scope_end) {
                graph.margin(end.id())
            } else {
                0
            };
            w.frame.end(axis) + margin
        })
        .max()
        .unwrap_or(0)
}

fn layout_scope(
    graph: &mut LayoutGraph,
    scope: WidgetId,
    measurer: &mut dyn Measurer,
    forced: [bool; 2],
) -> LayoutReport {
    let nested: Vec<WidgetId> = graph
        .children(scope)
        .iter()
        .copied()
        .filter(|c| graph[*c].kind.is_container() && !graph[*c].is_gone())
        .collect();
    let mut nested_sizes = HashMap::new();
    for &child in &nested {
        layout_scope(graph, child, measurer, [false, false]);
        nested_sizes.insert(child, graph[child].frame);
    }

    let config = graph.config().clone();
    let wrap_behavior = Axis::BOTH.map(|axis| {
        graph[scope].behavior(axis) == DimensionBehavior::WrapContent && !forced[axis.index()]
    });
    let mut wrap = wrap_behavior;

    reset_pass(graph, scope);
    let measured = measure_children(graph, scope, wrap, measurer);
    let flows = flow::prepare_flows(graph, scope, wrap);
    barrier::mark_references(graph, scope);
    let children: Vec<WidgetId> = graph.children(scope).to_vec();
    for &child in &children {
        resolve_ratio(graph, child);
    }
    tracing::trace!(%scope, children = children.len(), measured, flows, ?wrap, "scope prepared");

    let mut report = LayoutReport {
        converged: true,
        ..Default::default()
    };
    report.grouped = grouping::estimate(graph, scope, &mut wrap);

    let max_iterations = config.max_iterations.max(1);
    let mut solver = CassowarySolver::new().with_demotion(config.solver_demotion);
    for iteration in 1..=max_iterations {
        report.iterations = iteration;
        tracing::trace!(%scope, iteration, ?wrap, "solve pass");

        if config.direct_resolution {
            let counts = direct::resolve(graph, scope, [!wrap[0], !wrap[1]]);
            report.directly_resolved[0] += counts[0];
            report.directly_resolved[1] += counts[1];
        }

        let frame = graph[scope].frame;
        let (mut pass, extents, frames) = {
            let mut emitter = Emitter::new(graph, &mut solver, scope, wrap);
            let pass = emitter.emit();
            emitter.minimize();
            let extents = emitter.scope_extents();
            let span = [
                extents[0].unwrap_or(frame.width),
                extents[1].unwrap_or(frame.height),
            ];
            (pass, extents, emitter.frames(span))
        };
        solver.reset();

        for axis in Axis::BOTH {
            if let Some(extent) = extents[axis.index()] {
                graph[scope].set_extent(axis, extent);
            }
        }
        for (id, rect) in frames {
            apply_frame(&mut graph[id], rect);
        }

        for axis in Axis::BOTH {
            let i = axis.index();
            if !wrap_behavior[i] {
                continue;
            }
            let container = &graph[scope];
            let solved = container.frame.extent(axis);
            let bound = container.max_size(axis);
            let target = needed_extent(graph, scope, axis)
                .max(container.min_size(axis))
                .min(bound);
            pass.grew[i] = target > solved;
            pass.clamped[i] = solved > bound;
        }
        report.last_pass = pass;
        if !pass.needs_another_pass() {
            break;
        }
        if iteration == max_iterations {
            report.converged = false;
            tracing::warn!(
                %scope,
                iterations = iteration,
                "wrap content did not settle, keeping last pass"
            );
            break;
        }

        for axis in Axis::BOTH {
            let i = axis.index();
            if !pass.grew[i] && !pass.clamped[i] {
                continue;
            }
            let container = &graph[scope];
            let bound = container.max_size(axis);
            let extent = if pass.clamped[i] {
                bound
            } else {
                needed_extent(graph, scope, axis)
                    .max(container.min_size(axis))
                    .min(bound)
            };
            graph[scope].set_extent(axis, extent);
            wrap[i] = false;
            clear_resolved(graph, scope, axis);
            tracing::debug!(%scope, %axis, extent, grew = pass.grew[i], "resizing wrap content");
        }
    }

    // Nested containers resized by this scope are laid out again at their new size
    for child in nested {
        let before = nested_sizes.get(&child).copied();
        let after = graph[child].frame;
        let resized = before.is_some_and(|b| b.width != after.width || b.height != after.height);
        if resized {
            tracing::debug!(container = %child, frame = %after, "relayout of resized container");
            layout_scope(graph, child, measurer, [true, true]);
        }
    }

    report.frame = graph[scope].frame;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::LayoutConfig;
    use crate::layout::types::Rect;
    use crate::model::{AnchorId, MatchConstraintDefault, WidgetKind};

    fn anchor(w: WidgetId, kind: AnchorType) -> AnchorId {
        AnchorId::new(w, kind)
    }

    #[test]
    fn test_layout_rejects_non_container() {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        let leaf = graph.add_leaf(root).unwrap();
        let err = graph.layout_with_frames(leaf).unwrap_err();
        assert!(matches!(err, LayoutError::NotAContainer { .. }));
        assert!(graph.layout_with_frames(WidgetId(99)).is_err());
    }

    #[test]
    fn test_fixed_root_single_pass() {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        graph[root].set_size(300, 200);
        let a = graph.add_leaf(root).unwrap();
        graph[a].set_size(100, 50);
        graph.connect_widgets(a, AnchorType::Center, root, AnchorType::Center, 0);

        let report = graph.layout_with_frames(root).unwrap();
        assert_eq!(report.iterations, 1);
        assert!(report.converged);
        assert_eq!(graph[a].frame(), Rect::new(100, 75, 100, 50));
    }

    #[test]
    fn test_wrap_root_fits_child() {
        let mut graph = LayoutGraph::with_config(LayoutConfig::new().with_grouping(false));
        let root = graph.add_root();
        graph[root].set_behaviors(DimensionBehavior::WrapContent, DimensionBehavior::WrapContent);
        let a = graph.add_leaf(root).unwrap();
        graph[a].set_size(50, 30);
        assert!(graph.connect(anchor(a, AnchorType::Left), anchor(root, AnchorType::Left), 10));
        assert!(graph.connect(anchor(a, AnchorType::Top), anchor(root, AnchorType::Top), 5));

        let report = graph.layout_with_frames(root).unwrap();
        assert_eq!(report.iterations, 1);
        assert_eq!(report.frame.width, 60);
        assert_eq!(report.frame.height, 35);
    }

    #[test]
    fn test_wrap_root_clamped_to_bound() {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        graph[root]
            .set_behavior(Axis::Horizontal, DimensionBehavior::WrapContent)
            .set_max_size(Axis::Horizontal, 80)
            .set_size(0, 100);
        let a = graph.add_leaf(root).unwrap();
        graph[a].set_size(120, 30);
        assert!(graph.connect(anchor(a, AnchorType::Left), anchor(root, AnchorType::Left), 0));

        let report = graph.layout_with_frames(root).unwrap();
        assert_eq!(graph[root].width(), 80);
        assert!(report.converged);
    }

    #[test]
    fn test_unbounded_growth_hits_iteration_cap() {
        let config = LayoutConfig::new().with_max_iterations(4).with_grouping(false);
        let mut graph = LayoutGraph::with_config(config);
        let root = graph.add_root();
        graph[root].set_behavior(Axis::Horizontal, DimensionBehavior::WrapContent);
        let a = graph.add_leaf(root).unwrap();
        graph[a]
            .set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint)
            .set_match_default(Axis::Horizontal, MatchConstraintDefault::Percent)
            .set_match_percent(Axis::Horizontal, 1.0);
        assert!(graph.connect(anchor(a, AnchorType::Left), anchor(root, AnchorType::Left), 10));

        let report = graph.layout_with_frames(root).unwrap();
        assert_eq!(report.iterations, 4);
        assert!(!report.converged);
    }

    #[test]
    fn test_nested_container_laid_out_first() {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        graph[root].set_size(400, 300);
        let inner = graph.add_container(root).unwrap();
        graph[inner].set_behaviors(DimensionBehavior::WrapContent, DimensionBehavior::WrapContent);
        let leaf = graph.add_leaf(inner).unwrap();
        graph[leaf].set_size(40, 20);
        assert!(graph.connect(anchor(leaf, AnchorType::Left), anchor(inner, AnchorType::Left), 5));
        assert!(graph.connect(anchor(leaf, AnchorType::Top), anchor(inner, AnchorType::Top), 5));
        for side in [AnchorType::Right, AnchorType::Bottom] {
            assert!(graph.connect(anchor(inner, side), anchor(root, side), 0));
        }

        graph.layout_with_frames(root).unwrap();
        assert!(matches!(graph[inner].kind(), WidgetKind::Container(_)));
        assert_eq!(graph[inner].frame(), Rect::new(355, 275, 45, 25));
        assert_eq!(graph[leaf].frame(), Rect::new(5, 5, 40, 20));
        assert_eq!(graph.absolute_rect(leaf), Some(Rect::new(360, 280, 40, 20)));
    }
}
