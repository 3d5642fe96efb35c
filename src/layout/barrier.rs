//! Barriers: lines following the outermost edge of a set of siblings

use crate::model::{AnchorId, AnchorType, Barrier, LayoutGraph, WidgetId, WidgetKind};

use super::constraints::{known_value, Emitter};
use super::solver::{LinearSolver, Priority};

/// References a barrier takes into account inside `scope`
pub(crate) fn references<'g>(
    graph: &'g LayoutGraph,
    barrier: &'g Barrier,
    scope: WidgetId,
) -> impl Iterator<Item = WidgetId> + 'g {
    barrier.references().iter().copied().filter(move |r| {
        graph.widget(*r).is_some_and(|w| {
            w.parent == Some(scope) && (barrier.allows_gone_widget() || !w.is_gone())
        })
    })
}

/// Flag every widget referenced by a barrier of `scope` on the barrier's axis
pub(crate) fn mark_references(graph: &mut LayoutGraph, scope: WidgetId) {
    let mut marks = Vec::new();
    for &child in graph.children(scope) {
        if let WidgetKind::Barrier(barrier) = &graph[child].kind {
            let axis = barrier.side().axis();
            marks.extend(references(graph, barrier, scope).map(|r| (r, axis)));
        }
    }
    for (id, axis) in marks {
        graph[id].pass.in_barrier[axis.index()] = true;
    }
}

/// Barrier position once every reference's edge is known
pub(crate) fn position(
    graph: &LayoutGraph,
    barrier: &Barrier,
    scope: WidgetId,
    fixed: [bool; 2],
) -> Option<i32> {
    let side = barrier.side();
    let mut edge: Option<i32> = None;
    for reference in references(graph, barrier, scope) {
        let value = known_value(graph, scope, fixed, AnchorId::new(reference, side.anchor_type()))?;
        edge = Some(match edge {
            None => value,
            Some(e) if side.is_min() => e.min(value),
            Some(e) => e.max(value),
        });
    }
    let edge = edge?;
    Some(if side.is_min() {
        edge - barrier.margin()
    } else {
        edge + barrier.margin()
    })
}

/// Whether a widget depending on the barrier is centered on its axis
fn has_centered_dependents(graph: &LayoutGraph, id: WidgetId, barrier: &Barrier) -> bool {
    let axis = barrier.side().axis();
    [AnchorType::begin(axis), AnchorType::end(axis)]
        .into_iter()
        .filter_map(|kind| graph[id].anchor(kind).dependents())
        .flatten()
        .any(|dependent| {
            let owner = &graph[dependent.widget];
            owner.begin(axis).is_connected() && owner.end(axis).is_connected()
        })
}

impl<'a, S: LinearSolver + ?Sized> Emitter<'a, S> {
    pub(crate) fn add_barrier(&mut self, id: WidgetId, barrier: &Barrier) {
        let graph = self.graph;
        let side = barrier.side();
        let axis = side.axis();
        let line = self.var(AnchorId::new(id, side.anchor_type()));
        let widget = &graph[id];

        // A wrapping scope grows to contain the line
        if self.is_wrap(axis) {
            let parent_end = self.scope_end(axis);
            self.solver
                .add_greater_than(parent_end, line, 0, Priority::Equality);
        }
        if widget.pass.resolved[axis.index()] {
            self.solver.add_constant(line, widget.frame.start(axis));
            return;
        }

        let refs: Vec<WidgetId> = references(graph, barrier, self.scope)
            .filter(|r| self.includes(*r))
            .collect();
        let has_match_refs = refs.iter().any(|r| {
            let w = &graph[*r];
            w.is_match(axis) && w.begin(axis).is_connected() && w.end(axis).is_connected()
        });
        let strength = if !has_match_refs && has_centered_dependents(graph, id, barrier) {
            Priority::Equality
        } else {
            Priority::Highest
        };

        for reference in refs {
            let edge = self.var(AnchorId::new(reference, side.anchor_type()));
            if side.is_min() {
                self.solver
                    .add_lower_than(line, edge, -barrier.margin(), Priority::Fixed);
                self.solver
                    .add_equality(line, edge, -barrier.margin(), strength);
            } else {
                self.solver
                    .add_greater_than(line, edge, barrier.margin(), Priority::Fixed);
                self.solver
                    .add_equality(line, edge, barrier.margin(), strength);
            }
        }

        // Without references the line rests against the scope edge it faces
        let rest = if side.is_min() {
            self.scope_end(axis)
        } else {
            self.scope_begin(axis)
        };
        self.solver.add_equality(line, rest, 0, Priority::Low);
    }
}
