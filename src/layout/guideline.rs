//! Guideline placement

use crate::model::{AnchorId, Guideline, GuidelineMode, LayoutGraph, WidgetId};

use super::constraints::Emitter;
use super::solver::{LinearSolver, Priority};

/// Position of a guideline known without solving.
///
/// Begin offsets are always known. End offsets and percentages need the
/// parent extent on that axis to be fixed.
pub(crate) fn position(
    graph: &LayoutGraph,
    guideline: &Guideline,
    scope: WidgetId,
    fixed: bool,
) -> Option<i32> {
    let axis = guideline.axis();
    match guideline.mode() {
        GuidelineMode::Begin(offset) => Some(offset),
        GuidelineMode::End(offset) if fixed => Some(graph[scope].frame.extent(axis) - offset),
        GuidelineMode::Percent(percent) if fixed => {
            let extent = graph[scope].frame.extent(axis) as f32;
            Some((extent * percent + 0.5).floor() as i32)
        }
        _ => None,
    }
}

impl<'a, S: LinearSolver + ?Sized> Emitter<'a, S> {
    pub(crate) fn add_guideline(&mut self, id: WidgetId, guideline: &Guideline) {
        let graph = self.graph;
        let axis = guideline.axis();
        let line = self.var(AnchorId::new(id, guideline.anchor_type()));
        let widget = &graph[id];

        if widget.pass.resolved[axis.index()] {
            self.solver.add_constant(line, widget.frame.start(axis));
            if self.is_wrap(axis) {
                let parent_end = self.scope_end(axis);
                self.solver
                    .add_greater_than(parent_end, line, 0, Priority::Equality);
            }
            return;
        }

        let parent_begin = self.scope_begin(axis);
        let parent_end = self.scope_end(axis);
        let wrap = self.is_wrap(axis);
        match guideline.mode() {
            GuidelineMode::Begin(offset) => {
                self.solver
                    .add_equality(line, parent_begin, offset, Priority::Fixed);
                if wrap {
                    self.solver
                        .add_greater_than(parent_end, line, 0, Priority::Equality);
                }
            }
            GuidelineMode::End(offset) => {
                self.solver
                    .add_equality(line, parent_end, -offset, Priority::Fixed);
                if wrap {
                    self.solver
                        .add_greater_than(line, parent_begin, 0, Priority::Equality);
                    self.solver
                        .add_greater_than(parent_end, line, 0, Priority::Equality);
                }
            }
            GuidelineMode::Percent(percent) => {
                self.solver
                    .add_ratio(
                        line,
                        parent_begin,
                        parent_end,
                        parent_begin,
                        percent,
                        Priority::Fixed,
                    );
            }
        }
    }
}
