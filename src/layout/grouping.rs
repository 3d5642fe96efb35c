//! Wrap-content estimation by independent groups
//!
//! Children of a wrap-content container that share no connection can be
//! solved separately. Each group is solved on its own against a wrap scope;
//! the container takes the largest extent any group needs and the axis is
//! then laid out as fixed.

use std::collections::{HashMap, HashSet};

use crate::model::{AnchorType, LayoutGraph, WidgetId, WidgetKind};

use super::constraints::Emitter;
use super::solver::CassowarySolver;
use super::types::Axis;

/// Union-find over the children of one scope
struct Groups {
    parent: Vec<usize>,
}

impl Groups {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// The child of `scope` that contains `id`, if any
fn child_of(graph: &LayoutGraph, scope: WidgetId, id: WidgetId) -> Option<WidgetId> {
    let mut current = id;
    loop {
        let parent = graph.widget(current)?.parent?;
        if parent == scope {
            return Some(current);
        }
        current = parent;
    }
}

/// Partition the children of `scope` into groups that are independent on `axis`
pub(crate) fn partition(graph: &LayoutGraph, scope: WidgetId, axis: Axis) -> Vec<Vec<WidgetId>> {
    let children = graph.children(scope);
    let index: HashMap<WidgetId, usize> =
        children.iter().enumerate().map(|(i, c)| (*c, i)).collect();
    let mut groups = Groups::new(children.len());

    let mut kinds = vec![AnchorType::begin(axis), AnchorType::end(axis), AnchorType::center(axis)];
    if axis == Axis::Vertical {
        kinds.push(AnchorType::Baseline);
    }

    for (i, &child) in children.iter().enumerate() {
        let widget = &graph[child];
        for kind in &kinds {
            let Some(target) = widget.anchor(*kind).target() else {
                continue;
            };
            if let Some(j) = child_of(graph, scope, target.widget).and_then(|c| index.get(&c)) {
                groups.union(i, *j);
            }
        }
        let references: &[WidgetId] = match &widget.kind {
            WidgetKind::Barrier(b) if b.side().axis() == axis => b.references(),
            WidgetKind::Flow(f) => f.references(),
            _ => &[],
        };
        for r in references {
            if let Some(j) = index.get(r) {
                groups.union(i, *j);
            }
        }
    }

    let mut by_root: Vec<(usize, Vec<WidgetId>)> = Vec::new();
    for (i, &child) in children.iter().enumerate() {
        let root = groups.find(i);
        match by_root.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(child),
            None => by_root.push((root, vec![child])),
        }
    }
    by_root.into_iter().map(|(_, members)| members).collect()
}

/// Estimate wrap extents of `scope` from independent groups.
///
/// Axes that get an estimate are sized and dropped from `wrap`. Returns
/// whether any axis was estimated.
pub(crate) fn estimate(graph: &mut LayoutGraph, scope: WidgetId, wrap: &mut [bool; 2]) -> bool {
    let config = graph.config().clone();
    if !config.grouping || graph.children(scope).len() < config.grouping_min_children {
        return false;
    }

    let mut grouped = false;
    for axis in Axis::BOTH {
        let i = axis.index();
        if !wrap[i] {
            continue;
        }
        let groups = partition(graph, scope, axis);
        if groups.len() < 2 {
            continue;
        }

        let mut needed = 0;
        for members in &groups {
            let members: HashSet<WidgetId> = members.iter().copied().collect();
            let mut solver = CassowarySolver::new().with_demotion(config.solver_demotion);
            let mut emitter = Emitter::new(graph, &mut solver, scope, *wrap).with_members(&members);
            emitter.emit();
            emitter.minimize();
            let scope_extent = emitter.scope_extents()[i].unwrap_or(0);
            let member_extent = members
                .iter()
                .filter_map(|m| emitter.value(graph[*m].anchor_id(AnchorType::end(axis))))
                .max()
                .unwrap_or(0);
            needed = needed.max(scope_extent).max(member_extent);
        }

        let container = &graph[scope];
        let extent = needed.max(container.min_size(axis)).min(container.max_size(axis));
        graph[scope].set_extent(axis, extent);
        wrap[i] = false;
        grouped = true;
        tracing::debug!(
            scope = %scope,
            %axis,
            groups = groups.len(),
            extent,
            "wrap extent estimated from groups"
        );
    }
    grouped
}
