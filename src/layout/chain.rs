//! Chains: runs of widgets linked both ways on one axis
//!
//! [`ChainHead::define`] walks a chain from its head and gathers what the
//! styles need (visible endpoints, match-constraint members, weights).
//! `Emitter::add_chain` then emits the relations of the chain's style.

use std::collections::HashSet;

use crate::model::{AnchorId, AnchorType, ChainStyle, LayoutGraph, MatchConstraintDefault, WidgetId};

use super::constraints::Emitter;
use super::solver::{LinearSolver, Priority};
use super::types::Axis;

/// Summary of one chain on one axis
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChainHead {
    pub axis: Axis,
    /// Members in chain order, gone ones included
    pub members: Vec<WidgetId>,
    pub first_visible: Option<WidgetId>,
    pub last_visible: Option<WidgetId>,
    pub visible_count: usize,
    /// Sum of visible fixed extents and margins between the outer anchors
    pub total_size: i32,
    /// Visible MATCH_CONSTRAINT members that share space
    pub match_count: usize,
    pub total_weight: f32,
    /// Visible SPREAD or RATIO members, in order, for weighted distribution
    pub weighted: Vec<WidgetId>,
    pub has_undefined_weights: bool,
    pub has_defined_weights: bool,
}

impl ChainHead {
    /// Walk the chain starting at `head`
    pub fn define(graph: &LayoutGraph, head: WidgetId, axis: Axis) -> Option<ChainHead> {
        graph.widget(head)?;
        let i = axis.index();
        let mut chain = ChainHead {
            axis,
            members: Vec::new(),
            first_visible: None,
            last_visible: None,
            visible_count: 0,
            total_size: 0,
            match_count: 0,
            total_weight: 0.0,
            weighted: Vec::new(),
            has_undefined_weights: false,
            has_defined_weights: false,
        };

        let mut seen = HashSet::new();
        let mut current = Some(head);
        while let Some(id) = current {
            // force_connect can build a ring; stop at the first revisit
            if !seen.insert(id) {
                break;
            }
            chain.members.push(id);
            let w = &graph[id];
            if !w.is_gone() {
                chain.visible_count += 1;
                if chain.first_visible.is_none() {
                    chain.first_visible = Some(id);
                }
                chain.last_visible = Some(id);

                if !w.is_match(axis) {
                    chain.total_size += w.length(axis);
                }
                chain.total_size += graph.margin(w.anchor_id(AnchorType::begin(axis)));
                chain.total_size += graph.margin(w.anchor_id(AnchorType::end(axis)));

                if w.is_match(axis) {
                    let default = w.pass.resolved_default[i];
                    if matches!(
                        default,
                        MatchConstraintDefault::Spread
                            | MatchConstraintDefault::Ratio
                            | MatchConstraintDefault::Percent
                    ) {
                        chain.match_count += 1;
                    }
                    let weight = w.weight(axis);
                    if weight > 0.0 {
                        chain.total_weight += weight;
                    }
                    if matches!(
                        default,
                        MatchConstraintDefault::Spread | MatchConstraintDefault::Ratio
                    ) {
                        if weight < 0.0 {
                            chain.has_undefined_weights = true;
                        } else {
                            chain.has_defined_weights = true;
                        }
                        chain.weighted.push(id);
                    }
                }
            }
            current = graph.next_in_chain(id, axis);
        }

        if let Some(first) = chain.first_visible {
            chain.total_size -= graph.margin(AnchorId::new(first, AnchorType::begin(axis)));
        }
        if let Some(last) = chain.last_visible {
            chain.total_size -= graph.margin(AnchorId::new(last, AnchorType::end(axis)));
        }
        Some(chain)
    }

    pub fn first(&self) -> WidgetId {
        self.members[0]
    }

    pub fn last(&self) -> WidgetId {
        self.members[self.members.len() - 1]
    }

    /// Explicit and undeclared weights mixed in one chain
    pub fn has_complex_weights(&self) -> bool {
        self.has_defined_weights && self.has_undefined_weights
    }

    /// The tail's end anchor is not connected to anything
    pub fn is_dangling(&self, graph: &LayoutGraph) -> bool {
        !graph[self.last()].end(self.axis).is_connected()
    }

    /// Next non-gone member after `id`
    fn next_visible(&self, graph: &LayoutGraph, id: WidgetId) -> Option<WidgetId> {
        let pos = self.members.iter().position(|m| *m == id)?;
        self.members[pos + 1..]
            .iter()
            .copied()
            .find(|m| !graph[*m].is_gone())
    }
}

impl<'a, S: LinearSolver + ?Sized> Emitter<'a, S> {
    /// Relations of one chain, according to the style of its first member
    pub(crate) fn add_chain(&mut self, chain: &ChainHead) {
        use Priority::{Barrier, Centering, Equality, Fixed, Highest, Low};

        let graph = self.graph;
        let axis = chain.axis;
        let i = axis.index();
        let begin_of = |id: WidgetId| AnchorId::new(id, AnchorType::begin(axis));
        let end_of = |id: WidgetId| AnchorId::new(id, AnchorType::end(axis));
        let target = |anchor: AnchorId| graph.anchor(anchor).and_then(|a| a.target());

        let first = chain.first();
        let last = chain.last();
        let style = graph[first].chain_style(axis);
        let spread = style == ChainStyle::Spread;
        let spread_inside = style == ChainStyle::SpreadInside;
        let packed = style == ChainStyle::Packed;
        let wrap = self.is_wrap(axis);

        tracing::trace!(
            head = %first,
            %axis,
            ?style,
            members = chain.members.len(),
            total_size = chain.total_size,
            "emitting chain"
        );

        // Link each member to the previous one
        for &id in &chain.members {
            let w = &graph[id];
            let begin = begin_of(id);
            let mut strength = if packed { Low } else { Highest };
            let mut margin = graph.margin(begin);
            let spread_only = w.is_match(axis)
                && w.pass.resolved_default[i] == MatchConstraintDefault::Spread;
            if let (Some(t), true) = (target(begin), id != first) {
                margin += graph.margin(t);
            }
            if packed && id != first && Some(id) != chain.first_visible {
                strength = Fixed;
            }
            if let Some(t) = target(begin) {
                let bv = self.var(begin);
                let tv = self.var(t);
                if Some(id) == chain.first_visible {
                    self.solver.add_greater_than(bv, tv, margin, Barrier);
                } else {
                    self.solver.add_greater_than(bv, tv, margin, Fixed);
                }
                if spread_only && !packed {
                    strength = Equality;
                }
                if Some(id) == chain.first_visible && packed && w.pass.in_barrier[i] {
                    strength = Equality;
                }
                self.solver.add_equality(bv, tv, margin, strength);
            }
            if wrap {
                let bv = self.var(begin);
                if !w.is_gone() && w.is_match(axis) {
                    let ev = self.var(end_of(id));
                    self.solver.add_greater_than(ev, bv, 0, Equality);
                }
                let parent_begin = self.scope_begin(axis);
                self.solver.add_greater_than(bv, parent_begin, 0, Fixed);
            }
        }

        // Close the chain at the tail
        let last_end_target = target(end_of(last));
        if let (Some(last_visible), Some(tail_target)) = (chain.last_visible, last_end_target) {
            let end = end_of(last_visible);
            let lv = &graph[last_visible];
            let spread_only = lv.is_match(axis)
                && lv.pass.resolved_default[i] == MatchConstraintDefault::Spread;
            let margin = graph.margin(end);
            let ev = self.var(end);
            if let Some(t) = target(end) {
                let tv = self.var(t);
                if spread_only && !packed && t.widget == self.scope {
                    self.solver.add_equality(ev, tv, -margin, Equality);
                } else if packed && t.widget == self.scope {
                    self.solver.add_equality(ev, tv, -margin, Highest);
                }
            }
            let tail = self.var(tail_target);
            self.solver.add_lower_than(ev, tail, -margin, Barrier);
        }
        if wrap {
            let parent_end = self.scope_end(axis);
            let last_end = self.var(end_of(last));
            let margin = graph.margin(end_of(last));
            self.solver
                .add_greater_than(parent_end, last_end, margin, Fixed);
        }

        // Share space between match-constraint members
        if chain.weighted.len() > 1 {
            let complex = chain.has_complex_weights();
            let total = if chain.has_undefined_weights && !complex {
                chain.match_count as f32
            } else {
                chain.total_weight
            };
            let mut previous: Option<(WidgetId, f32)> = None;
            for &id in &chain.weighted {
                let begin = self.var(begin_of(id));
                let end = self.var(end_of(id));
                let mut weight = graph[id].weight(axis);
                if weight < 0.0 {
                    if complex {
                        self.solver.add_equality(end, begin, 0, Highest);
                        continue;
                    }
                    weight = 1.0;
                }
                if weight == 0.0 {
                    self.solver.add_equality(end, begin, 0, Fixed);
                    continue;
                }
                if let Some((prev, prev_weight)) = previous {
                    let prev_begin = self.var(begin_of(prev));
                    let prev_end = self.var(end_of(prev));
                    self.solver.add_equal_match(
                        prev_weight,
                        total,
                        weight,
                        prev_begin,
                        prev_end,
                        begin,
                        end,
                        Fixed,
                    );
                }
                previous = Some((id, weight));
            }
        }

        let Some(first_visible) = chain.first_visible else {
            return;
        };
        let last_visible = chain.last_visible.unwrap_or(first_visible);
        let apply_fixed = chain.match_count > 0 && chain.members.len() == chain.match_count;
        let outer_begin = target(begin_of(first));
        let outer_end = target(end_of(last));

        if first_visible == last_visible || packed {
            if let (Some(bt), Some(et)) = (outer_begin, outer_end) {
                let begin = begin_of(first_visible);
                let end = end_of(last_visible);
                let (b, btv, etv, e) = (self.var(begin), self.var(bt), self.var(et), self.var(end));
                let bias = graph[first].bias(axis);
                self.solver.add_centering(
                    b,
                    btv,
                    graph.margin(begin),
                    bias,
                    etv,
                    e,
                    graph.margin(end),
                    Centering,
                );
            }
        } else if spread {
            let strength = if apply_fixed { Fixed } else { Equality };
            let mut previous_visible = first_visible;
            let mut current = Some(first_visible);
            while let Some(id) = current {
                let next = chain.next_visible(graph, id);
                if next.is_some() || id == last_visible {
                    let begin_anchor = begin_of(id);
                    let begin_target = if previous_visible != id {
                        Some(end_of(previous_visible))
                    } else {
                        outer_begin
                    };
                    let begin_next_anchor = match next {
                        Some(n) => Some(begin_of(n)),
                        None => outer_end,
                    };
                    let begin_next_target = end_of(id);

                    let mut begin_margin = graph.margin(begin_anchor);
                    let mut next_margin = graph.margin(end_of(id));
                    if let Some(anchor) = begin_next_anchor {
                        next_margin += graph.margin(anchor);
                    }
                    begin_margin += graph.margin(end_of(previous_visible));
                    if id == first_visible {
                        begin_margin = graph.margin(begin_of(first_visible));
                    }
                    if id == last_visible {
                        next_margin = graph.margin(end_of(last_visible));
                    }

                    if let (Some(bt), Some(bn)) = (begin_target, begin_next_anchor) {
                        let b = self.var(begin_anchor);
                        let btv = self.var(bt);
                        let bnv = self.var(bn);
                        let bntv = self.var(begin_next_target);
                        self.solver.add_centering(
                            b,
                            btv,
                            begin_margin,
                            0.5,
                            bnv,
                            bntv,
                            next_margin,
                            strength,
                        );
                    }
                }
                if !graph[id].is_gone() {
                    previous_visible = id;
                }
                current = next;
            }
        } else if spread_inside {
            let strength = if apply_fixed { Fixed } else { Highest };
            let mut previous_visible = first_visible;
            let mut current = Some(first_visible);
            while let Some(id) = current {
                let mut next = chain.next_visible(graph, id);
                if id != first_visible && id != last_visible && next.is_some() {
                    if next == Some(last_visible) {
                        next = None;
                    }
                    let begin_anchor = begin_of(id);
                    let begin_target = end_of(previous_visible);
                    let (begin_next_anchor, begin_next_target) = match next {
                        Some(n) => (begin_of(n), target(begin_of(n))),
                        None => (begin_of(last_visible), Some(end_of(id))),
                    };
                    let begin_margin =
                        graph.margin(begin_anchor) + graph.margin(end_of(previous_visible));
                    let next_margin = graph.margin(end_of(id)) + graph.margin(begin_next_anchor);

                    if let Some(bnt) = begin_next_target {
                        let b = self.var(begin_anchor);
                        let btv = self.var(begin_target);
                        let bnv = self.var(begin_next_anchor);
                        let bntv = self.var(bnt);
                        self.solver.add_centering(
                            b,
                            btv,
                            begin_margin,
                            0.5,
                            bnv,
                            bntv,
                            next_margin,
                            strength,
                        );
                    }
                }
                if !graph[id].is_gone() {
                    previous_visible = id;
                }
                current = next;
            }

            let begin = begin_of(first_visible);
            let end = end_of(last_visible);
            if let Some(bt) = outer_begin {
                let b = self.var(begin);
                let btv = self.var(bt);
                self.solver
                    .add_equality(b, btv, graph.margin(begin), Equality);
            }
            if let Some(et) = outer_end {
                let e = self.var(end);
                let etv = self.var(et);
                self.solver
                    .add_equality(e, etv, -graph.margin(end), Equality);
            }
        }

        // Keep the visible run centered between the outer anchors
        if (spread || spread_inside) && first_visible != last_visible {
            let begin = begin_of(first_visible);
            let end = end_of(last_visible);
            let begin_target = target(begin);
            let end_target = if last != last_visible {
                target(end_of(last))
            } else {
                target(end)
            };
            if let (Some(bt), Some(et)) = (begin_target, end_target) {
                let b = self.var(begin);
                let btv = self.var(bt);
                let etv = self.var(et);
                let e = self.var(end);
                self.solver.add_centering(
                    b,
                    btv,
                    graph.margin(begin),
                    0.5,
                    etv,
                    e,
                    graph.margin(end),
                    Equality,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DimensionBehavior, Visibility};

    fn chain_of(n: usize) -> (LayoutGraph, WidgetId, Vec<WidgetId>) {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        graph[root].set_size(300, 100);
        let widgets: Vec<WidgetId> = (0..n).map(|_| graph.add_leaf(root).unwrap()).collect();
        for w in &widgets {
            graph[*w].set_size(50, 20);
        }
        let left = |w| AnchorId::new(w, AnchorType::Left);
        let right = |w| AnchorId::new(w, AnchorType::Right);
        assert!(graph.connect(left(widgets[0]), left(root), 0));
        for pair in widgets.windows(2) {
            assert!(graph.connect(right(pair[0]), left(pair[1]), 0));
            assert!(graph.connect(left(pair[1]), right(pair[0]), 0));
        }
        assert!(graph.connect(right(widgets[n - 1]), right(root), 0));
        (graph, root, widgets)
    }

    #[test]
    fn test_define_counts_members() {
        let (mut graph, _, widgets) = chain_of(3);
        graph[widgets[1]].set_visibility(Visibility::Gone);
        graph[widgets[2]].set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint);

        let chain = ChainHead::define(&graph, widgets[0], Axis::Horizontal).unwrap();
        assert_eq!(chain.members, widgets);
        assert_eq!(chain.visible_count, 2);
        assert_eq!(chain.first_visible, Some(widgets[0]));
        assert_eq!(chain.last_visible, Some(widgets[2]));
        assert_eq!(chain.match_count, 1);
        assert_eq!(chain.weighted, vec![widgets[2]]);
        assert!(chain.has_undefined_weights);
        assert!(!chain.has_complex_weights());
        assert_eq!(chain.total_size, 50);
        assert!(!chain.is_dangling(&graph));
    }

    #[test]
    fn test_complex_weights_flagged() {
        let (mut graph, _, widgets) = chain_of(2);
        for w in &widgets {
            graph[*w].set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint);
        }
        graph[widgets[0]].set_weight(Axis::Horizontal, Some(2.0));
        let chain = ChainHead::define(&graph, widgets[0], Axis::Horizontal).unwrap();
        assert!(chain.has_complex_weights());
        assert_eq!(chain.total_weight, 2.0);
    }

    #[test]
    fn test_next_visible_skips_gone() {
        let (mut graph, _, widgets) = chain_of(3);
        graph[widgets[1]].set_visibility(Visibility::Gone);
        let chain = ChainHead::define(&graph, widgets[0], Axis::Horizontal).unwrap();
        assert_eq!(chain.next_visible(&graph, widgets[0]), Some(widgets[2]));
        assert_eq!(chain.next_visible(&graph, widgets[2]), None);
    }
}
