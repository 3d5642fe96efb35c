//! Translation of widgets into solver relations
//!
//! An [`Emitter`] is built for one container (its *scope*) per solve pass.
//! It owns the anchor-to-variable map, pins the scope's own bounds, emits
//! each child's relations and collects the chain heads it meets on the way.
//! Guidelines, barriers and chains add their own `impl Emitter` blocks in
//! their modules.

use std::collections::{HashMap, HashSet};

use crate::model::{
    AnchorId, AnchorType, DimensionBehavior, LayoutGraph, MatchConstraintDefault, RatioSide, Widget,
    WidgetId, WidgetKind,
};

use super::solver::{LinearSolver, Priority, VarId};
use super::types::{Axis, Rect, SolvePassResult};

// ============================================================================
// Anchor values shared with direct resolution
// ============================================================================

/// The anchor whose variable stands for `anchor`.
///
/// Guidelines and barriers are lines: every anchor on their axis shares the
/// begin anchor's variable.
pub(crate) fn canonical(graph: &LayoutGraph, anchor: AnchorId) -> AnchorId {
    let Some(widget) = graph.widget(anchor.widget) else {
        return anchor;
    };
    let line_axis = match &widget.kind {
        WidgetKind::Guideline(g) => Some(g.axis()),
        WidgetKind::Barrier(b) => Some(b.side().axis()),
        _ => None,
    };
    match (line_axis, anchor.kind.axis()) {
        (Some(line), Some(axis)) if line == axis => {
            AnchorId::new(anchor.widget, AnchorType::begin(axis))
        }
        _ => anchor,
    }
}

/// Value of an anchor known before solving, if any.
///
/// The scope's begin is always 0 and its end is known on fixed axes. Other
/// anchors are known once direct resolution has stored a final value.
pub(crate) fn known_value(
    graph: &LayoutGraph,
    scope: WidgetId,
    fixed: [bool; 2],
    anchor: AnchorId,
) -> Option<i32> {
    let anchor = canonical(graph, anchor);
    if anchor.widget == scope {
        let axis = anchor.kind.axis()?;
        if anchor.kind == AnchorType::begin(axis) {
            return Some(0);
        }
        if anchor.kind == AnchorType::end(axis) && fixed[axis.index()] {
            return Some(graph[scope].frame.extent(axis));
        }
        return None;
    }
    let widget = graph.widget(anchor.widget)?;
    if widget.parent != Some(scope) {
        return None;
    }
    widget.anchor(anchor.kind).final_value
}

// ============================================================================
// Ratio resolution
// ============================================================================

/// Resolve a widget's dimension ratio for this layout call.
///
/// Fills in the per-pass match defaults, decides which side the ratio drives
/// and, when only one axis is ratio-driven, folds the ratio into a size.
pub(crate) fn resolve_ratio(graph: &mut LayoutGraph, id: WidgetId) {
    let Some(widget) = graph.widget(id) else {
        return;
    };
    let mut defaults = [
        widget.match_constraint[0].default,
        widget.match_constraint[1].default,
    ];
    let is_match = [widget.is_match(Axis::Horizontal), widget.is_match(Axis::Vertical)];
    let connected = |kind: AnchorType| widget.anchor(kind).is_connected();
    let horizontal_pair = connected(AnchorType::Left) && connected(AnchorType::Right);
    let vertical_pair = connected(AnchorType::Top) && connected(AnchorType::Bottom);
    let min = [widget.match_constraint[0].min, widget.match_constraint[1].min];
    let frame = widget.frame;

    let mut use_ratio = false;
    let mut side = RatioSide::Unknown;
    let mut w_over_h = 0.0;
    let mut new_extent: Option<(Axis, i32)> = None;

    if let Some(ratio) = widget.ratio.filter(|_| !widget.is_gone()) {
        w_over_h = match ratio.side {
            RatioSide::Vertical => 1.0 / ratio.value,
            _ => ratio.value,
        };
        for axis in Axis::BOTH {
            let i = axis.index();
            if is_match[i] && defaults[i] == MatchConstraintDefault::Spread {
                defaults[i] = MatchConstraintDefault::Ratio;
            }
        }
        let ratio_axis = |axis: Axis| {
            is_match[axis.index()] && defaults[axis.index()] == MatchConstraintDefault::Ratio
        };

        if ratio_axis(Axis::Horizontal) && ratio_axis(Axis::Vertical) {
            use_ratio = true;
            side = ratio.side;
            if side == RatioSide::Unknown && !(horizontal_pair && vertical_pair) {
                if vertical_pair {
                    side = RatioSide::Horizontal;
                } else if horizontal_pair {
                    side = RatioSide::Vertical;
                }
            }
            if side == RatioSide::Horizontal && !vertical_pair {
                side = RatioSide::Vertical;
            } else if side == RatioSide::Vertical && !horizontal_pair {
                side = RatioSide::Horizontal;
            }
            if side == RatioSide::Unknown {
                if min[0] > 0 && min[1] == 0 {
                    side = RatioSide::Horizontal;
                } else if min[0] == 0 && min[1] > 0 {
                    side = RatioSide::Vertical;
                }
            }
        } else if ratio_axis(Axis::Horizontal) {
            side = RatioSide::Horizontal;
            use_ratio = true;
            new_extent = Some((Axis::Horizontal, (w_over_h * frame.height as f32) as i32));
            if !is_match[1] {
                defaults[0] = MatchConstraintDefault::RatioResolved;
                use_ratio = false;
            }
        } else if ratio_axis(Axis::Vertical) {
            side = RatioSide::Vertical;
            use_ratio = true;
            new_extent = Some((Axis::Vertical, (frame.width as f32 / w_over_h) as i32));
            if !is_match[0] {
                defaults[1] = MatchConstraintDefault::RatioResolved;
                use_ratio = false;
            }
        }
    }

    let widget = &mut graph[id];
    if let Some((axis, extent)) = new_extent {
        widget.set_extent(axis, extent);
    }
    let pass = &mut widget.pass;
    pass.resolved_default = defaults;
    pass.use_ratio = use_ratio;
    pass.ratio = w_over_h;
    pass.ratio_side = side;
}

// ============================================================================
// Emitter
// ============================================================================

/// Per-axis inputs of [`Emitter::apply_axis`]
#[derive(Debug, Clone, Copy)]
struct AxisFlags {
    dimension: i32,
    apply_position: bool,
    use_ratio: bool,
    in_chain: bool,
    opposite_in_chain: bool,
    opposite_variable: bool,
}

/// Emits the relations of one container into a solver
pub(crate) struct Emitter<'a, S: LinearSolver + ?Sized> {
    pub(super) graph: &'a LayoutGraph,
    pub(super) solver: &'a mut S,
    pub(super) scope: WidgetId,
    /// Scope axes currently solved as wrap content
    pub(super) wrap: [bool; 2],
    /// Restrict emission to these children
    members: Option<&'a HashSet<WidgetId>>,
    vars: HashMap<AnchorId, VarId>,
    pub(super) chains: Vec<(WidgetId, Axis)>,
}

impl<'a, S: LinearSolver + ?Sized> Emitter<'a, S> {
    pub(crate) fn new(
        graph: &'a LayoutGraph,
        solver: &'a mut S,
        scope: WidgetId,
        wrap: [bool; 2],
    ) -> Self {
        Self {
            graph,
            solver,
            scope,
            wrap,
            members: None,
            vars: HashMap::new(),
            chains: Vec::new(),
        }
    }

    pub(crate) fn with_members(mut self, members: &'a HashSet<WidgetId>) -> Self {
        self.members = Some(members);
        self
    }

    pub(crate) fn is_wrap(&self, axis: Axis) -> bool {
        self.wrap[axis.index()]
    }

    pub(crate) fn scope_begin(&mut self, axis: Axis) -> VarId {
        self.var(AnchorId::new(self.scope, AnchorType::begin(axis)))
    }

    pub(crate) fn scope_end(&mut self, axis: Axis) -> VarId {
        self.var(AnchorId::new(self.scope, AnchorType::end(axis)))
    }

    /// Variable of an anchor, created on first use
    pub(crate) fn var(&mut self, anchor: AnchorId) -> VarId {
        let key = canonical(self.graph, anchor);
        if let Some(var) = self.vars.get(&key) {
            return *var;
        }
        let var = self.solver.create_variable();
        self.vars.insert(key, var);

        if let Some((container, axis, offset)) = self.foreign_offset(key) {
            let base = self.var(AnchorId::new(container, AnchorType::begin(axis)));
            self.solver.add_equality(var, base, offset, Priority::Fixed);
        } else if let (Some(axis), true) = (key.kind.axis(), self.is_leaf_center(key)) {
            let begin = self.var(AnchorId::new(key.widget, AnchorType::begin(axis)));
            let end = self.var(AnchorId::new(key.widget, AnchorType::end(axis)));
            self.solver
                .add_centering(var, begin, 0, 0.5, end, var, 0, Priority::Fixed);
        }
        var
    }

    fn is_leaf_center(&self, anchor: AnchorId) -> bool {
        matches!(anchor.kind, AnchorType::CenterX | AnchorType::CenterY)
            && !self.graph[anchor.widget].kind.is_helper()
    }

    /// For an anchor inside a sibling container: that sibling, the axis and
    /// the anchor's resolved offset from the sibling's begin edge
    fn foreign_offset(&self, anchor: AnchorId) -> Option<(WidgetId, Axis, i32)> {
        let graph = self.graph;
        let owner = graph.widget(anchor.widget)?;
        if anchor.widget == self.scope || owner.parent == Some(self.scope) {
            return None;
        }
        let axis = anchor.kind.axis()?;
        let mut sibling = owner.parent?;
        while graph.widget(sibling)?.parent != Some(self.scope) {
            sibling = graph.widget(sibling)?.parent?;
        }
        let (dx, dy) = graph.offset_within(anchor.widget, sibling)?;
        let base = match axis {
            Axis::Horizontal => dx,
            Axis::Vertical => dy,
        };
        let frame = owner.frame;
        let within = match anchor.kind {
            AnchorType::Baseline => owner.baseline_distance,
            kind if kind == AnchorType::end(axis) => frame.extent(axis),
            kind if kind == AnchorType::center(axis) => frame.extent(axis) / 2,
            _ => 0,
        };
        Some((sibling, axis, base + frame.start(axis) + within))
    }

    /// Whether an anchor's value is known before solving
    pub(crate) fn is_final(&self, anchor: AnchorId) -> bool {
        let fixed = [!self.wrap[0], !self.wrap[1]];
        known_value(self.graph, self.scope, fixed, anchor).is_some()
    }

    /// Solved value of an anchor that received a variable
    pub(crate) fn value(&self, anchor: AnchorId) -> Option<i32> {
        let key = canonical(self.graph, anchor);
        self.vars.get(&key).map(|var| self.solver.value(*var))
    }

    pub(super) fn includes(&self, id: WidgetId) -> bool {
        self.members.map_or(true, |m| m.contains(&id))
    }

    // ------------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------------

    /// Emit the scope and every included child, then the chains they form
    pub(crate) fn emit(&mut self) -> SolvePassResult {
        self.emit_scope();

        let graph = self.graph;
        let children: Vec<WidgetId> = graph
            .children(self.scope)
            .iter()
            .copied()
            .filter(|c| self.includes(*c))
            .collect();

        // Lines and flows first so their variables exist before the widgets using them
        for &child in &children {
            match &graph[child].kind {
                WidgetKind::Guideline(g) => self.add_guideline(child, g),
                WidgetKind::Flow(_) => self.add_widget(child),
                _ => {}
            }
        }
        for &child in &children {
            if let WidgetKind::Barrier(b) = &graph[child].kind {
                self.add_barrier(child, b);
            }
        }
        for &child in &children {
            if matches!(graph[child].kind, WidgetKind::Leaf | WidgetKind::Container(_)) {
                self.add_widget(child);
            }
        }

        let mut result = SolvePassResult::default();
        let heads = std::mem::take(&mut self.chains);
        for (head, axis) in &heads {
            if let Some(chain) = super::chain::ChainHead::define(graph, *head, *axis) {
                result.dangling_chain |= chain.is_dangling(graph);
                self.add_chain(&chain);
                result.chains += 1;
            }
        }
        self.chains = heads;
        result
    }

    /// Pin the scope's begin edges to 0 and bound its end edges
    fn emit_scope(&mut self) {
        let scope = &self.graph[self.scope];
        for axis in Axis::BOTH {
            let begin = self.scope_begin(axis);
            let end = self.scope_end(axis);
            self.solver.add_constant(begin, 0);
            if self.is_wrap(axis) {
                self.solver.add_equality(end, begin, 0, Priority::High);
                let min = scope.min_size(axis);
                if min > 0 {
                    self.solver.add_greater_than(end, begin, min, Priority::Fixed);
                }
                let max = scope.max_size(axis);
                if max < i32::MAX {
                    self.solver.add_lower_than(end, begin, max, Priority::Fixed);
                }
            } else {
                self.solver.add_constant(end, scope.frame.extent(axis));
            }
        }
    }

    /// Relations of a regular widget: leaf, nested container or flow
    pub(crate) fn add_widget(&mut self, id: WidgetId) {
        let graph = self.graph;
        let w = &graph[id];
        let has_dependents = w.anchors.iter().any(|a| a.has_dependents());
        let in_barrier = w.pass.in_barrier.iter().any(|b| *b);
        if w.is_gone() && !has_dependents && !in_barrier {
            return;
        }

        let resolved = w.pass.resolved;
        for axis in Axis::BOTH {
            if !resolved[axis.index()] {
                continue;
            }
            let begin = self.var(w.anchor_id(AnchorType::begin(axis)));
            let end = self.var(w.anchor_id(AnchorType::end(axis)));
            let start = w.frame.start(axis);
            self.solver.add_constant(begin, start);
            self.solver.add_constant(end, start + w.length(axis));
            if axis == Axis::Vertical
                && w.has_baseline
                && w.anchor(AnchorType::Baseline).has_dependents()
            {
                let baseline = self.var(w.anchor_id(AnchorType::Baseline));
                self.solver.add_constant(baseline, start + w.baseline_distance);
            }
            if self.is_wrap(axis) {
                let parent_end = self.scope_end(axis);
                self.solver
                    .add_greater_than(parent_end, end, 0, Priority::Equality);
            }
        }
        if resolved[0] && resolved[1] {
            return;
        }

        let mut in_chain = [false; 2];
        for axis in Axis::BOTH {
            let i = axis.index();
            if resolved[i] {
                continue;
            }
            if graph.is_chain_head(id, axis) {
                self.chains.push((id, axis));
                in_chain[i] = true;
            } else {
                in_chain[i] = graph.is_in_chain(id, axis);
            }

            let unconnected = !w.begin(axis).is_connected()
                && !w.end(axis).is_connected()
                && (axis == Axis::Horizontal || !w.anchor(AnchorType::Baseline).is_connected());
            if !in_chain[i] && self.is_wrap(axis) && !w.is_gone() && unconnected {
                let parent_end = self.scope_end(axis);
                let end = self.var(w.anchor_id(AnchorType::end(axis)));
                self.solver.add_greater_than(parent_end, end, 0, Priority::Low);
            }
        }

        let use_ratio = w.pass.use_ratio;
        let side = w.pass.ratio_side;
        let use_axis_ratio = [
            use_ratio && matches!(side, RatioSide::Horizontal | RatioSide::Unknown),
            use_ratio && matches!(side, RatioSide::Vertical | RatioSide::Unknown),
        ];

        let mut apply_position = [true, true];
        if !resolved[1] && w.has_baseline {
            let baseline_anchor = w.anchor(AnchorType::Baseline);
            let baseline = self.var(baseline_anchor.id());
            let top = self.var(w.anchor_id(AnchorType::Top));
            if let Some(target) = baseline_anchor.target {
                self.solver
                    .add_equality(baseline, top, w.baseline_distance, Priority::Fixed);
                let target = self.var(target);
                let margin = graph.margin(baseline_anchor.id());
                self.solver
                    .add_equality(baseline, target, margin, Priority::Fixed);
                if self.is_wrap(Axis::Vertical) {
                    let parent_end = self.scope_end(Axis::Vertical);
                    let bottom = self.var(w.anchor_id(AnchorType::Bottom));
                    self.solver
                        .add_greater_than(parent_end, bottom, 0, Priority::Equality);
                }
                apply_position[1] = false;
            } else if w.is_gone() {
                self.solver
                    .add_equality(baseline, top, baseline_anchor.margin, Priority::Fixed);
            } else {
                self.solver
                    .add_equality(baseline, top, w.baseline_distance, Priority::Fixed);
            }
        }

        for axis in Axis::BOTH {
            let i = axis.index();
            if resolved[i] {
                continue;
            }
            if w.behavior(axis) == DimensionBehavior::MatchParent
                && !self.is_wrap(axis)
                && !w.is_gone()
            {
                self.pin_to_parent(w, axis);
                continue;
            }
            let other = axis.opposite().index();
            let flags = AxisFlags {
                dimension: w.frame.extent(axis).max(w.min_size[i]),
                apply_position: apply_position[i],
                use_ratio: use_axis_ratio[i],
                in_chain: in_chain[i],
                opposite_in_chain: in_chain[other],
                opposite_variable: w.is_match(axis.opposite()),
            };
            self.apply_axis(w, axis, flags);
        }

        if use_ratio && !resolved[0] && !resolved[1] {
            let left = self.var(w.anchor_id(AnchorType::Left));
            let right = self.var(w.anchor_id(AnchorType::Right));
            let top = self.var(w.anchor_id(AnchorType::Top));
            let bottom = self.var(w.anchor_id(AnchorType::Bottom));
            let ratio = w.pass.ratio;
            if side == RatioSide::Vertical {
                self.solver
                    .add_ratio(bottom, top, right, left, 1.0 / ratio, Priority::Fixed);
            } else {
                self.solver
                    .add_ratio(right, left, bottom, top, ratio, Priority::Fixed);
            }
        }
    }

    /// MATCH_PARENT inside a sized parent spans it, less the margins
    fn pin_to_parent(&mut self, w: &Widget, axis: Axis) {
        let begin_anchor = w.begin(axis);
        let end_anchor = w.end(axis);
        let begin = self.var(begin_anchor.id());
        let end = self.var(end_anchor.id());
        let span = self.graph[self.scope].frame.extent(axis);
        self.solver.add_constant(begin, begin_anchor.margin);
        self.solver.add_constant(end, span - end_anchor.margin);
    }

    /// Position and size relations of one axis of a widget
    fn apply_axis(&mut self, w: &Widget, axis: Axis, flags: AxisFlags) {
        use Priority::{Barrier, Equality, Fixed, Highest};

        let graph = self.graph;
        let i = axis.index();
        let begin_anchor = w.begin(axis);
        let end_anchor = w.end(axis);
        let begin = self.var(begin_anchor.id());
        let end = self.var(end_anchor.id());
        let parent_min = self.scope_begin(axis);
        let parent_max = self.scope_end(axis);
        let begin_target = begin_anchor.target.map(|t| (t, self.var(t)));
        let end_target = end_anchor.target.map(|t| (t, self.var(t)));
        let num_connections = begin_target.is_some() as u8 + end_target.is_some() as u8;

        let mut parent_wrap = self.is_wrap(axis);
        let opposite_parent_wrap = self.is_wrap(axis.opposite());
        let mc = w.match_constraint(axis);
        let mut default = w.pass.resolved_default[i];
        if flags.use_ratio {
            default = MatchConstraintDefault::Ratio;
        }
        let mut variable = w.is_match(axis) && default != MatchConstraintDefault::RatioResolved;
        let mut dimension = flags.dimension;
        if w.is_gone() {
            dimension = 0;
            variable = false;
        }
        let begin_margin = graph.margin(begin_anchor.id());
        let end_margin = graph.margin(end_anchor.id());

        if flags.apply_position {
            match (begin_target, end_target) {
                (None, None) => self.solver.add_constant(begin, w.frame.start(axis)),
                (Some((_, bt)), None) => self.solver.add_equality(begin, bt, begin_margin, Fixed),
                _ => {}
            }
        }

        if !variable {
            self.solver.add_equality(end, begin, dimension, Fixed);
        } else if num_connections != 2
            && !flags.use_ratio
            && matches!(default, MatchConstraintDefault::Wrap | MatchConstraintDefault::Spread)
        {
            variable = false;
            let mut d = dimension.max(mc.min);
            if mc.max > 0 {
                d = d.min(mc.max);
            }
            self.solver.add_equality(end, begin, d, Fixed);
        } else {
            if dimension > 0 && default != MatchConstraintDefault::Wrap {
                dimension = 0;
            }
            if mc.min > 0 {
                self.solver.add_greater_than(end, begin, mc.min, Fixed);
                dimension = dimension.max(mc.min);
            }
            if mc.max > 0 {
                if !(parent_wrap && default == MatchConstraintDefault::Wrap) {
                    self.solver.add_lower_than(end, begin, mc.max, Fixed);
                }
                dimension = dimension.min(mc.max);
            }
            match default {
                MatchConstraintDefault::Wrap => {
                    if parent_wrap {
                        self.solver.add_equality(end, begin, dimension, Fixed);
                    } else {
                        self.solver.add_equality(end, begin, dimension, Equality);
                        self.solver.add_lower_than(end, begin, dimension, Fixed);
                    }
                }
                MatchConstraintDefault::Percent => {
                    self.solver
                        .add_ratio(end, begin, parent_max, parent_min, mc.percent, Fixed);
                    if parent_wrap {
                        variable = false;
                    }
                }
                _ => {}
            }
        }

        if !flags.apply_position || flags.in_chain {
            if num_connections < 2 && parent_wrap {
                self.solver.add_greater_than(begin, parent_min, 0, Fixed);
                let mut apply_end = true;
                if axis == Axis::Vertical {
                    if let Some(target) = w.anchor(AnchorType::Baseline).target {
                        let target = &graph[target.widget];
                        apply_end = target.ratio.is_some()
                            && target.is_match(Axis::Horizontal)
                            && target.is_match(Axis::Vertical);
                    }
                }
                if apply_end {
                    self.solver.add_greater_than(parent_max, end, 0, Fixed);
                }
            }
            return;
        }

        let mut wrap_strength = Equality;
        match (begin_target, end_target) {
            (None, None) => {}
            (Some((bt_anchor, _)), None) => {
                if parent_wrap && graph[bt_anchor.widget].kind.is_barrier() {
                    wrap_strength = Fixed;
                }
            }
            (None, Some((_, et))) => {
                self.solver.add_equality(end, et, -end_margin, Fixed);
                if parent_wrap {
                    self.solver.add_greater_than(begin, parent_min, 0, Equality);
                }
            }
            (Some((bt_anchor, bt)), Some((et_anchor, et))) => {
                let begin_widget = bt_anchor.widget;
                let end_widget = et_anchor.widget;
                let parent = self.scope;
                let is_barrier = |id: WidgetId| graph[id].kind.is_barrier();
                let is_guideline = |id: WidgetId| graph[id].kind.is_guideline();
                let any_barrier = is_barrier(begin_widget) || is_barrier(end_widget);

                let mut bounds_check = true;
                let mut centering = false;
                let mut strong = false;
                let mut range = false;
                let mut range_strength = Equality;
                let mut bounds_strength = Highest;
                let mut centering_strength = Barrier;

                if variable {
                    match default {
                        MatchConstraintDefault::Spread | MatchConstraintDefault::Percent => {
                            if default == MatchConstraintDefault::Spread
                                && mc.min == 0
                                && mc.max == 0
                            {
                                strong = true;
                                range_strength = Fixed;
                                bounds_strength = Fixed;
                                if self.is_final(bt_anchor) && self.is_final(et_anchor) {
                                    self.solver.add_equality(begin, bt, begin_margin, Fixed);
                                    self.solver.add_equality(end, et, -end_margin, Fixed);
                                    return;
                                }
                            } else {
                                centering = true;
                                range = true;
                                strong = true;
                                range_strength = Equality;
                                bounds_strength = Equality;
                            }
                            if any_barrier {
                                bounds_strength = Highest;
                            }
                        }
                        MatchConstraintDefault::Wrap => {
                            centering = true;
                            range = true;
                            range_strength = Fixed;
                        }
                        MatchConstraintDefault::Ratio | MatchConstraintDefault::RatioResolved => {
                            centering = true;
                            range = true;
                            strong = true;
                            if w.pass.ratio_side == RatioSide::Unknown {
                                range_strength = Fixed;
                                bounds_strength = Equality;
                                centering_strength = if flags.opposite_in_chain {
                                    if parent_wrap { Equality } else { Highest }
                                } else {
                                    Fixed
                                };
                            } else if flags.use_ratio {
                                let opposite = w.pass.resolved_default[axis.opposite().index()];
                                let inverted = matches!(
                                    opposite,
                                    MatchConstraintDefault::Percent | MatchConstraintDefault::Wrap
                                );
                                if !inverted {
                                    range_strength = Fixed;
                                    bounds_strength = Equality;
                                }
                            } else {
                                range_strength = Equality;
                                if mc.max > 0 {
                                    bounds_strength = Equality;
                                } else if mc.min == 0 {
                                    if !flags.opposite_in_chain {
                                        bounds_strength = Fixed;
                                    } else {
                                        let inner = begin_widget != parent && end_widget != parent;
                                        range_strength = if inner { Highest } else { Equality };
                                        bounds_strength = Highest;
                                    }
                                }
                            }
                        }
                    }
                } else {
                    centering = true;
                    range = true;
                    if self.is_final(bt_anchor) && self.is_final(et_anchor) {
                        self.solver.add_centering(
                            begin,
                            bt,
                            begin_margin,
                            w.bias(axis),
                            et,
                            end,
                            end_margin,
                            Fixed,
                        );
                        if parent_wrap && et != parent_max {
                            self.solver
                                .add_greater_than(parent_max, end, end_margin, wrap_strength);
                        }
                        return;
                    }
                }

                if range && bt == et && begin_widget != parent {
                    range = false;
                    bounds_check = false;
                }

                if centering {
                    if !variable
                        && !flags.opposite_variable
                        && !flags.opposite_in_chain
                        && bt == parent_min
                        && et == parent_max
                    {
                        centering_strength = Fixed;
                        range_strength = Fixed;
                        bounds_check = false;
                        parent_wrap = false;
                    }
                    self.solver.add_centering(
                        begin,
                        bt,
                        begin_margin,
                        w.bias(axis),
                        et,
                        end,
                        end_margin,
                        centering_strength,
                    );
                }

                if w.is_gone() && !end_anchor.has_dependents() {
                    return;
                }

                if range {
                    if parent_wrap && bt != et && !variable && any_barrier {
                        range_strength = Barrier;
                    }
                    self.solver
                        .add_greater_than(begin, bt, begin_margin, range_strength);
                    self.solver
                        .add_lower_than(end, et, -end_margin, range_strength);
                }

                if parent_wrap && w.pass.in_barrier[i] && !any_barrier && end_widget != parent {
                    bounds_strength = Barrier;
                    range_strength = Barrier;
                    bounds_check = true;
                }

                if bounds_check {
                    if strong && (!flags.opposite_in_chain || opposite_parent_wrap) {
                        let mut strength = bounds_strength;
                        if begin_widget == parent || end_widget == parent {
                            strength = Barrier;
                        }
                        if is_guideline(begin_widget) || is_guideline(end_widget) {
                            strength = Equality;
                        }
                        if any_barrier {
                            strength = Equality;
                        }
                        if flags.opposite_in_chain {
                            strength = Equality;
                        }
                        bounds_strength = strength.max(bounds_strength);
                    }
                    if parent_wrap {
                        bounds_strength = range_strength.min(bounds_strength);
                        if flags.use_ratio
                            && !flags.opposite_in_chain
                            && (begin_widget == parent || end_widget == parent)
                        {
                            bounds_strength = Highest;
                        }
                    }
                    self.solver
                        .add_equality(begin, bt, begin_margin, bounds_strength);
                    self.solver
                        .add_equality(end, et, -end_margin, bounds_strength);
                }

                if parent_wrap {
                    if bt != parent_min {
                        self.solver
                            .add_greater_than(begin, parent_min, 0, wrap_strength);
                    }
                    if variable && w.min_size[i] == 0 && mc.min == 0 {
                        let strength = if default == MatchConstraintDefault::Ratio {
                            Fixed
                        } else {
                            wrap_strength
                        };
                        self.solver.add_greater_than(end, begin, 0, strength);
                    }
                }
            }
        }

        if parent_wrap {
            let margin = if end_anchor.is_connected() { end_margin } else { 0 };
            if end_target.map(|(_, v)| v) != Some(parent_max) {
                self.solver
                    .add_greater_than(parent_max, end, margin, wrap_strength);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Read-back
    // ------------------------------------------------------------------------

    /// Solve the emitted system
    pub(crate) fn minimize(&mut self) {
        self.solver.minimize();
    }

    /// Solved extents of the scope, `None` on axes that were not solved as wrap
    pub(crate) fn scope_extents(&self) -> [Option<i32>; 2] {
        Axis::BOTH.map(|axis| {
            if !self.is_wrap(axis) {
                return None;
            }
            let begin = self.value(AnchorId::new(self.scope, AnchorType::begin(axis)))?;
            let end = self.value(AnchorId::new(self.scope, AnchorType::end(axis)))?;
            Some(end - begin)
        })
    }

    /// Solved rectangles of the included children
    pub(crate) fn frames(&self, scope_extent: [i32; 2]) -> Vec<(WidgetId, Rect)> {
        let graph = self.graph;
        graph
            .children(self.scope)
            .iter()
            .copied()
            .filter(|c| self.includes(*c))
            .filter_map(|id| {
                let w = &graph[id];
                let line_axis = match &w.kind {
                    WidgetKind::Guideline(g) => Some(g.axis()),
                    WidgetKind::Barrier(b) => Some(b.side().axis()),
                    _ => None,
                };
                if let Some(axis) = line_axis {
                    let position = self
                        .value(w.anchor_id(AnchorType::begin(axis)))
                        .unwrap_or_else(|| w.frame.start(axis));
                    let span = scope_extent[axis.opposite().index()];
                    let rect = match axis {
                        Axis::Horizontal => Rect::new(position, 0, 0, span),
                        Axis::Vertical => Rect::new(0, position, span, 0),
                    };
                    return Some((id, rect));
                }

                let edge = |kind: AnchorType, fallback: i32| {
                    self.value(w.anchor_id(kind)).unwrap_or(fallback)
                };
                let frame = w.frame;
                let length = |axis: Axis| if w.is_gone() { 0 } else { frame.extent(axis) };
                let left = edge(AnchorType::Left, frame.x);
                let top = edge(AnchorType::Top, frame.y);
                let right = edge(AnchorType::Right, left + length(Axis::Horizontal));
                let bottom = edge(AnchorType::Bottom, top + length(Axis::Vertical));
                Some((id, Rect::from_edges(left, top, right, bottom)))
            })
            .collect()
    }
}

/// Store a solved rectangle, applying the widget's own size rules.
///
/// Gone widgets collapse to zero size. A fixed extent never shrinks below its
/// authored size, extents never drop below the minimum size and match
/// constraint extents honor their maximum.
pub(crate) fn apply_frame(widget: &mut Widget, rect: Rect) {
    let mut rect = rect;
    if widget.is_gone() {
        rect.width = 0;
        rect.height = 0;
    } else if !widget.kind.is_helper() {
        for axis in Axis::BOTH {
            let i = axis.index();
            let mut size = rect.extent(axis);
            if widget.behavior(axis) == DimensionBehavior::Fixed {
                size = size.max(widget.frame.extent(axis));
            }
            size = size.max(widget.min_size[i]);
            let max = widget.match_constraint[i].max;
            if widget.is_match(axis) && max > 0 {
                size = size.min(max);
            }
            match axis {
                Axis::Horizontal => rect.width = size,
                Axis::Vertical => rect.height = size,
            }
        }
    }
    widget.frame = rect;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::solver::CassowarySolver;
    use crate::model::Guideline;

    fn graph_with_child() -> (LayoutGraph, WidgetId, WidgetId) {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        graph[root].set_size(300, 200);
        let child = graph.add_leaf(root).unwrap();
        (graph, root, child)
    }

    fn solve(graph: &mut LayoutGraph, root: WidgetId) -> Vec<(WidgetId, Rect)> {
        let children: Vec<WidgetId> = graph.children(root).to_vec();
        for child in children {
            resolve_ratio(graph, child);
        }
        let graph = &*graph;
        let mut solver = CassowarySolver::new();
        let mut emitter = Emitter::new(graph, &mut solver, root, [false, false]);
        emitter.emit();
        emitter.minimize();
        let extent = [graph[root].width(), graph[root].height()];
        emitter.frames(extent)
    }

    #[test]
    fn test_canonical_guideline_anchor() {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        let guide = graph.add_guideline(root, Guideline::vertical()).unwrap();
        let right = AnchorId::new(guide, AnchorType::Right);
        assert_eq!(canonical(&graph, right), AnchorId::new(guide, AnchorType::Left));
        let top = AnchorId::new(guide, AnchorType::Top);
        assert_eq!(canonical(&graph, top), top);
    }

    #[test]
    fn test_known_value_of_scope() {
        let (graph, root, _) = graph_with_child();
        let right = AnchorId::new(root, AnchorType::Right);
        assert_eq!(known_value(&graph, root, [true, true], right), Some(300));
        assert_eq!(known_value(&graph, root, [false, true], right), None);
        let top = AnchorId::new(root, AnchorType::Top);
        assert_eq!(known_value(&graph, root, [false, false], top), Some(0));
    }

    #[test]
    fn test_centered_fixed_child() {
        let (mut graph, root, child) = graph_with_child();
        graph[child].set_size(100, 50);
        graph[child].set_bias(Axis::Horizontal, 0.25);
        assert!(graph.connect_widgets(child, AnchorType::Left, root, AnchorType::Left, 0));
        assert!(graph.connect_widgets(child, AnchorType::Right, root, AnchorType::Right, 0));
        assert!(graph.connect_widgets(child, AnchorType::Top, root, AnchorType::Top, 10));

        let frames = solve(&mut graph, root);
        assert_eq!(frames, vec![(child, Rect::new(50, 10, 100, 50))]);
    }

    #[test]
    fn test_spread_child_fills_margins() {
        let (mut graph, root, child) = graph_with_child();
        graph[child]
            .set_size(0, 20)
            .set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint);
        assert!(graph.connect_widgets(child, AnchorType::Left, root, AnchorType::Left, 20));
        assert!(graph.connect_widgets(child, AnchorType::Right, root, AnchorType::Right, 30));

        let frames = solve(&mut graph, root);
        assert_eq!(frames[0].1, Rect::new(20, 0, 250, 20));
    }

    #[test]
    fn test_percent_width() {
        let (mut graph, root, child) = graph_with_child();
        graph[child]
            .set_size(0, 20)
            .set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint)
            .set_match_percent(Axis::Horizontal, 0.5);
        assert!(graph.connect_widgets(child, AnchorType::Left, root, AnchorType::Left, 0));
        assert!(graph.connect_widgets(child, AnchorType::Right, root, AnchorType::Right, 0));

        let frames = solve(&mut graph, root);
        assert_eq!(frames[0].1.width, 150);
        assert_eq!(frames[0].1.x, 75);
    }

    #[test]
    fn test_resolve_ratio_single_axis() {
        let (mut graph, _, child) = graph_with_child();
        graph[child]
            .set_size(0, 90)
            .set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint)
            .set_dimension_ratio("2:1");
        resolve_ratio(&mut graph, child);
        assert_eq!(graph[child].width(), 180);
        assert_eq!(
            graph[child].pass.resolved_default[0],
            MatchConstraintDefault::RatioResolved
        );
        assert!(!graph[child].pass.use_ratio);
    }

    #[test]
    fn test_resolve_ratio_both_axes_picks_connected_side() {
        let (mut graph, root, child) = graph_with_child();
        graph[child].set_behaviors(
            DimensionBehavior::MatchConstraint,
            DimensionBehavior::MatchConstraint,
        );
        graph[child].set_dimension_ratio("2:1");
        assert!(graph.connect_widgets(child, AnchorType::Left, root, AnchorType::Left, 0));
        assert!(graph.connect_widgets(child, AnchorType::Right, root, AnchorType::Right, 0));
        assert!(graph.connect_widgets(child, AnchorType::Top, root, AnchorType::Top, 0));
        resolve_ratio(&mut graph, child);
        assert!(graph[child].pass.use_ratio);
        assert_eq!(graph[child].pass.ratio_side, RatioSide::Vertical);

        let frames = solve(&mut graph, root);
        assert_eq!(frames[0].1, Rect::new(0, 0, 300, 150));
    }

    #[test]
    fn test_apply_frame_rules() {
        let (mut graph, _, child) = graph_with_child();
        graph[child].set_size(40, 40);
        apply_frame(&mut graph[child], Rect::new(5, 5, 10, 60));
        assert_eq!(graph[child].frame(), Rect::new(5, 5, 40, 60));

        graph[child].set_visibility(crate::model::Visibility::Gone);
        apply_frame(&mut graph[child], Rect::new(5, 5, 10, 60));
        assert_eq!(graph[child].frame(), Rect::new(5, 5, 0, 0));
    }
}
