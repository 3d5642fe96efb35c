//! The widget arena and its connection rules
//!
//! [`LayoutGraph`] owns every widget and anchor. Widgets are addressed by
//! [`WidgetId`], anchors by [`AnchorId`], and connectivity is only changed
//! through the methods here so that dependent sets stay symmetric.

use std::collections::HashSet;
use std::ops::{Index, IndexMut};

use crate::error::ConnectError;
use crate::layout::{Axis, LayoutConfig, LayoutError, Rect};

use super::anchor::{types_compatible, Anchor, AnchorId, AnchorType};
use super::helpers::{Barrier, Flow, Guideline};
use super::widget::{Widget, WidgetId, WidgetKind};

/// Arena of widgets forming one or more container trees
#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    widgets: Vec<Widget>,
    config: LayoutConfig,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            widgets: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        id.0 < self.widgets.len()
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.0)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id.0)
    }

    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.widget(id.widget).map(|w| w.anchor(id.kind))
    }

    fn anchor_mut(&mut self, id: AnchorId) -> &mut Anchor {
        self.widgets[id.widget.0].anchor_mut(id.kind)
    }

    /// Children of a container, empty for other widgets
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        match self.widget(id).map(|w| &w.kind) {
            Some(WidgetKind::Container(state)) => state.children(),
            _ => &[],
        }
    }

    // ========================================================================
    // Tree construction
    // ========================================================================

    /// Add a top-level container
    pub fn add_root(&mut self) -> WidgetId {
        let id = WidgetId(self.widgets.len());
        self.widgets.push(Widget::new(id, WidgetKind::container()));
        id
    }

    /// Add a widget of any kind under `parent`
    pub fn add_widget(
        &mut self,
        parent: WidgetId,
        kind: WidgetKind,
    ) -> Result<WidgetId, LayoutError> {
        self.container_children_mut(parent)?;
        let id = WidgetId(self.widgets.len());
        let mut widget = Widget::new(id, kind);
        widget.parent = Some(parent);
        self.widgets.push(widget);
        self.container_children_mut(parent)?.push(id);
        Ok(id)
    }

    pub fn add_leaf(&mut self, parent: WidgetId) -> Result<WidgetId, LayoutError> {
        self.add_widget(parent, WidgetKind::Leaf)
    }

    pub fn add_container(&mut self, parent: WidgetId) -> Result<WidgetId, LayoutError> {
        self.add_widget(parent, WidgetKind::container())
    }

    pub fn add_guideline(
        &mut self,
        parent: WidgetId,
        guideline: Guideline,
    ) -> Result<WidgetId, LayoutError> {
        self.add_widget(parent, WidgetKind::Guideline(guideline))
    }

    pub fn add_barrier(
        &mut self,
        parent: WidgetId,
        barrier: Barrier,
    ) -> Result<WidgetId, LayoutError> {
        self.add_widget(parent, WidgetKind::Barrier(barrier))
    }

    pub fn add_flow(&mut self, parent: WidgetId, flow: Flow) -> Result<WidgetId, LayoutError> {
        self.add_widget(parent, WidgetKind::Flow(flow))
    }

    /// Move an existing widget under `parent`
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), LayoutError> {
        if !self.contains(child) {
            return Err(LayoutError::UnknownWidget(child));
        }
        self.container_children_mut(parent)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(LayoutError::WouldNest { parent, child });
        }
        if let Some(old) = self.widgets[child.0].parent {
            self.remove_child(old, child)?;
        }
        self.widgets[child.0].parent = Some(parent);
        self.container_children_mut(parent)?.push(child);
        Ok(())
    }

    /// Detach `child` from `parent`, dropping every connection to or from it
    pub fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), LayoutError> {
        if !self.contains(child) {
            return Err(LayoutError::UnknownWidget(child));
        }
        let children = self.container_children_mut(parent)?;
        let Some(pos) = children.iter().position(|c| *c == child) else {
            return Ok(());
        };
        children.remove(pos);

        for kind in AnchorType::ALL {
            let id = AnchorId::new(child, kind);
            self.detach(id);
            let dependents: Vec<AnchorId> = self
                .anchor(id)
                .and_then(|a| a.dependents())
                .map(|d| d.iter().copied().collect())
                .unwrap_or_default();
            for dependent in dependents {
                self.detach(dependent);
            }
        }
        self.widgets[child.0].parent = None;
        Ok(())
    }

    /// Mutable guideline parameters of a widget
    pub fn guideline_mut(&mut self, id: WidgetId) -> Option<&mut Guideline> {
        match self.widget_mut(id).map(|w| &mut w.kind) {
            Some(WidgetKind::Guideline(g)) => Some(g),
            _ => None,
        }
    }

    /// Mutable barrier parameters of a widget
    pub fn barrier_mut(&mut self, id: WidgetId) -> Option<&mut Barrier> {
        match self.widget_mut(id).map(|w| &mut w.kind) {
            Some(WidgetKind::Barrier(b)) => Some(b),
            _ => None,
        }
    }

    /// Mutable flow parameters of a widget
    pub fn flow_mut(&mut self, id: WidgetId) -> Option<&mut Flow> {
        match self.widget_mut(id).map(|w| &mut w.kind) {
            Some(WidgetKind::Flow(f)) => Some(f),
            _ => None,
        }
    }

    fn container_children_mut(&mut self, id: WidgetId) -> Result<&mut Vec<WidgetId>, LayoutError> {
        match self.widgets.get_mut(id.0).map(|w| &mut w.kind) {
            Some(WidgetKind::Container(state)) => Ok(&mut state.children),
            Some(_) => Err(LayoutError::not_a_container(id)),
            None => Err(LayoutError::UnknownWidget(id)),
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(w) = current {
            if w == ancestor {
                return true;
            }
            current = self.widget(w).and_then(|w| w.parent);
        }
        false
    }

    // ========================================================================
    // Anchor connections
    // ========================================================================

    /// Connect `source` to `target`, validating type compatibility, cycles and reachability.
    ///
    /// Any previous connection of `source` is dropped first.
    pub fn try_connect(
        &mut self,
        source: AnchorId,
        target: AnchorId,
        margin: i32,
        gone_margin: Option<i32>,
    ) -> Result<(), ConnectError> {
        if let Err(e) = self.validate(source, target) {
            tracing::trace!(%source, %target, reason = %e, "connection rejected");
            return Err(e);
        }
        self.attach(source, target, margin, gone_margin);
        Ok(())
    }

    /// Connect `source` to `target`, returning false and changing nothing when invalid
    pub fn connect(&mut self, source: AnchorId, target: AnchorId, margin: i32) -> bool {
        self.try_connect(source, target, margin, None).is_ok()
    }

    /// Connect without validation. Only the widgets have to exist.
    pub fn force_connect(
        &mut self,
        source: AnchorId,
        target: AnchorId,
        margin: i32,
        gone_margin: Option<i32>,
    ) -> bool {
        if !self.contains(source.widget) || !self.contains(target.widget) {
            return false;
        }
        self.attach(source, target, margin, gone_margin);
        true
    }

    /// Set the margin used when the target's owner is gone
    pub fn set_gone_margin(&mut self, anchor: AnchorId, gone_margin: Option<i32>) {
        if self.contains(anchor.widget) {
            self.anchor_mut(anchor).gone_margin = gone_margin;
        }
    }

    fn validate(&self, source: AnchorId, target: AnchorId) -> Result<(), ConnectError> {
        let from = self
            .widget(source.widget)
            .ok_or(ConnectError::UnknownWidget(source.widget))?;
        let to = self
            .widget(target.widget)
            .ok_or(ConnectError::UnknownWidget(target.widget))?;

        let both_have_baseline = from.has_baseline && to.has_baseline;
        if !types_compatible(source.kind, target.kind, to.kind.is_guideline(), both_have_baseline) {
            return Err(ConnectError::incompatible(source.kind, target.kind));
        }
        if !self.is_reachable(source.widget, target.widget) {
            return Err(ConnectError::unreachable(source, target));
        }
        if self.would_cycle(source, target) {
            return Err(ConnectError::cycle(source, target));
        }
        Ok(())
    }

    /// Targets must be the parent, a sibling, or inside a sibling
    fn is_reachable(&self, owner: WidgetId, target: WidgetId) -> bool {
        let Some(parent) = self.widget(owner).and_then(|w| w.parent) else {
            return false;
        };
        if target == parent {
            return true;
        }
        let mut current = self.widget(target).and_then(|w| w.parent);
        while let Some(w) = current {
            if w == owner {
                return false;
            }
            if w == parent {
                return true;
            }
            current = self.widget(w).and_then(|w| w.parent);
        }
        false
    }

    /// Walk same-axis connections from the target's owner looking for the source's owner.
    ///
    /// The reverse half of a bidirectional pair is allowed, since that is how
    /// chains are built. The walk keeps an explicit stack and visited set.
    pub(crate) fn would_cycle(&self, source: AnchorId, target: AnchorId) -> bool {
        let owner = source.widget;
        if target.widget == owner {
            return true;
        }
        if self.anchor(target).and_then(|a| a.target) == Some(source) {
            return false;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![target.widget];
        while let Some(current) = stack.pop() {
            if current == owner {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            let Some(widget) = self.widget(current) else {
                continue;
            };
            for anchor in &widget.anchors {
                if !anchor.kind().is_similar_dimension(source.kind) {
                    continue;
                }
                if let Some(next) = anchor.target {
                    if !visited.contains(&next.widget) {
                        stack.push(next.widget);
                    }
                }
            }
        }
        false
    }

    fn attach(
        &mut self,
        source: AnchorId,
        target: AnchorId,
        margin: i32,
        gone_margin: Option<i32>,
    ) {
        self.detach(source);
        let anchor = self.anchor_mut(source);
        anchor.target = Some(target);
        anchor.margin = margin;
        anchor.gone_margin = gone_margin;
        self.anchor_mut(target).add_dependent(source);
    }

    /// Drop the outgoing connection of an anchor and deregister it from its target
    fn detach(&mut self, id: AnchorId) {
        if !self.contains(id.widget) {
            return;
        }
        if let Some(old) = self.anchor_mut(id).target {
            if self.contains(old.widget) {
                self.anchor_mut(old).remove_dependent(id);
            }
        }
        self.anchor_mut(id).clear();
    }

    fn is_connected(&self, id: AnchorId) -> bool {
        self.anchor(id).is_some_and(|a| a.is_connected())
    }

    fn target_of(&self, id: AnchorId) -> Option<AnchorId> {
        self.anchor(id).and_then(|a| a.target)
    }

    /// Connect two widgets by anchor type, expanding the centre anchors.
    ///
    /// CENTER fans out to both sides of each free axis. Connecting a side or
    /// the baseline drops the connections it conflicts with.
    pub fn connect_widgets(
        &mut self,
        from: WidgetId,
        from_type: AnchorType,
        to: WidgetId,
        to_type: AnchorType,
        margin: i32,
    ) -> bool {
        use AnchorType::*;
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        let a = |kind| AnchorId::new(from, kind);
        let b = |kind| AnchorId::new(to, kind);

        match (from_type, to_type) {
            (Center, Center) => {
                let free = |g: &Self, x, y| !g.is_connected(a(x)) && !g.is_connected(a(y));
                let mut centered_x = false;
                let mut centered_y = false;
                if free(self, Left, Right) {
                    centered_x = self.connect_widgets(from, Left, to, Left, 0)
                        & self.connect_widgets(from, Right, to, Right, 0);
                }
                if free(self, Top, Bottom) {
                    centered_y = self.connect_widgets(from, Top, to, Top, 0)
                        & self.connect_widgets(from, Bottom, to, Bottom, 0);
                }
                if centered_x && centered_y {
                    self.attach(a(Center), b(Center), 0, None);
                } else if centered_x {
                    self.attach(a(CenterX), b(CenterX), 0, None);
                } else if centered_y {
                    self.attach(a(CenterY), b(CenterY), 0, None);
                }
                centered_x || centered_y
            }
            (Center, Left | Right) | (Center, Top | Bottom) => {
                let (begin, end) = if to_type.axis() == Some(Axis::Horizontal) {
                    (Left, Right)
                } else {
                    (Top, Bottom)
                };
                let ok = self.connect_widgets(from, begin, to, to_type, 0)
                    & self.connect_widgets(from, end, to, to_type, 0);
                if ok {
                    self.attach(a(Center), b(to_type), 0, None);
                }
                ok
            }
            (CenterX, Left | Right) | (CenterY, Top | Bottom) => {
                let axis = to_type.axis().unwrap_or(Axis::Horizontal);
                let ok = self.connect_widgets(from, AnchorType::begin(axis), to, to_type, 0)
                    & self.connect_widgets(from, AnchorType::end(axis), to, to_type, 0);
                if ok {
                    self.attach(a(from_type), b(to_type), 0, None);
                }
                ok
            }
            (CenterX, CenterX) | (CenterY, CenterY) => {
                let axis = from_type.axis().unwrap_or(Axis::Horizontal);
                let (begin, end) = (AnchorType::begin(axis), AnchorType::end(axis));
                let ok = self.connect_widgets(from, begin, to, begin, 0)
                    & self.connect_widgets(from, end, to, end, 0);
                if ok {
                    self.attach(a(from_type), b(to_type), 0, None);
                }
                ok
            }
            _ => {
                let source = a(from_type);
                let target = b(to_type);
                if let Err(e) = self.validate(source, target) {
                    tracing::trace!(%source, %target, reason = %e, "connection rejected");
                    return false;
                }
                match from_type {
                    Baseline => {
                        self.detach(a(Top));
                        self.detach(a(Bottom));
                    }
                    Top | Bottom | Left | Right => {
                        let axis = from_type.axis().unwrap_or(Axis::Horizontal);
                        if axis == Axis::Vertical {
                            self.detach(a(Baseline));
                        }
                        if self.target_of(a(Center)) != Some(target) {
                            self.detach(a(Center));
                        }
                        let center = AnchorType::center(axis);
                        if self.is_connected(a(center)) {
                            self.detach(a(from_type.opposite()));
                            self.detach(a(center));
                        }
                    }
                    _ => {}
                }
                self.attach(source, target, margin, None);
                true
            }
        }
    }

    /// Reset one anchor of a widget, undoing the centring it took part in
    pub fn reset_anchor(&mut self, id: AnchorId) {
        use AnchorType::*;
        let Some(widget) = self.widget(id.widget) else {
            return;
        };
        let w = id.widget;
        let a = |kind| AnchorId::new(w, kind);
        let same_target = |x: AnchorType, y: AnchorType| {
            let (tx, ty) = (widget.anchor(x).target, widget.anchor(y).target);
            tx.is_some() && tx == ty
        };
        let same_owner = |x: AnchorType, y: AnchorType| {
            match (widget.anchor(x).target, widget.anchor(y).target) {
                (Some(tx), Some(ty)) => tx.widget == ty.widget,
                _ => false,
            }
        };

        let mut detach = Vec::new();
        let mut reset_bias = [false, false];
        match id.kind {
            Center => {
                if same_target(Left, Right) {
                    detach.extend([Left, Right]);
                }
                if same_target(Top, Bottom) {
                    detach.extend([Top, Bottom]);
                }
                detach.extend([CenterX, CenterY]);
                reset_bias = [true, true];
            }
            CenterX | CenterY => {
                let axis = id.kind.axis().unwrap_or(Axis::Horizontal);
                let (begin, end) = (AnchorType::begin(axis), AnchorType::end(axis));
                if same_owner(begin, end) {
                    detach.extend([begin, end]);
                }
                reset_bias[axis.index()] = true;
            }
            Left | Right | Top | Bottom => {
                let axis = id.kind.axis().unwrap_or(Axis::Horizontal);
                let (begin, end) = (AnchorType::begin(axis), AnchorType::end(axis));
                if same_target(begin, end) {
                    detach.push(Center);
                    reset_bias[axis.index()] = true;
                }
                let center = AnchorType::center(axis);
                if widget.anchor(center).is_connected() {
                    detach.push(center);
                    reset_bias[axis.index()] = true;
                }
            }
            Baseline => {}
        }

        for kind in detach {
            self.detach(a(kind));
        }
        self.detach(id);
        for axis in Axis::BOTH {
            if reset_bias[axis.index()] {
                self.widgets[w.0].bias[axis.index()] = 0.5;
            }
        }
    }

    /// Clear every anchor and attribute of a widget, keeping it in the tree
    pub fn reset_widget(&mut self, id: WidgetId) {
        if !self.contains(id) {
            return;
        }
        for kind in AnchorType::ALL {
            self.detach(AnchorId::new(id, kind));
        }
        self.widgets[id.0].reset_attributes();
    }

    /// Drop every outgoing connection of a widget, keeping its attributes
    pub(crate) fn detach_all(&mut self, id: WidgetId) {
        if !self.contains(id) {
            return;
        }
        for kind in AnchorType::ALL {
            self.detach(AnchorId::new(id, kind));
        }
    }

    /// Effective margin of an anchor.
    ///
    /// 0 when the owner is gone, the gone margin when one is set and the
    /// target's owner is gone, the authored margin otherwise.
    pub fn margin(&self, id: AnchorId) -> i32 {
        let Some(widget) = self.widget(id.widget) else {
            return 0;
        };
        if widget.is_gone() {
            return 0;
        }
        let anchor = widget.anchor(id.kind);
        if let (Some(gone_margin), Some(target)) = (anchor.gone_margin, anchor.target) {
            if self.widget(target.widget).is_some_and(|t| t.is_gone()) {
                return gone_margin;
            }
        }
        anchor.margin
    }

    // ========================================================================
    // Chain topology
    // ========================================================================

    /// Whether the begin or end anchor of an axis forms a bidirectional pair
    pub fn is_in_chain(&self, id: WidgetId, axis: Axis) -> bool {
        let paired = |kind| {
            let anchor = AnchorId::new(id, kind);
            self.target_of(anchor)
                .and_then(|t| self.target_of(t))
                .is_some_and(|back| back == anchor)
        };
        paired(AnchorType::begin(axis)) || paired(AnchorType::end(axis))
    }

    /// A chain head's begin anchor is not paired while its end anchor is
    pub fn is_chain_head(&self, id: WidgetId, axis: Axis) -> bool {
        let begin = AnchorId::new(id, AnchorType::begin(axis));
        let end = AnchorId::new(id, AnchorType::end(axis));
        let begin_paired = match self.target_of(begin) {
            Some(t) => self.target_of(t) == Some(begin),
            None => return false,
        };
        let end_paired = match self.target_of(end) {
            Some(t) => self.target_of(t) == Some(end),
            None => return false,
        };
        !begin_paired && end_paired
    }

    /// Next chain member: the owner of the end target when its begin points back
    pub fn next_in_chain(&self, id: WidgetId, axis: Axis) -> Option<WidgetId> {
        let end_target = self.target_of(AnchorId::new(id, AnchorType::end(axis)))?;
        let next = end_target.widget;
        let back = self.target_of(AnchorId::new(next, AnchorType::begin(axis)))?;
        (back.widget == id).then_some(next)
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Rectangle in the coordinates of the outermost container
    pub fn absolute_rect(&self, id: WidgetId) -> Option<Rect> {
        let widget = self.widget(id)?;
        let mut rect = widget.frame;
        let mut current = widget.parent;
        while let Some(p) = current {
            let parent = self.widget(p)?;
            if parent.parent.is_some() {
                rect = rect.offset(parent.frame.x, parent.frame.y);
            }
            current = parent.parent;
        }
        Some(rect)
    }

    /// Offset of `id`'s frame inside `ancestor`, if it is a descendant
    pub(crate) fn offset_within(&self, id: WidgetId, ancestor: WidgetId) -> Option<(i32, i32)> {
        let mut dx = 0;
        let mut dy = 0;
        let mut current = id;
        while current != ancestor {
            let widget = self.widget(current)?;
            let parent = widget.parent?;
            if parent != ancestor {
                let p = self.widget(parent)?;
                dx += p.frame.x;
                dy += p.frame.y;
            }
            current = parent;
        }
        Some((dx, dy))
    }
}

impl Index<WidgetId> for LayoutGraph {
    type Output = Widget;

    fn index(&self, id: WidgetId) -> &Widget {
        &self.widgets[id.0]
    }
}

impl IndexMut<WidgetId> for LayoutGraph {
    fn index_mut(&mut self, id: WidgetId) -> &mut Widget {
        &mut self.widgets[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AnchorType::*;

    fn setup() -> (LayoutGraph, WidgetId, WidgetId, WidgetId) {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        let a = graph.add_leaf(root).unwrap();
        let b = graph.add_leaf(root).unwrap();
        (graph, root, a, b)
    }

    fn id(w: WidgetId, kind: AnchorType) -> AnchorId {
        AnchorId::new(w, kind)
    }

    #[test]
    fn test_connect_registers_dependent() {
        let (mut graph, root, a, _) = setup();
        assert!(graph.connect(id(a, Left), id(root, Left), 8));
        let target = graph.anchor(id(root, Left)).unwrap();
        assert!(target.dependents().unwrap().contains(&id(a, Left)));
        assert_eq!(graph.margin(id(a, Left)), 8);
    }

    #[test]
    fn test_reconnect_moves_dependent() {
        let (mut graph, root, a, b) = setup();
        assert!(graph.connect(id(a, Left), id(root, Left), 0));
        assert!(graph.connect(id(a, Left), id(b, Right), 0));
        assert!(graph.anchor(id(root, Left)).unwrap().dependents().is_none());
        assert!(graph.anchor(id(b, Right)).unwrap().has_dependents());
    }

    #[test]
    fn test_rejects_incompatible_types() {
        let (mut graph, _, a, b) = setup();
        let err = graph.try_connect(id(a, Left), id(b, Top), 0, None).unwrap_err();
        assert_eq!(err, ConnectError::incompatible(Left, Top));
        assert!(!graph.anchor(id(a, Left)).unwrap().is_connected());
    }

    #[test]
    fn test_binary_pair_allowed() {
        let (mut graph, _, a, b) = setup();
        assert!(graph.connect(id(a, Right), id(b, Left), 0));
        assert!(graph.connect(id(b, Left), id(a, Right), 0));
        assert!(graph.is_in_chain(a, Axis::Horizontal));
    }

    #[test]
    fn test_cycle_through_third_widget_rejected() {
        let (mut graph, root, a, b) = setup();
        let c = graph.add_leaf(root).unwrap();
        assert!(graph.connect(id(b, Left), id(a, Right), 0));
        assert!(graph.connect(id(c, Left), id(b, Right), 0));
        let err = graph.try_connect(id(a, Left), id(c, Right), 0, None).unwrap_err();
        assert!(matches!(err, ConnectError::WouldCycle { .. }));
        // other axis is independent
        assert!(graph.connect(id(a, Top), id(c, Bottom), 0));
    }

    #[test]
    fn test_unrelated_widget_unreachable() {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        let inner = graph.add_container(root).unwrap();
        let nested = graph.add_leaf(inner).unwrap();
        let a = graph.add_leaf(root).unwrap();
        let other_root = graph.add_root();
        let stranger = graph.add_leaf(other_root).unwrap();

        // into a sibling's subtree is fine
        assert!(graph.connect(id(a, Left), id(nested, Right), 0));
        // a nested widget cannot reach out to its parent's siblings
        assert!(!graph.connect(id(nested, Left), id(a, Right), 0));
        assert!(!graph.connect(id(a, Top), id(stranger, Top), 0));
        // a root has no parent to connect within
        assert!(!graph.connect(id(root, Left), id(a, Left), 0));
    }

    #[test]
    fn test_center_fan_out() {
        let (mut graph, root, a, _) = setup();
        assert!(graph.connect_widgets(a, Center, root, Center, 0));
        for kind in [Left, Right, Top, Bottom] {
            assert_eq!(graph.anchor(id(a, kind)).unwrap().target(), Some(id(root, kind)));
        }
        assert_eq!(graph.anchor(id(a, Center)).unwrap().target(), Some(id(root, Center)));
    }

    #[test]
    fn test_center_x_fan_out_only_horizontal() {
        let (mut graph, root, a, _) = setup();
        assert!(graph.connect_widgets(a, Top, root, Top, 4));
        assert!(graph.connect_widgets(a, Center, root, Center, 0));
        assert_eq!(graph.anchor(id(a, Left)).unwrap().target(), Some(id(root, Left)));
        assert_eq!(graph.anchor(id(a, CenterX)).unwrap().target(), Some(id(root, CenterX)));
        assert!(!graph.anchor(id(a, Bottom)).unwrap().is_connected());
        assert_eq!(graph.margin(id(a, Top)), 4);
    }

    #[test]
    fn test_baseline_resets_vertical_sides() {
        let (mut graph, root, a, b) = setup();
        graph[a].set_baseline_distance(10);
        graph[b].set_baseline_distance(12);
        assert!(graph.connect_widgets(a, Top, root, Top, 0));
        assert!(graph.connect_widgets(a, Baseline, b, Baseline, 0));
        assert!(!graph.anchor(id(a, Top)).unwrap().is_connected());

        assert!(graph.connect_widgets(a, Bottom, root, Bottom, 0));
        assert!(!graph.anchor(id(a, Baseline)).unwrap().is_connected());
    }

    #[test]
    fn test_side_connect_breaks_center_x() {
        let (mut graph, root, a, b) = setup();
        assert!(graph.connect_widgets(a, CenterX, root, CenterX, 0));
        assert!(graph.connect_widgets(a, Left, b, Right, 6));
        assert!(!graph.anchor(id(a, Right)).unwrap().is_connected());
        assert!(!graph.anchor(id(a, CenterX)).unwrap().is_connected());
        assert_eq!(graph.anchor(id(a, Left)).unwrap().target(), Some(id(b, Right)));
    }

    #[test]
    fn test_reset_center_clears_sides_and_bias() {
        let (mut graph, root, a, _) = setup();
        assert!(graph.connect_widgets(a, Center, root, Left, 0));
        graph[a].set_bias(Axis::Horizontal, 0.2);
        graph.reset_anchor(id(a, Center));
        for kind in [Left, Right, Center] {
            assert!(!graph.anchor(id(a, kind)).unwrap().is_connected());
        }
        assert_eq!(graph[a].bias(Axis::Horizontal), 0.5);
        assert!(graph.anchor(id(root, Left)).unwrap().dependents().is_none());
    }

    #[test]
    fn test_gone_margin() {
        let (mut graph, root, a, b) = setup();
        assert!(graph.connect(id(a, Left), id(root, Left), 10));
        assert!(graph.try_connect(id(b, Left), id(a, Right), 20, Some(5)).is_ok());
        assert_eq!(graph.margin(id(b, Left)), 20);

        graph[a].set_visibility(crate::model::Visibility::Gone);
        assert_eq!(graph.margin(id(b, Left)), 5);
        assert_eq!(graph.margin(id(a, Left)), 0);
    }

    #[test]
    fn test_chain_head_detection() {
        let (mut graph, root, a, b) = setup();
        assert!(graph.connect(id(a, Left), id(root, Left), 0));
        assert!(graph.connect(id(a, Right), id(b, Left), 0));
        assert!(graph.connect(id(b, Left), id(a, Right), 0));
        assert!(graph.connect(id(b, Right), id(root, Right), 0));
        assert!(graph.is_chain_head(a, Axis::Horizontal));
        assert!(!graph.is_chain_head(b, Axis::Horizontal));
        assert_eq!(graph.next_in_chain(a, Axis::Horizontal), Some(b));
        assert_eq!(graph.next_in_chain(b, Axis::Horizontal), None);
    }

    #[test]
    fn test_remove_child_drops_connections() {
        let (mut graph, root, a, b) = setup();
        assert!(graph.connect(id(b, Left), id(a, Right), 0));
        graph.remove_child(root, a).unwrap();
        assert!(!graph.anchor(id(b, Left)).unwrap().is_connected());
        assert_eq!(graph.children(root), &[b]);
        assert_eq!(graph[a].parent(), None);
    }

    #[test]
    fn test_add_child_rejects_nesting_loop() {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        let outer = graph.add_container(root).unwrap();
        let inner = graph.add_container(outer).unwrap();
        assert!(matches!(
            graph.add_child(inner, outer),
            Err(LayoutError::WouldNest { .. })
        ));
        assert!(graph.add_child(root, inner).is_ok());
        assert_eq!(graph[inner].parent(), Some(root));
        assert!(graph.children(outer).is_empty());
    }

    #[test]
    fn test_add_widget_under_leaf_fails() {
        let (mut graph, _, a, _) = setup();
        assert!(matches!(graph.add_leaf(a), Err(LayoutError::NotAContainer { .. })));
    }

    #[test]
    fn test_absolute_rect() {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        let inner = graph.add_container(root).unwrap();
        let leaf = graph.add_leaf(inner).unwrap();
        graph[root].set_position(100, 100);
        graph[inner].set_position(10, 20);
        graph[leaf].set_position(1, 2).set_size(5, 5);
        assert_eq!(graph.absolute_rect(leaf), Some(Rect::new(11, 22, 5, 5)));
        assert_eq!(graph.offset_within(leaf, root), Some((10, 20)));
    }
}
