//! Widgets: rectangles with eight anchors and per-axis sizing rules

use std::fmt;

use crate::layout::{Axis, Rect};

use super::anchor::{Anchor, AnchorId, AnchorType};
use super::helpers::{Barrier, Flow, Guideline};
use super::ratio::parse_ratio;

/// Stable arena handle of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WidgetId(pub usize);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

// ============================================================================
// Sizing enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Takes space but is not drawn
    Invisible,
    /// Collapses to zero size and zero margins
    Gone,
}

/// How a widget's extent on one axis is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimensionBehavior {
    #[default]
    Fixed,
    WrapContent,
    /// Extent decided by the solver from the widget's connections
    MatchConstraint,
    MatchParent,
}

/// Sub-mode of a MATCH_CONSTRAINT extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchConstraintDefault {
    /// Fill the space between the two targets
    #[default]
    Spread,
    /// Fill the space, but no more than the content needs
    Wrap,
    /// Fraction of the parent extent
    Percent,
    /// Derived from the other axis through the dimension ratio
    Ratio,
    /// Ratio already folded into a concrete size for this pass
    RatioResolved,
}

/// Parameters of a MATCH_CONSTRAINT extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConstraint {
    pub default: MatchConstraintDefault,
    /// Lower bound, 0 for none
    pub min: i32,
    /// Upper bound, 0 for none
    pub max: i32,
    /// Fraction of the parent used by `Percent`
    pub percent: f32,
    /// Chain weight, `None` when undeclared
    pub weight: Option<f32>,
}

impl Default for MatchConstraint {
    fn default() -> Self {
        Self {
            default: MatchConstraintDefault::Spread,
            min: 0,
            max: 0,
            percent: 1.0,
            weight: None,
        }
    }
}

/// Style applied by a chain head to its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainStyle {
    #[default]
    Spread,
    SpreadInside,
    Packed,
}

/// The dimension a ratio computes from the other one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatioSide {
    /// Width is derived from height
    Horizontal,
    /// Height is derived from width
    Vertical,
    #[default]
    Unknown,
}

impl RatioSide {
    pub fn flipped(self) -> RatioSide {
        match self {
            RatioSide::Horizontal => RatioSide::Vertical,
            RatioSide::Vertical => RatioSide::Horizontal,
            RatioSide::Unknown => RatioSide::Unknown,
        }
    }
}

/// Width-over-height ratio together with its authored driving side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionRatio {
    pub value: f32,
    pub side: RatioSide,
}

// ============================================================================
// Widget kinds
// ============================================================================

/// State owned by a container widget
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerState {
    pub(crate) children: Vec<WidgetId>,
}

impl ContainerState {
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }
}

/// What a widget is, selected on when constraints are emitted
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Leaf,
    Guideline(Guideline),
    Barrier(Barrier),
    Flow(Flow),
    Container(ContainerState),
}

impl WidgetKind {
    pub fn container() -> Self {
        WidgetKind::Container(ContainerState::default())
    }

    pub fn is_container(&self) -> bool {
        matches!(self, WidgetKind::Container(_))
    }

    pub fn is_guideline(&self) -> bool {
        matches!(self, WidgetKind::Guideline(_))
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self, WidgetKind::Barrier(_))
    }

    /// Guidelines and barriers have no extent of their own
    pub fn is_helper(&self) -> bool {
        matches!(self, WidgetKind::Guideline(_) | WidgetKind::Barrier(_))
    }
}

/// Transient flags, rebuilt at the start of every layout call
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PassState {
    /// Axis placed by direct resolution, skipped by the solver
    pub resolved: [bool; 2],
    /// Referenced by a barrier on that axis
    pub in_barrier: [bool; 2],
    /// Match default after ratio resolution
    pub resolved_default: [MatchConstraintDefault; 2],
    /// Emit a ratio row instead of precomputing a size
    pub use_ratio: bool,
    pub ratio: f32,
    pub ratio_side: RatioSide,
    pub measured: bool,
}

// ============================================================================
// Widget
// ============================================================================

/// A rectangle positioned by its anchors
#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) kind: WidgetKind,
    pub(crate) anchors: [Anchor; 8],
    pub(crate) frame: Rect,
    pub(crate) min_size: [i32; 2],
    pub(crate) max_size: [i32; 2],
    pub(crate) visibility: Visibility,
    pub(crate) behavior: [DimensionBehavior; 2],
    pub(crate) match_constraint: [MatchConstraint; 2],
    pub(crate) ratio: Option<DimensionRatio>,
    pub(crate) bias: [f32; 2],
    pub(crate) chain_style: [ChainStyle; 2],
    pub(crate) baseline_distance: i32,
    pub(crate) has_baseline: bool,
    pub(crate) pass: PassState,
}

impl Widget {
    pub(crate) fn new(id: WidgetId, kind: WidgetKind) -> Self {
        Self {
            id,
            name: None,
            parent: None,
            kind,
            anchors: AnchorType::ALL.map(|t| Anchor::new(id, t)),
            frame: Rect::zero(),
            min_size: [0, 0],
            max_size: [i32::MAX, i32::MAX],
            visibility: Visibility::Visible,
            behavior: [DimensionBehavior::Fixed; 2],
            match_constraint: [MatchConstraint::default(); 2],
            ratio: None,
            bias: [0.5, 0.5],
            chain_style: [ChainStyle::Spread; 2],
            baseline_distance: 0,
            has_baseline: false,
            pass: PassState::default(),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn anchor(&self, kind: AnchorType) -> &Anchor {
        &self.anchors[kind.index()]
    }

    pub(crate) fn anchor_mut(&mut self, kind: AnchorType) -> &mut Anchor {
        &mut self.anchors[kind.index()]
    }

    pub fn anchor_id(&self, kind: AnchorType) -> AnchorId {
        AnchorId::new(self.id, kind)
    }

    /// Begin-side anchor of an axis
    pub fn begin(&self, axis: Axis) -> &Anchor {
        self.anchor(AnchorType::begin(axis))
    }

    /// End-side anchor of an axis
    pub fn end(&self, axis: Axis) -> &Anchor {
        self.anchor(AnchorType::end(axis))
    }

    /// Rectangle relative to the parent container
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn x(&self) -> i32 {
        self.frame.x
    }

    pub fn y(&self) -> i32 {
        self.frame.y
    }

    pub fn width(&self) -> i32 {
        self.frame.width
    }

    pub fn height(&self) -> i32 {
        self.frame.height
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_gone(&self) -> bool {
        self.visibility == Visibility::Gone
    }

    pub fn behavior(&self, axis: Axis) -> DimensionBehavior {
        self.behavior[axis.index()]
    }

    pub fn match_constraint(&self, axis: Axis) -> &MatchConstraint {
        &self.match_constraint[axis.index()]
    }

    pub fn dimension_ratio(&self) -> Option<DimensionRatio> {
        self.ratio
    }

    pub fn bias(&self, axis: Axis) -> f32 {
        self.bias[axis.index()]
    }

    pub fn chain_style(&self, axis: Axis) -> ChainStyle {
        self.chain_style[axis.index()]
    }

    pub fn min_size(&self, axis: Axis) -> i32 {
        self.min_size[axis.index()]
    }

    /// Upper size bound, `i32::MAX` when unbounded
    pub fn max_size(&self, axis: Axis) -> i32 {
        self.max_size[axis.index()]
    }

    pub fn baseline_distance(&self) -> i32 {
        self.baseline_distance
    }

    pub fn has_baseline(&self) -> bool {
        self.has_baseline
    }

    /// Whether the axis was placed by direct resolution in the last layout call
    pub fn is_resolved(&self, axis: Axis) -> bool {
        self.pass.resolved[axis.index()]
    }

    /// Current extent on an axis, 0 when gone
    pub(crate) fn length(&self, axis: Axis) -> i32 {
        if self.is_gone() {
            return 0;
        }
        self.frame.extent(axis)
    }

    pub(crate) fn is_match(&self, axis: Axis) -> bool {
        self.behavior(axis) == DimensionBehavior::MatchConstraint
    }

    /// Weight used inside chains, negative when undeclared
    pub(crate) fn weight(&self, axis: Axis) -> f32 {
        self.match_constraint(axis).weight.unwrap_or(-1.0)
    }

    pub(crate) fn extent_mut(&mut self, axis: Axis) -> &mut i32 {
        match axis {
            Axis::Horizontal => &mut self.frame.width,
            Axis::Vertical => &mut self.frame.height,
        }
    }

    pub(crate) fn start_mut(&mut self, axis: Axis) -> &mut i32 {
        match axis {
            Axis::Horizontal => &mut self.frame.x,
            Axis::Vertical => &mut self.frame.y,
        }
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Authored position, used when an axis has no connection
    pub fn set_position(&mut self, x: i32, y: i32) -> &mut Self {
        self.frame.x = x;
        self.frame.y = y;
        self
    }

    pub fn set_size(&mut self, width: i32, height: i32) -> &mut Self {
        self.set_extent(Axis::Horizontal, width);
        self.set_extent(Axis::Vertical, height)
    }

    /// Set the extent on an axis, raised to the minimum size
    pub fn set_extent(&mut self, axis: Axis, value: i32) -> &mut Self {
        let min = self.min_size(axis);
        *self.extent_mut(axis) = value.max(min);
        self
    }

    pub fn set_min_size(&mut self, axis: Axis, value: i32) -> &mut Self {
        self.min_size[axis.index()] = value.max(0);
        let current = self.frame.extent(axis);
        if current < self.min_size[axis.index()] {
            *self.extent_mut(axis) = self.min_size[axis.index()];
        }
        self
    }

    pub fn set_max_size(&mut self, axis: Axis, value: i32) -> &mut Self {
        self.max_size[axis.index()] = value;
        self
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> &mut Self {
        self.visibility = visibility;
        self
    }

    pub fn set_behavior(&mut self, axis: Axis, behavior: DimensionBehavior) -> &mut Self {
        self.behavior[axis.index()] = behavior;
        self
    }

    pub fn set_behaviors(
        &mut self,
        horizontal: DimensionBehavior,
        vertical: DimensionBehavior,
    ) -> &mut Self {
        self.behavior = [horizontal, vertical];
        self
    }

    pub fn set_match_constraint(&mut self, axis: Axis, constraint: MatchConstraint) -> &mut Self {
        self.match_constraint[axis.index()] = constraint;
        self
    }

    pub fn set_match_default(&mut self, axis: Axis, default: MatchConstraintDefault) -> &mut Self {
        self.match_constraint[axis.index()].default = default;
        self
    }

    /// Min/max clamp of a MATCH_CONSTRAINT extent. `i32::MAX` as max means none.
    pub fn set_match_bounds(&mut self, axis: Axis, min: i32, max: i32) -> &mut Self {
        let mc = &mut self.match_constraint[axis.index()];
        mc.min = min.max(0);
        mc.max = if max == i32::MAX { 0 } else { max.max(0) };
        self
    }

    /// Fraction of the parent; a proper fraction switches a SPREAD default to PERCENT
    pub fn set_match_percent(&mut self, axis: Axis, percent: f32) -> &mut Self {
        let mc = &mut self.match_constraint[axis.index()];
        mc.percent = percent;
        if percent > 0.0 && percent < 1.0 && mc.default == MatchConstraintDefault::Spread {
            mc.default = MatchConstraintDefault::Percent;
        }
        self
    }

    pub fn set_weight(&mut self, axis: Axis, weight: Option<f32>) -> &mut Self {
        self.match_constraint[axis.index()].weight = weight;
        self
    }

    /// Parse and store a ratio expression such as `"16:9"`, `"H,3:4"` or `"1.5"`.
    ///
    /// Malformed or non-positive input leaves the widget without a ratio.
    pub fn set_dimension_ratio(&mut self, expression: &str) -> &mut Self {
        self.ratio = parse_ratio(expression).map(|(value, side)| DimensionRatio { value, side });
        self
    }

    pub fn set_ratio(&mut self, ratio: Option<DimensionRatio>) -> &mut Self {
        self.ratio = ratio.filter(|r| r.value > 0.0);
        self
    }

    pub fn set_bias(&mut self, axis: Axis, bias: f32) -> &mut Self {
        self.bias[axis.index()] = bias;
        self
    }

    pub fn set_chain_style(&mut self, axis: Axis, style: ChainStyle) -> &mut Self {
        self.chain_style[axis.index()] = style;
        self
    }

    /// Distance from the top edge to the text baseline
    pub fn set_baseline_distance(&mut self, distance: i32) -> &mut Self {
        self.baseline_distance = distance;
        self.has_baseline = distance > 0;
        self
    }

    /// Drop bias, chain, ratio and match state back to defaults
    pub(crate) fn reset_attributes(&mut self) {
        self.bias = [0.5, 0.5];
        self.chain_style = [ChainStyle::Spread; 2];
        self.match_constraint = [MatchConstraint::default(); 2];
        self.ratio = None;
        self.pass = PassState::default();
    }
}
