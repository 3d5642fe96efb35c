//! Virtual helper widgets: guidelines, barriers and flows
//!
//! These only carry authored parameters. Their constraints are produced by
//! the layout module when the owning container is solved.

use crate::layout::Axis;

use super::anchor::AnchorType;
use super::widget::{ChainStyle, WidgetId};

// ============================================================================
// Guideline
// ============================================================================

/// The active placement of a guideline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuidelineMode {
    /// Offset from the parent's start edge
    Begin(i32),
    /// Offset from the parent's end edge
    End(i32),
    /// Fraction of the parent extent
    Percent(f32),
}

/// A zero-thickness line positioned relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guideline {
    axis: Axis,
    mode: GuidelineMode,
}

impl Guideline {
    /// A vertical line, positioned along the x axis
    pub fn vertical() -> Self {
        Self {
            axis: Axis::Horizontal,
            mode: GuidelineMode::Begin(0),
        }
    }

    /// A horizontal line, positioned along the y axis
    pub fn horizontal() -> Self {
        Self {
            axis: Axis::Vertical,
            mode: GuidelineMode::Begin(0),
        }
    }

    /// Axis along which the guideline is positioned
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn mode(&self) -> GuidelineMode {
        self.mode
    }

    /// Anchor carrying the guideline's position
    pub fn anchor_type(&self) -> AnchorType {
        AnchorType::begin(self.axis)
    }

    /// Switch to a start offset. Values of -1 or less are ignored.
    pub fn set_begin(&mut self, value: i32) -> &mut Self {
        if value > -1 {
            self.mode = GuidelineMode::Begin(value);
        }
        self
    }

    /// Switch to an end offset. Values of -1 or less are ignored.
    pub fn set_end(&mut self, value: i32) -> &mut Self {
        if value > -1 {
            self.mode = GuidelineMode::End(value);
        }
        self
    }

    /// Switch to a fraction of the parent. Values of -1 or less are ignored.
    pub fn set_percent(&mut self, value: f32) -> &mut Self {
        if value > -1.0 {
            self.mode = GuidelineMode::Percent(value);
        }
        self
    }

    pub fn with_begin(mut self, value: i32) -> Self {
        self.set_begin(value);
        self
    }

    pub fn with_end(mut self, value: i32) -> Self {
        self.set_end(value);
        self
    }

    pub fn with_percent(mut self, value: f32) -> Self {
        self.set_percent(value);
        self
    }
}

// ============================================================================
// Barrier
// ============================================================================

/// Side of the referenced widgets a barrier follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierSide {
    Left,
    Top,
    Right,
    Bottom,
}

impl BarrierSide {
    pub fn axis(self) -> Axis {
        match self {
            BarrierSide::Left | BarrierSide::Right => Axis::Horizontal,
            BarrierSide::Top | BarrierSide::Bottom => Axis::Vertical,
        }
    }

    pub fn anchor_type(self) -> AnchorType {
        match self {
            BarrierSide::Left => AnchorType::Left,
            BarrierSide::Top => AnchorType::Top,
            BarrierSide::Right => AnchorType::Right,
            BarrierSide::Bottom => AnchorType::Bottom,
        }
    }

    /// LEFT and TOP barriers take the minimum edge
    pub fn is_min(self) -> bool {
        matches!(self, BarrierSide::Left | BarrierSide::Top)
    }
}

/// A line following the outermost edge of a set of widgets
#[derive(Debug, Clone, PartialEq)]
pub struct Barrier {
    pub(crate) side: BarrierSide,
    pub(crate) margin: i32,
    pub(crate) allows_gone_widget: bool,
    pub(crate) references: Vec<WidgetId>,
}

impl Barrier {
    pub fn new(side: BarrierSide) -> Self {
        Self {
            side,
            margin: 0,
            allows_gone_widget: true,
            references: Vec::new(),
        }
    }

    pub fn side(&self) -> BarrierSide {
        self.side
    }

    pub fn margin(&self) -> i32 {
        self.margin
    }

    pub fn allows_gone_widget(&self) -> bool {
        self.allows_gone_widget
    }

    pub fn references(&self) -> &[WidgetId] {
        &self.references
    }

    pub fn with_margin(mut self, margin: i32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_allows_gone_widget(mut self, allows: bool) -> Self {
        self.allows_gone_widget = allows;
        self
    }

    pub fn with_references(mut self, references: impl IntoIterator<Item = WidgetId>) -> Self {
        self.references = references.into_iter().collect();
        self
    }

    pub fn set_allows_gone_widget(&mut self, allows: bool) -> &mut Self {
        self.allows_gone_widget = allows;
        self
    }

    pub fn add_reference(&mut self, widget: WidgetId) -> &mut Self {
        if !self.references.contains(&widget) {
            self.references.push(widget);
        }
        self
    }
}

// ============================================================================
// Flow
// ============================================================================

/// How a flow breaks its references into rows or columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowWrap {
    /// A single chain
    #[default]
    None,
    /// Greedy: start a new chain when the next widget would overflow
    Chain,
    /// A grid whose cells take the largest member of their row and column
    Aligned,
}

/// Cross-axis alignment of the widgets of one flow row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowAlign {
    Start,
    #[default]
    Center,
    End,
    /// Align text baselines, vertical alignment only
    Baseline,
}

/// A virtual layout that arranges its references into wrapped chains
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub(crate) orientation: Axis,
    pub(crate) wrap: FlowWrap,
    /// Gaps as `[horizontal, vertical]`
    pub(crate) gap: [i32; 2],
    /// Padding as `[left, top, right, bottom]`
    pub(crate) padding: [i32; 4],
    /// Elements per row or column, 0 for no limit
    pub(crate) max_elements: usize,
    pub(crate) style: [ChainStyle; 2],
    pub(crate) bias: [f32; 2],
    pub(crate) first_style: [Option<ChainStyle>; 2],
    pub(crate) first_bias: [Option<f32>; 2],
    pub(crate) last_style: [Option<ChainStyle>; 2],
    pub(crate) last_bias: [Option<f32>; 2],
    /// Alignment as `[horizontal, vertical]`
    pub(crate) align: [FlowAlign; 2],
    pub(crate) references: Vec<WidgetId>,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new(Axis::Horizontal)
    }
}

impl Flow {
    /// A flow laying out rows when `orientation` is horizontal, columns otherwise
    pub fn new(orientation: Axis) -> Self {
        Self {
            orientation,
            wrap: FlowWrap::None,
            gap: [0, 0],
            padding: [0; 4],
            max_elements: 0,
            style: [ChainStyle::Spread; 2],
            bias: [0.5, 0.5],
            first_style: [None; 2],
            first_bias: [None; 2],
            last_style: [None; 2],
            last_bias: [None; 2],
            align: [FlowAlign::Center; 2],
            references: Vec::new(),
        }
    }

    pub fn orientation(&self) -> Axis {
        self.orientation
    }

    pub fn wrap(&self) -> FlowWrap {
        self.wrap
    }

    pub fn references(&self) -> &[WidgetId] {
        &self.references
    }

    pub fn with_wrap(mut self, wrap: FlowWrap) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_gap(mut self, horizontal: i32, vertical: i32) -> Self {
        self.gap = [horizontal, vertical];
        self
    }

    pub fn with_padding(mut self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        self.padding = [left, top, right, bottom];
        self
    }

    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = max;
        self
    }

    pub fn with_style(mut self, axis: Axis, style: ChainStyle) -> Self {
        self.style[axis.index()] = style;
        self
    }

    pub fn with_bias(mut self, axis: Axis, bias: f32) -> Self {
        self.bias[axis.index()] = bias;
        self
    }

    /// Style and bias of the first row or column on an axis
    pub fn with_first(mut self, axis: Axis, style: Option<ChainStyle>, bias: Option<f32>) -> Self {
        self.first_style[axis.index()] = style;
        self.first_bias[axis.index()] = bias;
        self
    }

    /// Style and bias of the last row or column on an axis
    pub fn with_last(mut self, axis: Axis, style: Option<ChainStyle>, bias: Option<f32>) -> Self {
        self.last_style[axis.index()] = style;
        self.last_bias[axis.index()] = bias;
        self
    }

    pub fn with_align(mut self, axis: Axis, align: FlowAlign) -> Self {
        self.align[axis.index()] = align;
        self
    }

    pub fn with_references(mut self, references: impl IntoIterator<Item = WidgetId>) -> Self {
        self.references = references.into_iter().collect();
        self
    }

    /// Gap between members along an axis
    pub(crate) fn gap(&self, axis: Axis) -> i32 {
        self.gap[axis.index()]
    }

    /// Leading padding on an axis
    pub(crate) fn padding_begin(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.padding[0],
            Axis::Vertical => self.padding[1],
        }
    }

    /// Trailing padding on an axis
    pub(crate) fn padding_end(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.padding[2],
            Axis::Vertical => self.padding[3],
        }
    }
}
