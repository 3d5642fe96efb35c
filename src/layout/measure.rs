//! Content measurement
//!
//! Widgets sized by their content (WRAP_CONTENT, MATCH_CONSTRAINT with the
//! WRAP default) are measured by the host before each container is solved.
//! The host answers through a [`Measurer`]; a closure works as one.

use std::collections::HashMap;

use crate::model::{
    AnchorType, DimensionBehavior, LayoutGraph, MatchConstraintDefault, Widget, WidgetId,
    WidgetKind,
};

use super::types::Axis;

/// Constraint handed to the measurer on one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureMode {
    /// The extent is decided; the measurer should report it back
    Exactly(i32),
    /// Any extent up to the bound
    AtMost(i32),
    Unspecified,
}

impl MeasureMode {
    /// Apply the mode to a desired content extent
    pub fn resolve(self, desired: i32) -> i32 {
        match self {
            MeasureMode::Exactly(size) => size,
            MeasureMode::AtMost(bound) => desired.min(bound),
            MeasureMode::Unspecified => desired,
        }
    }
}

/// Result of measuring one widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    pub width: i32,
    pub height: i32,
    /// Distance from the top edge to the text baseline
    pub baseline: Option<i32>,
}

impl Measurement {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            baseline: None,
        }
    }

    pub fn with_baseline(mut self, baseline: i32) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// Host callback reporting content sizes
pub trait Measurer {
    fn measure(&mut self, widget: &Widget, modes: [MeasureMode; 2]) -> Measurement;
}

impl<F> Measurer for F
where
    F: FnMut(&Widget, [MeasureMode; 2]) -> Measurement,
{
    fn measure(&mut self, widget: &Widget, modes: [MeasureMode; 2]) -> Measurement {
        self(widget, modes)
    }
}

/// A table of content sizes. Widgets missing from the table measure as their
/// current frame.
#[derive(Debug, Clone, Default)]
pub struct IntrinsicSizes {
    sizes: HashMap<WidgetId, Measurement>,
}

impl IntrinsicSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: WidgetId, measurement: Measurement) -> &mut Self {
        self.sizes.insert(id, measurement);
        self
    }

    pub fn with(mut self, id: WidgetId, width: i32, height: i32) -> Self {
        self.sizes.insert(id, Measurement::new(width, height));
        self
    }

    pub fn get(&self, id: WidgetId) -> Option<&Measurement> {
        self.sizes.get(&id)
    }
}

impl Measurer for IntrinsicSizes {
    fn measure(&mut self, widget: &Widget, modes: [MeasureMode; 2]) -> Measurement {
        let content = self
            .sizes
            .get(&widget.id())
            .copied()
            .unwrap_or_else(|| Measurement::new(widget.width(), widget.height()));
        Measurement {
            width: modes[0].resolve(content.width),
            height: modes[1].resolve(content.height),
            baseline: content.baseline,
        }
    }
}

// ============================================================================
// Measuring a scope
// ============================================================================

/// Available span of the scope on an axis, if known
fn scope_span(graph: &LayoutGraph, scope: WidgetId, wrap: [bool; 2], axis: Axis) -> Option<i32> {
    let container = &graph[scope];
    if !wrap[axis.index()] {
        return Some(container.frame.extent(axis));
    }
    let bound = container.max_size(axis);
    (bound < i32::MAX).then_some(bound)
}

fn mode_for(widget: &Widget, axis: Axis, span: Option<i32>) -> MeasureMode {
    let extent = widget.frame.extent(axis);
    match widget.behavior(axis) {
        DimensionBehavior::Fixed => MeasureMode::Exactly(extent),
        DimensionBehavior::WrapContent => {
            span.map_or(MeasureMode::Unspecified, MeasureMode::AtMost)
        }
        DimensionBehavior::MatchConstraint => {
            if widget.match_constraint(axis).default == MatchConstraintDefault::Wrap {
                match span {
                    Some(s) => MeasureMode::AtMost(s),
                    None if extent > 0 => MeasureMode::AtMost(extent),
                    None => MeasureMode::Unspecified,
                }
            } else {
                MeasureMode::Exactly(extent)
            }
        }
        DimensionBehavior::MatchParent => match span {
            Some(s) => {
                let margins = widget.anchor(AnchorType::begin(axis)).raw_margin()
                    + widget.anchor(AnchorType::end(axis)).raw_margin();
                MeasureMode::Exactly((s - margins).max(0))
            }
            None => MeasureMode::Unspecified,
        },
    }
}

/// Whether the measured extent replaces the widget's extent on an axis
fn takes_measurement(widget: &Widget, axis: Axis) -> bool {
    match widget.behavior(axis) {
        DimensionBehavior::Fixed => false,
        DimensionBehavior::WrapContent | DimensionBehavior::MatchParent => true,
        DimensionBehavior::MatchConstraint => {
            widget.match_constraint(axis).default == MatchConstraintDefault::Wrap
        }
    }
}

/// Measure every visible leaf child of `scope` that depends on its content.
///
/// Returns the number of widgets measured.
pub(crate) fn measure_children(
    graph: &mut LayoutGraph,
    scope: WidgetId,
    wrap: [bool; 2],
    measurer: &mut dyn Measurer,
) -> usize {
    let spans = [
        scope_span(graph, scope, wrap, Axis::Horizontal),
        scope_span(graph, scope, wrap, Axis::Vertical),
    ];
    let children: Vec<WidgetId> = graph.children(scope).to_vec();
    let mut measured = 0;

    for id in children {
        let widget = &graph[id];
        if widget.is_gone() || !matches!(widget.kind, WidgetKind::Leaf) {
            continue;
        }
        let wants = [
            takes_measurement(widget, Axis::Horizontal),
            takes_measurement(widget, Axis::Vertical),
        ];
        if !wants[0] && !wants[1] && !widget.has_baseline {
            continue;
        }

        let modes = [
            mode_for(widget, Axis::Horizontal, spans[0]),
            mode_for(widget, Axis::Vertical, spans[1]),
        ];
        let result = measurer.measure(widget, modes);
        tracing::trace!(
            widget = %id,
            ?modes,
            width = result.width,
            height = result.height,
            "measured"
        );

        let widget = &mut graph[id];
        for axis in Axis::BOTH {
            if !wants[axis.index()] {
                continue;
            }
            let mut extent = result.extent(axis).max(0);
            if widget.is_match(axis) {
                let mc = widget.match_constraint(axis);
                extent = extent.max(mc.min);
                if mc.max > 0 {
                    extent = extent.min(mc.max);
                }
            }
            widget.set_extent(axis, extent);
        }
        if let Some(baseline) = result.baseline {
            widget.set_baseline_distance(baseline);
        }
        widget.pass.measured = true;
        measured += 1;
    }
    measured
}
