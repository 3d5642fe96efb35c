//! The widget tree and its anchor graph
//!
//! A [`LayoutGraph`] owns every widget in an arena. Widgets refer to each
//! other by [`WidgetId`] and their anchors by [`AnchorId`], so the graph can
//! hold cyclic chains without shared ownership.

pub mod anchor;
pub mod graph;
pub mod helpers;
pub mod ratio;
pub mod widget;

pub use anchor::{types_compatible, Anchor, AnchorId, AnchorType};
pub use graph::LayoutGraph;
pub use helpers::{Barrier, BarrierSide, Flow, FlowAlign, FlowWrap, Guideline, GuidelineMode};
pub use ratio::parse_ratio;
pub use widget::{
    ChainStyle, ContainerState, DimensionBehavior, DimensionRatio, MatchConstraint,
    MatchConstraintDefault, RatioSide, Visibility, Widget, WidgetId, WidgetKind,
};
