//! Anchor Layout - a constraint layout engine for widget trees
//!
//! Widgets are rectangles with eight anchors. Connecting an anchor to an
//! anchor of the parent or of a sibling states a relation with a margin;
//! the engine translates those relations into a linear system, solves it
//! and writes the frames back.
//!
//! # Example
//!
//! ```rust
//! use anchor_layout::{AnchorType, LayoutGraph};
//!
//! let mut graph = LayoutGraph::new();
//! let root = graph.add_root();
//! graph[root].set_size(300, 200);
//! let button = graph.add_leaf(root)?;
//! graph[button].set_size(100, 40);
//! graph.connect_widgets(button, AnchorType::Center, root, AnchorType::Center, 0);
//!
//! graph.layout_with_frames(root)?;
//! assert_eq!((graph[button].x(), graph[button].y()), (100, 80));
//! # Ok::<(), anchor_layout::LayoutError>(())
//! ```

pub mod error;
pub mod layout;
pub mod model;

pub use error::ConnectError;
pub use layout::{
    Axis, CassowarySolver, IntrinsicSizes, LayoutConfig, LayoutError, LayoutReport, LinearSolver,
    MeasureMode, Measurement, Measurer, Priority, Rect,
};
pub use model::{
    parse_ratio, AnchorId, AnchorType, Barrier, BarrierSide, ChainStyle, DimensionBehavior, Flow,
    FlowAlign, FlowWrap, Guideline, LayoutGraph, MatchConstraintDefault, Visibility, Widget,
    WidgetId, WidgetKind,
};
