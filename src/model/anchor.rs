//! Anchors: typed connection points owned by widgets

use std::collections::BTreeSet;
use std::fmt;

use crate::layout::Axis;

use super::widget::WidgetId;

/// The eight connection points every widget carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnchorType {
    Left,
    Top,
    Right,
    Bottom,
    Baseline,
    Center,
    CenterX,
    CenterY,
}

impl AnchorType {
    /// All anchor types in storage order
    pub const ALL: [AnchorType; 8] = [
        AnchorType::Left,
        AnchorType::Top,
        AnchorType::Right,
        AnchorType::Bottom,
        AnchorType::Baseline,
        AnchorType::Center,
        AnchorType::CenterX,
        AnchorType::CenterY,
    ];

    /// Slot of this type in a widget's anchor array
    pub fn index(self) -> usize {
        self as usize
    }

    /// Axis this anchor positions, `None` for CENTER which spans both
    pub fn axis(self) -> Option<Axis> {
        match self {
            AnchorType::Left | AnchorType::Right | AnchorType::CenterX => Some(Axis::Horizontal),
            AnchorType::Top | AnchorType::Bottom | AnchorType::Baseline | AnchorType::CenterY => {
                Some(Axis::Vertical)
            }
            AnchorType::Center => None,
        }
    }

    /// Begin-side anchor of an axis
    pub fn begin(axis: Axis) -> AnchorType {
        match axis {
            Axis::Horizontal => AnchorType::Left,
            Axis::Vertical => AnchorType::Top,
        }
    }

    /// End-side anchor of an axis
    pub fn end(axis: Axis) -> AnchorType {
        match axis {
            Axis::Horizontal => AnchorType::Right,
            Axis::Vertical => AnchorType::Bottom,
        }
    }

    /// Centre helper anchor of an axis
    pub fn center(axis: Axis) -> AnchorType {
        match axis {
            Axis::Horizontal => AnchorType::CenterX,
            Axis::Vertical => AnchorType::CenterY,
        }
    }

    /// The anchor on the other side of the same axis
    pub fn opposite(self) -> AnchorType {
        match self {
            AnchorType::Left => AnchorType::Right,
            AnchorType::Right => AnchorType::Left,
            AnchorType::Top => AnchorType::Bottom,
            AnchorType::Bottom => AnchorType::Top,
            AnchorType::Baseline
            | AnchorType::Center
            | AnchorType::CenterX
            | AnchorType::CenterY => self,
        }
    }

    /// Whether two anchor types constrain the same dimension.
    ///
    /// Baseline counts as vertical; CENTER is similar to everything.
    pub fn is_similar_dimension(self, other: AnchorType) -> bool {
        match (self.axis(), other.axis()) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => a == b,
        }
    }

    /// LEFT, TOP, RIGHT or BOTTOM
    pub fn is_side(self) -> bool {
        matches!(
            self,
            AnchorType::Left | AnchorType::Right | AnchorType::Top | AnchorType::Bottom
        )
    }
}

impl fmt::Display for AnchorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnchorType::Left => "left",
            AnchorType::Top => "top",
            AnchorType::Right => "right",
            AnchorType::Bottom => "bottom",
            AnchorType::Baseline => "baseline",
            AnchorType::Center => "center",
            AnchorType::CenterX => "center_x",
            AnchorType::CenterY => "center_y",
        };
        write!(f, "{}", name)
    }
}

/// Stable handle of an anchor: its owner plus its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId {
    pub widget: WidgetId,
    pub kind: AnchorType,
}

impl AnchorId {
    pub fn new(widget: WidgetId, kind: AnchorType) -> Self {
        Self { widget, kind }
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.widget, self.kind)
    }
}

/// A connection point on a widget
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    id: AnchorId,
    pub(crate) target: Option<AnchorId>,
    pub(crate) margin: i32,
    pub(crate) gone_margin: Option<i32>,
    pub(crate) dependents: Option<BTreeSet<AnchorId>>,
    pub(crate) final_value: Option<i32>,
}

impl Anchor {
    pub(crate) fn new(widget: WidgetId, kind: AnchorType) -> Self {
        Self {
            id: AnchorId::new(widget, kind),
            target: None,
            margin: 0,
            gone_margin: None,
            dependents: None,
            final_value: None,
        }
    }

    pub fn id(&self) -> AnchorId {
        self.id
    }

    pub fn owner(&self) -> WidgetId {
        self.id.widget
    }

    pub fn kind(&self) -> AnchorType {
        self.id.kind
    }

    /// Anchor this one is connected to
    pub fn target(&self) -> Option<AnchorId> {
        self.target
    }

    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }

    /// Authored margin, ignoring visibility
    pub fn raw_margin(&self) -> i32 {
        self.margin
    }

    /// Margin used instead of the authored one when the target is gone
    pub fn gone_margin(&self) -> Option<i32> {
        self.gone_margin
    }

    /// Anchors targeting this one, `None` when there are none
    pub fn dependents(&self) -> Option<&BTreeSet<AnchorId>> {
        self.dependents.as_ref()
    }

    pub fn has_dependents(&self) -> bool {
        self.dependents.as_ref().is_some_and(|d| !d.is_empty())
    }

    /// Value fixed by direct resolution during the current pass
    pub fn final_value(&self) -> Option<i32> {
        self.final_value
    }

    pub(crate) fn add_dependent(&mut self, dependent: AnchorId) {
        self.dependents
            .get_or_insert_with(BTreeSet::new)
            .insert(dependent);
    }

    pub(crate) fn remove_dependent(&mut self, dependent: AnchorId) {
        if let Some(set) = self.dependents.as_mut() {
            set.remove(&dependent);
            if set.is_empty() {
                self.dependents = None;
            }
        }
    }

    /// Clear the outgoing connection fields. The caller deregisters from the target.
    pub(crate) fn clear(&mut self) {
        self.target = None;
        self.margin = 0;
        self.gone_margin = None;
        self.final_value = None;
    }
}

/// Type-level compatibility of a connection from `source` to `target`.
///
/// `target_is_guideline` lets side anchors attach to a guideline's centre helper,
/// and `both_have_baseline` gates baseline to baseline connections.
pub fn types_compatible(
    source: AnchorType,
    target: AnchorType,
    target_is_guideline: bool,
    both_have_baseline: bool,
) -> bool {
    use AnchorType::*;
    if source == target {
        return source != Baseline || both_have_baseline;
    }
    match source {
        Center => !matches!(target, Baseline | CenterX | CenterY),
        Left | Right => {
            matches!(target, Left | Right) || (target_is_guideline && target == CenterX)
        }
        Top | Bottom => {
            matches!(target, Top | Bottom) || (target_is_guideline && target == CenterY)
        }
        Baseline => !matches!(target, Left | Right),
        CenterX | CenterY => false,
    }
}
