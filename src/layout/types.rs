//! Core types for the layout engine

use std::fmt;

/// One of the two layout axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Both axes, horizontal first
    pub const BOTH: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Index used for per-axis arrays
    pub fn index(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }

    /// The other axis
    pub fn opposite(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "horizontal"),
            Axis::Vertical => write!(f, "vertical"),
        }
    }
}

/// An integer rectangle, relative to the owning container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create an empty rectangle at the origin
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a rectangle from its four edges, clamping degenerate input to zero.
    ///
    /// An edge sitting on an integer sentinel means the solver could not
    /// produce a usable value. So does an extent below zero or beyond `i32`.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let sentinel = |v: i32| v == i32::MIN || v == i32::MAX;
        if sentinel(left) || sentinel(top) || sentinel(right) || sentinel(bottom) {
            return Self::zero();
        }
        let extent = |begin: i32, end: i32| i32::try_from(i64::from(end) - i64::from(begin)).ok();
        match (extent(left, right), extent(top, bottom)) {
            (Some(w), Some(h)) if w >= 0 && h >= 0 => Self::new(left, top, w, h),
            _ => Self::zero(),
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Start coordinate on an axis
    pub fn start(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Extent on an axis
    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// End coordinate on an axis
    pub fn end(&self, axis: Axis) -> i32 {
        self.start(axis) + self.extent(axis)
    }

    /// Translate by an offset
    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Check if this rectangle intersects another
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {} x {}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Outcome of one emit/minimize/read-back pass of the solve loop.
///
/// Returned up the call stack instead of being stashed in shared flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolvePassResult {
    /// Axes whose wrap-content bound grew to fit the children
    pub grew: [bool; 2],
    /// Axes clamped down to the host-provided bound
    pub clamped: [bool; 2],
    /// Number of chains emitted during the pass
    pub chains: usize,
    /// A chain whose tail end was left unconnected
    pub dangling_chain: bool,
}

impl SolvePassResult {
    /// Whether the loop has to run another pass
    pub fn needs_another_pass(&self) -> bool {
        self.grew.iter().any(|g| *g) || self.clamped.iter().any(|c| *c)
    }
}

/// Summary of a `layout()` call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutReport {
    /// Number of solve passes run by the outermost container
    pub iterations: usize,
    /// False when the iteration cap stopped the loop
    pub converged: bool,
    /// Axes resolved directly without the solver, as `[horizontal, vertical]` counts
    pub directly_resolved: [usize; 2],
    /// Whether the grouping pass produced a wrap estimate
    pub grouped: bool,
    /// Final container rectangle
    pub frame: Rect,
    /// Result of the last pass
    pub last_pass: SolvePassResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.end(Axis::Vertical), 60);
        assert_eq!(r.extent(Axis::Horizontal), 30);
    }

    #[test]
    fn test_from_edges_clamps_degenerate() {
        assert_eq!(Rect::from_edges(10, 0, 5, 10), Rect::zero());
        assert_eq!(Rect::from_edges(i32::MIN, 0, 5, 10), Rect::zero());
        assert_eq!(Rect::from_edges(0, 0, 5, i32::MAX), Rect::zero());
        assert_eq!(Rect::from_edges(1, 2, 5, 10), Rect::new(1, 2, 4, 8));
    }

    #[test]
    fn test_from_edges_rejects_overflowing_extent() {
        assert_eq!(Rect::from_edges(-2_000_000_000, 0, 2_000_000_000, 10), Rect::zero());
        assert_eq!(Rect::from_edges(0, -2_000_000_000, 10, 2_000_000_000), Rect::zero());
        assert_eq!(Rect::from_edges(-1_000, 0, 1_000, 10), Rect::new(-1_000, 0, 2_000, 10));
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 20, 20);
        assert_eq!(a.union(&b), Rect::new(0, 0, 25, 25));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_axis_helpers() {
        assert_eq!(Axis::Horizontal.opposite(), Axis::Vertical);
        assert_eq!(Axis::Vertical.index(), 1);
        assert_eq!(Axis::Horizontal.to_string(), "horizontal");
    }
}
