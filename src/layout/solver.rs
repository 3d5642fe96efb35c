//! Linear solver integration for layout computation
//!
//! The layout engine talks to the solver through the [`LinearSolver`] trait:
//! a handful of relations between anchor variables, each tagged with a
//! [`Priority`]. [`CassowarySolver`] implements it on top of the kasuari
//! Cassowary solver.

use std::collections::HashMap;

use kasuari::{
    Constraint, Expression, Solver as KasuariSolver, Strength, Variable as KasuariVariable,
    WeightedRelation::*,
};
use thiserror::Error;

// ============================================================================
// Priorities
// ============================================================================

/// Relative strength of a relation, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    None,
    Low,
    Medium,
    High,
    Highest,
    Equality,
    Barrier,
    Centering,
    /// Must hold
    Fixed,
}

/// Strength a FIXED relation is demoted to when it cannot be satisfied
const DEMOTED: Strength = Strength::REQUIRED.mul_f64(0.99);

impl Priority {
    /// Kasuari strength for this priority. Each soft level outweighs the
    /// previous one by a factor of fifty.
    pub fn strength(self) -> Strength {
        match self {
            Priority::None => Strength::WEAK.mul_f64(0.001),
            Priority::Low => Strength::WEAK.mul_f64(0.05),
            Priority::Medium => Strength::WEAK.mul_f64(2.5),
            Priority::High => Strength::WEAK.mul_f64(125.0),
            Priority::Highest => Strength::WEAK.mul_f64(6_250.0),
            Priority::Equality => Strength::WEAK.mul_f64(312_500.0),
            Priority::Barrier => Strength::WEAK.mul_f64(15_625_000.0),
            Priority::Centering => Strength::WEAK.mul_f64(781_250_000.0),
            Priority::Fixed => Strength::REQUIRED,
        }
    }
}

/// Handle of a solver variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

// ============================================================================
// Solver surface
// ============================================================================

/// Relations the layout engine emits. All margins and sizes are in pixels.
pub trait LinearSolver {
    /// Drop every variable and relation
    fn reset(&mut self);

    fn create_variable(&mut self) -> VarId;

    /// `a = b + margin`
    fn add_equality(&mut self, a: VarId, b: VarId, margin: i32, priority: Priority);

    /// `a = value`, always required
    fn add_constant(&mut self, a: VarId, value: i32);

    /// `a >= b + margin`
    fn add_greater_than(&mut self, a: VarId, b: VarId, margin: i32, priority: Priority);

    /// `a <= b + margin`
    fn add_lower_than(&mut self, a: VarId, b: VarId, margin: i32, priority: Priority);

    /// Place `[begin, end]` between two targets, splitting the slack by `bias`
    #[allow(clippy::too_many_arguments)]
    fn add_centering(
        &mut self,
        begin: VarId,
        begin_target: VarId,
        begin_margin: i32,
        bias: f32,
        end_target: VarId,
        end: VarId,
        end_margin: i32,
        priority: Priority,
    );

    /// `(a_end - a_begin) = ratio * (b_end - b_begin)`
    fn add_ratio(
        &mut self,
        a_end: VarId,
        a_begin: VarId,
        b_end: VarId,
        b_begin: VarId,
        ratio: f32,
        priority: Priority,
    );

    /// Share space between two weighted extents:
    /// `(end_a - begin_a) / weight_a = (end_b - begin_b) / weight_b`
    #[allow(clippy::too_many_arguments)]
    fn add_equal_match(
        &mut self,
        weight_a: f32,
        total_weight: f32,
        weight_b: f32,
        begin_a: VarId,
        end_a: VarId,
        begin_b: VarId,
        end_b: VarId,
        priority: Priority,
    );

    /// Solve the current system
    fn minimize(&mut self);

    /// Solved value of a variable, rounded to the nearest pixel
    fn value(&self, var: VarId) -> i32;
}

// ============================================================================
// SolverError
// ============================================================================

/// Errors from the underlying solver
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("unsatisfiable constraint: {0}")]
    Unsatisfiable(String),

    #[error("duplicate constraint: {0}")]
    Duplicate(String),

    #[error("internal solver error: {0}")]
    Internal(String),
}

// ============================================================================
// CassowarySolver
// ============================================================================

/// [`LinearSolver`] backed by kasuari
pub struct CassowarySolver {
    solver: KasuariSolver,
    variables: Vec<KasuariVariable>,
    /// Maps kasuari variables back to our handles
    index: HashMap<KasuariVariable, usize>,
    values: Vec<f64>,
    demote_required: bool,
    demotions: usize,
}

impl CassowarySolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: Vec::new(),
            index: HashMap::new(),
            values: Vec::new(),
            demote_required: true,
            demotions: 0,
        }
    }

    /// Whether unsatisfiable required relations are retried at a soft strength
    pub fn with_demotion(mut self, demote: bool) -> Self {
        self.demote_required = demote;
        self
    }

    /// Number of required relations demoted since the last reset
    pub fn demotions(&self) -> usize {
        self.demotions
    }

    fn expr(&self, var: VarId) -> Expression {
        Expression::from(self.variables[var.0])
    }

    fn convert_kasuari_error(e: kasuari::AddConstraintError, desc: &str) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => {
                SolverError::Unsatisfiable(desc.to_string())
            }
            kasuari::AddConstraintError::DuplicateConstraint => {
                SolverError::Duplicate(desc.to_string())
            }
            kasuari::AddConstraintError::InternalSolverError(msg) => {
                SolverError::Internal(format!("{}: {}", desc, msg))
            }
        }
    }

    /// Add a relation built for a given strength.
    ///
    /// A required relation that conflicts with the current system is demoted
    /// to the strongest soft strength and retried.
    fn add(&mut self, desc: &str, priority: Priority, build: impl Fn(Strength) -> Constraint) {
        let result = self
            .solver
            .add_constraint(build(priority.strength()))
            .map_err(|e| Self::convert_kasuari_error(e, desc));

        match result {
            Ok(()) => {}
            Err(SolverError::Unsatisfiable(_))
                if priority == Priority::Fixed && self.demote_required =>
            {
                tracing::debug!(relation = desc, "demoting unsatisfiable required relation");
                self.demotions += 1;
                if let Err(e) = self
                    .solver
                    .add_constraint(build(DEMOTED))
                    .map_err(|e| Self::convert_kasuari_error(e, desc))
                {
                    tracing::warn!(error = %e, "dropping relation after demotion");
                }
            }
            Err(SolverError::Internal(msg)) => {
                tracing::warn!(error = %msg, "solver rejected relation");
            }
            Err(e) => {
                tracing::debug!(error = %e, "dropping relation");
            }
        }
    }
}

impl Default for CassowarySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSolver for CassowarySolver {
    fn reset(&mut self) {
        self.solver = KasuariSolver::new();
        self.variables.clear();
        self.index.clear();
        self.values.clear();
        self.demotions = 0;
    }

    fn create_variable(&mut self) -> VarId {
        let kvar = KasuariVariable::new();
        let id = self.variables.len();
        self.variables.push(kvar);
        self.index.insert(kvar, id);
        self.values.push(0.0);
        VarId(id)
    }

    fn add_equality(&mut self, a: VarId, b: VarId, margin: i32, priority: Priority) {
        let (ea, eb) = (self.expr(a), self.expr(b));
        let m = margin as f64;
        self.add("a = b + m", priority, |s| ea.clone() | EQ(s) | eb.clone() + m);
    }

    fn add_constant(&mut self, a: VarId, value: i32) {
        let ea = self.expr(a);
        let v = value as f64;
        self.add("a = c", Priority::Fixed, |s| ea.clone() | EQ(s) | v);
    }

    fn add_greater_than(&mut self, a: VarId, b: VarId, margin: i32, priority: Priority) {
        let (ea, eb) = (self.expr(a), self.expr(b));
        let m = margin as f64;
        self.add("a >= b + m", priority, |s| ea.clone() | GE(s) | eb.clone() + m);
    }

    fn add_lower_than(&mut self, a: VarId, b: VarId, margin: i32, priority: Priority) {
        let (ea, eb) = (self.expr(a), self.expr(b));
        let m = margin as f64;
        self.add("a <= b + m", priority, |s| ea.clone() | LE(s) | eb.clone() + m);
    }

    fn add_centering(
        &mut self,
        begin: VarId,
        begin_target: VarId,
        begin_margin: i32,
        bias: f32,
        end_target: VarId,
        end: VarId,
        end_margin: i32,
        priority: Priority,
    ) {
        let a = self.expr(begin);
        let b = self.expr(begin_target);
        let c = self.expr(end_target);
        let d = self.expr(end);
        let (m1, m2) = (begin_margin as f64, end_margin as f64);
        let bias = bias as f64;

        if begin_target == end_target {
            // a + d = 2b
            self.add("centered on one target", priority, |s| {
                a.clone() + d.clone() | EQ(s) | 2.0 * b.clone()
            });
        } else if bias <= 0.0 {
            self.add("bias start", priority, |s| a.clone() | EQ(s) | b.clone() + m1);
        } else if bias >= 1.0 {
            self.add("bias end", priority, |s| d.clone() | EQ(s) | c.clone() - m2);
        } else {
            // (1 - bias)(a - b - m1) = bias(c - d - m2)
            self.add("centering", priority, |s| {
                (1.0 - bias) * (a.clone() - b.clone() - m1)
                    | EQ(s)
                    | bias * (c.clone() - d.clone() - m2)
            });
        }
    }

    fn add_ratio(
        &mut self,
        a_end: VarId,
        a_begin: VarId,
        b_end: VarId,
        b_begin: VarId,
        ratio: f32,
        priority: Priority,
    ) {
        let size_a = self.expr(a_end) - self.expr(a_begin);
        let size_b = self.expr(b_end) - self.expr(b_begin);
        let r = ratio as f64;
        self.add("ratio", priority, |s| size_a.clone() | EQ(s) | r * size_b.clone());
    }

    fn add_equal_match(
        &mut self,
        weight_a: f32,
        total_weight: f32,
        weight_b: f32,
        begin_a: VarId,
        end_a: VarId,
        begin_b: VarId,
        end_b: VarId,
        priority: Priority,
    ) {
        let size_a = self.expr(end_a) - self.expr(begin_a);
        let size_b = self.expr(end_b) - self.expr(begin_b);

        if total_weight == 0.0 || weight_a == weight_b {
            self.add("equal match", priority, |s| size_a.clone() | EQ(s) | size_b.clone());
        } else if weight_a == 0.0 {
            self.add("empty match", priority, |s| size_a.clone() | EQ(s) | 0.0);
        } else if weight_b == 0.0 {
            self.add("empty match", priority, |s| size_b.clone() | EQ(s) | 0.0);
        } else {
            let factor = (weight_a / weight_b) as f64;
            self.add("weighted match", priority, |s| {
                size_a.clone() | EQ(s) | factor * size_b.clone()
            });
        }
    }

    fn minimize(&mut self) {
        let changes = self.solver.fetch_changes();
        for (kvar, value) in changes {
            if let Some(&id) = self.index.get(kvar) {
                self.values[id] = *value;
            }
        }
    }

    fn value(&self, var: VarId) -> i32 {
        let v = self.values.get(var.0).copied().unwrap_or(0.0);
        // `as` saturates at the integer bounds and maps NaN to 0
        (v + 0.5).floor() as i32
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn solver_with(n: usize) -> (CassowarySolver, Vec<VarId>) {
        let mut solver = CassowarySolver::new();
        let vars = (0..n).map(|_| solver.create_variable()).collect();
        (solver, vars)
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::Fixed > Priority::Centering);
        assert!(Priority::Barrier > Priority::Equality);
        assert!(Priority::Equality > Priority::Highest);
        assert!(Priority::Low > Priority::None);
        assert!(Priority::Centering.strength() < Priority::Fixed.strength());
        assert!(Priority::Highest.strength() < Priority::Equality.strength());
    }

    #[test]
    fn test_equality_and_constant() {
        let (mut solver, v) = solver_with(2);
        solver.add_constant(v[0], 10);
        solver.add_equality(v[1], v[0], 15, Priority::Fixed);
        solver.minimize();
        assert_eq!(solver.value(v[0]), 10);
        assert_eq!(solver.value(v[1]), 25);
    }

    #[test]
    fn test_centering_with_bias() {
        // parent [0, 300], child of width 100
        let (mut solver, v) = solver_with(4);
        let (p_left, p_right, left, right) = (v[0], v[1], v[2], v[3]);
        solver.add_constant(p_left, 0);
        solver.add_constant(p_right, 300);
        solver.add_equality(right, left, 100, Priority::Fixed);
        solver.add_centering(left, p_left, 0, 0.25, p_right, right, 0, Priority::Centering);
        solver.minimize();
        assert_eq!(solver.value(left), 50);
    }

    #[test]
    fn test_centering_on_single_target() {
        let (mut solver, v) = solver_with(3);
        solver.add_constant(v[0], 100);
        solver.add_equality(v[2], v[1], 40, Priority::Fixed);
        solver.add_centering(v[1], v[0], 0, 0.5, v[0], v[2], 0, Priority::Centering);
        solver.minimize();
        assert_eq!(solver.value(v[1]), 80);
        assert_eq!(solver.value(v[2]), 120);
    }

    #[test]
    fn test_ratio() {
        let (mut solver, v) = solver_with(4);
        solver.add_constant(v[0], 0);
        solver.add_constant(v[1], 40);
        solver.add_constant(v[2], 0);
        solver.add_ratio(v[3], v[2], v[1], v[0], 2.0, Priority::Fixed);
        solver.minimize();
        assert_eq!(solver.value(v[3]), 80);
    }

    #[test]
    fn test_weighted_match() {
        // two extents sharing 300 with weights 2 and 1
        let (mut solver, v) = solver_with(4);
        let (b0, e0, b1, e1) = (v[0], v[1], v[2], v[3]);
        solver.add_constant(b0, 0);
        solver.add_equality(b1, e0, 0, Priority::Fixed);
        solver.add_constant(e1, 300);
        solver.add_greater_than(e0, b0, 0, Priority::Fixed);
        solver.add_greater_than(e1, b1, 0, Priority::Fixed);
        solver.add_equal_match(2.0, 3.0, 1.0, b0, e0, b1, e1, Priority::Fixed);
        solver.minimize();
        assert_eq!(solver.value(e0), 200);
    }

    #[test]
    fn test_unsatisfiable_required_is_demoted() {
        let (mut solver, v) = solver_with(1);
        solver.add_constant(v[0], 10);
        solver.add_constant(v[0], 20);
        solver.minimize();
        assert_eq!(solver.demotions(), 1);
        assert_eq!(solver.value(v[0]), 10);
    }

    #[test]
    fn test_soft_yields_to_stronger() {
        let (mut solver, v) = solver_with(2);
        solver.add_constant(v[0], 0);
        solver.add_equality(v[1], v[0], 50, Priority::Low);
        solver.add_equality(v[1], v[0], 80, Priority::Highest);
        solver.minimize();
        assert_eq!(solver.value(v[1]), 80);
    }

    #[test]
    fn test_reset_clears_variables() {
        let (mut solver, v) = solver_with(1);
        solver.add_constant(v[0], 42);
        solver.minimize();
        solver.reset();
        let fresh = solver.create_variable();
        solver.minimize();
        assert_eq!(solver.value(fresh), 0);
    }
}
