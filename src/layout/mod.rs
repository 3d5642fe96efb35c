//! Layout engine: turns the anchor graph into solved frames
//!
//! Each container is solved on its own, children before parents. Relations
//! go through the [`LinearSolver`] trait; [`CassowarySolver`] is the
//! implementation used by the engine.

pub mod config;
pub mod error;
pub mod measure;
pub mod solver;
pub mod types;

mod barrier;
mod chain;
mod constraints;
mod direct;
mod engine;
mod flow;
mod grouping;
mod guideline;

pub use config::LayoutConfig;
pub use error::LayoutError;
pub use measure::{IntrinsicSizes, MeasureMode, Measurement, Measurer};
pub use solver::{CassowarySolver, LinearSolver, Priority, SolverError, VarId};
pub use types::{Axis, LayoutReport, Rect, SolvePassResult};
