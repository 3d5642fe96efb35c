//! Error types for the layout engine

use thiserror::Error;

use crate::model::WidgetId;

use super::solver::SolverError;

/// Errors that can occur during layout computation
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Handle that does not belong to the graph
    #[error("unknown widget {0}")]
    UnknownWidget(WidgetId),

    /// Operation needs a container but got another widget kind
    #[error("widget {widget} is not a container")]
    NotAContainer { widget: WidgetId },

    /// Reparenting that would make a widget its own ancestor
    #[error("cannot move {child} under {parent}: {parent} is inside {child}")]
    WouldNest { parent: WidgetId, child: WidgetId },

    /// Configuration that could not be read or written
    #[error("invalid layout configuration: {reason}")]
    Config { reason: String },

    /// Solver failure that could not be absorbed
    #[error("constraint solver error: {0}")]
    SolverError(#[from] SolverError),
}

impl LayoutError {
    /// Create a not-a-container error
    pub fn not_a_container(widget: WidgetId) -> Self {
        Self::NotAContainer { widget }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Widget the error is about, if any
    pub fn widget(&self) -> Option<WidgetId> {
        match self {
            Self::UnknownWidget(id) => Some(*id),
            Self::NotAContainer { widget } => Some(*widget),
            Self::WouldNest { child, .. } => Some(*child),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for LayoutError {
    fn from(e: toml::de::Error) -> Self {
        Self::config(e.to_string())
    }
}

impl From<toml::ser::Error> for LayoutError {
    fn from(e: toml::ser::Error) -> Self {
        Self::config(e.to_string())
    }
}
