//! Errors raised while wiring the anchor graph

use thiserror::Error;

use crate::model::{AnchorId, AnchorType, WidgetId};

/// Why a connection between two anchors was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("cannot connect {source_type} to {target_type}")]
    IncompatibleTypes {
        source_type: AnchorType,
        target_type: AnchorType,
    },

    #[error("connecting {from} to {to} would create a cycle")]
    WouldCycle { from: AnchorId, to: AnchorId },

    #[error("{to} is neither the parent, a sibling nor inside a sibling of {from}")]
    NotReachable { from: AnchorId, to: AnchorId },

    #[error("unknown widget {0}")]
    UnknownWidget(WidgetId),
}

impl ConnectError {
    pub fn incompatible(source_type: AnchorType, target_type: AnchorType) -> Self {
        Self::IncompatibleTypes {
            source_type,
            target_type,
        }
    }

    pub fn cycle(from: AnchorId, to: AnchorId) -> Self {
        Self::WouldCycle { from, to }
    }

    pub fn unreachable(from: AnchorId, to: AnchorId) -> Self {
        Self::NotReachable { from, to }
    }
}
