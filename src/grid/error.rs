//! Wiring errors raised while mounting hosted widgets.

use crate::grid::config::WidgetType;
use std::fmt;
use thiserror::Error;

/// Capability a hosted widget must hand over when mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    DataChanged,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::DataChanged => f.write_str("data changed stream"),
        }
    }
}

/// A broken widget wiring. These indicate a programming error in the widget
/// or its registration and are never retried.
#[derive(Debug, Error)]
pub enum WiringError {
    #[error("no widget registered for type '{widget}'")]
    UnknownWidget { widget: WidgetType },

    #[error("widget '{widget}' does not provide its {capability}")]
    MissingCapability {
        widget: WidgetType,
        capability: Capability,
    },

    #[error("widget '{widget}' rejected its data: {source}")]
    InvalidData {
        widget: WidgetType,
        #[source]
        source: serde_json::Error,
    },
}

impl WiringError {
    pub fn widget(&self) -> &WidgetType {
        match self {
            WiringError::UnknownWidget { widget }
            | WiringError::MissingCapability { widget, .. }
            | WiringError::InvalidData { widget, .. } => widget,
        }
    }
}
