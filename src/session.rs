//! Scripted pointer sessions replayed against a board without a window.

use crate::grid::{Board, BoardEvent, GridItemConfig, PointerEvent, WiringError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Session {
    #[serde(default)]
    pub items: Vec<GridItemConfig>,
    #[serde(default)]
    pub steps: Vec<PointerEvent>,
}

impl Session {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Feed every step to `board`, pumping after each one. Returns the board
    /// events in the order they were raised.
    pub fn replay(&self, board: &mut Board) -> Result<Vec<BoardEvent>, WiringError> {
        let mut events = Vec::new();
        for step in &self.steps {
            let response = board.handle_pointer(step);
            tracing::debug!(kind = ?step.kind, x = step.position.x, y = step.position.y, captured = response.is_captured(), "replayed pointer");
            events.extend(board.pump()?);
        }
        Ok(events)
    }
}
