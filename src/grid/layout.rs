use crate::grid::config::{Cell, CellMetrics, GridConfig, GridItemConfig};
use crate::grid::geometry::Point;
use crate::grid::item::ResizeEvent;
use serde_json::Value;

/// Verdict on a placement request.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Accepted(GridItemConfig),
    /// Refused; carries the config the item keeps.
    Rejected(GridItemConfig),
}

impl Placement {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Placement::Accepted(_))
    }

    pub fn into_config(self) -> GridItemConfig {
        match self {
            Placement::Accepted(config) | Placement::Rejected(config) => config,
        }
    }
}

/// The authority over item placement on one grid.
///
/// Items report pixel-level gestures; the container turns them into cell
/// positions, resolves conflicts with other items and hands back the config
/// each item should adopt.
pub trait GridContainer {
    fn grid(&self) -> &GridConfig;

    fn items(&self) -> &[GridItemConfig];

    fn metrics(&self) -> CellMetrics {
        self.grid().metrics()
    }

    /// Cell under `point`, or `None` outside the grid.
    fn cell_at(&self, point: Point) -> Option<Cell>;

    /// Settle a resize. `None` when the item is unknown.
    fn commit_resize(&mut self, event: &ResizeEvent) -> Option<Placement>;

    /// Move an item so its top-left lands on `cell`.
    fn commit_drop(&mut self, id: &str, cell: Cell) -> Option<Placement>;

    /// Adopt a config an item replaced by itself.
    fn commit_config(&mut self, config: &GridItemConfig) -> Option<Placement>;

    fn update_data(&mut self, id: &str, data: &Value);

    fn remove(&mut self, id: &str) -> Option<GridItemConfig>;
}

/// Reference container: places items on a fixed grid and rejects any change
/// that leaves the grid or overlaps another item.
#[derive(Debug, Clone)]
pub struct Grid {
    config: GridConfig,
    items: Vec<GridItemConfig>,
}

impl Grid {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
        }
    }

    /// Build a grid from `items`, dropping entries that cannot be placed.
    pub fn with_items(config: GridConfig, items: Vec<GridItemConfig>) -> (Self, Vec<String>) {
        let mut grid = Self::new(config);
        let mut warnings = Vec::new();
        for item in items {
            if let Err(w) = grid.insert(item) {
                warnings.push(w);
            }
        }
        (grid, warnings)
    }

    pub fn get(&self, id: &str) -> Option<&GridItemConfig> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Place a new item. Spans are clamped to the grid like a normalised
    /// dashboard slot; ids must be unique.
    pub fn insert(&mut self, mut item: GridItemConfig) -> Result<(), String> {
        if self.get(&item.id).is_some() {
            return Err(format!("duplicate grid item id '{}' ignored", item.id));
        }
        let cols = self.config.max_cols.max(1);
        let rows = self.config.max_rows.max(1);
        if item.col >= cols || item.row >= rows {
            return Err(format!(
                "grid item '{}' is outside the grid and was ignored",
                item.id
            ));
        }
        item.sizex = item.sizex.max(1).min(cols - item.col);
        item.sizey = item.sizey.max(1).min(rows - item.row);
        if self.collides(&item) {
            return Err(format!(
                "grid item '{}' overlaps another item and was ignored",
                item.id
            ));
        }
        self.items.push(item);
        Ok(())
    }

    fn collides(&self, candidate: &GridItemConfig) -> bool {
        self.items
            .iter()
            .any(|other| other.id != candidate.id && other.overlaps(candidate))
    }

    fn accepts(&self, candidate: &GridItemConfig) -> bool {
        candidate.fits(&self.config) && !self.collides(candidate)
    }

    /// Replace the stored config of `candidate.id` if the placement is valid.
    fn commit(&mut self, candidate: GridItemConfig) -> Option<Placement> {
        let accepted = self.accepts(&candidate);
        let slot = self.items.iter_mut().find(|i| i.id == candidate.id)?;
        if !accepted {
            tracing::info!(
                item = %candidate.id,
                col = candidate.col,
                row = candidate.row,
                sizex = candidate.sizex,
                sizey = candidate.sizey,
                "placement rejected, restoring previous layout"
            );
            return Some(Placement::Rejected(slot.clone()));
        }
        *slot = candidate;
        Some(Placement::Accepted(slot.clone()))
    }

    fn span_for(extent: f32, cell: f32) -> u32 {
        if cell <= 0.0 {
            return 1;
        }
        ((extent / cell).round() as u32).max(1)
    }
}

impl GridContainer for Grid {
    fn grid(&self) -> &GridConfig {
        &self.config
    }

    fn items(&self) -> &[GridItemConfig] {
        &self.items
    }

    fn cell_at(&self, point: Point) -> Option<Cell> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let metrics = self.metrics();
        let col = (point.x / metrics.col_width) as u32;
        let row = (point.y / metrics.row_height) as u32;
        (col < self.config.max_cols && row < self.config.max_rows).then(|| Cell::new(col, row))
    }

    fn commit_resize(&mut self, event: &ResizeEvent) -> Option<Placement> {
        let mut candidate = self.get(&event.id)?.clone();
        let metrics = self.metrics();
        candidate.sizex = Self::span_for(event.width, metrics.col_width);
        candidate.sizey = Self::span_for(event.height, metrics.row_height);
        self.commit(candidate)
    }

    fn commit_drop(&mut self, id: &str, cell: Cell) -> Option<Placement> {
        let mut candidate = self.get(id)?.clone();
        candidate.col = cell.col.min(self.config.max_cols.saturating_sub(candidate.sizex));
        candidate.row = cell.row.min(self.config.max_rows.saturating_sub(candidate.sizey));
        self.commit(candidate)
    }

    fn commit_config(&mut self, config: &GridItemConfig) -> Option<Placement> {
        self.commit(config.clone())
    }

    fn update_data(&mut self, id: &str, data: &Value) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.component.data = data.clone();
        }
    }

    fn remove(&mut self, id: &str) -> Option<GridItemConfig> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }
}
