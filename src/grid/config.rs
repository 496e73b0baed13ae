use crate::grid::geometry::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

fn default_grid_id() -> String {
    "grid".into()
}

fn default_max_cols() -> u32 {
    5
}

fn default_max_rows() -> u32 {
    5
}

fn default_cell_extent() -> f32 {
    100.0
}

fn default_span() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_border_size() -> f32 {
    10.0
}

fn empty_data() -> Value {
    Value::Object(Default::default())
}

/// Grid definition shared by every item placed on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    #[serde(default = "default_grid_id")]
    pub id: String,
    #[serde(default = "default_max_cols")]
    pub max_cols: u32,
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
    #[serde(default = "default_cell_extent")]
    pub col_width: f32,
    #[serde(default = "default_cell_extent")]
    pub row_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            id: default_grid_id(),
            max_cols: default_max_cols(),
            max_rows: default_max_rows(),
            col_width: default_cell_extent(),
            row_height: default_cell_extent(),
        }
    }
}

impl GridConfig {
    pub fn metrics(&self) -> CellMetrics {
        CellMetrics {
            col_width: self.col_width,
            row_height: self.row_height,
        }
    }

    /// Pixel extent of the whole grid.
    pub fn pixel_size(&self) -> Size {
        Size::new(
            self.max_cols as f32 * self.col_width,
            self.max_rows as f32 * self.row_height,
        )
    }
}

/// Pixel size of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub col_width: f32,
    pub row_height: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            col_width: default_cell_extent(),
            row_height: default_cell_extent(),
        }
    }
}

/// A grid cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
}

impl Cell {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Name under which a hosted widget factory is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetType(String);

impl WidgetType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Which widget an item hosts and the payload it starts from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentRef {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    #[serde(default = "empty_data")]
    pub data: Value,
}

impl ComponentRef {
    pub fn new(widget_type: impl Into<WidgetType>) -> Self {
        Self {
            widget_type: widget_type.into(),
            data: empty_data(),
        }
    }
}

/// Descriptor of one item on the grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridItemConfig {
    pub id: String,
    #[serde(default)]
    pub col: u32,
    #[serde(default)]
    pub row: u32,
    #[serde(default = "default_span")]
    pub sizex: u32,
    #[serde(default = "default_span")]
    pub sizey: u32,
    #[serde(default = "default_true")]
    pub draggable: bool,
    #[serde(default = "default_true")]
    pub resizable: bool,
    #[serde(default = "default_border_size")]
    pub border_size: f32,
    pub component: ComponentRef,
}

impl GridItemConfig {
    pub fn with_widget(id: &str, widget: &str, col: u32, row: u32) -> Self {
        Self {
            id: id.to_string(),
            col,
            row,
            sizex: default_span(),
            sizey: default_span(),
            draggable: true,
            resizable: true,
            border_size: default_border_size(),
            component: ComponentRef::new(widget),
        }
    }

    pub fn with_span(mut self, sizex: u32, sizey: u32) -> Self {
        self.sizex = sizex;
        self.sizey = sizey;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.component.data = data;
        self
    }

    pub fn pixel_size(&self, metrics: CellMetrics) -> Size {
        Size::new(
            self.sizex as f32 * metrics.col_width,
            self.sizey as f32 * metrics.row_height,
        )
    }

    pub fn pixel_origin(&self, metrics: CellMetrics) -> Point {
        Point::new(
            self.col as f32 * metrics.col_width,
            self.row as f32 * metrics.row_height,
        )
    }

    /// Whether the item lies entirely within `grid`.
    pub fn fits(&self, grid: &GridConfig) -> bool {
        self.sizex >= 1
            && self.sizey >= 1
            && self.col + self.sizex <= grid.max_cols
            && self.row + self.sizey <= grid.max_rows
    }

    pub fn overlaps(&self, other: &GridItemConfig) -> bool {
        self.col < other.col + other.sizex
            && other.col < self.col + self.sizex
            && self.row < other.row + other.sizey
            && other.row < self.row + self.sizey
    }

    /// Field-level comparison against the config that replaces this one.
    pub fn diff(&self, next: &GridItemConfig) -> ConfigChange {
        ConfigChange {
            position: self.col != next.col || self.row != next.row,
            size: self.sizex != next.sizex || self.sizey != next.sizey,
            widget_type: self.component.widget_type != next.component.widget_type,
            data: self.component.data != next.component.data,
            flags: self.draggable != next.draggable
                || self.resizable != next.resizable
                || self.border_size != next.border_size,
        }
    }
}

/// Which parts of an item config changed between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigChange {
    pub position: bool,
    pub size: bool,
    pub widget_type: bool,
    pub data: bool,
    pub flags: bool,
}

impl ConfigChange {
    pub fn is_empty(&self) -> bool {
        !(self.position || self.size || self.widget_type || self.data || self.flags)
    }

    pub fn needs_remount(&self) -> bool {
        self.widget_type
    }
}
