pub mod board;
pub mod config;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod item;
pub mod layout;
pub mod pointer;
#[cfg(feature = "egui")]
pub mod surface;
pub mod widgets;

pub use board::{Board, BoardEvent, DragGhost};
pub use config::{Cell, CellMetrics, ComponentRef, ConfigChange, GridConfig, GridItemConfig, WidgetType};
pub use drag::{DragCoordinator, DragEvent, DragResult};
pub use error::{Capability, WiringError};
pub use geometry::{CursorHint, Point, ResizeAxis, Size};
pub use item::{GridItem, ItemEvent, ItemState, ResizeEvent};
pub use layout::{Grid, GridContainer, Placement};
pub use pointer::{PointerEvent, PointerKind, PointerResponse};
pub use widgets::{HostedWidget, WidgetDescriptor, WidgetFactory, WidgetRegistry};
