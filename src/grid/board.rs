//! A grid board: the container that owns the placed items, routes pointer
//! input to them and settles their gestures against the [`Grid`].

use crate::grid::config::{Cell, GridConfig, GridItemConfig};
use crate::grid::drag::{DragCoordinator, DragEvent, DragResult, ElementAnchor};
use crate::grid::error::WiringError;
use crate::grid::geometry::{Point, Size};
use crate::grid::item::{GridItem, ItemEvent};
use crate::grid::layout::{Grid, GridContainer, Placement};
use crate::grid::pointer::{PointerEvent, PointerKind, PointerResponse};
use crate::grid::widgets::WidgetRegistry;
use crate::settings::Settings;
use hashlink::LinkedHashMap;
use serde_json::Value;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Layout changes reported to the application after [`Board::pump`].
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    DataChanged { id: String, data: Value },
    Moved { config: GridItemConfig },
    Resized { config: GridItemConfig },
    Replaced { config: GridItemConfig },
    /// An item dragged in from outside the board was placed.
    Added { config: GridItemConfig },
    /// The grid refused a move, resize or replacement; the item kept `config`.
    Rejected { config: GridItemConfig },
    DroppedOutside { config: GridItemConfig },
    Removed { id: String },
}

/// The box following the pointer while an item is dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGhost {
    pub config: GridItemConfig,
    pub position: Point,
    pub size: Size,
}

pub struct Board {
    grid: Grid,
    items: LinkedHashMap<String, GridItem>,
    registry: WidgetRegistry,
    coordinator: Rc<DragCoordinator>,
    item_tx: Sender<ItemEvent>,
    item_rx: Receiver<ItemEvent>,
    drag_rx: Receiver<DragEvent>,
    outside_rx: Receiver<DragResult>,
    remove_on_drop_outside: bool,
    laid_out: bool,
    pub warnings: Vec<String>,
    event_cb: Option<Rc<dyn Fn(&BoardEvent)>>,
}

impl Board {
    pub fn new(grid: GridConfig, items: Vec<GridItemConfig>, registry: WidgetRegistry) -> Self {
        let coordinator = Rc::new(DragCoordinator::new());
        let drag_rx = coordinator.subscribe();
        let outside_rx = coordinator.dropped_outside();
        let (item_tx, item_rx) = channel();
        let (grid, mut warnings) = Grid::with_items(grid, items);
        for item in grid.items() {
            if !registry.contains(&item.component.widget_type) {
                warnings.push(format!(
                    "grid item '{}' uses unregistered widget '{}'",
                    item.id, item.component.widget_type
                ));
            }
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        let mut board = Self {
            grid,
            items: LinkedHashMap::new(),
            registry,
            coordinator,
            item_tx,
            item_rx,
            drag_rx,
            outside_rx,
            remove_on_drop_outside: false,
            laid_out: false,
            warnings,
            event_cb: None,
        };
        let configs = board.grid.items().to_vec();
        for config in configs {
            let item = board.make_item(config);
            board.items.insert(item.id().to_string(), item);
        }
        board
    }

    pub fn from_settings(
        settings: &Settings,
        items: Vec<GridItemConfig>,
        registry: WidgetRegistry,
    ) -> Self {
        let mut board = Self::new(settings.grid.clone(), items, registry);
        board.remove_on_drop_outside = settings.remove_on_drop_outside;
        board
    }

    pub fn with_event_callback(mut self, cb: Rc<dyn Fn(&BoardEvent)>) -> Self {
        self.event_cb = Some(cb);
        self
    }

    pub fn set_remove_on_drop_outside(&mut self, enabled: bool) {
        self.remove_on_drop_outside = enabled;
    }

    fn make_item(&self, config: GridItemConfig) -> GridItem {
        GridItem::new(
            config,
            self.grid.metrics(),
            self.coordinator.clone(),
            self.item_tx.clone(),
        )
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn coordinator(&self) -> &Rc<DragCoordinator> {
        &self.coordinator
    }

    pub fn item(&self, id: &str) -> Option<&GridItem> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut GridItem> {
        self.items.get_mut(id)
    }

    /// Items in paint order, bottom first.
    pub fn items(&self) -> impl Iterator<Item = &GridItem> + '_ {
        self.items.values()
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut GridItem> + '_ {
        self.items.values_mut()
    }

    /// Current configs in placement order.
    pub fn configs(&self) -> Vec<GridItemConfig> {
        self.grid.items().to_vec()
    }

    /// Mount every item's widget. Called once the board has been laid out.
    pub fn after_first_layout(&mut self) -> Result<(), WiringError> {
        self.laid_out = true;
        for item in self.items.values_mut() {
            item.after_first_layout(&self.registry)?;
        }
        Ok(())
    }

    pub fn drag_ghost(&self) -> Option<DragGhost> {
        let session = self.coordinator.session()?;
        Some(DragGhost {
            position: session.element_position(),
            size: session.anchor.size,
            config: session.config,
        })
    }

    /// Route one pointer sample. While an item is dragged the board tracks
    /// the pointer itself and resolves the drop on release.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> PointerResponse {
        if self.coordinator.is_dragging() {
            return match event.kind {
                PointerKind::Down => PointerResponse::Captured,
                PointerKind::Move => {
                    self.coordinator.move_drag(event.position);
                    PointerResponse::Captured
                }
                PointerKind::Up => {
                    self.coordinator.move_drag(event.position);
                    let target = self.drop_target(event.position);
                    self.coordinator.finish_drag(event.position, target);
                    PointerResponse::Captured
                }
            };
        }

        match event.kind {
            PointerKind::Down => {
                // Topmost first.
                let ids: Vec<String> = self.items.keys().cloned().collect();
                for id in ids.iter().rev() {
                    if let Some(item) = self.items.get_mut(id) {
                        if item.handle_pointer(event).is_captured() {
                            return PointerResponse::Captured;
                        }
                    }
                }
                PointerResponse::Ignored
            }
            PointerKind::Move | PointerKind::Up => {
                if let Some(item) = self.items.values_mut().find(|i| i.is_resizing()) {
                    return item.handle_pointer(event);
                }
                let mut response = PointerResponse::Ignored;
                for item in self.items.values_mut() {
                    if item.handle_pointer(event).is_captured() {
                        response = PointerResponse::Captured;
                    }
                }
                response
            }
        }
    }

    /// Start dragging a config the board does not hold yet, from a palette
    /// or another surface. Its box hangs from the pointer by the top-left.
    /// Returns `false` when a drag is already active or the id is taken.
    pub fn start_external_drag(&mut self, config: GridItemConfig, pointer: Point) -> bool {
        if self.coordinator.is_dragging() {
            return false;
        }
        if self.items.contains_key(&config.id) {
            tracing::warn!(item = %config.id, "external drag ignored, id already on the board");
            return false;
        }
        let anchor = ElementAnchor {
            item_id: config.id.clone(),
            origin: pointer,
            size: config.pixel_size(self.grid.metrics()),
        };
        self.coordinator
            .start_drag(&config, &PointerEvent::down(pointer.x, pointer.y), anchor);
        true
    }

    /// Cell the dragged box lands on, or `None` when released off the grid.
    fn drop_target(&self, pointer: Point) -> Option<Cell> {
        self.grid.cell_at(pointer)?;
        let session = self.coordinator.session()?;
        let origin = session.element_position();
        let grid = self.grid.grid();
        let metrics = grid.metrics();
        let nearest = |offset: f32, extent: f32, count: u32| -> u32 {
            let index = if extent > 0.0 { (offset / extent).round() } else { 0.0 };
            (index.max(0.0) as u32).min(count.saturating_sub(1))
        };
        Some(Cell::new(
            nearest(origin.x, metrics.col_width, grid.max_cols),
            nearest(origin.y, metrics.row_height, grid.max_rows),
        ))
    }

    /// Abandon any gesture in progress without committing it.
    pub fn cancel_gesture(&mut self) {
        self.coordinator.cancel_drag();
        for item in self.items.values_mut() {
            item.cancel_gesture();
        }
    }

    /// Drain item, drag and widget streams and commit the resulting changes
    /// to the grid.
    pub fn pump(&mut self) -> Result<Vec<BoardEvent>, WiringError> {
        let mut out = Vec::new();
        for item in self.items.values_mut() {
            item.pump(&self.registry)?;
        }

        let drag_events: Vec<DragEvent> = self.drag_rx.try_iter().collect();
        for event in drag_events {
            let DragEvent::DroppedInside { notice, cell } = event else {
                continue;
            };
            if !self.items.contains_key(&notice.config.id) {
                out.push(self.place_dropped(notice.config, cell)?);
                continue;
            }
            if let Some(placement) = self.grid.commit_drop(&notice.config.id, cell) {
                out.push(self.settle(placement, |config| BoardEvent::Moved { config })?);
            }
        }

        let item_events: Vec<ItemEvent> = self.item_rx.try_iter().collect();
        for event in item_events {
            match event {
                ItemEvent::Resize(_) => {}
                ItemEvent::ResizeStop(resize) => {
                    if let Some(placement) = self.grid.commit_resize(&resize) {
                        out.push(self.settle(placement, |config| BoardEvent::Resized { config })?);
                    }
                }
                ItemEvent::DataChanged { id, data } => {
                    self.grid.update_data(&id, &data);
                    out.push(BoardEvent::DataChanged { id, data });
                }
                ItemEvent::ConfigReplaced { config } => {
                    if let Some(placement) = self.grid.commit_config(&config) {
                        out.push(self.settle(placement, |config| BoardEvent::Replaced { config })?);
                    }
                }
            }
        }

        let outside: Vec<DragResult> = self.outside_rx.try_iter().collect();
        for result in outside {
            let id = result.config.id.clone();
            out.push(BoardEvent::DroppedOutside {
                config: result.config,
            });
            if self.remove_on_drop_outside && self.remove_item(&id).is_some() {
                out.push(BoardEvent::Removed { id });
            }
        }

        if let Some(cb) = &self.event_cb {
            for event in &out {
                cb(event);
            }
        }
        Ok(out)
    }

    /// Push the grid's verdict back to the item and describe it.
    fn settle(
        &mut self,
        placement: Placement,
        accepted: impl FnOnce(GridItemConfig) -> BoardEvent,
    ) -> Result<BoardEvent, WiringError> {
        let was_accepted = placement.is_accepted();
        let config = placement.into_config();
        self.push_config(config.clone())?;
        Ok(if was_accepted {
            accepted(config)
        } else {
            BoardEvent::Rejected { config }
        })
    }

    /// Insert an externally dragged config with its top-left on `cell`,
    /// shifted left/up so the whole span fits.
    fn place_dropped(&mut self, mut config: GridItemConfig, cell: Cell) -> Result<BoardEvent, WiringError> {
        let grid = self.grid.grid();
        config.col = cell.col.min(grid.max_cols.saturating_sub(config.sizex.max(1)));
        config.row = cell.row.min(grid.max_rows.saturating_sub(config.sizey.max(1)));
        if !self.add_item(config.clone())? {
            return Ok(BoardEvent::Rejected { config });
        }
        let stored = self.grid.get(&config.id).cloned().unwrap_or(config);
        tracing::info!(item = %stored.id, col = stored.col, row = stored.row, "dragged-in item placed");
        Ok(BoardEvent::Added { config: stored })
    }

    /// Hand the grid's verdict back to the item.
    fn push_config(&mut self, config: GridItemConfig) -> Result<(), WiringError> {
        if let Some(item) = self.items.get_mut(&config.id) {
            item.apply_config(config, &self.registry)?;
            item.snap_to_config();
        }
        Ok(())
    }

    /// Place a new item. Returns `false` when the grid rejected the placement.
    pub fn add_item(&mut self, config: GridItemConfig) -> Result<bool, WiringError> {
        if let Err(warning) = self.grid.insert(config.clone()) {
            tracing::warn!("{warning}");
            self.warnings.push(warning);
            return Ok(false);
        }
        let stored = self.grid.get(&config.id).cloned().unwrap_or(config);
        let mut item = self.make_item(stored);
        if self.laid_out {
            item.after_first_layout(&self.registry)?;
        }
        self.items.insert(item.id().to_string(), item);
        Ok(true)
    }

    /// Remove an item. Its widget is destroyed and its subscriptions released.
    pub fn remove_item(&mut self, id: &str) -> Option<GridItemConfig> {
        if self
            .coordinator
            .session()
            .is_some_and(|s| s.config.id == id)
        {
            self.coordinator.cancel_drag();
        }
        let mut item = self.items.remove(id)?;
        item.teardown();
        tracing::info!(item = %id, "grid item removed");
        self.grid.remove(id)
    }

    /// Replace the whole item set. Items whose id survives are kept and only
    /// remounted when their widget type changed.
    pub fn replace_items(&mut self, items: Vec<GridItemConfig>) -> Result<(), WiringError> {
        self.coordinator.cancel_drag();
        let (grid, warnings) = Grid::with_items(self.grid.grid().clone(), items);
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        self.grid = grid;
        self.warnings = warnings;

        let mut reusable = std::mem::take(&mut self.items);
        let configs = self.grid.items().to_vec();
        for config in configs {
            let item = match reusable.remove(&config.id) {
                Some(mut item) => {
                    item.cancel_gesture();
                    item.apply_config(config, &self.registry)?;
                    item.snap_to_config();
                    item
                }
                None => {
                    let mut item = self.make_item(config);
                    if self.laid_out {
                        item.after_first_layout(&self.registry)?;
                    }
                    item
                }
            };
            self.items.insert(item.id().to_string(), item);
        }
        // Whatever is left in `reusable` is dropped and torn down here.
        Ok(())
    }
}
