//! A single grid item: its visual box, the pointer state machine that turns
//! presses into drags or resizes, and the hosted widget mounted inside it.

use crate::grid::config::{CellMetrics, ConfigChange, GridItemConfig, WidgetType};
use crate::grid::drag::{DragCoordinator, DragEvent, ElementAnchor};
use crate::grid::error::{Capability, WiringError};
use crate::grid::geometry::{can_resize, resize_candidate, CursorHint, Point, ResizeAxis, Size};
use crate::grid::pointer::{PointerEvent, PointerKind, PointerResponse};
use crate::grid::widgets::{HostedWidget, WidgetRegistry};
use serde_json::Value;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender};

/// Pixel size reported while resizing and when a resize settles.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeEvent {
    pub id: String,
    /// Column of the item.
    pub x: u32,
    /// Row of the item.
    pub y: u32,
    pub width: f32,
    pub height: f32,
}

/// Events an item raises towards its container.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEvent {
    Resize(ResizeEvent),
    ResizeStop(ResizeEvent),
    DataChanged { id: String, data: Value },
    ConfigReplaced { config: GridItemConfig },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeState {
    pub origin_pointer: Point,
    pub origin_size: Size,
    pub axis: ResizeAxis,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemState {
    #[default]
    Idle,
    /// Hidden while the coordinator carries the drag.
    DraggingSelf,
    Resizing(ResizeState),
}

/// The item's on-screen box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBox {
    pub position: Point,
    pub size: Size,
    pub visible: bool,
    pub cursor: CursorHint,
}

impl ItemBox {
    pub fn contains(&self, point: Point) -> bool {
        let local = point.offset_from(self.position);
        local.x >= 0.0 && local.y >= 0.0 && local.x < self.size.width && local.y < self.size.height
    }

    /// CSS-style transform placing the box.
    pub fn transform(&self) -> String {
        format!("translate({}px, {}px)", self.position.x, self.position.y)
    }
}

struct MountedWidget {
    widget_type: WidgetType,
    widget: Box<dyn HostedWidget>,
    data_rx: Receiver<Value>,
    config_rx: Option<Receiver<GridItemConfig>>,
}

pub struct GridItem {
    config: GridItemConfig,
    metrics: CellMetrics,
    element: ItemBox,
    state: ItemState,
    mounted: Option<MountedWidget>,
    laid_out: bool,
    coordinator: Rc<DragCoordinator>,
    drag_events: Option<Receiver<DragEvent>>,
    events: Sender<ItemEvent>,
    dirty: bool,
    torn_down: bool,
}

impl GridItem {
    pub fn new(
        config: GridItemConfig,
        metrics: CellMetrics,
        coordinator: Rc<DragCoordinator>,
        events: Sender<ItemEvent>,
    ) -> Self {
        let element = ItemBox {
            position: config.pixel_origin(metrics),
            size: config.pixel_size(metrics),
            visible: true,
            cursor: CursorHint::Auto,
        };
        let drag_events = Some(coordinator.subscribe());
        tracing::debug!(item = %config.id, widget = %config.component.widget_type, "grid item created");
        Self {
            config,
            metrics,
            element,
            state: ItemState::Idle,
            mounted: None,
            laid_out: false,
            coordinator,
            drag_events,
            events,
            dirty: true,
            torn_down: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &GridItemConfig {
        &self.config
    }

    pub fn element(&self) -> &ItemBox {
        &self.element
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.element.visible
    }

    pub fn cursor(&self) -> CursorHint {
        self.element.cursor
    }

    pub fn mounted_type(&self) -> Option<&WidgetType> {
        self.mounted.as_ref().map(|m| &m.widget_type)
    }

    pub fn widget_mut(&mut self) -> Option<&mut (dyn HostedWidget + 'static)> {
        self.mounted.as_mut().map(|m| m.widget.as_mut())
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Returns and clears the re-render flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// The box has been laid out once; mount the hosted widget now.
    pub fn after_first_layout(&mut self, registry: &WidgetRegistry) -> Result<(), WiringError> {
        if self.torn_down || self.laid_out {
            return Ok(());
        }
        self.laid_out = true;
        self.inject_widget(registry).map(|_| ())
    }

    pub fn set_metrics(&mut self, metrics: CellMetrics) {
        if self.metrics == metrics {
            return;
        }
        self.metrics = metrics;
        self.element.size = self.config.pixel_size(metrics);
        self.element.position = self.config.pixel_origin(metrics);
        self.mark_dirty();
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> PointerResponse {
        if self.torn_down {
            return PointerResponse::Ignored;
        }
        match event.kind {
            PointerKind::Move => self.on_pointer_move(event),
            PointerKind::Down => self.on_pointer_down(event),
            PointerKind::Up => self.on_pointer_up(),
        }
    }

    fn on_pointer_move(&mut self, event: &PointerEvent) -> PointerResponse {
        let ItemState::Resizing(resize) = self.state else {
            self.set_cursor(self.hover_cursor(event.position));
            return PointerResponse::Ignored;
        };

        self.set_cursor(resize.axis.cursor());
        let delta = event.position.offset_from(resize.origin_pointer);
        let candidate = resize_candidate(resize.origin_size, delta);
        self.emit(ItemEvent::Resize(ResizeEvent {
            id: self.config.id.clone(),
            x: self.config.col,
            y: self.config.row,
            width: candidate.width,
            height: candidate.height,
        }));

        let mut size = self.element.size;
        if resize.axis.affects_width() {
            size.width = candidate.width;
        }
        if resize.axis.affects_height() {
            size.height = candidate.height;
        }
        self.element.size = size;
        self.mark_dirty();
        PointerResponse::Captured
    }

    fn on_pointer_down(&mut self, event: &PointerEvent) -> PointerResponse {
        if !matches!(self.state, ItemState::Idle)
            || !self.element.visible
            || !self.element.contains(event.position)
        {
            return PointerResponse::Ignored;
        }

        let offset = event.position.offset_from(self.element.position);
        match can_resize(
            offset,
            self.element.size,
            self.config.border_size,
            self.config.resizable,
        ) {
            Some(axis) => {
                tracing::debug!(item = %self.config.id, ?axis, "resize started");
                self.state = ItemState::Resizing(ResizeState {
                    origin_pointer: event.position,
                    origin_size: self.element.size,
                    axis,
                });
                self.set_cursor(axis.cursor());
                PointerResponse::Captured
            }
            None if self.config.draggable => {
                self.state = ItemState::DraggingSelf;
                let anchor = ElementAnchor {
                    item_id: self.config.id.clone(),
                    origin: self.element.position,
                    size: self.element.size,
                };
                self.coordinator.start_drag(&self.config, event, anchor);
                self.element.visible = false;
                self.mark_dirty();
                PointerResponse::Captured
            }
            None => PointerResponse::Ignored,
        }
    }

    fn on_pointer_up(&mut self) -> PointerResponse {
        if !matches!(self.state, ItemState::Resizing(_)) {
            return PointerResponse::Ignored;
        }
        self.state = ItemState::Idle;
        let size = self.element.size;
        tracing::debug!(item = %self.config.id, width = size.width, height = size.height, "resize stopped");
        self.emit(ItemEvent::ResizeStop(ResizeEvent {
            id: self.config.id.clone(),
            x: self.config.col,
            y: self.config.row,
            width: size.width,
            height: size.height,
        }));
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.widget.item_loaded(&self.config);
        }
        self.mark_dirty();
        PointerResponse::Captured
    }

    fn hover_cursor(&self, pointer: Point) -> CursorHint {
        if !self.element.visible || !self.element.contains(pointer) {
            return CursorHint::Auto;
        }
        CursorHint::from_axis(can_resize(
            pointer.offset_from(self.element.position),
            self.element.size,
            self.config.border_size,
            self.config.resizable,
        ))
    }

    fn set_cursor(&mut self, cursor: CursorHint) {
        if self.element.cursor != cursor {
            self.element.cursor = cursor;
            self.mark_dirty();
        }
    }

    /// Reset the box to the pixel geometry of the current config, discarding
    /// any size left over from a rejected gesture.
    pub fn snap_to_config(&mut self) {
        let size = self.config.pixel_size(self.metrics);
        let position = self.config.pixel_origin(self.metrics);
        if self.element.size != size || self.element.position != position {
            self.element.size = size;
            self.element.position = position;
            self.mark_dirty();
        }
    }

    /// Abandon the current gesture without reporting it. A dragged box is
    /// shown again and a resized box returns to its config size.
    pub fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.state) {
            ItemState::Idle => {}
            ItemState::DraggingSelf => {
                self.element.visible = true;
                self.mark_dirty();
            }
            ItemState::Resizing(_) => {
                self.element.cursor = CursorHint::Auto;
                self.snap_to_config();
                self.mark_dirty();
            }
        }
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, ItemState::Resizing(_))
    }

    /// Drain drag notifications and the hosted widget's streams.
    pub fn pump(&mut self, registry: &WidgetRegistry) -> Result<(), WiringError> {
        if self.torn_down {
            return Ok(());
        }

        let drops: Vec<DragEvent> = match &self.drag_events {
            Some(rx) => rx
                .try_iter()
                .filter(|e| e.ends_drag() && e.item_id() == self.config.id)
                .collect(),
            None => Vec::new(),
        };
        if !drops.is_empty() && matches!(self.state, ItemState::DraggingSelf) {
            self.state = ItemState::Idle;
            self.element.visible = true;
            self.mark_dirty();
        }

        let (payloads, configs) = match &self.mounted {
            Some(mounted) => (
                mounted.data_rx.try_iter().collect::<Vec<_>>(),
                mounted
                    .config_rx
                    .as_ref()
                    .map(|rx| rx.try_iter().collect::<Vec<_>>())
                    .unwrap_or_default(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        for data in payloads {
            self.config.component.data = data.clone();
            self.emit(ItemEvent::DataChanged {
                id: self.config.id.clone(),
                data,
            });
            self.mark_dirty();
        }
        for config in configs {
            if !self.owns(&config) {
                continue;
            }
            self.emit(ItemEvent::ConfigReplaced {
                config: config.clone(),
            });
            self.apply_config(config, registry)?;
        }
        Ok(())
    }

    /// Adopt a new config, from the container or from the hosted widget.
    pub fn apply_config(
        &mut self,
        config: GridItemConfig,
        registry: &WidgetRegistry,
    ) -> Result<ConfigChange, WiringError> {
        if !self.owns(&config) {
            return Ok(ConfigChange::default());
        }
        let change = self.config.diff(&config);
        if change.is_empty() {
            return Ok(change);
        }
        self.config = config;
        if change.size {
            self.element.size = self.config.pixel_size(self.metrics);
        }
        if change.position {
            self.element.position = self.config.pixel_origin(self.metrics);
        }
        self.mark_dirty();

        if self.laid_out && !self.torn_down {
            if change.needs_remount() {
                self.inject_widget(registry)?;
            } else if change.data {
                if let Some(mounted) = self.mounted.as_mut() {
                    mounted.widget.on_data_updated(&self.config.component.data);
                }
            }
        }
        Ok(change)
    }

    /// The id is fixed for the item's lifetime; configs naming another id
    /// are ignored.
    fn owns(&self, config: &GridItemConfig) -> bool {
        if config.id == self.config.id {
            return true;
        }
        tracing::warn!(item = %self.config.id, requested = %config.id, "ignoring config for a different item id");
        false
    }

    /// Mount the widget named by `config.component.type` unless it is already
    /// mounted. Returns whether a new instance was created.
    fn inject_widget(&mut self, registry: &WidgetRegistry) -> Result<bool, WiringError> {
        let widget_type = self.config.component.widget_type.clone();
        if self.mounted_type() == Some(&widget_type) {
            return Ok(false);
        }
        self.destroy_widget();

        let mut widget = registry.create(&widget_type, &self.config.component.data)?;
        let Some(data_rx) = widget.data_changed() else {
            tracing::error!(item = %self.config.id, widget = %widget_type, "widget does not provide a data stream");
            widget.destroy();
            return Err(WiringError::MissingCapability {
                widget: widget_type,
                capability: Capability::DataChanged,
            });
        };
        let config_rx = widget.config_changed();
        widget.item_loaded(&self.config);

        tracing::debug!(item = %self.config.id, widget = %widget_type, "widget mounted");
        self.mounted = Some(MountedWidget {
            widget_type,
            widget,
            data_rx,
            config_rx,
        });
        self.mark_dirty();
        Ok(true)
    }

    fn destroy_widget(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            tracing::debug!(item = %self.config.id, widget = %mounted.widget_type, "widget destroyed");
            mounted.widget.destroy();
        }
    }

    /// Release every subscription and the hosted widget. An active resize or
    /// drag is abandoned without a stop event.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.state = ItemState::Idle;
        self.drag_events = None;
        self.destroy_widget();
        tracing::debug!(item = %self.config.id, "grid item torn down");
    }

    fn emit(&self, event: ItemEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!(item = %self.config.id, "item event dropped, container gone");
        }
    }
}

impl Drop for GridItem {
    fn drop(&mut self) {
        self.teardown();
    }
}
