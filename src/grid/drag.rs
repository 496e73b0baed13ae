//! Drag coordination between grid items, the container and the application.
//!
//! One coordinator is constructed per board and handed to every item. The
//! dragging item calls [`DragCoordinator::start_drag`]; whoever resolves the
//! drop calls [`DragCoordinator::finish_drag`]. Everyone else only listens.
//!
//! Streams are hot: a receiver only sees events published after it was
//! created, and dropping the receiver unsubscribes.

use crate::grid::config::{Cell, GridItemConfig};
use crate::grid::geometry::{Point, Size};
use crate::grid::pointer::PointerEvent;
use std::cell::RefCell;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Where the dragged item's box sat when the drag started.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAnchor {
    pub item_id: String,
    pub origin: Point,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragNotice {
    pub config: GridItemConfig,
    pub pointer: Point,
    pub source: ElementAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    Started(DragNotice),
    Moved(DragNotice),
    DroppedInside { notice: DragNotice, cell: Cell },
    DroppedOutside(DragNotice),
}

impl DragEvent {
    pub fn notice(&self) -> &DragNotice {
        match self {
            DragEvent::Started(notice)
            | DragEvent::Moved(notice)
            | DragEvent::DroppedOutside(notice)
            | DragEvent::DroppedInside { notice, .. } => notice,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.notice().config.id
    }

    pub fn ends_drag(&self) -> bool {
        matches!(
            self,
            DragEvent::DroppedInside { .. } | DragEvent::DroppedOutside(_)
        )
    }
}

/// Payload of the drop-outside stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DragResult {
    pub config: GridItemConfig,
    pub pointer: Point,
}

/// The drag currently in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub config: GridItemConfig,
    pub origin_pointer: Point,
    pub last_pointer: Point,
    pub anchor: ElementAnchor,
}

impl DragSession {
    /// Where the dragged box would sit if it followed the pointer.
    pub fn element_position(&self) -> Point {
        self.anchor
            .origin
            .translate(self.last_pointer.offset_from(self.origin_pointer))
    }

    fn notice(&self) -> DragNotice {
        DragNotice {
            config: self.config.clone(),
            pointer: self.last_pointer,
            source: self.anchor.clone(),
        }
    }
}

#[derive(Default)]
pub struct DragCoordinator {
    session: RefCell<Option<DragSession>>,
    subscribers: RefCell<Vec<Sender<DragEvent>>>,
    outside_subscribers: RefCell<Vec<Sender<DragResult>>>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every drag lifecycle event.
    pub fn subscribe(&self) -> Receiver<DragEvent> {
        let (tx, rx) = channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Subscribe to drags that ended outside any grid cell.
    pub fn dropped_outside(&self) -> Receiver<DragResult> {
        let (tx, rx) = channel();
        self.outside_subscribers.borrow_mut().push(tx);
        rx
    }

    pub fn is_dragging(&self) -> bool {
        self.session.borrow().is_some()
    }

    pub fn session(&self) -> Option<DragSession> {
        self.session.borrow().clone()
    }

    pub fn start_drag(&self, config: &GridItemConfig, event: &PointerEvent, anchor: ElementAnchor) {
        let session = DragSession {
            config: config.clone(),
            origin_pointer: event.position,
            last_pointer: event.position,
            anchor,
        };
        if let Some(previous) = self.session.borrow_mut().replace(session.clone()) {
            tracing::warn!(
                abandoned = %previous.config.id,
                item = %config.id,
                "drag started while another drag was active"
            );
        }
        tracing::debug!(item = %config.id, x = event.position.x, y = event.position.y, "drag started");
        self.publish(DragEvent::Started(session.notice()));
    }

    /// Track the pointer of the active drag. Returns the dragged element's
    /// new position, or `None` when no drag is active.
    pub fn move_drag(&self, pointer: Point) -> Option<Point> {
        let notice = {
            let mut session = self.session.borrow_mut();
            let session = session.as_mut()?;
            session.last_pointer = pointer;
            (session.notice(), session.element_position())
        };
        self.publish(DragEvent::Moved(notice.0));
        Some(notice.1)
    }

    /// End the active drag, inside the grid at `target` or outside it when
    /// `target` is `None`.
    pub fn finish_drag(&self, pointer: Point, target: Option<Cell>) -> Option<DragSession> {
        let mut session = self.session.borrow_mut().take()?;
        session.last_pointer = pointer;
        let notice = session.notice();
        match target {
            Some(cell) => {
                tracing::debug!(item = %session.config.id, col = cell.col, row = cell.row, "dropped inside grid");
                self.publish(DragEvent::DroppedInside { notice, cell });
            }
            None => {
                tracing::info!(item = %session.config.id, "dropped outside grid");
                let result = DragResult {
                    config: notice.config.clone(),
                    pointer,
                };
                self.outside_subscribers
                    .borrow_mut()
                    .retain(|tx| tx.send(result.clone()).is_ok());
                self.publish(DragEvent::DroppedOutside(notice));
            }
        }
        Some(session)
    }

    /// Discard the active drag without notifying anyone.
    pub fn cancel_drag(&self) -> Option<DragSession> {
        let session = self.session.borrow_mut().take();
        if let Some(session) = &session {
            tracing::debug!(item = %session.config.id, "drag cancelled");
        }
        session
    }

    fn publish(&self, event: DragEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
