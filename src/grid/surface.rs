//! egui rendering surface for a [`Board`].

use crate::grid::board::Board;
use crate::grid::error::WiringError;
use crate::grid::geometry::{CursorHint, Point};
use crate::grid::layout::GridContainer;
use crate::grid::pointer::{PointerEvent, PointerKind};
use eframe::egui;

fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Auto => egui::CursorIcon::Default,
        CursorHint::EwResize => egui::CursorIcon::ResizeHorizontal,
        CursorHint::NsResize => egui::CursorIcon::ResizeVertical,
        CursorHint::NwseResize => egui::CursorIcon::ResizeNwSe,
    }
}

fn to_rect(origin: egui::Pos2, position: Point, width: f32, height: f32) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + egui::vec2(position.x, position.y),
        egui::vec2(width, height),
    )
}

/// Pointer samples for this frame in board coordinates.
fn pointer_events(ui: &egui::Ui, origin: egui::Pos2) -> Vec<PointerEvent> {
    ui.input(|i| {
        let Some(pos) = i.pointer.interact_pos().or(i.pointer.hover_pos()) else {
            return Vec::new();
        };
        let position = Point::new(pos.x - origin.x, pos.y - origin.y);
        let mut events = vec![PointerEvent {
            kind: PointerKind::Move,
            position,
        }];
        if i.pointer.primary_pressed() {
            events.push(PointerEvent {
                kind: PointerKind::Down,
                position,
            });
        }
        if i.pointer.primary_released() {
            events.push(PointerEvent {
                kind: PointerKind::Up,
                position,
            });
        }
        events
    })
}

/// Draw `board`, feed it this frame's pointer input and pump it.
pub fn board_ui(board: &mut Board, ui: &mut egui::Ui) -> Result<(), WiringError> {
    let grid_size = board.grid().grid().pixel_size();
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(grid_size.width, grid_size.height),
        egui::Sense::click_and_drag(),
    );
    let origin = rect.min;

    for event in pointer_events(ui, origin) {
        board.handle_pointer(&event);
    }
    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        board.cancel_gesture();
    }
    board.pump()?;

    let painter = ui.painter_at(rect);
    painter.rect_stroke(rect, 0.0, ui.visuals().widgets.noninteractive.bg_stroke);

    let mut cursor = CursorHint::Auto;
    let mut changed = false;
    let mut child = ui.child_ui(rect, egui::Layout::top_down(egui::Align::LEFT));
    for item in board.items_mut() {
        changed |= item.take_dirty();
        if item.cursor() != CursorHint::Auto {
            cursor = item.cursor();
        }
        if !item.is_visible() {
            continue;
        }
        let element = *item.element();
        let item_rect = to_rect(origin, element.position, element.size.width, element.size.height);
        let item_clip = item_rect.intersect(child.clip_rect());
        child.allocate_ui_at_rect(item_rect, |item_ui| {
            item_ui.set_clip_rect(item_clip);
            egui::Frame::group(item_ui.style()).show(item_ui, |ui| {
                ui.set_min_size(item_rect.size() - egui::vec2(12.0, 12.0));
                if let Some(widget) = item.widget_mut() {
                    widget.ui(ui);
                }
            });
        });
    }

    if let Some(ghost) = board.drag_ghost() {
        let ghost_rect = to_rect(origin, ghost.position, ghost.size.width, ghost.size.height);
        painter.rect_filled(
            ghost_rect,
            4.0,
            ui.visuals().selection.bg_fill.gamma_multiply(0.4),
        );
        painter.text(
            ghost_rect.center(),
            egui::Align2::CENTER_CENTER,
            ghost.config.component.widget_type.as_str(),
            egui::FontId::proportional(14.0),
            ui.visuals().text_color(),
        );
    }

    if cursor != CursorHint::Auto {
        ui.ctx().set_cursor_icon(cursor_icon(cursor));
    }
    if changed {
        ui.ctx().request_repaint();
    }
    Ok(())
}

/// Minimal eframe application hosting a single board.
pub struct BoardApp {
    board: Board,
    error: Option<String>,
}

impl BoardApp {
    pub fn new(mut board: Board) -> Self {
        let error = board.after_first_layout().err().map(|e| e.to_string());
        Self { board, error }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.error {
                ui.colored_label(ui.visuals().error_fg_color, err);
                return;
            }
            if let Err(e) = board_ui(&mut self.board, ui) {
                tracing::error!(error = %e, "board wiring failed");
                self.error = Some(e.to_string());
            }
        });
    }
}
