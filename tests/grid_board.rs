use grid_board::grid::{
    Board, BoardEvent, CellMetrics, DragCoordinator, GridConfig, GridItem, GridItemConfig,
    HostedWidget, PointerEvent, WidgetDescriptor, WidgetRegistry,
};
use grid_board::session::Session;
use grid_board::settings::Settings;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use serial_test::serial;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

static RECORDS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));

fn record(entry: String) {
    RECORDS.lock().unwrap().push(entry);
}

fn take_records() -> Vec<String> {
    std::mem::take(&mut *RECORDS.lock().unwrap())
}

/// What a [`TracingWidget`] pushes through its config stream once loaded.
#[derive(Clone, Copy)]
enum OnLoad {
    Nothing,
    Widen,
    Rename,
}

/// Widget that logs its lifecycle and reacts once to being loaded.
struct TracingWidget {
    name: &'static str,
    on_load: OnLoad,
    data_rx: Option<Receiver<Value>>,
    _data_tx: Sender<Value>,
    config_tx: Sender<GridItemConfig>,
    config_rx: Option<Receiver<GridItemConfig>>,
}

impl HostedWidget for TracingWidget {
    fn item_loaded(&mut self, config: &GridItemConfig) {
        record(format!("{}:loaded:{}x{}", self.name, config.sizex, config.sizey));
        let mut next = config.clone();
        match std::mem::replace(&mut self.on_load, OnLoad::Nothing) {
            OnLoad::Nothing => return,
            OnLoad::Widen => next.sizex += 1,
            OnLoad::Rename => next.id = format!("{}-renamed", config.id),
        }
        let _ = self.config_tx.send(next);
    }

    fn data_changed(&mut self) -> Option<Receiver<Value>> {
        self.data_rx.take()
    }

    fn config_changed(&mut self) -> Option<Receiver<GridItemConfig>> {
        self.config_rx.take()
    }

    fn destroy(&mut self) {
        record(format!("{}:destroy", self.name));
    }
}

fn tracing_widget(name: &'static str, on_load: OnLoad) -> WidgetDescriptor {
    WidgetDescriptor::from_fn(move |_| {
        record(format!("{name}:create"));
        let (data_tx, data_rx) = channel();
        let (config_tx, config_rx) = channel();
        Box::new(TracingWidget {
            name,
            on_load,
            data_rx: Some(data_rx),
            _data_tx: data_tx,
            config_tx,
            config_rx: Some(config_rx),
        })
    })
}

fn registry() -> WidgetRegistry {
    let mut registry = WidgetRegistry::with_defaults();
    registry.register("note", tracing_widget("note", OnLoad::Nothing));
    registry.register("wide", tracing_widget("wide", OnLoad::Widen));
    registry.register("rogue", tracing_widget("rogue", OnLoad::Rename));
    registry
}

#[test]
fn item_box_follows_json_config() {
    let config: GridItemConfig = serde_json::from_value(json!({
        "id": "2",
        "col": 2,
        "row": 2,
        "sizex": 4,
        "sizey": 1,
        "component": { "type": "scratchpad", "data": { "content": "hello" } }
    }))
    .unwrap();
    let (tx, _rx) = channel();
    let item = GridItem::new(
        config,
        CellMetrics::default(),
        Rc::new(DragCoordinator::new()),
        tx,
    );
    assert_eq!(item.element().size.width, 400.0);
    assert_eq!(item.element().size.height, 100.0);
    assert_eq!(item.element().transform(), "translate(200px, 200px)");
}

#[test]
#[serial]
fn retyping_an_item_remounts_exactly_once() {
    take_records();
    let mut board = Board::new(
        GridConfig::default(),
        vec![GridItemConfig::with_widget("a", "note", 0, 0)],
        registry(),
    );
    assert!(take_records().is_empty());
    board.after_first_layout().unwrap();
    assert_eq!(take_records(), vec!["note:create", "note:loaded:1x1"]);

    let mut moved = board.configs();
    moved[0].col = 3;
    board.replace_items(moved.clone()).unwrap();
    assert!(take_records().is_empty());

    moved[0].component = grid_board::grid::ComponentRef::new("wide");
    board.replace_items(moved).unwrap();
    assert_eq!(
        take_records(),
        vec!["note:destroy", "wide:create", "wide:loaded:1x1"]
    );

    // The widget widens itself; the board adopts the new span.
    let events = board.pump().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, BoardEvent::Replaced { config } if config.sizex == 2)));
    assert_eq!(board.configs()[0].sizex, 2);

    drop(board);
    assert_eq!(take_records(), vec!["wide:destroy"]);
}

#[test]
#[serial]
fn drop_outside_removes_when_configured() {
    take_records();
    let settings = Settings {
        remove_on_drop_outside: true,
        ..Settings::default()
    };
    let mut board = Board::from_settings(
        &settings,
        vec![
            GridItemConfig::with_widget("keep", "note", 0, 0),
            GridItemConfig::with_widget("gone", "note", 2, 2),
        ],
        registry(),
    );
    board.after_first_layout().unwrap();
    take_records();

    board.handle_pointer(&PointerEvent::down(250.0, 250.0));
    board.handle_pointer(&PointerEvent::moved(700.0, 250.0));
    board.handle_pointer(&PointerEvent::up(700.0, 250.0));
    let events = board.pump().unwrap();

    assert_eq!(
        events,
        vec![
            BoardEvent::DroppedOutside {
                config: GridItemConfig::with_widget("gone", "note", 2, 2),
            },
            BoardEvent::Removed { id: "gone".into() },
        ]
    );
    assert_eq!(take_records(), vec!["note:destroy"]);
    let ids: Vec<_> = board.configs().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["keep"]);
}

#[test]
#[serial]
fn widget_cannot_rename_its_item() {
    take_records();
    let settings = Settings {
        remove_on_drop_outside: true,
        ..Settings::default()
    };
    let mut board = Board::from_settings(
        &settings,
        vec![GridItemConfig::with_widget("r", "rogue", 1, 1)],
        registry(),
    );
    board.after_first_layout().unwrap();
    assert!(board.pump().unwrap().is_empty());
    assert!(board.item("r").is_some());
    assert!(board.item("r-renamed").is_none());
    assert_eq!(board.configs()[0].id, "r");

    // The item is still reachable under its original id.
    board.handle_pointer(&PointerEvent::down(150.0, 150.0));
    board.handle_pointer(&PointerEvent::moved(700.0, 150.0));
    board.handle_pointer(&PointerEvent::up(700.0, 150.0));
    let events = board.pump().unwrap();
    assert_eq!(events.last(), Some(&BoardEvent::Removed { id: "r".into() }));
    assert!(board.configs().is_empty());
    assert_eq!(
        take_records(),
        vec!["rogue:create", "rogue:loaded:1x1", "rogue:destroy"]
    );
}

#[test]
fn replayed_session_moves_item() {
    let session: Session = serde_json::from_value(json!({
        "items": [
            { "id": "1", "col": 0, "row": 0, "component": { "type": "scratchpad" } }
        ],
        "steps": [
            { "kind": "down", "position": { "x": 50.0, "y": 50.0 } },
            { "kind": "move", "position": { "x": 250.0, "y": 150.0 } },
            { "kind": "up", "position": { "x": 250.0, "y": 150.0 } }
        ]
    }))
    .unwrap();
    let mut board = Board::new(
        GridConfig::default(),
        session.items.clone(),
        WidgetRegistry::with_defaults(),
    );
    board.after_first_layout().unwrap();
    let events = session.replay(&mut board).unwrap();

    assert!(matches!(events.as_slice(), [BoardEvent::Moved { .. }]));
    let config = &board.configs()[0];
    assert_eq!((config.col, config.row), (2, 1));
}

#[test]
fn broken_widget_surfaces_wiring_error() {
    let mut board = Board::new(
        GridConfig::default(),
        vec![GridItemConfig::with_widget("x", "scratchpad", 0, 0).with_data(json!({"content": 3}))],
        WidgetRegistry::with_defaults(),
    );
    let err = board.after_first_layout().unwrap_err();
    assert!(err.to_string().contains("scratchpad"));
}
