use std::{fs, rc::Rc, sync::mpsc::channel};

use grid_board::grid::{
    Board, CellMetrics, DragCoordinator, GridConfig, GridItem, GridItemConfig, PointerEvent,
    WidgetRegistry,
};
use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn item_lifecycle_reaches_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.log");

    let subscriber = grid_board::logging::subscriber(true, Some(path.clone()));
    tracing::subscriber::with_default(subscriber, || {
        let (tx, _rx) = channel();
        let _item = GridItem::new(
            GridItemConfig::with_widget("7", "scratchpad", 1, 1),
            CellMetrics::default(),
            Rc::new(DragCoordinator::new()),
            tx,
        );
    });

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("grid item created"));
    assert!(contents.contains("item=7"));
}

#[test]
#[serial]
fn info_level_skips_debug_but_keeps_rejections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.log");

    let subscriber = grid_board::logging::subscriber(false, Some(path.clone()));
    tracing::subscriber::with_default(subscriber, || {
        let mut board = Board::new(
            GridConfig::default(),
            vec![
                GridItemConfig::with_widget("1", "scratchpad", 0, 0),
                GridItemConfig::with_widget("2", "scratchpad", 2, 0),
            ],
            WidgetRegistry::with_defaults(),
        );
        board.after_first_layout().unwrap();
        board.handle_pointer(&PointerEvent::down(250.0, 50.0));
        board.handle_pointer(&PointerEvent::moved(50.0, 50.0));
        board.handle_pointer(&PointerEvent::up(50.0, 50.0));
        board.pump().unwrap();
    });

    let contents = fs::read_to_string(path).unwrap();
    assert!(!contents.contains("grid item created"));
    assert!(contents.contains("INFO"));
}

#[test]
#[serial]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    grid_board::logging::init(false, None);
    tracing::info!("test");

    assert!(!path.exists(), "log file should not be created");
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
