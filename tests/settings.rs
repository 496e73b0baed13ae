use grid_board::settings::Settings;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn empty_file_yields_defaults() {
    let file = NamedTempFile::new().unwrap();
    let settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.grid.max_cols, 5);
    assert_eq!(settings.grid.col_width, 100.0);
}

#[test]
fn missing_fields_take_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "remove_on_drop_outside": true, "grid": {{ "max_rows": 8 }} }}"#).unwrap();
    let settings = Settings::load(file.path()).unwrap();
    assert!(settings.remove_on_drop_outside);
    assert!(!settings.debug_logging);
    assert_eq!(settings.grid.max_rows, 8);
    assert_eq!(settings.grid.max_cols, 5);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let mut settings = Settings::default();
    settings.debug_logging = true;
    settings.log_file = Some(dir.path().join("board.log"));
    settings.grid.col_width = 120.0;
    settings.save(&path).unwrap();

    assert_eq!(Settings::load(&path).unwrap(), settings);
    assert_eq!(Settings::path_for(dir.path()), path);
}

#[test]
fn malformed_file_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    assert!(Settings::load(file.path()).is_err());
}
