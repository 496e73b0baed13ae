use anyhow::Context;
use clap::Parser;
use grid_board::grid::{Board, WidgetRegistry};
use grid_board::session::Session;
use grid_board::settings::Settings;
use std::path::PathBuf;

/// Replay a scripted pointer session against a grid board and print the
/// resulting item configs as JSON.
#[derive(Parser)]
#[command(name = "grid_board", version)]
struct Cli {
    /// Settings file, or a directory containing `settings.json`.
    settings: PathBuf,
    /// Session file with `items` and pointer `steps`.
    session: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings_path = Settings::path_for(&cli.settings);
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    grid_board::logging::init(settings.debug_logging, settings.log_file.clone());

    let session = Session::load(&cli.session)
        .with_context(|| format!("loading session from {}", cli.session.display()))?;
    let mut board = Board::from_settings(&settings, session.items.clone(), WidgetRegistry::with_defaults());
    for warning in &board.warnings {
        eprintln!("warning: {warning}");
    }
    board.after_first_layout()?;

    let events = session.replay(&mut board)?;
    tracing::info!(steps = session.steps.len(), events = events.len(), "session replayed");

    println!("{}", serde_json::to_string_pretty(&board.configs())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_requires_both_paths() {
        Cli::command().debug_assert();
        assert!(Cli::try_parse_from(["grid_board", "settings.json"]).is_err());
        let cli = Cli::try_parse_from(["grid_board", "s.json", "run.json"]).unwrap();
        assert_eq!(cli.session, PathBuf::from("run.json"));
    }
}
