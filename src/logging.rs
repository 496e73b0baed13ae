use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Build the board's subscriber. With `debug` the default level is `debug`
/// and can be overridden through `RUST_LOG`; otherwise the level is forced to
/// `info`. When `log_file` is given, output goes to that file instead of
/// stdout.
pub fn subscriber(debug: bool, log_file: Option<PathBuf>) -> Box<dyn Subscriber + Send + Sync> {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "grid_board.log".into());
            let appender = tracing_appender::rolling::never(dir, name);
            Box::new(builder.with_ansi(false).with_writer(appender).finish())
        }
        None => Box::new(builder.finish()),
    }
}

/// Install [`subscriber`] globally. A second call keeps the first subscriber.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    if tracing::subscriber::set_global_default(subscriber(debug, log_file)).is_err() {
        tracing::debug!("logging already initialised");
    }
}
