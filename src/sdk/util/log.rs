use env_logger::{Builder, Env};

/// Installs the process-wide logger. `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: &str) {
    let result = Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(false)
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialised");
    }
}
