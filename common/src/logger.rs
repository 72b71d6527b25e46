use once_cell::sync::OnceCell;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Console logging with a local `HH:MM:SS` prefix on every line.
///
/// Filter defaults to `info`; override with `RUST_LOG`.
pub fn init_logger(service_name: &'static str) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
            .init();

        tracing::info!(service = service_name, "logger initialized");
    });
}
