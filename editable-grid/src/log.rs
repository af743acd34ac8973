use std::{fs::File, sync::OnceLock};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACER: OnceLock<()> = OnceLock::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the file logger once; later calls are no-ops. Log level is
/// taken from `RUST_LOG` and falls back to `info`.
pub fn setup_logger(log_dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    TRACER.get_or_init(|| {
        let file = File::create(format!("{log_dir}/editable-grid.log"))
            .expect("Failed to create log file");
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file);

        let file_layer = fmt::layer()
            .with_line_number(true)
            .with_writer(non_blocking_writer)
            .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

        LOG_GUARD.set(guard).ok();

        tracing_subscriber::registry().with(file_layer).try_init().ok();
    });

    Ok(())
}
