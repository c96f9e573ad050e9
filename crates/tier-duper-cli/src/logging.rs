use tier_duper_core::AppConfig;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logger(config: &AppConfig) -> impl Drop {
    let filter_layer = EnvFilter::new(&config.tracing_level);

    let file_appender = tracing_appender::rolling::never("./", &config.log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    info!(
        "Tracing is configured for stdout and file logging ({}).",
        config.log_file_path
    );

    guard
}
