use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter (e.g. `SCRIVENER_LOG=debug`).
pub const LOG_ENV_VAR: &str = "SCRIVENER_LOG";

/// Install the JSON log subscriber used by `scrivener-cli`.
///
/// A run logs model loading, the start of transcription, a progress notice every
/// `Opts::progress_interval` segments and each file it writes, all at `info`; the engine request
/// is logged at `debug` and whisper.cpp's own output at `trace` (target `whisper_cpp`).
/// Logs go to stderr because stdout carries the run manifest. Calling this twice is harmless.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init();
}
