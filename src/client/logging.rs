// Logging configuration for the UdaciRacer client

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::client::config::LoggingSettings;

/// Target prefix shared by every event this crate logs
const CRATE_TARGET: &str = "udaciracer";

// Keep the guard alive for the lifetime of the program
static LOG_GUARD: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Initialize logging from the `[logging]` config section.
///
/// `RUST_LOG`, when set, replaces the configured filter entirely.
pub fn init_logging(settings: &LoggingSettings) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env.as_deref(), &settings.level);
    let mut guards = Vec::new();

    let file_layer = settings.log_file_path().and_then(|path| {
        let file_name = path.file_name()?.to_str()?.to_string();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(parent, file_name));
        guards.push(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false),
        )
    });

    // stderr, so race output on stdout stays readable
    let console_layer = settings.console.then(|| {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        guards.push(guard);
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(false)
    });

    // A second init in the same process is ignored
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    let _ = LOG_GUARD.set(guards);
}

/// INFO for dependencies, `level` for this crate, unless `env` overrides it.
fn build_filter(env: Option<&str>, level: &str) -> EnvFilter {
    if let Some(spec) = env.filter(|s| !s.trim().is_empty()) {
        return EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse_lossy(spec);
    }
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy("")
        .add_directive(crate_directive(level))
}

fn crate_directive(level: &str) -> Directive {
    let level = level.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::DEBUG);
    format!("{}={}", CRATE_TARGET, level)
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into())
}
