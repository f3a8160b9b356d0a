use std::path::Path;

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when no level is given: allocation summaries under the `ssi`
/// target stay visible alongside the world's own info logs.
pub const DEFAULT_FILTER: &str = "info,ssi=info";

#[derive(Clone, Copy)]
struct TickTimer;

impl FormatTime for TickTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%m%dT%H:%M:%S%.3f"))
    }
}

/// Directives for `level`. A bare level such as `"warn"` also applies to the
/// `ssi` target; directives naming `ssi` are used as given.
fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        DEFAULT_FILTER.to_string()
    } else if level.split(',').any(|d| d.split('=').next().map(str::trim) == Some("ssi")) {
        level.to_string()
    } else {
        let base = level.split(',').find(|d| !d.contains('=')).unwrap_or("info");
        format!("{level},ssi={base}")
    }
}

pub fn build_filter(level: &str) -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::try_new(filter_directives(level))?)
}

/// Install stdout and file logging filtered by `level`, an `EnvFilter`
/// directive such as `"info"` or `"info,ssi=debug"`.
///
/// Keep the returned guard alive for as long as logs must reach the file.
pub fn init(log_path: impl AsRef<Path>, level: &str) -> anyhow::Result<WorkerGuard> {
    let file = std::fs::File::create(log_path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(TickTimer)
                .with_writer(std::io::stdout)
                .with_filter(build_filter(level)?),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(TickTimer)
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(build_filter(level)?),
        )
        .try_init()?;

    Ok(guard)
}
