use anyhow::Context;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "hipoteca.log";

/// hyper and reqwest log every connection at debug; keep them at warn
/// unless `RUST_LOG` asks otherwise.
const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,reqwest=warn";

/// JSON logs go to a daily file; the terminal belongs to the TUI unless
/// `log_to_stderr` is set. Keep the guard alive for the whole run.
pub(crate) fn init_tracing(log_dir: &Path, log_to_stderr: bool) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;
    let (file_writer, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));

    let requests = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_target(false)
        .json();
    let stderr = log_to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(requests)
        .with(stderr)
        .try_init()
        .context("tracing subscriber already installed")?;

    Ok(file_guard)
}

/// `RUST_LOG` when it parses, otherwise the quiet default.
fn log_filter(env: Option<&str>) -> EnvFilter {
    EnvFilter::new(filter_directives(env))
}

fn filter_directives(env: Option<&str>) -> &str {
    env.map(str::trim)
        .filter(|value| !value.is_empty() && EnvFilter::try_new(value).is_ok())
        .unwrap_or(DEFAULT_DIRECTIVES)
}
