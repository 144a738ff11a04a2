//! Tracing subscriber setup

use canvas_domain::{CanvasError, LoggingConfig, Result};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins over the configured level. HTTP
/// internals are capped at `warn` unless named explicitly.
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let base = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => directives,
        _ => config.level.clone(),
    };

    let filter = EnvFilter::try_new(&base)
        .map_err(|e| CanvasError::Config(format!("Invalid log filter {base:?}: {e}")))?;

    ["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"]
        .iter()
        .filter(|directive| !base.contains(directive.split('=').next().unwrap_or_default()))
        .try_fold(filter, |filter, directive| {
            directive
                .parse()
                .map(|d| filter.add_directive(d))
                .map_err(|e| CanvasError::Config(format!("Invalid log directive: {e}")))
        })
}

/// Install the global subscriber. Both formats write to stderr so stdout
/// stays clean for command output.
///
/// # Errors
/// Returns `CanvasError::Config` for an invalid filter or when a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    init_with_writer(config, std::io::stderr)
}

fn init_with_writer<W>(config: &LoggingConfig, writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = build_filter(config)?;
    let builder =
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(writer);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };

    installed.map_err(|e| CanvasError::Config(format!("Failed to install logger: {e}")))
}
