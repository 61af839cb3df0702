use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a `tracing` filter directive, e.g. `apk_puller=trace`
pub const LOG_ENV_VAR: &str = "APK_PULLER_LOG";

/// Installs a stderr subscriber. `verbose` lowers the default level from `warn` to `debug`.
pub fn setup_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Failed to build log filter")?;
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global subscriber")?;
    Ok(())
}
