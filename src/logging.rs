//! Structured logging bootstrap using `tracing`.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter applied when `RUST_LOG` is unset: our progress lines at `info`,
/// everything else (hyper, rustls) only when it warns.
const DEFAULT_DIRECTIVES: &str = "warn,pushshift_harvest=info";

/// Install a global tracing subscriber for the harvester.
///
/// `verbose` lowers our own target to `debug`, which logs every request URL.
pub fn init_tracing(verbose: bool) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::try_new("warn,pushshift_harvest=debug")?,
        Err(_) => EnvFilter::try_new(DEFAULT_DIRECTIVES)?,
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!(verbose, "tracing initialised");
    Ok(())
}
