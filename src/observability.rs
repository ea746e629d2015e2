// Logging setup and timing helpers for depscope
// Per-run counters live in RunStats; nothing here keeps global state.

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

const QUIET_FILTER: &str = "error";
const VERBOSE_FILTER: &str = "depscope=debug,info";
const DEFAULT_FILTER: &str = "depscope=warn,error";

/// Initialize logging with default verbosity
pub fn init_logging() -> Result<()> {
    init_logging_with_level(false, false)
}

/// Initialize logging with configurable verbosity
///
/// `quiet` wins over both `verbose` and `RUST_LOG`. Calling this twice is
/// harmless; the second subscriber is dropped.
pub fn init_logging_with_level(verbose: bool, quiet: bool) -> Result<()> {
    let env_filter = if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        let flag_filter = if verbose {
            EnvFilter::new(VERBOSE_FILTER)
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        };

        if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::try_from_default_env().unwrap_or(flag_filter)
        } else {
            flag_filter
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(!quiet)
        .with_thread_ids(!quiet)
        .with_line_number(!quiet)
        .with_file(!quiet)
        .with_writer(std::io::stderr)
        .with_ansi(true);

    match tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
    {
        Ok(()) => {
            debug!("depscope logging initialized");
            Ok(())
        }
        // Already initialized, e.g. by a test harness or an embedding application
        Err(_) => Ok(()),
    }
}

/// Logs the elapsed time of a named operation when dropped
pub struct PerfTimer {
    name: String,
    run_id: Uuid,
    start: Instant,
}

impl PerfTimer {
    pub fn new(name: impl Into<String>, run_id: Uuid) -> Self {
        let name = name.into();
        debug!(run_id = %run_id, "Timer started: {}", name);
        Self {
            name,
            run_id,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        info!(
            run_id = %self.run_id,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            "Timer completed: {}", self.name
        );
    }
}
