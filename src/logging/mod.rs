//! Diagnostics go to stderr through `tracing`; the page itself goes to stdout.
//!
//! Filter priority: `MATRIBROWSE_LOG`, then `RUST_LOG`, then `-v` count,
//! then `warn`.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MATRIBROWSE_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Normal,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub const fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    pub const fn default_level(self) -> Level {
        match self {
            Self::Normal => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

fn directive_for(verbosity: Verbosity) -> String {
    let level = verbosity.default_level().to_string().to_lowercase();
    match verbosity {
        Verbosity::Normal => level,
        // Keep dependency chatter (hyper, reqwest) at warn unless asked for.
        _ => format!("warn,matribrowse={level}"),
    }
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(directive_for(verbosity))
}

/// Installs the global subscriber. Returns `false` when one was already set.
pub fn init_subscriber(verbosity: Verbosity, no_color: bool) -> bool {
    let use_ansi = !no_color && std::io::IsTerminal::is_terminal(&std::io::stderr());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true);

    if verbosity == Verbosity::Normal {
        tracing_subscriber::registry()
            .with(build_env_filter(verbosity))
            .with(fmt_layer.without_time().compact())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(build_env_filter(verbosity))
            .with(fmt_layer.with_timer(fmt::time::uptime()))
            .try_init()
            .is_ok()
    }
}
