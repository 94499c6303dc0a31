use std::env;
use std::io::{stdout, IsTerminal};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `LOG_FORMAT=json|pretty` wins; otherwise pretty on a terminal and JSON elsewhere.
    pub fn detect() -> Self {
        match env::var("LOG_FORMAT").map(|v| v.to_lowercase()) {
            Ok(v) if v == "json" => LogFormat::Json,
            Ok(v) if v == "pretty" => LogFormat::Pretty,
            _ if stdout().is_terminal() => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn setup_logging() {
    let format = LogFormat::detect();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Pretty => builder.with_ansi(true).init(),
        LogFormat::Json => builder.json().with_ansi(false).with_current_span(false).init(),
    }

    tracing::info!(?format, "logging: subscriber installed");
}
