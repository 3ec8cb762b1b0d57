//! Diagnostics setup. Reports go to stdout; tracing goes to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for a `PARKADE_LOG` value.
pub fn filter_directive(level: Option<&str>) -> String {
    let base_level = match level {
        Some("debug") => "debug",
        Some("warn") | Some("warning") => "warn",
        Some("error") => "error",
        _ => "info",
    };
    format!("parkade={base_level},parkade_cli={base_level}")
}

/// Output format of diagnostics, chosen by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// `RUST_LOG` wins when set; otherwise the level comes from `PARKADE_LOG`.
fn env_filter() -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => {
            let level = std::env::var("PARKADE_LOG").ok();
            EnvFilter::new(filter_directive(level.as_deref()))
        }
    }
}

/// Install the global subscriber, writing to stderr. A second call is a no-op.
pub fn init_tracing() {
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());
    let (json, text) = match format {
        LogFormat::Json => (Some(fmt::layer().json().with_writer(std::io::stderr)), None),
        LogFormat::Text => (None, Some(fmt::layer().with_writer(std::io::stderr))),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(json)
        .with(text)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_defaults_to_info() {
        assert_eq!(filter_directive(None), "parkade=info,parkade_cli=info");
        assert_eq!(filter_directive(Some("loud")), "parkade=info,parkade_cli=info");
    }

    #[test]
    fn directive_accepts_known_levels() {
        assert_eq!(filter_directive(Some("debug")), "parkade=debug,parkade_cli=debug");
        assert_eq!(filter_directive(Some("warning")), "parkade=warn,parkade_cli=warn");
        assert_eq!(filter_directive(Some("error")), "parkade=error,parkade_cli=error");
    }

    #[test]
    fn log_format_from_env_value() {
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("pretty")), LogFormat::Text);
    }
}
