//! Structured logging setup.
//!
//! `RUST_LOG` selects the filter (default `dreamer=info`). Setting
//! `DREAMER_LOG_FORMAT=json` switches to one JSON object per line. Logs go
//! to stderr so command output on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "dreamer=info";

/// Env var selecting the output format.
pub const FORMAT_ENV: &str = "DREAMER_LOG_FORMAT";

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if wants_json(std::env::var(FORMAT_ENV).ok().as_deref()) {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

fn wants_json(format: Option<&str>) -> bool {
    format.is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_format_is_case_insensitive() {
        assert!(wants_json(Some("json")));
        assert!(wants_json(Some(" JSON ")));
        assert!(!wants_json(Some("pretty")));
        assert!(!wants_json(None));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init();
        init();
    }
}
