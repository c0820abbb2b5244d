//! Structured logging initialization. Respects `RUST_LOG`; defaults to
//! `info` so a production deployment isn't silently quiet. JSON output is
//! opt-in via `LOG_FORMAT=json` (plain text is friendlier for local dev).

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let subscriber = fmt().with_env_filter(filter);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
