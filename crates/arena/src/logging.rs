use std::io;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// Installs the global fmt subscriber. `RUST_LOG` takes precedence over `default_filter`.
/// Only the first call has any effect.
pub fn init_tracing(default_filter: &str) {
    let default_filter = default_filter.to_owned();
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&default_filter));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(io::stderr)
            .compact();

        // A test harness or embedding host may already own the global subscriber.
        let _ = subscriber.try_init();
    });
}
