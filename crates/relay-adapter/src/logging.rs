//! Tracing bootstrap for binaries embedding the adapter

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "relay_adapter=info,relay_truncation=info";

/// Installs the global subscriber: an `EnvFilter` from `RUST_LOG` and a fmt
/// layer writing to stderr, as JSON lines when `json` is set.
pub fn init_tracing(json: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.into()));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}
