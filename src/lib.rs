pub mod analysis;
pub mod config;
pub mod consistency;
pub mod correlation;
pub mod error;
pub mod http_client;
mod json_fields;
pub mod pipeline;
pub mod report;
pub mod roster_fetch;
pub mod schedule_fetch;
pub mod source;

/// Installs the `tracing` subscriber for a binary. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
