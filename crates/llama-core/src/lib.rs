//! Core types and utilities for the Llama Matemática admin client

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod forms;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use types::{EntityId, Role, RoleKind, SessionUser};

/// Initialize the logging system
///
/// `RUST_LOG` wins over `level` when set. `json` switches the fmt layer to
/// one JSON object per event.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    };

    installed.map_err(|err| Error::Other(format!("failed to install logger: {err}")))
}
