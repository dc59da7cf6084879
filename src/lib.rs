pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
mod system;

pub use shared::config::AppConfig;
pub use shared::error::{AppError, Result};
pub use system::OfflineSubsystem;

/// Install the tracing subscriber. Call once at process start.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offline_inspect=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
