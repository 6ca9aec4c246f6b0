pub mod bridge;
pub mod config;
pub mod events;

use tracing_subscriber::{fmt, EnvFilter};

use roster_shared::constants::APP_NAME;

pub use bridge::{spawn_sidebar, SidebarCommand, SidebarNotification};
pub use config::ClientConfig;

/// Application name and version, as logged at startup.
pub fn banner() -> String {
    format!("{APP_NAME} v{}", env!("CARGO_PKG_VERSION"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("roster_client=debug,roster_core=debug,roster_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
