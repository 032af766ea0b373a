//! Parley - terminal chat client
//!
//! A client-side conversation store that keeps a message log in sync with
//! a chat backend, with optimistic sends, edits and deletes.

mod api;
mod config;
mod console;
mod runtime;
mod session;
mod state_machine;

use api::{HttpChatApi, LoggingChatApi};
use config::ClientConfig;
use runtime::StoreHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the console
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = ClientConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        timeout_secs = config.request_timeout.map(|t| t.as_secs()),
        "Starting chat client"
    );

    let api = LoggingChatApi::new(HttpChatApi::new(&config.api_url, config.request_timeout)?);
    let mounted = StoreHandle::mount(api, config.credential);

    console::run(mounted.handle, mounted.events, config.viewport_rows).await?;

    // The console unmounts on exit; wait for the store to wind down
    mounted.task.await?;
    Ok(())
}
