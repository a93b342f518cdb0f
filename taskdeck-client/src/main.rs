//! # TaskDeck
//!
//! Interactive terminal client for the TaskDeck backend.
//!
//! ## Usage
//!
//! ```bash
//! TASKDECK_API__BASE_URL=http://localhost:8000 cargo run -p taskdeck-client
//! ```
//!
//! Type `help` at the prompt for the list of commands.

use std::io::Write;
use std::sync::Arc;
use taskdeck_client::cache::CacheStore;
use taskdeck_client::client::DataClient;
use taskdeck_client::config::ClientConfig;
use taskdeck_client::session::SessionStore;
use taskdeck_client::shell::{Shell, ShellOutcome};
use taskdeck_client::transport::HttpTransport;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PROMPT: &str = "taskdeck> ";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with rendered views
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        "TaskDeck v{} using {}",
        env!("CARGO_PKG_VERSION"),
        config.graphql_url()?
    );

    let transport = HttpTransport::new(&config)?;
    let client = DataClient::new(Arc::new(transport), CacheStore::new());
    let mut shell = Shell::new(SessionStore::new(client));

    println!("{}", shell.start().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match shell.execute_line(&line).await {
            ShellOutcome::Continue(output) if output.is_empty() => {}
            ShellOutcome::Continue(output) => println!("{}", output),
            ShellOutcome::Quit => break,
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}
