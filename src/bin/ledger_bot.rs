//! Runs the ledger bot until interrupted.
//!
//! Reads `GUILD_BOT_APP_ID` and `GUILD_BOT_TOKEN`, and optionally `GUILD_BOT_API_HOST`
//! (defaults to the production API). Log output is controlled with `RUST_LOG`.

use std::env;
use std::sync::Arc;

use guild_gateway::auth::Credentials;
use guild_gateway::gateway::{Client, Config, Status};
use guild_gateway::ledger::Ledger;
use guild_gateway::{API_HOST, API_HOST_VAR};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let credentials = Credentials::from_env()?;
    let host = env::var(API_HOST_VAR).unwrap_or_else(|_| API_HOST.to_owned());

    let client = Client::new(&host, credentials, Config::default())?;
    let session = client.connect(Arc::new(Ledger::new())).await?;
    info!(%host, "Ledger bot connected");

    let mut status = session.state_receiver();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Interrupted, shutting down");
            session.shutdown().await?;
        }
        () = async {
            while status.changed().await.is_ok() {
                let current = *status.borrow_and_update();
                info!(status = %current, "Session status");
                if current == Status::Disconnected {
                    break;
                }
            }
        } => {
            if let Err(e) = session.wait().await {
                error!(error = %e, "Gateway session stopped");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
