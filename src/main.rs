#![allow(clippy::result_large_err)]

use binder_buddy::Binder;
use binder_buddy::config::settings::load_app_configuration;
use binder_buddy::core::filter::LedgerFilter;
use binder_buddy::errors::Result;
use binder_buddy::sync::SyncClient;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Open the store (creates tables, bootstraps the catalog)
    let binder = Binder::open(&app_config)
        .await
        .inspect(|_| info!("Store opened successfully."))
        .inspect_err(|e| error!("Failed to open store: {}", e))?;

    // 5. Optionally refresh the catalog from the remote service.
    // Sync failure keeps the local catalog; it is never fatal.
    if let Some(settings) = &app_config.sync {
        match SyncClient::from_settings(settings) {
            Ok(client) => match binder.sync_catalog(&client).await {
                Ok(applied) => info!("Remote catalog sync applied {} cards.", applied),
                Err(e) => warn!("Remote catalog sync failed, keeping local catalog: {}", e),
            },
            Err(e) => warn!("Remote catalog sync misconfigured, skipping: {}", e),
        }
    }

    // 6. Record a total-value snapshot for the history chart
    let snapshot = binder
        .record_value_snapshot()
        .await
        .inspect_err(|e| error!("Failed to record value snapshot: {}", e))?;

    // 7. Log a summary of the store
    let catalog_cards = binder.card_count().await?;
    let owned_rows = binder.collection_rows(&LedgerFilter::default()).await?;
    let decks = binder.decks().await?;
    info!(
        "Store summary: {} catalog cards, {} owned rows, {} decks, collection value {:.2}.",
        catalog_cards,
        owned_rows.len(),
        decks.len(),
        snapshot.total_value
    );

    Ok(())
}
