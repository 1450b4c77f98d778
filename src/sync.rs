//! Remote catalog sync - fetches a keyed catalog payload over HTTP and
//! replaces the local catalog wholesale.
//!
//! Sync is strictly optional and never touches the ledgers: a failed fetch
//! or an unusable payload leaves the local catalog exactly as it was.
//! Callers treat sync failure as log-and-continue; there is no retry
//! policy.

use crate::{
    config::settings::SyncSettings,
    core::catalog,
    entities::{CardColor, master_card},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

/// Remote payload shape: a flat card list plus a set id to name directory.
#[derive(Debug, Deserialize)]
pub struct RemotePayload {
    /// All cards known to the remote catalog
    pub cards: Vec<RemoteCard>,
    /// Directory of set ids to display names
    #[serde(default)]
    pub sets: Vec<RemoteSet>,
}

/// One card in the remote payload. The id carries the card key as
/// `SETCODE-NUMBER`.
#[derive(Debug, Deserialize)]
pub struct RemoteCard {
    /// Composite id, set code and collector number joined by a dash
    pub id: String,
    /// Card display name
    pub name: String,
    /// Set id, resolved against the payload's set directory
    #[serde(default)]
    pub set: String,
    /// Color letter codes; empty means colorless
    #[serde(default)]
    pub colors: Vec<String>,
}

/// One set directory entry in the remote payload.
#[derive(Debug, Deserialize)]
pub struct RemoteSet {
    /// Set id as referenced by cards
    pub id: String,
    /// Set display name
    pub name: String,
}

/// Collapses a remote color list to a single stored color: empty means
/// universal, one entry is parsed (unknown codes fall back to universal),
/// and anything longer is multicolor.
fn collapse_colors(colors: &[String]) -> CardColor {
    match colors {
        [] => CardColor::Universal,
        [single] => CardColor::from_code(single).unwrap_or(CardColor::Universal),
        _ => CardColor::Multicolor,
    }
}

/// Derives catalog rows from a remote payload.
///
/// Card ids split on their last dash into set code and collector number;
/// ids that do not fit the shape are skipped. Set names resolve through the
/// payload's set directory, falling back to the set code itself.
fn derive_catalog(payload: RemotePayload) -> Vec<master_card::Model> {
    let set_names: HashMap<&str, &str> = payload
        .sets
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();

    let mut seen: HashSet<(String, i32)> = HashSet::new();
    let mut rows = Vec::new();

    for card in &payload.cards {
        let Some((set_code, number_text)) = card.id.rsplit_once('-') else {
            debug!(id = card.id.as_str(), "skipping card with malformed id");
            continue;
        };
        let Ok(card_number) = number_text.parse::<i32>() else {
            debug!(id = card.id.as_str(), "skipping card with non-numeric number");
            continue;
        };
        if set_code.is_empty() || card.name.trim().is_empty() {
            debug!(id = card.id.as_str(), "skipping card with blank key or name");
            continue;
        }
        if !seen.insert((set_code.to_string(), card_number)) {
            debug!(id = card.id.as_str(), "skipping duplicate card id");
            continue;
        }

        let set_key = if card.set.is_empty() {
            set_code
        } else {
            card.set.as_str()
        };
        let set_name = set_names.get(set_key).copied().unwrap_or(set_code);

        rows.push(master_card::Model {
            set_code: set_code.to_string(),
            card_number,
            card_name: card.name.trim().to_string(),
            set_name: set_name.to_string(),
            color: collapse_colors(&card.colors),
        });
    }

    rows
}

/// HTTP client for the keyed remote catalog endpoint.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SyncClient {
    /// Builds a client for the given endpoint with a 30 second timeout.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Builds a client from the configured sync settings.
    pub fn from_settings(settings: &SyncSettings) -> Result<Self> {
        Self::new(&settings.url, &settings.api_key)
    }

    /// Performs the keyed GET and deserializes the catalog payload.
    ///
    /// A non-success status surfaces as an HTTP error; a body that is not
    /// the expected shape surfaces as a sync error.
    pub async fn fetch_catalog(&self) -> Result<RemotePayload> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<RemotePayload>()
            .await
            .map_err(|e| Error::Sync {
                message: format!("malformed catalog payload: {e}"),
            })
    }
}

/// Fetches the remote catalog and replaces the local one in a single
/// transaction. Returns the number of catalog rows applied.
///
/// On any failure the local catalog and the ledgers are left untouched.
pub async fn sync_catalog(db: &DatabaseConnection, client: &SyncClient) -> Result<usize> {
    let payload = client.fetch_catalog().await?;
    let rows = derive_catalog(payload);
    let applied = rows.len();

    catalog::replace_catalog(db, rows).await?;

    info!(cards = applied, "remote catalog sync complete");
    Ok(applied)
}
