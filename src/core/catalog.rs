//! Master catalog business logic - Handles catalog bootstrap, lookup, and
//! wholesale replacement.
//!
//! The catalog is the read-only reference list of known cards. It is seeded
//! once from a bundled delimited dataset, can be replaced wholesale by the
//! remote sync, and is never edited row by row. Bootstrap is forgiving about
//! the dataset's shape: the delimiter is sniffed, headers are matched
//! through a synonym table, and malformed rows are skipped and counted
//! rather than failing the load.

use crate::{
    entities::{CardColor, MasterCard, master_card},
    errors::{Error, Result},
    io::normalize_header,
};
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Batch size for catalog inserts, kept well under SQLite's bind limit.
const INSERT_CHUNK: usize = 500;

/// Outcome of a catalog bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Number of catalog rows inserted
    pub loaded: usize,
    /// Number of malformed dataset rows skipped
    pub skipped: usize,
    /// True when the catalog was already populated and nothing was loaded
    pub already_loaded: bool,
}

/// Parses a delimited catalog dataset into master card rows.
///
/// Returns the parsed rows along with the count of skipped rows. Rows are
/// skipped for a blank set code or card name, a non-numeric card number, or
/// a duplicate key; a missing or unrecognized color defaults to universal.
fn parse_catalog(contents: &str) -> Result<(Vec<master_card::Model>, usize)> {
    let delimiter = crate::io::sniff_delimiter(contents);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    let mut set_code_idx = None;
    let mut number_idx = None;
    let mut name_idx = None;
    let mut set_name_idx = None;
    let mut color_idx = None;
    for (idx, raw) in headers.iter().enumerate() {
        match normalize_header(raw).as_str() {
            "setcode" | "code" => set_code_idx = Some(idx),
            "cardnumber" | "number" | "no" => number_idx = Some(idx),
            "name" | "cardname" => name_idx = Some(idx),
            "setname" | "edition" => set_name_idx = Some(idx),
            "color" | "colour" => color_idx = Some(idx),
            _ => {}
        }
    }

    let set_code_idx = set_code_idx.ok_or_else(|| Error::Catalog {
        message: "dataset is missing a set code column".to_string(),
    })?;
    let number_idx = number_idx.ok_or_else(|| Error::Catalog {
        message: "dataset is missing a card number column".to_string(),
    })?;
    let name_idx = name_idx.ok_or_else(|| Error::Catalog {
        message: "dataset is missing a card name column".to_string(),
    })?;

    let mut rows = Vec::new();
    let mut seen: HashSet<(String, i32)> = HashSet::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let Ok(record) = record else {
            skipped += 1;
            debug!("skipping malformed catalog record");
            continue;
        };

        let set_code = record.get(set_code_idx).unwrap_or("").trim();
        let card_name = record.get(name_idx).unwrap_or("").trim();
        let number_text = record.get(number_idx).unwrap_or("").trim();

        let Ok(card_number) = number_text.parse::<i32>() else {
            skipped += 1;
            debug!(number = number_text, "skipping row with non-numeric card number");
            continue;
        };
        if set_code.is_empty() || card_name.is_empty() {
            skipped += 1;
            debug!("skipping row with blank set code or card name");
            continue;
        }
        if !seen.insert((set_code.to_string(), card_number)) {
            skipped += 1;
            debug!(set_code, card_number, "skipping duplicate catalog key");
            continue;
        }

        let set_name = set_name_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(set_code);
        let color = color_idx
            .and_then(|idx| record.get(idx))
            .and_then(CardColor::from_code)
            .unwrap_or(CardColor::Universal);

        rows.push(master_card::Model {
            set_code: set_code.to_string(),
            card_number,
            card_name: card_name.to_string(),
            set_name: set_name.to_string(),
            color,
        });
    }

    Ok((rows, skipped))
}

/// Inserts catalog rows in chunks on the given connection or transaction.
async fn insert_rows<C>(conn: &C, rows: Vec<master_card::Model>) -> Result<()>
where
    C: ConnectionTrait,
{
    for chunk in rows.chunks(INSERT_CHUNK) {
        let models = chunk.iter().cloned().map(|m| master_card::ActiveModel {
            set_code: Set(m.set_code),
            card_number: Set(m.card_number),
            card_name: Set(m.card_name),
            set_name: Set(m.set_name),
            color: Set(m.color),
        });
        MasterCard::insert_many(models)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}

/// Seeds the catalog from a delimited dataset, at most once.
///
/// A non-empty catalog short-circuits with `already_loaded` set and no rows
/// touched, so repeated startups never duplicate the catalog. All inserts
/// run in one transaction.
pub async fn bootstrap_from_reader<R>(db: &DatabaseConnection, mut reader: R) -> Result<BootstrapReport>
where
    R: Read,
{
    if card_count(db).await? > 0 {
        return Ok(BootstrapReport {
            loaded: 0,
            skipped: 0,
            already_loaded: true,
        });
    }

    let mut contents = String::new();
    reader.read_to_string(&mut contents).map_err(|e| Error::Catalog {
        message: format!("failed to read catalog dataset: {e}"),
    })?;

    let (rows, skipped) = parse_catalog(&contents)?;
    let loaded = rows.len();

    let txn = db.begin().await?;
    insert_rows(&txn, rows).await?;
    txn.commit().await?;

    info!(loaded, skipped, "catalog bootstrap complete");
    Ok(BootstrapReport {
        loaded,
        skipped,
        already_loaded: false,
    })
}

/// Seeds the catalog from a dataset file, at most once.
pub async fn bootstrap<P>(db: &DatabaseConnection, path: P) -> Result<BootstrapReport>
where
    P: AsRef<Path>,
{
    let file = std::fs::File::open(path.as_ref()).map_err(|e| Error::Catalog {
        message: format!(
            "failed to open catalog dataset {}: {e}",
            path.as_ref().display()
        ),
    })?;
    bootstrap_from_reader(db, file).await
}

/// Replaces the whole catalog in one transaction.
///
/// Used by the remote sync: readers observe either the old catalog or the
/// new one, never a partially replaced state.
pub async fn replace_catalog(db: &DatabaseConnection, rows: Vec<master_card::Model>) -> Result<()> {
    let txn = db.begin().await?;
    MasterCard::delete_many().exec(&txn).await?;
    insert_rows(&txn, rows).await?;
    txn.commit().await?;
    Ok(())
}

/// Number of cards in the catalog.
pub async fn card_count(db: &DatabaseConnection) -> Result<u64> {
    MasterCard::find().count(db).await.map_err(Into::into)
}

/// Point read of a catalog card by its key.
pub async fn get_card(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
) -> Result<Option<master_card::Model>> {
    MasterCard::find_by_id((set_code.to_string(), card_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Searches the catalog by card name substring, name-ordered.
///
/// This is the hand-off point for externally recognized card names: a
/// candidate name string resolves here to concrete catalog rows.
pub async fn search_by_name(
    db: &DatabaseConnection,
    fragment: &str,
    limit: u64,
) -> Result<Vec<master_card::Model>> {
    MasterCard::find()
        .filter(master_card::Column::CardName.contains(fragment))
        .order_by_asc(master_card::Column::CardName)
        .order_by_asc(master_card::Column::SetCode)
        .order_by_asc(master_card::Column::CardNumber)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the distinct (set code, set name) pairs in the catalog, ordered by
/// set code.
pub async fn list_sets(db: &DatabaseConnection) -> Result<Vec<(String, String)>> {
    MasterCard::find()
        .select_only()
        .column(master_card::Column::SetCode)
        .column(master_card::Column::SetName)
        .distinct()
        .order_by_asc(master_card::Column::SetCode)
        .into_tuple()
        .all(db)
        .await
        .map_err(Into::into)
}
