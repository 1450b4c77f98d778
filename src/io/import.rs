//! Collection and external snapshot imports from delimited text.
//!
//! Imports are strict where bootstrap is forgiving: the whole file is parsed
//! before anything is written, and any malformed record aborts the import
//! with zero rows applied. The collection import then replaces the ledger in
//! one transaction; external imports create their snapshot atomically.

use crate::{
    core::external::{self, ExternalEntry},
    entities::{CardColor, CollectionCard, collection_card, external_collection, external_wishlist},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use std::io::Read;
use tracing::info;

use super::{normalize_header, sniff_delimiter};

/// Batch size for ledger inserts, kept well under SQLite's bind limit.
const INSERT_CHUNK: usize = 500;

fn read_contents<R>(mut reader: R) -> Result<String>
where
    R: Read,
{
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parses a full collection export back into ledger rows.
///
/// Rows with a non-positive quantity are dropped rather than rejected, so a
/// file can explicitly zero out cards. Everything else that is off (blank
/// set code, non-numeric fields, duplicate keys, unknown colors) aborts the
/// parse.
fn parse_collection_csv(contents: &str) -> Result<Vec<collection_card::Model>> {
    let delimiter = sniff_delimiter(contents);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    let mut set_code_idx = None;
    let mut number_idx = None;
    let mut quantity_idx = None;
    let mut price_idx = None;
    let mut color_idx = None;
    let mut personal_idx = None;
    let mut general_idx = None;
    for (idx, raw) in headers.iter().enumerate() {
        match normalize_header(raw).as_str() {
            "setcode" | "code" => set_code_idx = Some(idx),
            "cardnumber" | "number" | "no" => number_idx = Some(idx),
            "quantity" | "qty" | "count" => quantity_idx = Some(idx),
            "price" | "value" => price_idx = Some(idx),
            "color" | "colour" => color_idx = Some(idx),
            "personalnotes" | "personal" => personal_idx = Some(idx),
            "generalnotes" | "general" | "notes" => general_idx = Some(idx),
            _ => {}
        }
    }

    let set_code_idx = set_code_idx.ok_or_else(|| Error::Import {
        message: "missing required column setCode".to_string(),
    })?;
    let number_idx = number_idx.ok_or_else(|| Error::Import {
        message: "missing required column cardNumber".to_string(),
    })?;
    let quantity_idx = quantity_idx.ok_or_else(|| Error::Import {
        message: "missing required column quantity".to_string(),
    })?;

    let mut rows = Vec::new();
    let mut seen: HashSet<(String, i32)> = HashSet::new();

    for (index, record) in reader.records().enumerate() {
        // Header is line 1, so data row N sits on line N + 1
        let line = index + 2;
        let record = record.map_err(|e| Error::Import {
            message: format!("line {line}: malformed record: {e}"),
        })?;

        let set_code = record.get(set_code_idx).unwrap_or("").trim();
        if set_code.is_empty() {
            return Err(Error::Import {
                message: format!("line {line}: blank set code"),
            });
        }

        let number_text = record.get(number_idx).unwrap_or("").trim();
        let card_number: i32 = number_text.parse().map_err(|_| Error::Import {
            message: format!("line {line}: invalid card number '{number_text}'"),
        })?;

        let quantity_text = record.get(quantity_idx).unwrap_or("").trim();
        let quantity: i32 = quantity_text.parse().map_err(|_| Error::Import {
            message: format!("line {line}: invalid quantity '{quantity_text}'"),
        })?;

        if !seen.insert((set_code.to_string(), card_number)) {
            return Err(Error::Import {
                message: format!("line {line}: duplicate card key {set_code} #{card_number}"),
            });
        }

        let price_text = price_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .unwrap_or("");
        let price = if price_text.is_empty() {
            None
        } else {
            Some(price_text.parse::<f64>().map_err(|_| Error::Import {
                message: format!("line {line}: invalid price '{price_text}'"),
            })?)
        };

        let color_text = color_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .unwrap_or("");
        let color = if color_text.is_empty() {
            CardColor::Universal
        } else {
            CardColor::from_code(color_text).ok_or_else(|| Error::InvalidColor {
                code: color_text.to_string(),
            })?
        };

        let personal_notes = personal_idx
            .and_then(|idx| record.get(idx))
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);
        let general_notes = general_idx
            .and_then(|idx| record.get(idx))
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);

        if quantity > 0 {
            rows.push(collection_card::Model {
                set_code: set_code.to_string(),
                card_number,
                quantity,
                price,
                color,
                personal_notes,
                general_notes,
            });
        }
    }

    Ok(rows)
}

/// Parses an external snapshot file: card key, quantity, optional price.
fn parse_external_csv(contents: &str) -> Result<Vec<ExternalEntry>> {
    let delimiter = sniff_delimiter(contents);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    let mut set_code_idx = None;
    let mut number_idx = None;
    let mut quantity_idx = None;
    let mut price_idx = None;
    for (idx, raw) in headers.iter().enumerate() {
        match normalize_header(raw).as_str() {
            "setcode" | "code" => set_code_idx = Some(idx),
            "cardnumber" | "number" | "no" => number_idx = Some(idx),
            "quantity" | "qty" | "count" => quantity_idx = Some(idx),
            "price" | "value" => price_idx = Some(idx),
            _ => {}
        }
    }

    let set_code_idx = set_code_idx.ok_or_else(|| Error::Import {
        message: "missing required column setCode".to_string(),
    })?;
    let number_idx = number_idx.ok_or_else(|| Error::Import {
        message: "missing required column cardNumber".to_string(),
    })?;
    let quantity_idx = quantity_idx.ok_or_else(|| Error::Import {
        message: "missing required column quantity".to_string(),
    })?;

    let mut entries = Vec::new();
    let mut seen: HashSet<(String, i32)> = HashSet::new();

    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = record.map_err(|e| Error::Import {
            message: format!("line {line}: malformed record: {e}"),
        })?;

        let set_code = record.get(set_code_idx).unwrap_or("").trim();
        if set_code.is_empty() {
            return Err(Error::Import {
                message: format!("line {line}: blank set code"),
            });
        }

        let number_text = record.get(number_idx).unwrap_or("").trim();
        let card_number: i32 = number_text.parse().map_err(|_| Error::Import {
            message: format!("line {line}: invalid card number '{number_text}'"),
        })?;

        let quantity_text = record.get(quantity_idx).unwrap_or("").trim();
        let quantity: i32 = quantity_text.parse().map_err(|_| Error::Import {
            message: format!("line {line}: invalid quantity '{quantity_text}'"),
        })?;

        if !seen.insert((set_code.to_string(), card_number)) {
            return Err(Error::Import {
                message: format!("line {line}: duplicate card key {set_code} #{card_number}"),
            });
        }

        let price_text = price_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .unwrap_or("");
        let price = if price_text.is_empty() {
            None
        } else {
            Some(price_text.parse::<f64>().map_err(|_| Error::Import {
                message: format!("line {line}: invalid price '{price_text}'"),
            })?)
        };

        entries.push(ExternalEntry {
            set_code: set_code.to_string(),
            card_number,
            quantity,
            price,
        });
    }

    Ok(entries)
}

/// Replaces the whole ownership ledger with the contents of a delimited
/// file.
///
/// The file is parsed completely before anything is written; a malformed
/// record aborts with the ledger untouched. The replacement itself runs in
/// one transaction, so importing the same file twice equals importing it
/// once. Returns the number of rows applied.
pub async fn import_collection<R>(db: &DatabaseConnection, reader: R) -> Result<usize>
where
    R: Read,
{
    let contents = read_contents(reader)?;
    let rows = parse_collection_csv(&contents)?;
    let applied = rows.len();

    let txn = db.begin().await?;
    CollectionCard::delete_many().exec(&txn).await?;
    for chunk in rows.chunks(INSERT_CHUNK) {
        let models = chunk.iter().cloned().map(|m| collection_card::ActiveModel {
            set_code: Set(m.set_code),
            card_number: Set(m.card_number),
            quantity: Set(m.quantity),
            price: Set(m.price),
            color: Set(m.color),
            personal_notes: Set(m.personal_notes),
            general_notes: Set(m.general_notes),
        });
        CollectionCard::insert_many(models)
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;

    info!(applied, "collection import complete");
    Ok(applied)
}

/// Imports an external collection snapshot from a delimited file.
///
/// The file is parsed completely, then the snapshot is created atomically.
/// The user's own ledgers are never touched.
pub async fn import_external_collection<R>(
    db: &DatabaseConnection,
    name: &str,
    reader: R,
) -> Result<external_collection::Model>
where
    R: Read,
{
    let contents = read_contents(reader)?;
    let entries = parse_external_csv(&contents)?;
    external::create_collection(db, name.to_string(), entries).await
}

/// Imports an external wishlist snapshot from a delimited file. Any price
/// column in the file is ignored; wishlists carry no prices.
pub async fn import_external_wishlist<R>(
    db: &DatabaseConnection,
    name: &str,
    reader: R,
) -> Result<external_wishlist::Model>
where
    R: Read,
{
    let contents = read_contents(reader)?;
    let entries = parse_external_csv(&contents)?;
    external::create_wishlist(db, name.to_string(), entries).await
}
