//! Collection export to delimited text.
//!
//! The export format is the canonical comma-delimited shape with the full
//! column set, written in key order so repeated exports of the same ledger
//! are byte-identical.

use crate::{core::collection, errors::Result};
use sea_orm::DatabaseConnection;
use std::io::Write;

/// Column headers of the canonical export format.
pub const EXPORT_HEADERS: [&str; 7] = [
    "setCode",
    "cardNumber",
    "quantity",
    "price",
    "color",
    "personalNotes",
    "generalNotes",
];

/// Writes the whole ownership ledger as comma-delimited text.
///
/// Rows are ordered by set code and collector number; absent prices and
/// notes become empty cells. Returns the number of data rows written.
pub async fn export_collection<W>(db: &DatabaseConnection, writer: W) -> Result<usize>
where
    W: Write,
{
    let entries = collection::all_entries(db).await?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;

    let count = entries.len();
    for entry in entries {
        csv_writer.write_record([
            entry.set_code,
            entry.card_number.to_string(),
            entry.quantity.to_string(),
            entry.price.map(|p| p.to_string()).unwrap_or_default(),
            entry.color.code().to_string(),
            entry.personal_notes.unwrap_or_default(),
            entry.general_notes.unwrap_or_default(),
        ])?;
    }
    csv_writer.flush()?;

    Ok(count)
}
