//! Unified error types and result handling for `BinderBuddy`.
//!
//! All fallible operations in the crate return [`Result`], and every failure
//! mode is a variant of [`Error`]. Validation failures are rejected before any
//! mutation is applied; import failures abort with zero rows applied.

use thiserror::Error;

/// The unified error type for all `BinderBuddy` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation failed
    #[error("configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },

    /// A card key was not found in the master catalog
    #[error("card {set_code} #{card_number} not found in the master catalog")]
    CardNotFound {
        /// Set code of the missing card
        set_code: String,
        /// Card number of the missing card
        card_number: i32,
    },

    /// A ledger row was expected to exist but did not
    #[error("no ledger entry for card {set_code} #{card_number}")]
    EntryNotFound {
        /// Set code of the missing entry
        set_code: String,
        /// Card number of the missing entry
        card_number: i32,
    },

    /// A deck id did not resolve to an existing deck
    #[error("deck {id} not found")]
    DeckNotFound {
        /// The unknown deck id
        id: i32,
    },

    /// An external collection or wishlist id did not resolve to a snapshot
    #[error("external snapshot {id} not found")]
    ExternalNotFound {
        /// The unknown snapshot id
        id: i32,
    },

    /// A quantity delta or value was rejected by validation
    #[error("invalid quantity {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// A color code string did not map to a known card color
    #[error("invalid color code '{code}'")]
    InvalidColor {
        /// The rejected color code
        code: String,
    },

    /// A delimited import was rejected as a whole
    #[error("import failed: {message}")]
    Import {
        /// Description of the rejected input
        message: String,
    },

    /// The bundled catalog dataset could not be loaded
    #[error("catalog dataset error: {message}")]
    Catalog {
        /// Description of the dataset problem
        message: String,
    },

    /// The remote catalog sync payload was unusable
    #[error("remote sync failed: {message}")]
    Sync {
        /// Description of the sync problem
        message: String,
    },

    /// Database error from the underlying store
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error while reading or writing files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP error from the remote catalog sync
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
