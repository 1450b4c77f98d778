//! Shared filter and sort types for ledger listings.
//!
//! The ownership ledger and the wishlist expose the same filtered listing
//! shape, so the filter lives here rather than in either module. Empty
//! filter axes leave that axis unconstrained.

use crate::entities::CardColor;

/// Sort key for ledger listings. Ties are always broken by set code and
/// then collector number, so every sort yields a deterministic total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Order by catalog card name
    #[default]
    Name,
    /// Order by set code, then collector number
    Number,
    /// Group by color code
    Color,
}

/// Filter and ordering for a ledger listing.
///
/// All axes are optional; the default filter matches every row and sorts
/// by card name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerFilter {
    /// Case-insensitive substring match against the catalog card name
    pub name_contains: Option<String>,
    /// Exact match against the catalog color
    pub color: Option<CardColor>,
    /// Exact match against the entry's set code
    pub set_code: Option<String>,
    /// Ordering of the result rows
    pub sort: SortKey,
}
