/// Card catalog bootstrap, lookup, and replacement
pub mod catalog;

/// Ownership ledger operations
pub mod collection;

/// Deck management and deck card operations
pub mod deck;

/// External collection and wishlist snapshots
pub mod external;

/// Shared filter and sort types for ledger listings
pub mod filter;

/// Price history and collection value statistics
pub mod stats;

/// Cross-collection trade matching
pub mod trade;

/// Wishlist ledger operations
pub mod wishlist;
