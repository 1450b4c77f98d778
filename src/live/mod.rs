//! Reactive query layer - observable views over the ledger state.
//!
//! Mutations publish [`StoreChange`]s on a [`ChangeBus`]; a [`LiveQuery`]
//! listens for the changes relevant to it and recomputes its snapshot,
//! superseding any in-flight recompute so subscribers only ever observe the
//! newest result.

/// Broadcast bus carrying store change notifications
pub mod bus;

/// Observable query with latest-wins recomputation
pub mod query;

/// Concrete live views over ledgers, decks, snapshots, and trades
pub mod views;

pub use bus::{ChangeBus, StoreChange};
pub use query::LiveQuery;
