//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! Every committed mutation publishes a [`StoreChange`] describing which
//! ledger it touched. Live queries subscribe and recompute when a change
//! they care about arrives. The bus is fan-out: any number of subscribers
//! each receive every published change.

use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// A committed mutation to one of the persistent ledgers.
///
/// Changes are intentionally coarse: they say which ledger moved, not what
/// moved inside it. Subscribers recompute their whole snapshot anyway, so a
/// finer grain would buy nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    /// The ownership ledger changed
    Collection,
    /// The wishlist ledger changed
    Wishlist,
    /// A deck or its cards changed
    Deck {
        /// Id of the affected deck
        deck_id: i32,
    },
    /// An external collection snapshot was created or deleted
    ExternalCollection {
        /// Id of the affected snapshot
        id: i32,
    },
    /// An external wishlist snapshot was created or deleted
    ExternalWishlist {
        /// Id of the affected snapshot
        id: i32,
    },
    /// The master catalog was loaded or replaced wholesale
    Catalog,
    /// A price observation or value snapshot was appended
    Prices,
}

/// In-process fan-out bus for [`StoreChange`]s.
///
/// Cloning the bus is cheap and every clone publishes into the same channel,
/// so the store facade and its live queries can each hold their own handle.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<StoreChange>,
}

impl ChangeBus {
    /// Creates a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed changes are dropped
    /// and slow receivers observe a lag error on their next receive.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a change to all current subscribers.
    ///
    /// Publishing with zero subscribers is a no-op, not an error.
    pub fn publish(&self, change: StoreChange) {
        // A send error only means there are no receivers right now
        let _ = self.sender.send(change);
    }

    /// Subscribes to all changes published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = ChangeBus::default();
        let mut rx = bus.subscribe();

        bus.publish(StoreChange::Collection);
        bus.publish(StoreChange::Deck { deck_id: 7 });

        assert_eq!(rx.recv().await.unwrap(), StoreChange::Collection);
        assert_eq!(rx.recv().await.unwrap(), StoreChange::Deck { deck_id: 7 });
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_change() {
        let bus = ChangeBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(StoreChange::Wishlist);

        assert_eq!(first.recv().await.unwrap(), StoreChange::Wishlist);
        assert_eq!(second.recv().await.unwrap(), StoreChange::Wishlist);
    }

    #[test]
    fn test_publish_without_subscribers_is_a_no_op() {
        let bus = ChangeBus::default();
        bus.publish(StoreChange::Catalog);
    }

    #[tokio::test]
    async fn test_clones_share_the_channel() {
        let bus = ChangeBus::default();
        let publisher = bus.clone();
        let mut rx = bus.subscribe();

        publisher.publish(StoreChange::Prices);
        assert_eq!(rx.recv().await.unwrap(), StoreChange::Prices);
    }
}
