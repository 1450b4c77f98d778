//! Observable query with latest-wins recomputation.
//!
//! A [`LiveQuery`] turns a read-only query over the store into a live view:
//! it recomputes its snapshot whenever its parameters change or a relevant
//! [`StoreChange`] arrives on the bus, and broadcasts each fresh snapshot to
//! every subscriber. Recomputation is superseding: starting a new recompute
//! aborts the in-flight one, and a finished snapshot is delivered only while
//! it is still the newest, so a stale result is never delivered after a
//! newer one.

use crate::errors::Result;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::warn;

use super::bus::{ChangeBus, StoreChange};

/// Buffer capacity for the per-query snapshot channel. Only the newest
/// snapshots matter, so a lagging subscriber dropping old ones is fine.
const SNAPSHOT_CAPACITY: usize = 64;

/// Boxed future produced by a snapshot computation.
pub type SnapshotFuture<R> = Pin<Box<dyn Future<Output = Result<R>> + Send>>;

type ComputeFn<P, R> = Arc<dyn Fn(DatabaseConnection, P) -> SnapshotFuture<R> + Send + Sync>;
type InterestFn<P> = Arc<dyn Fn(&P, StoreChange) -> bool + Send + Sync>;

/// Shared state between the query handle, its bus listener, and any
/// in-flight recompute task.
struct Inner<P, R> {
    db: DatabaseConnection,
    compute: ComputeFn<P, R>,
    interest: InterestFn<P>,
    params: Mutex<P>,
    /// Monotonic recompute counter; a finished snapshot is delivered only
    /// while its generation is still the newest one started.
    generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    snapshots: broadcast::Sender<Arc<R>>,
}

impl<P, R> Inner<P, R> {
    fn lock_params(&self) -> MutexGuard<'_, P> {
        self.params.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Starts a recompute for the current parameters, superseding any in-flight
/// one. The previous task is aborted; if it already passed its delivery
/// check its snapshot went out before this newer one, never after.
fn trigger<P, R>(inner: &Arc<Inner<P, R>>)
where
    P: Clone + Send + 'static,
    R: Send + Sync + 'static,
{
    let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
    let params = inner.lock_params().clone();
    let db = inner.db.clone();
    let compute = Arc::clone(&inner.compute);
    let state = Arc::clone(inner);

    let handle = tokio::spawn(async move {
        match compute(db, params).await {
            Ok(snapshot) => {
                // Deliver only while no newer recompute has started
                if state.generation.load(Ordering::SeqCst) == generation {
                    let _ = state.snapshots.send(Arc::new(snapshot));
                }
            }
            Err(error) => warn!(%error, "live query recompute failed"),
        }
    });

    let mut slot = inner.lock_in_flight();
    if let Some(previous) = slot.replace(handle) {
        previous.abort();
    }
}

/// A live view over the store: parameters `P` in, snapshots of `R` out.
///
/// Constructed by the view functions in [`super::views`] and handed out by
/// the store facade. Every subscriber receives the same snapshot sequence.
/// Dropping the query aborts its bus listener and any in-flight recompute,
/// so leaving a screen cancels its pending work.
pub struct LiveQuery<P, R> {
    inner: Arc<Inner<P, R>>,
    listener: JoinHandle<()>,
}

impl<P, R> LiveQuery<P, R>
where
    P: Clone + Send + 'static,
    R: Send + Sync + 'static,
{
    /// Creates a live query bound to a bus.
    ///
    /// `interest` decides, under the current parameters, whether a store
    /// change affects this query; `compute` produces a fresh snapshot. The
    /// bus listener is spawned on the current runtime. No snapshot is
    /// computed until [`refresh`](Self::refresh), a parameter change, or a
    /// relevant store change arrives, so callers subscribe first and then
    /// prime the query.
    pub fn new<C, Fut, I>(
        db: DatabaseConnection,
        bus: &ChangeBus,
        params: P,
        interest: I,
        compute: C,
    ) -> Self
    where
        C: Fn(DatabaseConnection, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
        I: Fn(&P, StoreChange) -> bool + Send + Sync + 'static,
    {
        let compute: ComputeFn<P, R> = Arc::new(move |db, params| {
            let future: SnapshotFuture<R> = Box::pin(compute(db, params));
            future
        });
        let interest: InterestFn<P> = Arc::new(interest);
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CAPACITY);

        let inner = Arc::new(Inner {
            db,
            compute,
            interest,
            params: Mutex::new(params),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            snapshots,
        });

        let mut changes = bus.subscribe();
        let listener_state = Arc::clone(&inner);
        let listener = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        let relevant = {
                            let params = listener_state.lock_params();
                            (listener_state.interest)(&params, change)
                        };
                        if relevant {
                            trigger(&listener_state);
                        }
                    }
                    // Dropped changes may have been relevant, so recompute
                    Err(RecvError::Lagged(_)) => trigger(&listener_state),
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self { inner, listener }
    }

    /// Subscribes to the snapshot stream. Snapshots are shared via `Arc`,
    /// so many subscribers cost one computation.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<R>> {
        self.inner.snapshots.subscribe()
    }

    /// Replaces the query parameters and recomputes.
    ///
    /// Any in-flight recompute for the previous parameters is superseded:
    /// its task is aborted and its snapshot, if already computed, is never
    /// delivered after the new one.
    pub fn set_params(&self, params: P) {
        *self.inner.lock_params() = params;
        trigger(&self.inner);
    }

    /// Recomputes a snapshot for the current parameters.
    pub fn refresh(&self) {
        trigger(&self.inner);
    }

    /// The current query parameters.
    #[must_use]
    pub fn params(&self) -> P {
        self.inner.lock_params().clone()
    }
}

impl<P, R> Drop for LiveQuery<P, R> {
    fn drop(&mut self) {
        self.listener.abort();
        if let Some(task) = self.inner.lock_in_flight().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use std::time::Duration;
    use tokio::time::timeout;

    /// A query whose snapshot is just its parameter times ten; interest in
    /// wishlist changes only.
    fn tenfold_query(db: DatabaseConnection, bus: &ChangeBus) -> LiveQuery<i32, i32> {
        LiveQuery::new(
            db,
            bus,
            1,
            |_, change| matches!(change, StoreChange::Wishlist),
            |_db, params| async move { Ok(params * 10) },
        )
    }

    #[tokio::test]
    async fn test_refresh_delivers_a_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = ChangeBus::default();
        let query = tenfold_query(db, &bus);
        let mut rx = query.subscribe();

        query.refresh();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(*snapshot, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_latest_params_win() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = ChangeBus::default();
        let query = tenfold_query(db, &bus);
        let mut rx = query.subscribe();

        // Two back-to-back parameter changes: the first recompute is
        // superseded before it runs, so exactly one snapshot arrives and
        // it reflects the second value.
        query.set_params(2);
        query.set_params(3);

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(*snapshot, 30);
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
        assert_eq!(query.params(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_relevant_change_triggers_recompute() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = ChangeBus::default();
        let query = tenfold_query(db, &bus);
        let mut rx = query.subscribe();

        bus.publish(StoreChange::Wishlist);

        let snapshot = timeout(Duration::from_millis(500), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*snapshot, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_irrelevant_change_is_ignored() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = ChangeBus::default();
        let query = tenfold_query(db, &bus);
        let mut rx = query.subscribe();

        bus.publish(StoreChange::Collection);
        bus.publish(StoreChange::Catalog);

        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_the_same_sequence() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = ChangeBus::default();
        let query = tenfold_query(db, &bus);
        let mut first = query.subscribe();
        let mut second = query.subscribe();

        query.set_params(4);

        assert_eq!(*first.recv().await.unwrap(), 40);
        assert_eq!(*second.recv().await.unwrap(), 40);

        Ok(())
    }

    #[tokio::test]
    async fn test_interest_sees_current_params() -> Result<()> {
        let db = setup_test_db().await?;
        let bus = ChangeBus::default();

        // Interested only in changes to the deck named by the parameter
        let query = LiveQuery::new(
            db,
            &bus,
            5,
            |deck_id, change| matches!(change, StoreChange::Deck { deck_id: id } if id == *deck_id),
            |_db, params: i32| async move { Ok(params) },
        );
        let mut rx = query.subscribe();

        bus.publish(StoreChange::Deck { deck_id: 4 });
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());

        bus.publish(StoreChange::Deck { deck_id: 5 });
        let snapshot = timeout(Duration::from_millis(500), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*snapshot, 5);

        Ok(())
    }
}
