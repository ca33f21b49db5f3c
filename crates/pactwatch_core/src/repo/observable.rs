//! Push-based change feed over any agreement repository.
//!
//! # Responsibility
//! - Decorate an `AgreementRepository` so every successful mutation
//!   publishes the fresh full agreement list to all subscribers.
//! - Keep delivery channel-based: a writer never receives the post-write
//!   snapshot synchronously, it arrives through its `Subscription`.
//!
//! # Invariants
//! - Failed mutations publish nothing.
//! - Snapshots are read and sent under the feed lock, so each subscriber
//!   receives them in commit order and the last one queued is the newest.
//! - Inside `batch`, mutations publish one snapshot when the outermost batch
//!   ends instead of one each.
//! - `revision` increases by one per published snapshot.
//! - Dropped subscriptions are pruned on the next publish.

use crate::model::agreement::{Agreement, AgreementId, AgreementPatch};
use crate::repo::agreement_repo::{AgreementRepository, RepoResult};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Receiving end of the change feed.
pub struct Subscription {
    receiver: Receiver<Vec<Agreement>>,
}

impl Subscription {
    /// Returns the oldest queued snapshot without blocking.
    pub fn try_next(&self) -> Option<Vec<Agreement>> {
        match self.receiver.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drains every queued snapshot and returns only the newest one.
    ///
    /// Older snapshots are superseded: each one is a full list.
    pub fn latest(&self) -> Option<Vec<Agreement>> {
        let mut newest = None;
        while let Some(snapshot) = self.try_next() {
            newest = Some(snapshot);
        }
        newest
    }
}

#[derive(Default)]
struct FeedState {
    subscribers: Vec<Sender<Vec<Agreement>>>,
    /// Open `batch` scopes.
    held: usize,
    /// A mutation committed while held.
    pending: bool,
}

#[derive(Default)]
struct ChangeFeed {
    state: Mutex<FeedState>,
    revision: AtomicU64,
}

impl ChangeFeed {
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Repository decorator that notifies subscribers after each mutation.
pub struct ObservableStore<R> {
    inner: R,
    feed: ChangeFeed,
}

impl<R: AgreementRepository> ObservableStore<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            feed: ChangeFeed::default(),
        }
    }

    /// Registers a new subscriber. Only mutations after this call are seen.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        self.feed.lock().subscribers.push(sender);
        Subscription { receiver }
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.lock().subscribers.len()
    }

    /// Number of snapshots published so far.
    pub fn revision(&self) -> u64 {
        self.feed.revision.load(Ordering::SeqCst)
    }

    /// Runs `f` with per-mutation publishing suspended.
    ///
    /// Mutations made by `f`, from any thread, are announced by a single
    /// snapshot once the outermost batch returns, whether `f` succeeded or
    /// not. Nothing is published when `f` mutated nothing.
    pub fn batch<T>(&self, f: impl FnOnce(&Self) -> T) -> T {
        self.feed.lock().held += 1;
        let _release = BatchRelease { store: self };
        f(self)
    }

    fn after_mutation<T>(&self, operation: &'static str, result: RepoResult<T>) -> RepoResult<T> {
        let value = result?;
        let mut state = self.feed.lock();
        if state.held > 0 {
            state.pending = true;
        } else {
            self.publish_locked(&mut state, operation);
        }
        Ok(value)
    }

    fn release_batch(&self) {
        let mut state = self.feed.lock();
        state.held = state.held.saturating_sub(1);
        if state.held == 0 && state.pending {
            state.pending = false;
            self.publish_locked(&mut state, "batch");
        }
    }

    fn publish_locked(&self, state: &mut FeedState, operation: &'static str) {
        let snapshot = match self.inner.list_agreements() {
            Ok(snapshot) => snapshot,
            // The write is committed; only the notification is lost.
            Err(err) => {
                warn!(
                    "event=feed_publish module=repo status=error operation={operation} error={err}"
                );
                return;
            }
        };
        state
            .subscribers
            .retain(|sender| sender.send(snapshot.clone()).is_ok());
        let revision = self.feed.revision.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "event=feed_publish module=repo status=ok operation={operation} revision={revision} records={} subscribers={}",
            snapshot.len(),
            state.subscribers.len()
        );
    }
}

struct BatchRelease<'a, R: AgreementRepository> {
    store: &'a ObservableStore<R>,
}

impl<R: AgreementRepository> Drop for BatchRelease<'_, R> {
    fn drop(&mut self) {
        self.store.release_batch();
    }
}

impl<R: AgreementRepository> AgreementRepository for ObservableStore<R> {
    fn get_agreement(&self, id: AgreementId) -> RepoResult<Option<Agreement>> {
        self.inner.get_agreement(id)
    }

    fn list_agreements(&self) -> RepoResult<Vec<Agreement>> {
        self.inner.list_agreements()
    }

    fn insert_agreement(&self, agreement: &Agreement) -> RepoResult<AgreementId> {
        self.after_mutation("insert", self.inner.insert_agreement(agreement))
    }

    fn update_agreement(&self, agreement: &Agreement) -> RepoResult<()> {
        self.after_mutation("update", self.inner.update_agreement(agreement))
    }

    fn patch_agreement(&self, id: AgreementId, patch: &AgreementPatch) -> RepoResult<()> {
        self.after_mutation("patch", self.inner.patch_agreement(id, patch))
    }

    fn delete_agreement(&self, id: AgreementId) -> RepoResult<()> {
        self.after_mutation("delete", self.inner.delete_agreement(id))
    }
}
