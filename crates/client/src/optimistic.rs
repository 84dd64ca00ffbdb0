//! Optimistic drafts with commit-or-revert.
//!
//! Each mutation takes a [`Ticket`] stamped with a per-list sequence number. For any entity
//! only the most recently issued ticket decides what is displayed: an older ticket settling
//! late never overwrites or reverts the newer draft. Its success still moves the confirmed
//! base, which is what a failed newer ticket falls back to.

use std::{collections::HashMap, fmt::Debug, future::Future, hash::Hash};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{ClientError, Result},
    models::{Notification, Task},
};

pub trait Keyed: Clone {
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
}

impl Keyed for Task {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Notification {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct Ticket<T: Keyed> {
    key: T::Key,
    seq: u64,
    draft: T,
}

impl<T: Keyed> Ticket<T> {
    pub fn key(&self) -> &T::Key {
        &self.key
    }

    pub fn draft(&self) -> &T {
        &self.draft
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The latest ticket confirmed its draft.
    Applied,
    /// The latest ticket failed; the entity is back on its confirmed base.
    Reverted,
    /// A newer ticket exists, so nothing visible changed.
    Stale,
}

struct Pending<T> {
    base: T,
    latest: u64,
}

pub struct OptimisticList<T: Keyed> {
    items: Vec<T>,
    pending: HashMap<T::Key, Pending<T>>,
    next_seq: u64,
}

impl<T: Keyed> Default for OptimisticList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Keyed> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            pending: HashMap::new(),
            next_seq: 1,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    pub fn is_pending(&self, key: &T::Key) -> bool {
        self.pending.contains_key(key)
    }

    /// Takes a fresh fetch. Entities with work in flight keep showing their draft and the
    /// fetched copy becomes their confirmed base. Entities missing from the fetch are gone,
    /// along with their pending work.
    pub fn replace_all(&mut self, fetched: Vec<T>) {
        self.pending
            .retain(|key, _| fetched.iter().any(|item| &item.key() == key));
        let mut items = Vec::with_capacity(fetched.len());
        for item in fetched {
            match self.pending.get_mut(&item.key()) {
                Some(pending) => {
                    let shown = self.items.iter().find(|i| i.key() == item.key()).cloned();
                    pending.base = item.clone();
                    items.push(shown.unwrap_or(item));
                }
                None => items.push(item),
            }
        }
        self.items = items;
    }

    pub fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|i| i.key() == item.key()) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    /// Overwrites the entity if it is still listed.
    fn replace(&mut self, item: T) {
        if let Some(slot) = self.items.iter_mut().find(|i| i.key() == item.key()) {
            *slot = item;
        }
    }

    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        self.pending.remove(key);
        let idx = self.items.iter().position(|i| &i.key() == key)?;
        Some(self.items.remove(idx))
    }

    /// Applies `draft` to the entity and returns the ticket that will settle it.
    pub fn begin(&mut self, key: &T::Key, draft: impl FnOnce(&mut T)) -> Option<Ticket<T>> {
        let item = self.items.iter_mut().find(|i| &i.key() == key)?;
        let seq = self.next_seq;
        self.next_seq += 1;

        self.pending
            .entry(key.clone())
            .and_modify(|p| p.latest = seq)
            .or_insert_with(|| Pending {
                base: item.clone(),
                latest: seq,
            });

        draft(item);
        Some(Ticket {
            key: key.clone(),
            seq,
            draft: item.clone(),
        })
    }

    /// Settles a ticket whose request succeeded. `confirmed` is the backend's copy, if it
    /// sent one; otherwise the draft stands.
    pub fn commit(&mut self, ticket: Ticket<T>, confirmed: Option<T>) -> Settled {
        let confirmed = confirmed.unwrap_or(ticket.draft);
        match self.latest(&ticket.key) {
            Some(latest) if latest == ticket.seq => {
                self.pending.remove(&ticket.key);
                self.replace(confirmed);
                Settled::Applied
            }
            Some(_) => {
                if let Some(pending) = self.pending.get_mut(&ticket.key) {
                    pending.base = confirmed;
                }
                Settled::Stale
            }
            None => Settled::Stale,
        }
    }

    /// Settles a ticket whose request failed.
    pub fn revert(&mut self, ticket: Ticket<T>) -> Settled {
        if self.latest(&ticket.key) != Some(ticket.seq) {
            return Settled::Stale;
        }
        if let Some(pending) = self.pending.remove(&ticket.key) {
            self.replace(pending.base);
        }
        Settled::Reverted
    }

    fn latest(&self, key: &T::Key) -> Option<u64> {
        self.pending.get(key).map(|p| p.latest)
    }
}

/// Drafts the change, runs `call` with the drafted entity, then commits or reverts.
///
/// The lock is not held across `call`, so later mutations of the same entity can be
/// issued while this one is in flight.
pub async fn commit_or_revert<T, D, F, Fut>(
    list: &RwLock<OptimisticList<T>>,
    key: &T::Key,
    draft: D,
    call: F,
) -> Result<Settled>
where
    T: Keyed,
    D: FnOnce(&mut T),
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let ticket = list
        .write()
        .await
        .begin(key, draft)
        .ok_or_else(|| ClientError::Validation(format!("{key:?} is not loaded")))?;

    match call(ticket.draft.clone()).await {
        Ok(confirmed) => Ok(list.write().await.commit(ticket, confirmed)),
        Err(e) => {
            let settled = list.write().await.revert(ticket);
            tracing::warn!(?key, ?settled, "Optimistic update failed: {}", e);
            Err(e)
        }
    }
}
