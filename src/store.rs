//! Shared catalog state.
//!
//! The published page, its loading/error flags, the version stamp and the
//! table of in-flight selection changes all live behind one mutex. Callers go
//! through [`CatalogStore::with_state`], which keeps every critical section
//! synchronous; the lock is never held across an `.await`.

use crate::error::PokedexResult;
use crate::events::EventEmitter;
use crate::models::{PageResult, Pokemon};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// An optimistic selection change waiting on the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub prior: bool,
    pub optimistic: bool,
}

/// Result of trying to start a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStart {
    NotFound,
    AlreadyPending,
    Started {
        prior: bool,
        optimistic: bool,
        version: u64,
    },
}

/// Result of settling a selection change against the latest list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleSettled {
    /// Value the record now carries (authoritative or restored)
    pub selected: bool,
    /// False when a newer fetch replaced the list and the record left the page
    pub visible: bool,
    pub version: u64,
}

#[derive(Debug, Default)]
pub struct CatalogState {
    pub page: PageResult,
    pub loading: bool,
    pub error: Option<String>,
    pub version: u64,
    pub latest_epoch: u64,
    pub in_flight: HashMap<u32, InFlight>,
}

impl CatalogState {
    fn publish(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Allocate the next fetch epoch and raise the loading flag
    pub fn begin_fetch(&mut self) -> u64 {
        self.latest_epoch += 1;
        self.loading = true;
        self.error = None;
        self.latest_epoch
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.latest_epoch
    }

    /// Replace the list with a fetched page.
    ///
    /// Returns the new version, or `None` if `epoch` has been superseded.
    /// Records with a selection change in flight keep their optimistic value
    /// and stay pending.
    pub fn apply_page(&mut self, epoch: u64, mut page: PageResult) -> Option<u64> {
        if !self.is_current(epoch) {
            return None;
        }

        for item in page.items.iter_mut() {
            if let Some(flight) = self.in_flight.get(&item.number) {
                item.selected = flight.optimistic;
                item.pending = true;
            }
        }

        self.page = page;
        self.loading = false;
        Some(self.publish())
    }

    /// Record a failed fetch. The current list is kept.
    ///
    /// Returns false if `epoch` has been superseded.
    pub fn apply_failure(&mut self, epoch: u64, message: String) -> bool {
        if !self.is_current(epoch) {
            return false;
        }

        self.error = Some(message);
        self.loading = false;
        true
    }

    /// Flip a record optimistically and mark it pending
    pub fn begin_toggle(&mut self, number: u32) -> ToggleStart {
        if self.in_flight.contains_key(&number) {
            return ToggleStart::AlreadyPending;
        }

        let Some(record) = self.page.find_mut(number) else {
            return ToggleStart::NotFound;
        };

        let prior = record.selected;
        let optimistic = !prior;
        record.selected = optimistic;
        record.pending = true;

        self.in_flight.insert(number, InFlight { prior, optimistic });
        ToggleStart::Started {
            prior,
            optimistic,
            version: self.publish(),
        }
    }

    /// Settle a selection change.
    ///
    /// `authoritative` is the remote answer, or `None` to roll back. The
    /// record is looked up by number in whatever list is current now.
    pub fn finish_toggle(&mut self, number: u32, authoritative: Option<bool>) -> ToggleSettled {
        let prior = self
            .in_flight
            .remove(&number)
            .map(|flight| flight.prior)
            .unwrap_or_default();
        let selected = authoritative.unwrap_or(prior);

        let visible = match self.page.find_mut(number) {
            Some(record) => {
                record.selected = selected;
                record.pending = false;
                true
            }
            None => false,
        };

        let version = if visible { self.publish() } else { self.version };
        ToggleSettled {
            selected,
            visible,
            version,
        }
    }
}

/// Copy of the published state for readers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogSnapshot {
    pub page: PageResult,
    pub loading: bool,
    pub error: Option<String>,
    pub version: u64,
}

#[derive(Clone, Default)]
pub struct CatalogStore {
    state: Arc<Mutex<CatalogState>>,
    events: EventEmitter,
}

impl CatalogStore {
    pub fn new(events: EventEmitter) -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState::default())),
            events,
        }
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Run `f` with exclusive access to the state
    pub fn with_state<R>(&self, f: impl FnOnce(&mut CatalogState) -> R) -> PokedexResult<R> {
        let mut state = self.state.lock()?;
        Ok(f(&mut state))
    }

    pub fn snapshot(&self) -> PokedexResult<CatalogSnapshot> {
        self.with_state(|state| CatalogSnapshot {
            page: state.page.clone(),
            loading: state.loading,
            error: state.error.clone(),
            version: state.version,
        })
    }

    pub fn find(&self, number: u32) -> PokedexResult<Option<Pokemon>> {
        self.with_state(|state| state.page.find(number).cloned())
    }

    pub fn version(&self) -> PokedexResult<u64> {
        self.with_state(|state| state.version)
    }

    pub fn is_pending(&self, number: u32) -> PokedexResult<bool> {
        self.with_state(|state| state.in_flight.contains_key(&number))
    }
}
