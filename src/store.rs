// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Thread-safe keyed record store with stable insertion order.
//!
//! Mirrors the contract of the external document store: records keyed by
//! id, created/replaced/deleted whole, snapshot reads. Insertion order is
//! preserved because consolidation's greedy tie-break makes record order
//! observable.

use crate::base::RecordId;
use crate::error::LedgerError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;

/// A record that knows its own id.
pub trait Record {
    fn record_id(&self) -> &RecordId;
}

/// A concurrent, insertion-ordered collection of records.
///
/// Combines a [`DashMap`] for O(1) keyed access with a mutex-guarded id
/// list for iteration order. The two are never locked at the same time:
/// writers touch the map first and the order list second, readers clone
/// the order list and then resolve ids against the map, so a record being
/// inserted concurrently is simply not visible until its id is ordered.
#[derive(Debug)]
pub struct RecordStore<T> {
    /// Records indexed by id for O(1) duplicate detection and lookup.
    records: DashMap<RecordId, T>,

    /// Record ids in insertion order.
    order: Mutex<Vec<RecordId>>,
}

impl<T: Record + Clone> RecordStore<T> {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    /// Adds a record to the store.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateRecord`] if a record with the same
    /// id already exists.
    pub fn insert(&self, record: T) -> Result<(), LedgerError> {
        let id = record.record_id().clone();

        // Entry API for atomic check-and-insert to prevent race conditions.
        match self.records.entry(id.clone()) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateRecord),
            Entry::Vacant(entry) => {
                entry.insert(record);
                self.order.lock().push(id);
                Ok(())
            }
        }
    }

    /// Inserts the record, replacing any existing record with the same id.
    ///
    /// A replacement keeps the record's original position; a new id goes to
    /// the end, matching how the document store echoes writes back.
    pub fn upsert(&self, record: T) {
        let id = record.record_id().clone();
        if self.records.insert(id.clone(), record).is_none() {
            self.order.lock().push(id);
        }
    }

    /// Removes a record by id, returning it if present.
    pub fn remove(&self, id: &RecordId) -> Option<T> {
        let removed = self.records.remove(id).map(|(_, record)| record);
        if removed.is_some() {
            self.order.lock().retain(|ordered| ordered != id);
        }
        removed
    }

    /// Retrieves a copy of a record by id.
    pub fn get(&self, id: &RecordId) -> Option<T> {
        self.records.get(id).map(|record| record.value().clone())
    }

    /// Applies a fallible mutation to the record with the given id.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RecordNotFound`] if the id is unknown; otherwise
    /// whatever the mutation returns.
    pub fn update<F>(&self, id: &RecordId, mutate: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut T) -> Result<(), LedgerError>,
    {
        let mut record = self.records.get_mut(id).ok_or(LedgerError::RecordNotFound)?;
        mutate(record.value_mut())
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copies out all records in insertion order.
    ///
    /// Ids removed between the order read and the map lookup are skipped;
    /// the snapshot is whatever the store held at some recent moment, which
    /// is all a read-side projection needs.
    pub fn snapshot(&self) -> Vec<T> {
        let order = self.order.lock().clone();
        order
            .iter()
            .filter_map(|id| self.records.get(id).map(|record| record.value().clone()))
            .collect()
    }
}

impl<T: Record + Clone> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
