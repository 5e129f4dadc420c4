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

//! Trip ledger.
//!
//! The [`TripLedger`] holds the two record collections of a trip (shared
//! expenses and settlement payments) and projects member balances from
//! them. It is the in-process mirror of the external document store's
//! snapshot: records are validated on the way in, replaced or removed
//! whole, and balances are recomputed from scratch on every read.
//!
//! # Concurrency
//!
//! All methods take `&self`; multiple realtime listeners and UI readers may
//! touch the ledger concurrently. There are no transactions and no conflict
//! resolution: a reader sees whatever snapshot is current, exactly as a
//! client of the hosted store would.

use crate::balance::{BalanceEntry, consolidate};
use crate::base::{MemberId, RecordId};
use crate::error::LedgerError;
use crate::expense::ExpenseRecord;
use crate::settlement::{SettlementRecord, SettlementStatus};
use crate::store::{Record, RecordStore};

impl Record for ExpenseRecord {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for SettlementRecord {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

/// Expense and settlement collections for one trip.
///
/// # Invariants
///
/// - Record ids are unique within each collection.
/// - Every stored record passed its writer-side validation.
/// - Settlement status only ever moves `Pending` → `Confirmed`, and only
///   at the receiver's hand.
pub struct TripLedger {
    expenses: RecordStore<ExpenseRecord>,
    settlements: RecordStore<SettlementRecord>,
}

impl TripLedger {
    /// Creates a ledger with no records.
    pub fn new() -> Self {
        TripLedger {
            expenses: RecordStore::new(),
            settlements: RecordStore::new(),
        }
    }

    /// Adds a new expense record.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DuplicateRecord`] - expense id already exists.
    /// - Any validation error from [`ExpenseRecord::validate`].
    pub fn add_expense(&self, expense: ExpenseRecord) -> Result<(), LedgerError> {
        expense.validate()?;
        self.expenses.insert(expense)
    }

    /// Creates or replaces an expense record, as the store echo does.
    ///
    /// # Errors
    ///
    /// Any validation error from [`ExpenseRecord::validate`].
    pub fn upsert_expense(&self, expense: ExpenseRecord) -> Result<(), LedgerError> {
        expense.validate()?;
        self.expenses.upsert(expense);
        Ok(())
    }

    /// Removes an expense record by id.
    pub fn remove_expense(&self, id: &RecordId) -> Option<ExpenseRecord> {
        self.expenses.remove(id)
    }

    /// Adds a new settlement record.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DuplicateRecord`] - settlement id already exists.
    /// - Any validation error from [`SettlementRecord::validate`].
    pub fn add_settlement(&self, settlement: SettlementRecord) -> Result<(), LedgerError> {
        settlement.validate()?;
        self.settlements.insert(settlement)
    }

    /// Creates or replaces a settlement record.
    ///
    /// # Errors
    ///
    /// Any validation error from [`SettlementRecord::validate`].
    pub fn upsert_settlement(&self, settlement: SettlementRecord) -> Result<(), LedgerError> {
        settlement.validate()?;
        self.settlements.upsert(settlement);
        Ok(())
    }

    /// Removes a settlement record by id.
    pub fn remove_settlement(&self, id: &RecordId) -> Option<SettlementRecord> {
        self.settlements.remove(id)
    }

    /// Confirms receipt of a settlement on behalf of `by`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::RecordNotFound`] - unknown settlement id.
    /// - [`LedgerError::NotReceiver`] - `by` is not the receiver.
    /// - [`LedgerError::AlreadyConfirmed`] - settlement already confirmed.
    pub fn confirm_settlement(&self, id: &RecordId, by: &MemberId) -> Result<(), LedgerError> {
        self.settlements.update(id, |settlement| settlement.confirm(by))
    }

    /// Snapshot of all expense records in insertion order.
    pub fn expenses(&self) -> Vec<ExpenseRecord> {
        self.expenses.snapshot()
    }

    /// Snapshot of all settlement records in insertion order.
    pub fn settlements(&self) -> Vec<SettlementRecord> {
        self.settlements.snapshot()
    }

    /// Settlements paid to `member` that still await their acknowledgement.
    pub fn pending_incoming(&self, member: &MemberId) -> Vec<SettlementRecord> {
        self.settlements
            .snapshot()
            .into_iter()
            .filter(|s| s.to_id == *member && s.status == SettlementStatus::Pending)
            .collect()
    }

    /// Consolidated balances from `member`'s point of view.
    ///
    /// Recomputed in full from the current snapshots on every call; owns no
    /// state and caches nothing.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EmptySplitGroup`] if a malformed expense reached the
    /// collection (possible when a concurrent writer bypassed validation).
    pub fn balances_for(&self, member: &MemberId) -> Result<Vec<BalanceEntry>, LedgerError> {
        consolidate(&self.expenses(), &self.settlements(), member)
    }
}

impl Default for TripLedger {
    fn default() -> Self {
        Self::new()
    }
}
