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

//! Shared expense records.
//!
//! An expense carries who paid what ([`ExpenseRecord::payers`]) and who the
//! cost is divided among ([`ExpenseRecord::split_ids`]). The two sets are
//! independent: a member can pay without owing a share and owe a share
//! without having paid. The payer sum may differ from the total; the
//! difference is what consolidation attributes between members.

use crate::base::{MemberId, RecordId};
use crate::currency::Currency;
use crate::error::LedgerError;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One spend event shared within a trip.
///
/// Iteration order of `payers` and `split_ids` is their insertion order.
/// Consolidation allocates greedily in that order, so the order is part of
/// the record's observable behavior and must survive serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: RecordId,
    /// Display date as entered by the client (e.g. `2024/03/31`).
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    /// Total cost of the expense.
    pub amount: Decimal,
    pub currency: Currency,
    /// Amount each contributing member actually paid. Absent means zero.
    pub payers: IndexMap<MemberId, Decimal>,
    /// Members the cost is divided among, equally.
    pub split_ids: Vec<MemberId>,
}

impl ExpenseRecord {
    /// Amount `member` paid toward this expense (zero if absent).
    pub fn paid_by(&self, member: &MemberId) -> Decimal {
        self.payers.get(member).copied().unwrap_or(Decimal::ZERO)
    }

    /// Whether `member` owes a share of this expense.
    pub fn is_split_with(&self, member: &MemberId) -> bool {
        self.split_ids.contains(member)
    }

    /// Equal per-member share: `amount / |split_ids|`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EmptySplitGroup`] when the split group is empty, so
    /// the division by zero surfaces as a data-integrity error instead of
    /// garbage output.
    pub fn equal_share(&self) -> Result<Decimal, LedgerError> {
        if self.split_ids.is_empty() {
            return Err(LedgerError::EmptySplitGroup);
        }
        Ok(self.amount / Decimal::from(self.split_ids.len() as u64))
    }

    /// Writer-side validation, applied before the record enters a ledger.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - total is zero or negative.
    /// - [`LedgerError::EmptySplitGroup`] - nobody to divide the cost among.
    /// - [`LedgerError::NegativeContribution`] - a payer amount is negative.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        if self.split_ids.is_empty() {
            return Err(LedgerError::EmptySplitGroup);
        }
        if self.payers.values().any(|paid| *paid < Decimal::ZERO) {
            return Err(LedgerError::NegativeContribution);
        }
        Ok(())
    }
}
