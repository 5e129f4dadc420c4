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

//! Settlement records.
//!
//! A settlement is a direct payment between two members, recorded to reduce
//! an imbalance computed from the expense ledger. Status follows a one-way
//! state machine:
//!
//! - [`Pending`] → [`Confirmed`] (via [`SettlementRecord::confirm`], receiver only)
//!
//! There is no reverse transition, no expiry, and no cancellation. Status is
//! informational: balance consolidation applies settlements of either status.
//!
//! [`Pending`]: SettlementStatus::Pending
//! [`Confirmed`]: SettlementStatus::Confirmed

use crate::base::{MemberId, RecordId};
use crate::currency::Currency;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Acknowledgement state of a settlement.
///
//  Settlement (Pending) ──confirm by receiver──► Settlement (Confirmed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Payer recorded the payment; receiver has not acknowledged it yet.
    Pending,
    /// Receiver acknowledged the payment. Terminal.
    Confirmed,
}

/// A direct payment from one member to another, outside the expense ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: RecordId,
    /// Member who paid.
    pub from_id: MemberId,
    /// Member who was paid.
    pub to_id: MemberId,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: SettlementStatus,
    /// Display date as entered by the client.
    #[serde(default)]
    pub date: String,
}

impl SettlementRecord {
    /// Acknowledges receipt of the payment, `Pending` → `Confirmed`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotReceiver`] - `by` is not the settlement's receiver.
    /// - [`LedgerError::AlreadyConfirmed`] - the settlement left `Pending` before.
    pub fn confirm(&mut self, by: &MemberId) -> Result<(), LedgerError> {
        if *by != self.to_id {
            return Err(LedgerError::NotReceiver);
        }
        if self.status != SettlementStatus::Pending {
            return Err(LedgerError::AlreadyConfirmed);
        }
        self.status = SettlementStatus::Confirmed;
        Ok(())
    }

    /// Writer-side validation, applied before the record enters a ledger.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - amount is zero or negative.
    /// - [`LedgerError::SelfSettlement`] - payer and receiver are the same member.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        if self.from_id == self.to_id {
            return Err(LedgerError::SelfSettlement);
        }
        Ok(())
    }
}
