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

//! Error types for record validation and balance consolidation.

use thiserror::Error;

/// Ledger processing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Expense is divided among an empty split group.
    ///
    /// Surfaced instead of dividing by zero; an expense like this is a
    /// data-integrity failure on the writer's side, not a zero balance.
    #[error("expense split group is empty")]
    EmptySplitGroup,

    /// Amount is zero or negative.
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// A payer contribution is negative.
    #[error("payer contribution must not be negative")]
    NegativeContribution,

    /// Duplicate record ID within a collection.
    #[error("duplicate record ID")]
    DuplicateRecord,

    /// Referenced record ID does not exist.
    #[error("record not found")]
    RecordNotFound,

    /// Settlement payer and receiver are the same member.
    #[error("settlement payer and receiver must differ")]
    SelfSettlement,

    /// Only the settlement's receiver can confirm it.
    #[error("only the receiver can confirm a settlement")]
    NotReceiver,

    /// Settlement was already confirmed.
    #[error("settlement already confirmed")]
    AlreadyConfirmed,
}

#[cfg(test)]
mod tests {
    use super::LedgerError;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::EmptySplitGroup.to_string(),
            "expense split group is empty"
        );
        assert_eq!(
            LedgerError::InvalidAmount.to_string(),
            "invalid amount (must be positive)"
        );
        assert_eq!(
            LedgerError::NegativeContribution.to_string(),
            "payer contribution must not be negative"
        );
        assert_eq!(LedgerError::DuplicateRecord.to_string(), "duplicate record ID");
        assert_eq!(LedgerError::RecordNotFound.to_string(), "record not found");
        assert_eq!(
            LedgerError::SelfSettlement.to_string(),
            "settlement payer and receiver must differ"
        );
        assert_eq!(
            LedgerError::NotReceiver.to_string(),
            "only the receiver can confirm a settlement"
        );
        assert_eq!(
            LedgerError::AlreadyConfirmed.to_string(),
            "settlement already confirmed"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::EmptySplitGroup;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
