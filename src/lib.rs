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

//! # TripSplit
//!
//! This library consolidates a trip's shared expenses and settlement
//! payments into per-member balances: for each counterparty, how much the
//! viewing member still owes them and how much they still owe the viewing
//! member, per currency.
//!
//! ## Core Components
//!
//! - [`consolidate`]: The balance reduction, a pure function of the two record lists
//! - [`TripLedger`]: Concurrent holder of a trip's expense and settlement collections
//! - [`ExpenseRecord`]: One spend event with payers and an equal-split group
//! - [`SettlementRecord`]: A direct member-to-member payment with a pending/confirmed lifecycle
//! - [`LedgerError`]: Error types for validation and consolidation failures
//!
//! ## Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tripsplit_rs::{Currency, ExpenseRecord, MemberId, RecordId, TripLedger};
//!
//! let ledger = TripLedger::new();
//!
//! // Member "2" paid the whole dinner, split four ways.
//! ledger
//!     .add_expense(ExpenseRecord {
//!         id: RecordId::from("1"),
//!         date: "2024/03/31".to_string(),
//!         description: "yakiniku dinner".to_string(),
//!         amount: dec!(12000),
//!         currency: Currency::Jpy,
//!         payers: [(MemberId::from("2"), dec!(12000))].into_iter().collect(),
//!         split_ids: vec![
//!             MemberId::from("user-admin"),
//!             MemberId::from("2"),
//!             MemberId::from("3"),
//!             MemberId::from("4"),
//!         ],
//!     })
//!     .unwrap();
//!
//! // The admin owes member "2" their 3000 JPY share.
//! let balances = ledger.balances_for(&MemberId::from("user-admin")).unwrap();
//! assert_eq!(balances.len(), 1);
//! assert_eq!(balances[0].counterparty, MemberId::from("2"));
//! assert_eq!(balances[0].to_pay, dec!(3000));
//! ```
//!
//! ## Thread Safety
//!
//! The ledger may be shared across threads; realtime-store listeners can
//! apply record changes while readers recompute balances. Balances are a
//! read-side projection of whatever snapshot is current; there is no
//! locking across the two collections and no conflict resolution.

pub mod balance;
mod base;
mod currency;
pub mod error;
mod expense;
mod ledger;
mod settlement;
mod store;

pub use balance::{BalanceEntry, consolidate};
pub use base::{MemberId, RecordId};
pub use currency::{Currency, UnknownCurrency};
pub use error::LedgerError;
pub use expense::ExpenseRecord;
pub use ledger::TripLedger;
pub use settlement::{SettlementRecord, SettlementStatus};
pub use store::{Record, RecordStore};
