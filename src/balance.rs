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

//! Debt consolidation.
//!
//! [`consolidate`] reduces an expense list and a settlement list to one
//! [`BalanceEntry`] per (counterparty, currency) pair, from the point of
//! view of a single member. It is a pure function of its inputs: no state
//! is kept between calls, and the result is fully re-derivable from the
//! two record lists at any time.
//!
//! # Allocation
//!
//! Each expense is settled independently. The viewer's net position is
//! `paid - share`; a positive net is attributed as credit against
//! under-payers in split-group order, a negative net as debt against
//! over-payers in payer order, greedily until the net is exhausted.
//!
//! The per-counterparty breakdown among three or more members is therefore
//! an iteration-order tie-break, not a unique mathematical solution; only
//! the viewer's total net position is well-defined. Both orders are
//! insertion orders, so the tie-break is deterministic.
//!
//! # Settlements
//!
//! Recorded payments reduce the matching (counterparty, currency) bucket
//! whether or not the receiver confirmed them. Confirmation is a roster-
//! facing acknowledgement, not a gate on the arithmetic.

use crate::base::MemberId;
use crate::currency::Currency;
use crate::error::LedgerError;
use crate::expense::ExpenseRecord;
use crate::settlement::SettlementRecord;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Entries at or below this value (in the currency's minor unit) are
/// suppressed as division noise, not as a business threshold.
const NOISE_FLOOR: Decimal = Decimal::ONE;

/// Net position toward one counterparty in one currency.
///
/// Both amounts are non-negative; at most one is meaningfully non-zero for
/// a given counterparty unless record data is inconsistent.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEntry {
    pub counterparty: MemberId,
    /// What the viewer still owes the counterparty.
    pub to_pay: Decimal,
    /// What the counterparty still owes the viewer.
    pub to_receive: Decimal,
    pub currency: Currency,
}

impl BalanceEntry {
    const DECIMAL_PRECISION: u32 = 2;
}

impl Serialize for BalanceEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("BalanceEntry", 4)?;
        state.serialize_field("counterparty", &self.counterparty)?;
        state.serialize_field("to_pay", &self.to_pay.round_dp(Self::DECIMAL_PRECISION))?;
        state.serialize_field(
            "to_receive",
            &self.to_receive.round_dp(Self::DECIMAL_PRECISION),
        )?;
        state.serialize_field("currency", &self.currency)?;
        state.end()
    }
}

#[derive(Debug, Default)]
struct Totals {
    debt: Decimal,
    credit: Decimal,
}

/// Computes the viewer's balance against every counterparty.
///
/// Accumulation is keyed by (counterparty, currency); relationships that
/// span currencies produce one entry per currency, never a converted sum.
///
/// # Errors
///
/// [`LedgerError::EmptySplitGroup`] when any expense carries an empty split
/// group. The writer should have rejected the record; the engine refuses to
/// turn it into a zero balance silently.
pub fn consolidate(
    expenses: &[ExpenseRecord],
    settlements: &[SettlementRecord],
    me: &MemberId,
) -> Result<Vec<BalanceEntry>, LedgerError> {
    let mut balances: IndexMap<(MemberId, Currency), Totals> = IndexMap::new();

    for exp in expenses {
        let share = exp.equal_share()?;
        let my_share = if exp.is_split_with(me) { share } else { Decimal::ZERO };
        let my_net = exp.paid_by(me) - my_share;

        if my_net > Decimal::ZERO {
            // Overpaid: attribute the float to under-payers in split order.
            let mut remaining = my_net;
            for other in &exp.split_ids {
                if other == me {
                    continue;
                }
                let shortfall = (share - exp.paid_by(other)).max(Decimal::ZERO);
                let owes_me = remaining.min(shortfall);
                if owes_me > Decimal::ZERO {
                    let totals = balances
                        .entry((other.clone(), exp.currency))
                        .or_default();
                    totals.credit += owes_me;
                    remaining -= owes_me;
                }
                if remaining <= Decimal::ZERO {
                    break;
                }
            }
        } else if my_net < Decimal::ZERO {
            // Underpaid: cover the deficit against over-payers in payer order.
            let mut remaining = -my_net;
            for (payer, paid) in &exp.payers {
                if payer == me {
                    continue;
                }
                let payer_share = if exp.is_split_with(payer) {
                    share
                } else {
                    Decimal::ZERO
                };
                let overpaid = (*paid - payer_share).max(Decimal::ZERO);
                let i_owe = remaining.min(overpaid);
                if i_owe > Decimal::ZERO {
                    let totals = balances
                        .entry((payer.clone(), exp.currency))
                        .or_default();
                    totals.debt += i_owe;
                    remaining -= i_owe;
                }
                if remaining <= Decimal::ZERO {
                    break;
                }
            }
        }
    }

    // Settlements adjust existing buckets only; a payment with no matching
    // expense relationship never materializes an entry. Status is not
    // consulted here.
    for settlement in settlements {
        if settlement.from_id == *me {
            if let Some(totals) =
                balances.get_mut(&(settlement.to_id.clone(), settlement.currency))
            {
                totals.debt -= settlement.amount;
            }
        } else if settlement.to_id == *me {
            if let Some(totals) =
                balances.get_mut(&(settlement.from_id.clone(), settlement.currency))
            {
                totals.credit -= settlement.amount;
            }
        }
    }

    Ok(balances
        .into_iter()
        .map(|((counterparty, currency), totals)| BalanceEntry {
            counterparty,
            to_pay: totals.debt.max(Decimal::ZERO),
            to_receive: totals.credit.max(Decimal::ZERO),
            currency,
        })
        .filter(|entry| entry.to_pay > NOISE_FLOOR || entry.to_receive > NOISE_FLOOR)
        .collect())
}
