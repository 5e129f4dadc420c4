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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use tripsplit_rs::{
    Currency, ExpenseRecord, MemberId, RecordId, SettlementRecord, SettlementStatus, TripLedger,
};

/// TripSplit - Consolidate trip expense CSV files into member balances
///
/// Reads expense and settlement records from a CSV file and outputs the
/// consolidated balances of one member to stdout.
#[derive(Parser, Debug)]
#[command(name = "tripsplit-rs")]
#[command(about = "Consolidates trip expense CSVs into per-member balances", long_about = None)]
struct Args {
    /// Path to CSV file with expense and settlement records
    ///
    /// Expected format: kind,id,amount,currency,payers,split,from,to,status
    /// Example: cargo run -- records.csv --member user-admin > balances.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Member whose balances are computed
    #[arg(long, value_name = "ID")]
    member: String,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Load records from CSV
    let ledger = match load_records(BufReader::new(file)) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error reading records: {}", e);
            process::exit(1);
        }
    };

    // Consolidate for the requested member
    let member = MemberId::from(args.member.as_str());
    let balances = match ledger.balances_for(&member) {
        Ok(balances) => balances,
        Err(e) => {
            eprintln!("Error consolidating balances: {}", e);
            process::exit(1);
        }
    };

    // Write results to stdout
    if let Err(e) = write_balances(&balances, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `kind, id, amount, currency, payers, split, from, to, status`
/// - `payers` is encoded `member:amount;member:amount`
/// - `split` is encoded `member;member;member`
/// - `from`/`to`/`status` apply to settlement rows only
#[derive(Debug, Deserialize)]
struct CsvRecord {
    kind: String,
    id: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    currency: String,
    payers: Option<String>,
    split: Option<String>,
    from: Option<String>,
    to: Option<String>,
    status: Option<String>,
}

/// Either kind of ledger record, as parsed from one CSV row.
#[derive(Debug)]
enum LedgerRow {
    Expense(ExpenseRecord),
    Settlement(SettlementRecord),
}

impl CsvRecord {
    /// Converts the CSV record to a ledger record.
    ///
    /// Returns `None` for unknown kinds or missing required fields.
    fn into_row(self) -> Option<LedgerRow> {
        let id = RecordId::from(self.id.as_str());
        let amount = self.amount?;
        let currency = Currency::from_str(&self.currency).ok()?;

        match self.kind.to_lowercase().as_str() {
            "expense" => Some(LedgerRow::Expense(ExpenseRecord {
                id,
                date: String::new(),
                description: String::new(),
                amount,
                currency,
                payers: parse_payers(self.payers.as_deref().unwrap_or(""))?,
                split_ids: parse_members(self.split.as_deref().unwrap_or("")),
            })),
            "settlement" => Some(LedgerRow::Settlement(SettlementRecord {
                id,
                from_id: MemberId::from(self.from?.as_str()),
                to_id: MemberId::from(self.to?.as_str()),
                amount,
                currency,
                status: match self.status.as_deref() {
                    Some("confirmed") => SettlementStatus::Confirmed,
                    _ => SettlementStatus::Pending,
                },
                date: String::new(),
            })),
            _ => None,
        }
    }
}

/// Parses a `member:amount;member:amount` payer list.
///
/// Returns `None` when an amount fails to parse; an empty field is an
/// empty payer map (nobody recorded a payment yet).
fn parse_payers(field: &str) -> Option<IndexMap<MemberId, Decimal>> {
    let mut payers = IndexMap::new();
    for pair in field.split(';').filter(|p| !p.trim().is_empty()) {
        let (member, amount) = pair.split_once(':')?;
        payers.insert(
            MemberId::from(member.trim()),
            Decimal::from_str(amount.trim()).ok()?,
        );
    }
    Some(payers)
}

/// Parses a `member;member;member` list.
fn parse_members(field: &str) -> Vec<MemberId> {
    field
        .split(';')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(MemberId::from)
        .collect()
}

/// Loads records from a CSV reader into a fresh ledger.
///
/// Streaming parse; malformed rows and records that fail validation are
/// skipped (logged in debug builds only), matching how the realtime feed
/// drops documents it cannot apply.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn load_records<R: Read>(reader: R) -> Result<TripLedger, csv::Error> {
    let ledger = TripLedger::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " expense "
        .flexible(true) // Allow short settlement/expense rows
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => {
                let Some(row) = record.into_row() else {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping invalid record row");
                    continue;
                };

                let outcome = match row {
                    LedgerRow::Expense(expense) => ledger.add_expense(expense),
                    LedgerRow::Settlement(settlement) => ledger.add_settlement(settlement),
                };
                if let Err(_e) = outcome {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping record: {}", _e);
                }
            }
            Err(_e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", _e);
                continue;
            }
        }
    }

    Ok(ledger)
}

/// Writes balance entries to a CSV writer.
///
/// # CSV Format
///
/// Columns: `counterparty, to_pay, to_receive, currency`
///
/// # Example
///
/// ```csv
/// counterparty,to_pay,to_receive,currency
/// 2,3000,0,JPY
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_balances<W: Write>(
    balances: &[tripsplit_rs::BalanceEntry],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for entry in balances {
        wtr.serialize(entry)?;
    }

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}
