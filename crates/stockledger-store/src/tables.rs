//! CSV codecs for the positions and transactions tables.
//!
//! Fields are read by position only. The first record is dropped if, and
//! only if, it matches the table's header. Records with the wrong number of
//! fields are skipped with a warning; records with the right shape but
//! unparseable values are reported as [`LedgerError::CorruptTable`].

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rust_decimal::Decimal;
use stockledger_types::{
    LedgerError, Position, Result, TradeKind, TradeTimestamp, Transaction, constants,
    validate_symbol,
};

pub(crate) const POSITIONS_TABLE: &str = "positions";
pub(crate) const TRANSACTIONS_TABLE: &str = "transactions";

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Parse a positions table. Duplicate symbols are rejected.
pub fn read_positions<R: Read>(reader: R) -> Result<Vec<Position>> {
    let mut rdr = table_reader(reader);
    let mut positions = Vec::new();
    let mut seen = HashSet::new();

    for (idx, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| csv_error(POSITIONS_TABLE, &e))?;
        let row = idx + 1;
        if idx == 0 && is_header(&record, &constants::POSITIONS_HEADER) {
            continue;
        }
        if record.len() != constants::POSITIONS_HEADER.len() {
            tracing::warn!(
                table = POSITIONS_TABLE,
                row,
                fields = record.len(),
                "Skipping malformed row"
            );
            continue;
        }

        let symbol = record[0].to_string();
        validate_symbol(&symbol).map_err(|e| corrupt(POSITIONS_TABLE, row, e.to_string()))?;
        let average_price = parse_price(POSITIONS_TABLE, row, &record[1])?;
        let quantity = record[2].trim().parse::<u64>().map_err(|e| {
            corrupt(
                POSITIONS_TABLE,
                row,
                format!("bad quantity {:?}: {e}", &record[2]),
            )
        })?;

        if !seen.insert(symbol.clone()) {
            return Err(corrupt(
                POSITIONS_TABLE,
                row,
                format!("duplicate symbol {symbol:?}"),
            ));
        }
        tracing::debug!(table = POSITIONS_TABLE, row, symbol = %symbol, "Row loaded");
        positions.push(Position {
            symbol,
            average_price,
            quantity,
        });
    }
    Ok(positions)
}

/// Write a headered positions table, one row per position, in the order given.
pub fn write_positions<'a, W: Write>(
    writer: W,
    rows: impl IntoIterator<Item = &'a Position>,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(constants::POSITIONS_HEADER)
        .map_err(|e| csv_error(POSITIONS_TABLE, &e))?;
    for p in rows {
        let price = p.average_price.to_string();
        let quantity = p.quantity.to_string();
        wtr.write_record([p.symbol.as_str(), price.as_str(), quantity.as_str()])
            .map_err(|e| csv_error(POSITIONS_TABLE, &e))?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Parse a transactions table, preserving row order.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = table_reader(reader);
    let mut transactions = Vec::new();

    for (idx, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| csv_error(TRANSACTIONS_TABLE, &e))?;
        let row = idx + 1;
        if idx == 0 && is_header(&record, &constants::TRANSACTIONS_HEADER) {
            continue;
        }
        if record.len() != constants::TRANSACTIONS_HEADER.len() {
            tracing::warn!(
                table = TRANSACTIONS_TABLE,
                row,
                fields = record.len(),
                "Skipping malformed row"
            );
            continue;
        }

        let price = parse_price(TRANSACTIONS_TABLE, row, &record[1])?;
        let kind = TradeKind::from_str(&record[2])
            .map_err(|reason| corrupt(TRANSACTIONS_TABLE, row, reason))?;
        transactions.push(Transaction {
            symbol: record[0].to_string(),
            price,
            kind,
            timestamp: TradeTimestamp(record[3].to_string()),
        });
    }
    Ok(transactions)
}

/// Write a headered transactions table in the order given.
pub fn write_transactions<'a, W: Write>(
    writer: W,
    rows: impl IntoIterator<Item = &'a Transaction>,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(constants::TRANSACTIONS_HEADER)
        .map_err(|e| csv_error(TRANSACTIONS_TABLE, &e))?;
    for t in rows {
        let price = t.price.to_string();
        let kind = t.kind.to_string();
        wtr.write_record([
            t.symbol.as_str(),
            price.as_str(),
            kind.as_str(),
            t.timestamp.as_str(),
        ])
        .map_err(|e| csv_error(TRANSACTIONS_TABLE, &e))?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Open `path` for reading, or `None` if it does not exist.
pub(crate) fn open_if_exists(path: &Path) -> Result<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LedgerError::Io(format!("cannot open {}: {e}", path.display()))),
    }
}

/// Replace `path` with whatever `write` produces.
///
/// The content goes to a scratch file next to `path`, is synced, and is then
/// renamed over the target. On failure the scratch file is removed and the
/// previous table is left as it was.
pub(crate) fn write_atomically(
    path: &Path,
    write: impl FnOnce(&mut File) -> Result<()>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = scratch_path(path);
    let staged: Result<()> = (|| {
        let mut file = File::create(&tmp)
            .map_err(|e| LedgerError::Io(format!("cannot create {}: {e}", tmp.display())))?;
        write(&mut file)?;
        file.sync_all()?;
        Ok(())
    })();
    if let Err(e) = staged {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| {
        LedgerError::Io(format!(
            "cannot move {} over {}: {e}",
            tmp.display(),
            path.display()
        ))
    })
}

fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(constants::TEMP_FILE_SUFFIX);
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

pub(crate) fn table_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

fn is_header(record: &StringRecord, header: &[&str]) -> bool {
    record.len() == header.len()
        && record
            .iter()
            .zip(header)
            .all(|(field, name)| field.trim().eq_ignore_ascii_case(name))
}

fn parse_price(table: &str, row: usize, raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    let price = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| corrupt(table, row, format!("bad price {raw:?}: {e}")))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(corrupt(table, row, format!("negative price {price}")));
    }
    Ok(price)
}

fn corrupt(table: &str, row: usize, reason: String) -> LedgerError {
    LedgerError::CorruptTable {
        table: table.to_string(),
        row,
        reason,
    }
}

pub(crate) fn csv_error(table: &str, err: &csv::Error) -> LedgerError {
    if let csv::ErrorKind::Io(io) = err.kind() {
        return LedgerError::Io(io.to_string());
    }
    let row = err
        .position()
        .and_then(|p| usize::try_from(p.record()).ok())
        .map_or(0, |r| r + 1);
    corrupt(table, row, err.to_string())
}
