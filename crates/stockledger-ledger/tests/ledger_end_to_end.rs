//! End-to-end tests across credentials, ledger, and tables.
//!
//! These tests exercise the full session lifecycle:
//! register -> login -> open ledger -> trade -> close -> reopen
//!
//! They check that averages and extremes come out right, that failed
//! trades leave both memory and disk untouched, and that a reopened ledger
//! sees exactly what the previous session persisted.

use std::fs;

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockledger_ledger::Ledger;
use stockledger_store::{AuthenticatedUser, CredentialStore};
use stockledger_types::{LedgerConfig, LedgerError, Position, TradeKind};

/// Helper: one data directory with a registered, logged-in user.
struct Session {
    dir: tempfile::TempDir,
    config: LedgerConfig,
    user: AuthenticatedUser,
}

impl Session {
    fn new(username: &str) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::with_data_dir(dir.path());
        let mut creds = CredentialStore::open(config.credentials_path()).unwrap();
        creds.register(username, "secret").unwrap();
        let user = creds.login(username, "secret").unwrap();
        Self { dir, config, user }
    }

    fn open(&self) -> Ledger {
        Ledger::open(&self.config, &self.user).unwrap()
    }

    fn file(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }
}

fn d(v: i64) -> Decimal {
    Decimal::new(v, 0)
}

fn snapshot(ledger: &Ledger) -> (Vec<Position>, usize) {
    (ledger.portfolio().cloned().collect(), ledger.history().len())
}

// =========================================================================
// Trading
// =========================================================================

#[test]
fn buy_twice_averages_cost() {
    let s = Session::new("alice");
    let mut ledger = s.open();

    ledger.buy("AAA", d(100), 10).unwrap();
    let p = ledger.buy("AAA", d(200), 10).unwrap();

    assert_eq!(p.average_price, d(150));
    assert_eq!(p.quantity, 20);

    let history = ledger.history();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|t| t.kind == TradeKind::Buy));
    assert_eq!(history[0].price, d(100));
    assert_eq!(history[1].price, d(200));
}

#[test]
fn sell_keeps_average_and_logs_at_it() {
    let s = Session::new("alice");
    let mut ledger = s.open();
    ledger.buy("AAA", d(100), 10).unwrap();
    ledger.buy("AAA", d(200), 10).unwrap();

    let p = ledger.sell("AAA", 5).unwrap();
    assert_eq!(p.quantity, 15);
    assert_eq!(p.average_price, d(150));

    let last = ledger.history().pop().unwrap();
    assert_eq!(last.kind, TradeKind::Sell);
    assert_eq!(last.price, d(150));
}

#[test]
fn oversell_is_rejected_without_side_effects() {
    let s = Session::new("alice");
    let mut ledger = s.open();
    ledger.buy("AAA", d(100), 15).unwrap();
    let before = snapshot(&ledger);
    let stocks_before = fs::read_to_string(s.file("alice_stocks.csv")).unwrap();

    let err = ledger.sell("AAA", 100).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientQuantity { requested: 100, held: 15, .. }
    ));
    assert_eq!(snapshot(&ledger), before);
    assert_eq!(
        fs::read_to_string(s.file("alice_stocks.csv")).unwrap(),
        stocks_before
    );
}

#[test]
fn selling_everything_keeps_a_flat_position() {
    let s = Session::new("alice");
    let mut ledger = s.open();
    ledger.buy("AAA", d(40), 3).unwrap();

    let p = ledger.sell("AAA", 3).unwrap();
    assert!(p.is_flat());
    assert_eq!(p.average_price, d(40));
    assert_eq!(ledger.find("AAA").unwrap().quantity, 0);
    assert!(matches!(
        ledger.sell("AAA", 1),
        Err(LedgerError::InsufficientQuantity { held: 0, .. })
    ));
}

#[test]
fn unknown_symbol_lookup_fails() {
    let s = Session::new("alice");
    let ledger = s.open();
    assert!(matches!(
        ledger.find("ZZZ"),
        Err(LedgerError::SymbolNotFound(ref sym)) if sym == "ZZZ"
    ));
}

#[test]
fn extremes_span_buys_and_sells() {
    let s = Session::new("alice");
    let mut ledger = s.open();
    assert!(ledger.lowest_trade().is_none());
    assert!(ledger.highest_trade().is_none());

    ledger.buy("AAA", d(100), 1).unwrap();
    ledger.buy("BBB", d(50), 2).unwrap();
    ledger.sell("BBB", 1).unwrap(); // logged at 50
    ledger.buy("CCC", d(300), 1).unwrap();

    assert_eq!(ledger.lowest_trade().unwrap().price, d(50));
    assert_eq!(ledger.lowest_trade().unwrap().symbol, "BBB");
    assert_eq!(ledger.highest_trade().unwrap().price, d(300));
    assert_eq!(ledger.highest_trade().unwrap().symbol, "CCC");
}

#[test]
fn portfolio_lists_symbols_in_order() {
    let s = Session::new("alice");
    let mut ledger = s.open();
    for sym in ["MSFT", "AAPL", "TSLA", "GOOG", "AMZN"] {
        ledger.buy(sym, d(10), 1).unwrap();
    }
    let symbols: Vec<String> = ledger.portfolio().map(|p| p.symbol.clone()).collect();
    assert_eq!(symbols, ["AAPL", "AMZN", "GOOG", "MSFT", "TSLA"]);
}

// =========================================================================
// Persistence
// =========================================================================

#[test]
fn reopen_restores_positions_and_history() {
    let s = Session::new("alice");
    let before = {
        let mut ledger = s.open();
        ledger.buy("AAA", d(100), 10).unwrap();
        ledger.buy("AAA", d(200), 10).unwrap();
        ledger.buy("BBB", d(7), 1).unwrap();
        ledger.sell("AAA", 5).unwrap();
        snapshot(&ledger)
    };

    let ledger = s.open();
    assert_eq!(snapshot(&ledger), before);
    assert_eq!(ledger.find("AAA").unwrap().quantity, 15);
    assert_eq!(ledger.lowest_trade().unwrap().price, d(7));
    assert_eq!(ledger.highest_trade().unwrap().price, d(200));
}

#[test]
fn second_session_for_same_user_is_busy() {
    let s = Session::new("alice");
    let _first = s.open();
    let err = Ledger::open(&s.config, &s.user).unwrap_err();
    assert!(matches!(err, LedgerError::SessionBusy { ref username } if username == "alice"));
}

#[test]
fn closing_a_session_releases_the_lock() {
    let s = Session::new("alice");
    drop(s.open());
    assert!(!s.file("alice.lock").exists());
    assert!(Ledger::open(&s.config, &s.user).is_ok());
}

#[test]
fn users_have_separate_ledgers() {
    let s = Session::new("alice");
    let mut creds = CredentialStore::open(s.config.credentials_path()).unwrap();
    creds.register("bob", "other").unwrap();
    let bob_user = creds.login("bob", "other").unwrap();

    let mut alice = s.open();
    let mut bob = Ledger::open(&s.config, &bob_user).unwrap();
    alice.buy("AAA", d(1), 1).unwrap();
    bob.buy("BBB", d(2), 2).unwrap();

    assert!(alice.find("BBB").is_err());
    assert!(bob.find("AAA").is_err());
    assert_eq!(bob.username(), "bob");
}

// =========================================================================
// Rollback on failed writes
// =========================================================================

#[test]
fn failed_transactions_write_leaves_ledger_unchanged() {
    let s = Session::new("alice");
    let mut ledger = s.open();
    ledger.buy("AAA", d(100), 10).unwrap();
    let before = snapshot(&ledger);
    let stocks_before = fs::read_to_string(s.file("alice_stocks.csv")).unwrap();

    // A directory where the scratch file should go blocks the write.
    fs::create_dir(s.file("alice_transactions.csv.tmp")).unwrap();

    let err = ledger.buy("AAA", d(200), 10).unwrap_err();
    assert!(matches!(err, LedgerError::Io(_)));
    assert_eq!(snapshot(&ledger), before);
    assert_eq!(ledger.find("AAA").unwrap().average_price, d(100));
    assert_eq!(
        fs::read_to_string(s.file("alice_stocks.csv")).unwrap(),
        stocks_before
    );

    fs::remove_dir(s.file("alice_transactions.csv.tmp")).unwrap();
    let p = ledger.buy("AAA", d(200), 10).unwrap();
    assert_eq!(p.average_price, d(150));
}

#[test]
fn failed_positions_write_leaves_ledger_unchanged() {
    let s = Session::new("alice");
    let mut ledger = s.open();
    ledger.buy("AAA", d(100), 10).unwrap();
    let before = snapshot(&ledger);
    let txs_before = fs::read_to_string(s.file("alice_transactions.csv")).unwrap();

    fs::create_dir(s.file("alice_stocks.csv.tmp")).unwrap();

    assert!(ledger.buy("BBB", d(5), 1).is_err());
    assert!(ledger.sell("AAA", 1).is_err());
    assert_eq!(snapshot(&ledger), before);
    assert_eq!(
        fs::read_to_string(s.file("alice_transactions.csv")).unwrap(),
        txs_before
    );
}

// =========================================================================
// Properties
// =========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn buys_conserve_quantity_and_bound_the_average(
        buys in prop::collection::vec((1i64..100_000, 1u64..1_000), 1..12)
    ) {
        let s = Session::new("alice");
        let mut ledger = s.open();

        let mut total = 0u64;
        for &(cents, qty) in &buys {
            ledger.buy("AAA", Decimal::new(cents, 2), qty).unwrap();
            total += qty;
        }

        let p = ledger.find("AAA").unwrap();
        prop_assert_eq!(p.quantity, total);

        let lo = buys.iter().map(|&(c, _)| Decimal::new(c, 2)).min().unwrap();
        let hi = buys.iter().map(|&(c, _)| Decimal::new(c, 2)).max().unwrap();
        prop_assert!(p.average_price >= lo && p.average_price <= hi);
        prop_assert_eq!(ledger.lowest_trade().unwrap().price, lo);
        prop_assert_eq!(ledger.highest_trade().unwrap().price, hi);
    }
}
