//! Property tests for the in-memory ledger structures.
//!
//! Uses proptest to verify:
//! 1. AVL shape: any insert sequence leaves a sorted, balanced tree
//! 2. Extremes bounds: lowest ≤ every recorded price ≤ highest
//! 3. Heap order: popping yields keys in mode order
//! 4. Read-only lookups: searching never changes the index or the extremes

use std::collections::BTreeSet;

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockledger_index::{BinaryHeap, ExtremesTracker, PriceIndex};
use stockledger_types::{Position, TradeKind, Transaction};

// ── Strategies ───────────────────────────────────────────────────────

fn arb_symbol() -> impl Strategy<Value = String> {
    "[A-Z]{1,4}"
}

fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_kind() -> impl Strategy<Value = TradeKind> {
    prop_oneof![Just(TradeKind::Buy), Just(TradeKind::Sell)]
}

fn index_from(symbols: &[String]) -> PriceIndex {
    let mut index = PriceIndex::new();
    for s in symbols {
        // Random symbols repeat; the index must reject, not corrupt.
        let _ = index.insert(Position::new(s.clone(), Decimal::ONE, 1));
    }
    index
}

// ── 1. AVL shape ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn inserts_keep_tree_sorted_and_balanced(symbols in prop::collection::vec(arb_symbol(), 0..200)) {
        let index = index_from(&symbols);
        prop_assert!(index.check_invariants().is_ok());

        let distinct: BTreeSet<&String> = symbols.iter().collect();
        let walked: Vec<&String> = index.inorder().map(|p| &p.symbol).collect();
        prop_assert_eq!(walked, distinct.into_iter().collect::<Vec<_>>());
        prop_assert_eq!(index.preorder().count(), index.len());
    }

    #[test]
    fn rebuild_from_preorder_keeps_positions(symbols in prop::collection::vec(arb_symbol(), 1..100)) {
        let index = index_from(&symbols);
        let rebuilt = PriceIndex::from_positions(index.preorder().cloned()).unwrap();
        prop_assert!(rebuilt.check_invariants().is_ok());
        let a: Vec<&Position> = index.inorder().collect();
        let b: Vec<&Position> = rebuilt.inorder().collect();
        prop_assert_eq!(a, b);
    }
}

// ── 2. Extremes bounds ───────────────────────────────────────────────

proptest! {
    #[test]
    fn extremes_bound_every_price(trades in prop::collection::vec((arb_symbol(), arb_price(), arb_kind()), 1..150)) {
        let mut tracker = ExtremesTracker::new();
        for (i, (symbol, price, kind)) in trades.iter().enumerate() {
            tracker.record_transaction(Transaction::dummy(symbol, *price, *kind, u32::try_from(i).unwrap()));
        }
        let low = tracker.lowest().unwrap().price;
        let high = tracker.highest().unwrap().price;
        for (_, price, _) in &trades {
            prop_assert!(low <= *price && *price <= high);
        }
        prop_assert_eq!(low, trades.iter().map(|t| t.1).min().unwrap());
        prop_assert_eq!(high, trades.iter().map(|t| t.1).max().unwrap());
    }
}

// ── 3. Heap order ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn min_heap_drains_sorted(prices in prop::collection::vec(arb_price(), 0..200)) {
        let mut heap = BinaryHeap::min();
        for p in &prices {
            heap.push(*p, *p);
        }
        let mut drained = Vec::new();
        while let Some(p) = heap.pop() {
            drained.push(p);
        }
        let mut expected = prices.clone();
        expected.sort();
        prop_assert_eq!(drained, expected);
    }

    #[test]
    fn max_heap_drains_reverse_sorted(prices in prop::collection::vec(arb_price(), 0..200)) {
        let mut heap = BinaryHeap::max();
        for p in &prices {
            heap.push(*p, *p);
        }
        let mut drained = Vec::new();
        while let Some(p) = heap.pop() {
            drained.push(p);
        }
        let mut expected = prices.clone();
        expected.sort_by(|a, b| b.cmp(a));
        prop_assert_eq!(drained, expected);
    }
}

// ── 4. Read-only lookups ─────────────────────────────────────────────

proptest! {
    #[test]
    fn repeated_search_is_pure(symbols in prop::collection::vec(arb_symbol(), 1..50), probe in arb_symbol()) {
        let index = index_from(&symbols);
        let mut tracker = ExtremesTracker::new();
        tracker.record_transaction(Transaction::dummy("AAA", Decimal::ONE, TradeKind::Buy, 0));

        let shape: Vec<Position> = index.preorder().cloned().collect();
        let first = index.search(&probe).cloned();
        for _ in 0..5 {
            prop_assert_eq!(index.search(&probe).cloned(), first.clone());
        }
        let after: Vec<Position> = index.preorder().cloned().collect();
        prop_assert_eq!(shape, after);
        prop_assert_eq!(tracker.len(), 1);
        prop_assert_eq!(tracker.lowest(), tracker.highest());
    }
}
