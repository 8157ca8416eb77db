//! Integration tests for the full movement pipeline.
//!
//! Tests: operation → balance store + movement journal, including the
//! concurrency and replay guarantees.

use std::sync::Arc;

use proptest::prelude::*;

use stockforge_balance::InMemoryBalanceStore;
use stockforge_catalog::{InMemoryCatalog, Product, Warehouse};
use stockforge_core::{ActorId, DocumentId, ProductId, StockError, WarehouseId};
use stockforge_ledger::{
    InMemoryMovementJournal, JournalQuery, MovementRef, MovementType, ReferenceKind,
};

use crate::processor::MovementProcessor;

type TestProcessor =
    MovementProcessor<Arc<InMemoryCatalog>, Arc<InMemoryBalanceStore>, Arc<InMemoryMovementJournal>>;

struct Fixture {
    processor: Arc<TestProcessor>,
    journal: Arc<InMemoryMovementJournal>,
    product: ProductId,
    wh_a: WarehouseId,
    wh_b: WarehouseId,
    actor: ActorId,
}

fn setup() -> Fixture {
    stockforge_observability::init();

    let catalog = Arc::new(InMemoryCatalog::new());
    let balances = Arc::new(InMemoryBalanceStore::new());
    let journal = Arc::new(InMemoryMovementJournal::new());

    let product = ProductId::new();
    let wh_a = WarehouseId::new();
    let wh_b = WarehouseId::new();
    catalog.insert_product(Product::new(product, "SKU-1", "Widget"));
    catalog.insert_warehouse(Warehouse::new(wh_a, "WH-A", "Main"));
    catalog.insert_warehouse(Warehouse::new(wh_b, "WH-B", "Overflow"));

    Fixture {
        processor: Arc::new(MovementProcessor::new(catalog, balances, journal.clone())),
        journal,
        product,
        wh_a,
        wh_b,
        actor: ActorId::new(),
    }
}

fn receipt() -> MovementRef {
    MovementRef::new(ReferenceKind::Receipt, DocumentId::new())
}

fn delivery() -> MovementRef {
    MovementRef::new(ReferenceKind::Delivery, DocumentId::new())
}

fn transfer_ref() -> MovementRef {
    MovementRef::new(ReferenceKind::Transfer, DocumentId::new())
}

fn adjustment_ref() -> MovementRef {
    MovementRef::new(ReferenceKind::Adjustment, DocumentId::new())
}

#[test]
fn end_to_end_scenario() {
    let f = setup();

    // (P, A) starts at 50.
    f.processor
        .record_inward(f.product, f.wh_a, 50, receipt(), f.actor)
        .unwrap();

    // 1. Outward 30 → A at 20.
    let posted = f
        .processor
        .record_outward(f.product, f.wh_a, 30, delivery(), f.actor)
        .unwrap();
    assert_eq!(posted.balance.current_stock, 20);
    assert_eq!(posted.entry.movement_type, MovementType::Outward);
    assert_eq!(posted.entry.quantity, 30);
    assert_eq!(posted.entry.balance_before, 50);
    assert_eq!(posted.entry.balance_after, 20);

    // 2. Transfer 15 A→B → A at 5, B at 15.
    let transfer = f
        .processor
        .record_transfer(f.product, f.wh_a, f.wh_b, 15, transfer_ref(), f.actor)
        .unwrap();
    assert_eq!(transfer.source.balance.current_stock, 5);
    assert_eq!(transfer.source.entry.movement_type, MovementType::TransferOut);
    assert_eq!(transfer.source.entry.balance_before, 20);
    assert_eq!(transfer.source.entry.balance_after, 5);
    assert_eq!(transfer.destination.balance.current_stock, 15);
    assert_eq!(transfer.destination.entry.movement_type, MovementType::TransferIn);
    assert_eq!(transfer.destination.entry.balance_before, 0);
    assert_eq!(transfer.destination.entry.balance_after, 15);

    // 3. Outward 10 fails; A stays at 5, no new entries on either key.
    let entries_before = f.journal.len();
    let err = f
        .processor
        .record_outward(f.product, f.wh_a, 10, delivery(), f.actor)
        .unwrap_err();
    assert_eq!(
        err,
        StockError::InsufficientStock {
            available: 5,
            requested: 10
        }
    );
    assert_eq!(f.processor.balance(f.product, f.wh_a).unwrap().current_stock, 5);
    assert_eq!(f.journal.len(), entries_before);

    f.processor.verify_replay(f.product, f.wh_a).unwrap();
    f.processor.verify_replay(f.product, f.wh_b).unwrap();
}

#[test]
fn insufficient_outward_leaves_no_trace() {
    let f = setup();
    f.processor
        .record_inward(f.product, f.wh_a, 10, receipt(), f.actor)
        .unwrap();

    let err = f
        .processor
        .record_outward(f.product, f.wh_a, 20, delivery(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { available: 10, requested: 20 }));

    let balance = f.processor.balance(f.product, f.wh_a).unwrap();
    assert_eq!(balance.current_stock, 10);
    assert_eq!(balance.version, 1);
    assert_eq!(f.journal.len(), 1);
}

#[test]
fn outward_on_untouched_key_fails_at_zero() {
    let f = setup();
    let err = f
        .processor
        .record_outward(f.product, f.wh_a, 1, delivery(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { available: 0, requested: 1 }));
    assert_eq!(f.journal.len(), 0);
}

#[test]
fn failed_transfer_leaves_both_legs_untouched() {
    let f = setup();
    f.processor
        .record_inward(f.product, f.wh_a, 10, receipt(), f.actor)
        .unwrap();

    let err = f
        .processor
        .record_transfer(f.product, f.wh_a, f.wh_b, 25, transfer_ref(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { available: 10, requested: 25 }));

    assert_eq!(f.processor.balance(f.product, f.wh_a).unwrap().current_stock, 10);
    assert_eq!(f.processor.balance(f.product, f.wh_b).unwrap().current_stock, 0);
    assert_eq!(f.journal.len(), 1);
}

#[test]
fn transfer_legs_share_reference_id() {
    let f = setup();
    f.processor
        .record_inward(f.product, f.wh_a, 30, receipt(), f.actor)
        .unwrap();

    let reference = transfer_ref();
    let transfer = f
        .processor
        .record_transfer(f.product, f.wh_a, f.wh_b, 12, reference, f.actor)
        .unwrap();
    assert_eq!(transfer.source.entry.reference.id, reference.id);
    assert_eq!(transfer.destination.entry.reference.id, reference.id);
    assert_ne!(transfer.source.entry.entry_id, transfer.destination.entry.entry_id);
}

#[test]
fn transfer_to_same_warehouse_is_rejected() {
    let f = setup();
    let err = f
        .processor
        .record_transfer(f.product, f.wh_a, f.wh_a, 5, transfer_ref(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::Validation(_)));
}

#[test]
fn adjustment_creates_balance_on_untouched_key() {
    let f = setup();
    let posted = f
        .processor
        .record_adjustment(f.product, f.wh_a, 10, adjustment_ref(), f.actor)
        .unwrap();
    assert_eq!(posted.balance.current_stock, 10);
    assert_eq!(posted.entry.movement_type, MovementType::Adjustment);
    assert_eq!(posted.entry.quantity, 10);
    assert_eq!(posted.entry.balance_before, 0);
    assert_eq!(posted.entry.balance_after, 10);
}

#[test]
fn negative_adjustment_recovers_sign_from_balances() {
    let f = setup();
    f.processor
        .record_inward(f.product, f.wh_a, 25, receipt(), f.actor)
        .unwrap();

    let posted = f
        .processor
        .record_adjustment(f.product, f.wh_a, -10, adjustment_ref(), f.actor)
        .unwrap();
    assert_eq!(posted.balance.current_stock, 15);
    assert_eq!(posted.entry.quantity, 10);
    assert_eq!(posted.entry.signed_effect(), -10);
}

#[test]
fn negative_adjustment_below_zero_is_rejected() {
    let f = setup();

    // No balance at all.
    let err = f
        .processor
        .record_adjustment(f.product, f.wh_a, -5, adjustment_ref(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { available: 0, requested: 5 }));

    // Balance too small.
    f.processor
        .record_inward(f.product, f.wh_a, 3, receipt(), f.actor)
        .unwrap();
    let err = f
        .processor
        .record_adjustment(f.product, f.wh_a, -5, adjustment_ref(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { available: 3, requested: 5 }));
}

#[test]
fn zero_quantity_is_rejected_for_every_operation() {
    let f = setup();
    let ops: Vec<Result<_, StockError>> = vec![
        f.processor.record_inward(f.product, f.wh_a, 0, receipt(), f.actor),
        f.processor.record_outward(f.product, f.wh_a, 0, delivery(), f.actor),
        f.processor.record_return(f.product, f.wh_a, 0, delivery(), f.actor),
        f.processor.record_adjustment(f.product, f.wh_a, 0, adjustment_ref(), f.actor),
    ];
    for result in ops {
        assert!(matches!(result.unwrap_err(), StockError::Validation(_)));
    }
    let err = f
        .processor
        .record_transfer(f.product, f.wh_a, f.wh_b, 0, transfer_ref(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::Validation(_)));
    assert_eq!(f.journal.len(), 0);
}

#[test]
fn unknown_references_fail_before_any_write() {
    let f = setup();

    let err = f
        .processor
        .record_inward(ProductId::new(), f.wh_a, 5, receipt(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::NotFound(_)));

    let err = f
        .processor
        .record_inward(f.product, WarehouseId::new(), 5, receipt(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::NotFound(_)));
    assert_eq!(f.journal.len(), 0);
}

#[test]
fn inactive_product_is_rejected() {
    let f = setup();
    let catalog = InMemoryCatalog::new();
    let product = ProductId::new();
    let warehouse = WarehouseId::new();
    catalog.insert_product(Product::new(product, "SKU-X", "Retired").deactivated());
    catalog.insert_warehouse(Warehouse::new(warehouse, "WH-X", "Spare"));
    let processor = MovementProcessor::new(
        Arc::new(catalog),
        Arc::new(InMemoryBalanceStore::new()),
        Arc::new(InMemoryMovementJournal::new()),
    );

    let err = processor
        .record_inward(product, warehouse, 5, receipt(), f.actor)
        .unwrap_err();
    assert!(matches!(err, StockError::Validation(_)));
}

#[test]
fn return_movement_restocks_the_key() {
    let f = setup();
    f.processor
        .record_inward(f.product, f.wh_a, 10, receipt(), f.actor)
        .unwrap();
    f.processor
        .record_outward(f.product, f.wh_a, 6, delivery(), f.actor)
        .unwrap();

    let posted = f
        .processor
        .record_return(f.product, f.wh_a, 2, delivery(), f.actor)
        .unwrap();
    assert_eq!(posted.entry.movement_type, MovementType::Return);
    assert_eq!(posted.balance.current_stock, 6);
    f.processor.verify_replay(f.product, f.wh_a).unwrap();
}

#[test]
fn journal_reflects_commits_immediately() {
    let f = setup();
    let posted = f
        .processor
        .record_inward(f.product, f.wh_a, 5, receipt(), f.actor)
        .unwrap();

    let entries = f
        .processor
        .movements(&JournalQuery::new().product(f.product).warehouse(f.wh_a))
        .unwrap();
    assert_eq!(entries, vec![posted.entry]);
}

#[test]
fn untouched_key_reads_as_zero_state() {
    let f = setup();
    let balance = f.processor.balance(f.product, f.wh_b).unwrap();
    assert_eq!(balance.current_stock, 0);
    assert_eq!(balance.version, 0);
    assert_eq!(balance.available_stock(), 0);
}

#[test]
fn concurrent_outwards_never_oversell() {
    let f = setup();
    f.processor
        .record_inward(f.product, f.wh_a, 10, receipt(), f.actor)
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let processor = f.processor.clone();
        let (product, warehouse, actor) = (f.product, f.wh_a, f.actor);
        handles.push(std::thread::spawn(move || {
            processor.record_outward(product, warehouse, 7, delivery(), actor)
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result.as_ref().unwrap_err(),
            StockError::InsufficientStock { .. } | StockError::ConcurrencyConflict(_)
        ));
    }

    assert_eq!(f.processor.balance(f.product, f.wh_a).unwrap().current_stock, 3);
    f.processor.verify_replay(f.product, f.wh_a).unwrap();
}

#[test]
fn opposite_transfers_complete_without_deadlock() {
    let f = setup();
    f.processor
        .record_inward(f.product, f.wh_a, 100, receipt(), f.actor)
        .unwrap();
    f.processor
        .record_inward(f.product, f.wh_b, 100, receipt(), f.actor)
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let processor = f.processor.clone();
        let (product, actor) = (f.product, f.actor);
        let (from, to) = if i % 2 == 0 {
            (f.wh_a, f.wh_b)
        } else {
            (f.wh_b, f.wh_a)
        };
        handles.push(std::thread::spawn(move || {
            processor.record_transfer(product, from, to, 3, transfer_ref(), actor)
        }));
    }

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let a = f.processor.balance(f.product, f.wh_a).unwrap().current_stock;
    let b = f.processor.balance(f.product, f.wh_b).unwrap().current_stock;
    assert_eq!(a + b, 200);
    f.processor.verify_replay(f.product, f.wh_a).unwrap();
    f.processor.verify_replay(f.product, f.wh_b).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Property: after any sequence of movements (some of which fail), the
    /// stored balance equals the fold of the key's journal and never goes
    /// negative.
    #[test]
    fn replay_invariant_holds_for_random_sequences(
        deltas in prop::collection::vec(-20i64..30i64, 1..40)
    ) {
        let f = setup();
        let mut expected = 0i64;

        for delta in deltas {
            if delta == 0 {
                continue;
            }
            let result = if delta > 0 {
                f.processor.record_inward(f.product, f.wh_a, delta, receipt(), f.actor)
            } else {
                f.processor.record_outward(f.product, f.wh_a, -delta, delivery(), f.actor)
            };
            match result {
                Ok(posted) => {
                    expected += delta;
                    prop_assert_eq!(posted.balance.current_stock, expected);
                }
                Err(StockError::InsufficientStock { available, requested }) => {
                    prop_assert_eq!(available, expected);
                    prop_assert_eq!(requested, -delta);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
            prop_assert!(expected >= 0);
        }

        prop_assert_eq!(
            f.processor.balance(f.product, f.wh_a).unwrap().current_stock,
            expected
        );
        prop_assert!(f.processor.verify_replay(f.product, f.wh_a).is_ok());
    }
}
