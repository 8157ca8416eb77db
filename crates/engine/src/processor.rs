use serde::{Deserialize, Serialize};

use stockforge_balance::{BalanceDelta, BalanceRecord, BalanceStore, BalanceStoreError};
use stockforge_catalog::ReferenceCatalog;
use stockforge_core::{
    ActorId, ExpectedVersion, ProductId, StockError, StockKey, StockResult, WarehouseId,
};
use stockforge_ledger::{
    JournalError, JournalQuery, LedgerEntry, MovementJournal, MovementRef, MovementType,
    NewLedgerEntry,
};

use crate::locks::{self, LockRegistry};
use crate::replay::{fold_chain, ReplayError};

/// Result of one committed single-leg movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posted {
    pub balance: BalanceRecord,
    pub entry: LedgerEntry,
}

/// Result of one committed transfer (both legs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedTransfer {
    pub source: Posted,
    pub destination: Posted,
}

/// The four+ movement operations, each a single atomic unit spanning one or
/// two balance rows and one or two journal appends.
///
/// External document workflows call exactly one operation per line item.
/// Validation (existence, quantity, sufficiency) completes before the first
/// write; a failed call leaves balance and journal untouched. The processor
/// never retries internally.
#[derive(Debug)]
pub struct MovementProcessor<C, B, J> {
    catalog: C,
    balances: B,
    journal: J,
    locks: LockRegistry,
}

impl<C, B, J> MovementProcessor<C, B, J> {
    pub fn new(catalog: C, balances: B, journal: J) -> Self {
        Self {
            catalog,
            balances,
            journal,
            locks: LockRegistry::new(),
        }
    }
}

fn balance_err(err: BalanceStoreError) -> StockError {
    match err {
        BalanceStoreError::NegativeStock { current, delta, .. } => {
            StockError::insufficient(current, delta.abs())
        }
        BalanceStoreError::Concurrency { key, detail } => {
            StockError::conflict(format!("{key}: {detail}"))
        }
        BalanceStoreError::Storage(msg) => StockError::storage(msg),
    }
}

/// Journal rejections at this point mean the engine built an inconsistent
/// entry or the store failed; either way the caller sees a storage fault.
fn journal_err(err: JournalError) -> StockError {
    StockError::storage(err.to_string())
}

fn ensure_positive(quantity: i64) -> StockResult<()> {
    if quantity <= 0 {
        return Err(StockError::validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    Ok(())
}

impl<C, B, J> MovementProcessor<C, B, J>
where
    C: ReferenceCatalog,
    B: BalanceStore,
    J: MovementJournal,
{
    /// Inbound receipt line: no precondition on existing stock.
    pub fn record_inward(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
        quantity: i64,
        reference: MovementRef,
        actor: ActorId,
    ) -> StockResult<Posted> {
        ensure_positive(quantity)?;
        self.resolve(product, warehouse)?;
        self.post_single(
            StockKey::new(product, warehouse),
            MovementType::Inward,
            quantity,
            quantity,
            reference,
            actor,
        )
    }

    /// Outbound delivery line: requires `current_stock >= quantity`.
    pub fn record_outward(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
        quantity: i64,
        reference: MovementRef,
        actor: ActorId,
    ) -> StockResult<Posted> {
        ensure_positive(quantity)?;
        self.resolve(product, warehouse)?;
        self.post_single(
            StockKey::new(product, warehouse),
            MovementType::Outward,
            quantity,
            -quantity,
            reference,
            actor,
        )
    }

    /// Customer return line: inbound, referencing the originating delivery.
    pub fn record_return(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
        quantity: i64,
        reference: MovementRef,
        actor: ActorId,
    ) -> StockResult<Posted> {
        ensure_positive(quantity)?;
        self.resolve(product, warehouse)?;
        self.post_single(
            StockKey::new(product, warehouse),
            MovementType::Return,
            quantity,
            quantity,
            reference,
            actor,
        )
    }

    /// Physical-count adjustment: `difference` is the caller-computed signed
    /// delta (counted minus recorded). Computing it is the caller's job.
    pub fn record_adjustment(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
        difference: i64,
        reference: MovementRef,
        actor: ActorId,
    ) -> StockResult<Posted> {
        if difference == 0 {
            return Err(StockError::validation("adjustment difference cannot be zero"));
        }
        self.resolve(product, warehouse)?;
        self.post_single(
            StockKey::new(product, warehouse),
            MovementType::Adjustment,
            difference.abs(),
            difference,
            reference,
            actor,
        )
    }

    /// Paired inter-warehouse transfer: two balance mutations and two journal
    /// appends committed as one indivisible unit, or nothing at all.
    pub fn record_transfer(
        &self,
        product: ProductId,
        from: WarehouseId,
        to: WarehouseId,
        quantity: i64,
        reference: MovementRef,
        actor: ActorId,
    ) -> StockResult<PostedTransfer> {
        ensure_positive(quantity)?;
        if from == to {
            return Err(StockError::validation(
                "transfer requires two distinct warehouses",
            ));
        }
        self.resolve(product, from)?;
        self.resolve(product, to)?;

        let source = StockKey::new(product, from);
        let destination = StockKey::new(product, to);

        // Deterministic acquisition order prevents deadlock between
        // opposite-direction transfers on the same warehouse pair.
        let (first, second) = self.locks.lock_pair(source, destination)?;
        let _guard_a = locks::acquire(&first)?;
        let _guard_b = locks::acquire(&second)?;

        let (source_before, source_version) = self.read_row(source)?;
        let (dest_before, dest_version) = self.read_row(destination)?;

        if source_before < quantity {
            tracing::warn!(
                key = %source,
                available = source_before,
                requested = quantity,
                "transfer rejected: insufficient stock at source"
            );
            return Err(StockError::insufficient(source_before, quantity));
        }

        let rows = self
            .balances
            .apply_many(&[
                BalanceDelta::new(source, -quantity, ExpectedVersion::Exact(source_version)),
                BalanceDelta::new(destination, quantity, ExpectedVersion::Exact(dest_version)),
            ])
            .map_err(balance_err)?;
        let source_row = rows[0].clone();
        let dest_row = rows[1].clone();

        let out_leg = NewLedgerEntry {
            product,
            warehouse: from,
            movement_type: MovementType::TransferOut,
            quantity,
            reference,
            balance_before: source_before,
            balance_after: source_row.current_stock,
            actor,
        };
        let in_leg = NewLedgerEntry {
            product,
            warehouse: to,
            movement_type: MovementType::TransferIn,
            quantity,
            reference,
            balance_before: dest_before,
            balance_after: dest_row.current_stock,
            actor,
        };

        match self.journal.append_pair(out_leg, in_leg) {
            Ok((out_entry, in_entry)) => {
                tracing::info!(
                    product = %product,
                    from = %from,
                    to = %to,
                    qty = quantity,
                    reference = %reference.id,
                    "transfer committed"
                );
                Ok(PostedTransfer {
                    source: Posted {
                        balance: source_row,
                        entry: out_entry,
                    },
                    destination: Posted {
                        balance: dest_row,
                        entry: in_entry,
                    },
                })
            }
            Err(err) => {
                // Compensate both balance legs so the failed call leaves
                // nothing behind.
                let _ = self.balances.apply_many(&[
                    BalanceDelta::new(source, quantity, ExpectedVersion::Any),
                    BalanceDelta::new(destination, -quantity, ExpectedVersion::Any),
                ]);
                Err(journal_err(err))
            }
        }
    }

    /// Balance lookup by key; absence is the valid zero-stock state.
    pub fn balance(&self, product: ProductId, warehouse: WarehouseId) -> StockResult<BalanceRecord> {
        let key = StockKey::new(product, warehouse);
        Ok(self
            .balances
            .get(key)
            .map_err(balance_err)?
            .unwrap_or_else(BalanceRecord::zero))
    }

    /// All balance rows (dashboard read surface).
    pub fn balances(&self) -> StockResult<Vec<(StockKey, BalanceRecord)>> {
        self.balances.list().map_err(balance_err)
    }

    /// Journal read path for reporting collaborators. Reflects every
    /// committed append immediately.
    pub fn movements(&self, query: &JournalQuery) -> StockResult<Vec<LedgerEntry>> {
        self.journal.query(query).map_err(journal_err)
    }

    /// Audit support: fold the key's journal from zero and compare with the
    /// stored balance.
    pub fn verify_replay(
        &self,
        product: ProductId,
        warehouse: WarehouseId,
    ) -> Result<(), ReplayError> {
        let key = StockKey::new(product, warehouse);
        let entries = self.journal.entries_for_key(key).map_err(journal_err)?;
        let folded = fold_chain(key, &entries)?;
        let stored = self
            .balances
            .get(key)
            .map_err(balance_err)?
            .map(|r| r.current_stock)
            .unwrap_or(0);

        if folded != stored {
            return Err(ReplayError::Mismatch {
                key,
                folded,
                stored,
            });
        }
        Ok(())
    }

    fn resolve(&self, product: ProductId, warehouse: WarehouseId) -> StockResult<()> {
        let product = self
            .catalog
            .product(product)
            .ok_or_else(|| StockError::not_found(format!("product {product}")))?;
        if !product.active {
            return Err(StockError::validation(format!(
                "product {} is inactive",
                product.sku
            )));
        }

        let warehouse = self
            .catalog
            .warehouse(warehouse)
            .ok_or_else(|| StockError::not_found(format!("warehouse {warehouse}")))?;
        if !warehouse.active {
            return Err(StockError::validation(format!(
                "warehouse {} is inactive",
                warehouse.code
            )));
        }

        Ok(())
    }

    fn read_row(&self, key: StockKey) -> StockResult<(i64, u64)> {
        Ok(self
            .balances
            .get(key)
            .map_err(balance_err)?
            .map(|r| (r.current_stock, r.version))
            .unwrap_or((0, 0)))
    }

    /// One single-key critical section: read, validate, write, append.
    fn post_single(
        &self,
        key: StockKey,
        movement_type: MovementType,
        quantity: i64,
        delta: i64,
        reference: MovementRef,
        actor: ActorId,
    ) -> StockResult<Posted> {
        let lock = self.locks.lock_for(key)?;
        let _guard = locks::acquire(&lock)?;

        let (balance_before, version) = self.read_row(key)?;

        if balance_before + delta < 0 {
            tracing::warn!(
                key = %key,
                movement = ?movement_type,
                available = balance_before,
                requested = delta.abs(),
                "movement rejected: insufficient stock"
            );
            return Err(StockError::insufficient(balance_before, delta.abs()));
        }

        let row = self
            .balances
            .apply(key, delta, ExpectedVersion::Exact(version))
            .map_err(balance_err)?;

        let entry = NewLedgerEntry {
            product: key.product,
            warehouse: key.warehouse,
            movement_type,
            quantity,
            reference,
            balance_before,
            balance_after: row.current_stock,
            actor,
        };

        match self.journal.append(entry) {
            Ok(entry) => {
                tracing::debug!(
                    key = %key,
                    movement = ?movement_type,
                    qty = quantity,
                    before = balance_before,
                    after = row.current_stock,
                    reference = %reference.id,
                    "movement committed"
                );
                Ok(Posted {
                    balance: row,
                    entry,
                })
            }
            Err(err) => {
                // Compensate the balance write so the failed call leaves
                // nothing behind.
                let _ = self.balances.apply(key, -delta, ExpectedVersion::Any);
                Err(journal_err(err))
            }
        }
    }
}
