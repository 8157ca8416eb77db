use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockforge_core::{ActorId, DocumentId, EntryId, ProductId, StockKey, WarehouseId};

/// Kind of quantity change recorded by one ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Inward,
    Outward,
    TransferOut,
    TransferIn,
    Adjustment,
    Return,
}

impl MovementType {
    /// Sign of the balance effect, or `None` when the type carries either
    /// sign (adjustments).
    pub fn sign(self) -> Option<i64> {
        match self {
            MovementType::Inward | MovementType::TransferIn | MovementType::Return => Some(1),
            MovementType::Outward | MovementType::TransferOut => Some(-1),
            MovementType::Adjustment => None,
        }
    }
}

/// Kind of business document that triggered a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Receipt,
    Delivery,
    Transfer,
    Adjustment,
}

/// The triggering business document (kind + identifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementRef {
    pub kind: ReferenceKind,
    pub id: DocumentId,
}

impl MovementRef {
    pub fn new(kind: ReferenceKind, id: DocumentId) -> Self {
        Self { kind, id }
    }
}

/// An entry ready to be appended to the journal (no id/timestamp yet).
///
/// The journal assigns `entry_id` and `created_at` during append so that
/// creation order and timestamps agree with commit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    pub product: ProductId,
    pub warehouse: WarehouseId,
    pub movement_type: MovementType,
    /// Magnitude of the change, always positive.
    pub quantity: i64,
    pub reference: MovementRef,
    pub balance_before: i64,
    pub balance_after: i64,
    pub actor: ActorId,
}

impl NewLedgerEntry {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product, self.warehouse)
    }

    /// Signed balance effect this entry claims.
    pub fn signed_effect(&self) -> i64 {
        self.balance_after - self.balance_before
    }

    /// Check the entry invariant: positive magnitude, non-negative balances,
    /// and `balance_after - balance_before` consistent with the movement type.
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity <= 0 {
            return Err(format!("quantity must be positive, got {}", self.quantity));
        }
        if self.balance_before < 0 || self.balance_after < 0 {
            return Err(format!(
                "balances must be non-negative (before {}, after {})",
                self.balance_before, self.balance_after
            ));
        }

        let effect = self.signed_effect();
        let consistent = match self.movement_type.sign() {
            Some(sign) => effect == sign * self.quantity,
            // Adjustments carry the magnitude; either sign is valid.
            None => effect.abs() == self.quantity,
        };
        if !consistent {
            return Err(format!(
                "balance effect {} inconsistent with {:?} quantity {}",
                effect, self.movement_type, self.quantity
            ));
        }

        Ok(())
    }
}

/// A committed, immutable journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub product: ProductId,
    pub warehouse: WarehouseId,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reference: MovementRef,
    pub balance_before: i64,
    pub balance_after: i64,
    pub actor: ActorId,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product, self.warehouse)
    }

    /// Signed balance effect: `balance_after - balance_before`.
    ///
    /// For adjustments this recovers the sign the `quantity` magnitude drops.
    pub fn signed_effect(&self) -> i64 {
        self.balance_after - self.balance_before
    }
}
