//! Reconciling physical counts against the authoritative stock level.
//!
//! An administrator enters a counted value per product. Only strictly
//! positive counts that differ from the current level become journal
//! adjustments; blank entries mean "not counted" and are never submitted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// One proposed ledger change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Adjustment {
    pub product_id: Uuid,
    pub delta: i32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdjustmentError {
    #[error("product {0} not found")]
    UnknownProduct(Uuid),

    #[error("counted value for product {product_id} must not be negative (got {counted})")]
    NegativeCount { product_id: Uuid, counted: i32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("'{0}' is not a whole number")]
    NotANumber(String),

    #[error("count cannot be negative")]
    Negative,
}

/// Delta to submit for a counted value, if any.
///
/// `counted <= 0` is not a staged change, and a count equal to the current
/// level produces nothing.
pub fn adjustment_delta(counted: i32, current: i32) -> Option<i32> {
    if counted <= 0 {
        return None;
    }
    let delta = counted - current;
    (delta != 0).then_some(delta)
}

/// Turns physical counts into adjustments against the current levels.
///
/// `current_of` returns the authoritative count for a product, or `None` when
/// the product does not exist.
pub fn plan_adjustments<F>(
    counts: impl IntoIterator<Item = (Uuid, i32)>,
    current_of: F,
) -> Result<Vec<Adjustment>, AdjustmentError>
where
    F: Fn(Uuid) -> Option<i32>,
{
    let mut planned = Vec::new();
    for (product_id, counted) in counts {
        if counted < 0 {
            return Err(AdjustmentError::NegativeCount {
                product_id,
                counted,
            });
        }
        let current = current_of(product_id).ok_or(AdjustmentError::UnknownProduct(product_id))?;
        if let Some(delta) = adjustment_delta(counted, current) {
            planned.push(Adjustment { product_id, delta });
        }
    }
    Ok(planned)
}

/// Pending physical counts keyed by product. Absent key means "no entry".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingCounts {
    entries: BTreeMap<Uuid, i32>,
}

impl PendingCounts {
    /// Stage raw input for a product. Blank input clears the entry.
    pub fn stage(&mut self, product_id: Uuid, raw: &str) -> Result<(), StageError> {
        let raw = raw.trim();
        if raw.is_empty() {
            self.entries.remove(&product_id);
            return Ok(());
        }
        let counted: i32 = raw
            .parse()
            .map_err(|_| StageError::NotANumber(raw.to_string()))?;
        if counted < 0 {
            return Err(StageError::Negative);
        }
        self.entries.insert(product_id, counted);
        Ok(())
    }

    pub fn get(&self, product_id: Uuid) -> Option<i32> {
        self.entries.get(&product_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Uuid, i32)> + '_ {
        self.entries.iter().map(|(id, counted)| (*id, *counted))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
