use uuid::Uuid;

use super::{Backend, ClientResult};
use crate::{
    domain::inventory::{Adjustment, PendingCounts, StageError, adjustment_delta},
    dto::inventory::{ApplyCountsRequest, PhysicalCount},
    models::{JournalEntry, Product, UserProfile},
};

/// Product counts with optional administrator edits.
///
/// Standard users get a read-only listing. Pending edits survive a failed
/// save and are cleared once the server confirms the batch.
#[derive(Debug, Clone, Default)]
pub struct InventoryEditor {
    products: Vec<Product>,
    pending: PendingCounts,
    admin: bool,
    loading: bool,
    saving: bool,
    error: Option<String>,
}

impl InventoryEditor {
    pub fn new(profile: Option<&UserProfile>) -> Self {
        Self {
            admin: profile.is_some_and(UserProfile::is_admin),
            ..Self::default()
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending(&self, product_id: Uuid) -> Option<i32> {
        self.pending.get(product_id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub async fn load<B: Backend>(&mut self, backend: &B, token: &str) -> ClientResult<()> {
        self.loading = true;
        let result = backend.list_products(token).await;
        self.loading = false;

        match result {
            Ok(products) => {
                self.products = products;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Ignored in read-only mode.
    pub fn stage(&mut self, product_id: Uuid, raw: &str) -> Result<(), StageError> {
        if !self.admin {
            return Ok(());
        }
        self.pending.stage(product_id, raw)
    }

    /// Deltas a save would submit, in listing order.
    pub fn planned(&self) -> Vec<Adjustment> {
        self.products
            .iter()
            .filter_map(|p| {
                let counted = self.pending.get(p.id)?;
                let delta = adjustment_delta(counted, p.current_inventory_count)?;
                Some(Adjustment {
                    product_id: p.id,
                    delta,
                })
            })
            .collect()
    }

    pub fn can_save(&self) -> bool {
        self.admin && !self.saving && !self.planned().is_empty()
    }

    /// Submits the counted values behind [`planned`](Self::planned).
    ///
    /// Nothing is sent when no product would change.
    pub async fn save<B: Backend>(
        &mut self,
        backend: &B,
        token: &str,
    ) -> ClientResult<Vec<JournalEntry>> {
        let counts: Vec<PhysicalCount> = self
            .planned()
            .into_iter()
            .filter_map(|a| {
                self.pending.get(a.product_id).map(|counted| PhysicalCount {
                    product_id: a.product_id,
                    counted,
                })
            })
            .collect();
        if !self.admin || counts.is_empty() {
            return Ok(Vec::new());
        }

        self.saving = true;
        let result = backend
            .apply_counts(token, ApplyCountsRequest { counts })
            .await;
        self.saving = false;

        match result {
            Ok(applied) => {
                self.pending.clear();
                self.products = applied.products;
                self.error = None;
                Ok(applied.entries)
            }
            Err(e) => {
                tracing::warn!(error = %e, "inventory save failed");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
