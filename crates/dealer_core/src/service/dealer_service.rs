//! Dealer use-case service.
//!
//! # Responsibility
//! - Provide stable dealer entry points for CLI and embedding callers.
//! - Compose store calls for patch and name-lookup flows.
//!
//! # Invariants
//! - Service APIs never bypass store validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::app_error::AppResult;
use crate::model::dealer::{filter_by_name, Dealer, DealerPatch, DealerUpdate};
use crate::store::dealer_store::DealerStore;
use log::info;

/// Use-case service wrapper for dealer operations.
pub struct DealerService<S: DealerStore> {
    store: S,
}

impl<S: DealerStore> DealerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new dealer; the returned copy carries id and timestamps.
    pub fn create_dealer(&self, dealer: Dealer) -> AppResult<Dealer> {
        let created = self.store.save(dealer)?;
        info!(
            "event=dealer_create module=service status=ok dealer_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_dealer(&self, id: &str) -> AppResult<Dealer> {
        self.store.get(id)
    }

    pub fn get_all_dealers(&self) -> AppResult<Vec<Dealer>> {
        self.store.get_all()
    }

    /// Returns dealers whose name exactly matches one of `names`,
    /// keeping name order from the store.
    pub fn get_dealers_by_names(&self, names: &[String]) -> AppResult<Vec<Dealer>> {
        let dealers = self.store.get_all()?;
        Ok(filter_by_name(&dealers, names))
    }

    /// Applies a sparse patch to the stored dealer.
    ///
    /// # Contract
    /// - Fetches the current row, applies present patch fields, and runs a
    ///   trusted update so patched descriptive fields are kept.
    /// - Returns the before/after snapshots.
    pub fn patch_dealer(&self, id: &str, patch: &DealerPatch) -> AppResult<DealerUpdate> {
        let mut dealer = self.store.get(id)?;
        dealer.patch(patch);
        let update = self.store.update(dealer, true)?;
        info!(
            "event=dealer_patch module=service status=ok dealer_id={}",
            update.new.id
        );
        Ok(update)
    }
}
