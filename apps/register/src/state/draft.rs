//! # Draft State
//!
//! Shares the register's current order between commands.
//!
//! ## Thread Safety
//! The draft is wrapped in `Arc<Mutex<T>>` so any command can reach it while
//! only one mutates it at a time. The lock is never held across an `.await`:
//! commands fetch from the data source first, then lock, mutate and release.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_discount                                                         │
//! │    1. source.lookup_discount(code).await     (no lock)                  │
//! │    2. with_draft_mut(|d| d.apply_discount(..))   (lock, sync, unlock)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use mesa_core::{OrderDraft, Rate};

/// Register-managed draft state.
#[derive(Debug, Clone)]
pub struct DraftState {
    draft: Arc<Mutex<OrderDraft>>,
}

impl DraftState {
    /// Creates state holding an empty draft at `tax_rate`.
    pub fn new(tax_rate: Rate) -> Self {
        DraftState {
            draft: Arc::new(Mutex::new(OrderDraft::new(tax_rate))),
        }
    }

    /// A poisoned lock still holds a consistent draft: every draft
    /// mutation validates before it writes.
    fn lock(&self) -> MutexGuard<'_, OrderDraft> {
        self.draft.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Executes a function with read access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = draft_state.with_draft(|d| d.totals().clone());
    /// ```
    pub fn with_draft<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&OrderDraft) -> R,
    {
        let draft = self.lock();
        f(&draft)
    }

    /// Executes a function with write access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// draft_state.with_draft_mut(|d| d.add_item(product, 1, None))?;
    /// ```
    pub fn with_draft_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut OrderDraft) -> R,
    {
        let mut draft = self.lock();
        f(&mut draft)
    }

    /// Copy of the current draft.
    pub fn snapshot(&self) -> OrderDraft {
        self.with_draft(OrderDraft::clone)
    }
}

impl Default for DraftState {
    fn default() -> Self {
        Self::new(mesa_core::DEFAULT_TAX_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesa_core::{Money, Product};

    fn fries() -> Product {
        Product {
            id: "truffle-fries".to_string(),
            name: "Truffle Fries".to_string(),
            price: Money::from_cents(799),
            category: "Sides".to_string(),
            stock: 10,
            is_active: true,
            allergens: vec![],
        }
    }

    #[test]
    fn test_clones_share_one_draft() {
        let state = DraftState::default();
        let other = state.clone();

        state
            .with_draft_mut(|d| d.add_item(fries(), 2, None))
            .unwrap();

        assert_eq!(other.with_draft(|d| d.total_quantity()), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let state = DraftState::default();
        let mut copy = state.snapshot();
        copy.add_item(fries(), 1, None).unwrap();

        assert!(state.with_draft(|d| d.is_empty()));
    }
}
