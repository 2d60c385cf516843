//! Shared tool state
//!
//! The ledger, the in-flight analysis bookkeeping and the store behind one
//! handle. Locks are held only inside the synchronous helpers here, never
//! across an await.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::analysis::AnalysisTracker;
use crate::ledger::DayLedger;
use crate::models::{NutrientGoals, UserProfile};
use crate::store::LedgerStore;

pub struct Session {
    ledger: Mutex<DayLedger>,
    tracker: Mutex<AnalysisTracker>,
    store: LedgerStore,
    goal_defaults: NutrientGoals,
}

impl Session {
    /// Revive the stored ledger (or start `initial_days` fresh days at `today`)
    pub fn open(
        store: LedgerStore,
        today: NaiveDate,
        initial_days: usize,
        goal_defaults: NutrientGoals,
    ) -> Self {
        let ledger = store.load(today, initial_days);
        info!(
            days = ledger.len(),
            current = %ledger.current_day().id,
            "Ledger ready"
        );

        Self {
            ledger: Mutex::new(ledger),
            tracker: Mutex::new(AnalysisTracker::new()),
            store,
            goal_defaults,
        }
    }

    fn ledger(&self) -> MutexGuard<'_, DayLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tracker(&self) -> MutexGuard<'_, AnalysisTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the ledger
    pub fn read<T>(&self, f: impl FnOnce(&DayLedger) -> T) -> T {
        let ledger = self.ledger();
        f(&*ledger)
    }

    /// Change the ledger and persist it. Nothing is saved when `f` fails.
    ///
    /// A failed save is reported as an error, but the change stays applied in
    /// memory and is written by the next successful save.
    pub fn mutate<T>(
        &self,
        f: impl FnOnce(&mut DayLedger) -> Result<T, String>,
    ) -> Result<T, String> {
        let mut ledger = self.ledger();
        let out = f(&mut *ledger)?;
        if let Err(e) = self.store.save(&ledger) {
            warn!(error = %e, "Ledger change applied but not saved");
            return Err(format!("Change applied but not saved: {}", e));
        }
        Ok(out)
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn goal_defaults(&self) -> &NutrientGoals {
        &self.goal_defaults
    }

    pub fn profile(&self) -> Result<UserProfile, String> {
        self.store
            .load_profile()
            .map_err(|e| format!("Failed to load profile: {}", e))
    }

    /// Effective goals: the stored profile over the configured defaults
    pub fn goals(&self) -> Result<NutrientGoals, String> {
        Ok(self.profile()?.goals(&self.goal_defaults))
    }
}

/// Index of `day_id`, or of the current day when no id is given
pub fn resolve_index(ledger: &DayLedger, day_id: Option<&str>) -> Result<usize, String> {
    match day_id {
        None => Ok(ledger.current_index()),
        Some(id) => ledger
            .position(id)
            .ok_or_else(|| format!("Day not found: {}", id)),
    }
}
