use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{KeyValueStore, StoreResult};
use crate::ledger::DayLedger;
use crate::models::{Day, UserProfile};

/// Key of the serialized day sequence
pub const DAYS_KEY: &str = "days";
/// Key of the current-day cursor
pub const CURRENT_DAY_INDEX_KEY: &str = "current_day_index";
/// Key of the user profile
pub const USER_PROFILE_KEY: &str = "user_profile";

/// Saves and revives the ledger and user profile
#[derive(Clone)]
pub struct LedgerStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LedgerStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn save(&self, ledger: &DayLedger) -> StoreResult<()> {
        let days = serde_json::to_string(ledger.days())?;
        let current = ledger.current_index().to_string();
        self.kv
            .set_many(&[(DAYS_KEY, days.as_str()), (CURRENT_DAY_INDEX_KEY, current.as_str())])?;
        debug!(days = ledger.len(), current = ledger.current_index(), "Saved ledger");
        Ok(())
    }

    /// The stored ledger, or `None` when nothing (or an empty sequence) is stored
    pub fn try_load(&self) -> StoreResult<Option<DayLedger>> {
        let Some(raw) = self.kv.get(DAYS_KEY)? else {
            return Ok(None);
        };
        let days: Vec<Day> = serde_json::from_str(&raw)?;

        let current = match self.kv.get(CURRENT_DAY_INDEX_KEY)? {
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                warn!(value = %raw, "Unreadable stored day index, selecting the first day");
                0
            }),
            None => 0,
        };

        Ok(DayLedger::from_persisted(days, current))
    }

    /// Revive the stored ledger, falling back to `initial_days` fresh days
    /// from `today` when nothing usable is stored
    pub fn load(&self, today: NaiveDate, initial_days: usize) -> DayLedger {
        match self.try_load() {
            Ok(Some(ledger)) => {
                debug!(days = ledger.len(), "Loaded stored ledger");
                ledger
            }
            Ok(None) => {
                debug!("No stored days, starting a fresh ledger");
                DayLedger::fresh(today, initial_days)
            }
            Err(e) => {
                warn!(error = %e, "Stored ledger unreadable, starting a fresh ledger");
                DayLedger::fresh(today, initial_days)
            }
        }
    }

    /// The stored profile, or an empty one when none is stored
    pub fn load_profile(&self) -> StoreResult<UserProfile> {
        match self.kv.get(USER_PROFILE_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(UserProfile::default()),
        }
    }

    pub fn save_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let raw = serde_json::to_string(profile)?;
        self.kv.set(USER_PROFILE_KEY, &raw)
    }

    /// Forget the stored ledger; the profile is kept
    pub fn clear(&self) -> StoreResult<()> {
        self.kv.remove(DAYS_KEY)?;
        self.kv.remove(CURRENT_DAY_INDEX_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{AnalysisResult, Macros, MicroValues, Micronutrient, Recipe};
    use crate::store::{MemoryKvStore, SqliteKvStore};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn memory_store() -> (Arc<MemoryKvStore>, LedgerStore) {
        let kv = Arc::new(MemoryKvStore::new());
        (kv.clone(), LedgerStore::new(kv))
    }

    fn sample_ledger() -> DayLedger {
        let mut ledger = DayLedger::fresh(today(), 3);
        let recipe = Recipe::new(
            "Lentil soup",
            Macros {
                calories: 420.0,
                protein: 24.0,
                ..Default::default()
            },
            MicroValues::zero().with(Micronutrient::Iron, 6.5),
        );
        ledger
            .record_analysis(
                1,
                Some("photo.jpg".into()),
                AnalysisResult {
                    recipes: vec![recipe.clone()],
                    ..Default::default()
                },
            )
            .unwrap();
        ledger.add_recipe(1, recipe).unwrap();
        ledger.select_day(1);
        ledger
    }

    #[test]
    fn test_round_trip() {
        let (_, store) = memory_store();
        let ledger = sample_ledger();
        store.save(&ledger).unwrap();

        let loaded = store.load(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), 7);
        assert_eq!(loaded, ledger);
        assert_eq!(loaded.current_index(), 1);
        assert_eq!(loaded.days()[1].totals().calories, 420.0);
    }

    #[test]
    fn test_round_trip_sqlite() {
        let db = Database::in_memory("ledger_store_round_trip").unwrap();
        let store = LedgerStore::new(Arc::new(SqliteKvStore::new(db)));
        let ledger = sample_ledger();
        store.save(&ledger).unwrap();
        assert_eq!(store.try_load().unwrap(), Some(ledger));
    }

    #[test]
    fn test_missing_falls_back_to_fresh() {
        let (_, store) = memory_store();
        let ledger = store.load(today(), 7);
        assert_eq!(ledger, DayLedger::fresh(today(), 7));
    }

    #[test]
    fn test_empty_array_falls_back_to_fresh() {
        let (kv, store) = memory_store();
        kv.set(DAYS_KEY, "[]").unwrap();
        kv.set(CURRENT_DAY_INDEX_KEY, "0").unwrap();
        assert_eq!(store.load(today(), 2).len(), 2);
    }

    #[test]
    fn test_corrupt_blob_falls_back_to_fresh() {
        let (kv, store) = memory_store();
        kv.set(DAYS_KEY, "{not json").unwrap();
        assert!(store.try_load().is_err());
        assert_eq!(store.load(today(), 7), DayLedger::fresh(today(), 7));
    }

    #[test]
    fn test_cursor_clamped_and_tolerated() {
        let (kv, store) = memory_store();
        store.save(&DayLedger::fresh(today(), 3)).unwrap();

        kv.set(CURRENT_DAY_INDEX_KEY, "42").unwrap();
        assert_eq!(store.load(today(), 7).current_index(), 2);

        kv.set(CURRENT_DAY_INDEX_KEY, "two").unwrap();
        assert_eq!(store.load(today(), 7).current_index(), 0);
    }

    #[test]
    fn test_loads_timestamp_dates() {
        let (kv, store) = memory_store();
        kv.set(
            DAYS_KEY,
            r#"[{"id": "d1", "date": "2025-01-06T00:00:00.000Z", "chosenRecipes": []}]"#,
        )
        .unwrap();

        let ledger = store.load(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), 7);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.current_day().id, "d1");
        assert_eq!(ledger.current_day().date, today());
    }

    #[test]
    fn test_clear_keeps_profile() {
        let (_, store) = memory_store();
        let mut profile = UserProfile::default();
        profile.calories_goal = Some(2100.0);
        store.save_profile(&profile).unwrap();
        store.save(&sample_ledger()).unwrap();

        store.clear().unwrap();
        assert_eq!(store.try_load().unwrap(), None);
        assert_eq!(store.load_profile().unwrap(), profile);
    }

    #[test]
    fn test_missing_profile_is_default() {
        let (_, store) = memory_store();
        assert_eq!(store.load_profile().unwrap(), UserProfile::default());
    }
}
