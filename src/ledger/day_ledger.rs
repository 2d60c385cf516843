use chrono::NaiveDate;
use tracing::debug;

use super::{LedgerError, LedgerResult};
use crate::models::{AnalysisResult, Day, Recipe};

/// Ordered days plus the current selection.
///
/// Always holds at least one day. New days are dated one day after the last,
/// so ids are unique and dates increase; deletions may leave gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLedger {
    days: Vec<Day>,
    current: usize,
}

impl DayLedger {
    /// Days in a freshly created ledger: today and the six after it
    pub const DEFAULT_DAYS: usize = 7;

    /// `count` consecutive empty days starting at `today` (at least one)
    pub fn fresh(today: NaiveDate, count: usize) -> Self {
        let mut days = Vec::with_capacity(count.max(1));
        let mut date = today;
        days.push(Day::new(date));
        for _ in 1..count {
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
            days.push(Day::new(date));
        }
        Self { days, current: 0 }
    }

    /// Revive a stored ledger. Returns `None` for an empty day list; a cursor
    /// past the end is clamped and repeated ids keep their first occurrence.
    pub fn from_persisted(days: Vec<Day>, current: usize) -> Option<Self> {
        let mut unique: Vec<Day> = Vec::with_capacity(days.len());
        for day in days {
            if unique.iter().any(|d| d.id == day.id) {
                debug!(id = %day.id, "Dropping repeated day id from stored ledger");
                continue;
            }
            unique.push(day);
        }

        if unique.is_empty() {
            return None;
        }
        let current = current.min(unique.len() - 1);
        Some(Self { days: unique, current })
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Never true; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, index: usize) -> Option<&Day> {
        self.days.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_day(&self) -> &Day {
        &self.days[self.current]
    }

    /// Index of the day with this id
    pub fn position(&self, day_id: &str) -> Option<usize> {
        self.days.iter().position(|d| d.id == day_id)
    }

    /// Append a day dated one day after the current last day. The selection
    /// does not move. Refused when the last day is the final representable date.
    pub fn append_day(&mut self) -> LedgerResult<&Day> {
        let last = self.days[self.days.len() - 1].date;
        let next = last.succ_opt().ok_or(LedgerError::DateOverflow(last))?;
        debug!(date = %next, "Appending day");
        self.days.push(Day::new(next));
        Ok(&self.days[self.days.len() - 1])
    }

    /// Remove the day at `index`, returning it.
    ///
    /// The selection keeps pointing at the same day when an earlier day is
    /// removed, and is clamped to the new last index when it would fall off
    /// the end.
    pub fn delete_day(&mut self, index: usize) -> LedgerResult<Day> {
        if self.days.len() == 1 {
            debug!("Refusing to delete the last remaining day");
            return Err(LedgerError::LastDay);
        }
        self.check_index(index)?;

        let removed = self.days.remove(index);
        if self.current >= self.days.len() {
            self.current = self.days.len() - 1;
        } else if index < self.current {
            self.current -= 1;
        }

        debug!(id = %removed.id, current = self.current, "Deleted day");
        Ok(removed)
    }

    /// Move the cursor. Out-of-range indexes are ignored; returns whether the
    /// cursor moved to `index`.
    pub fn select_day(&mut self, index: usize) -> bool {
        if index >= self.days.len() {
            return false;
        }
        self.current = index;
        true
    }

    /// Choose a recipe into a day. Returns `Ok(false)` when a recipe with the
    /// same name is already chosen.
    pub fn add_recipe(&mut self, day_index: usize, recipe: Recipe) -> LedgerResult<bool> {
        let day = self.day_mut(day_index)?;
        Ok(day.add_recipe(recipe))
    }

    /// Remove a chosen recipe by name. Returns the removed recipe, if any.
    pub fn remove_recipe(&mut self, day_index: usize, name: &str) -> LedgerResult<Option<Recipe>> {
        let day = self.day_mut(day_index)?;
        Ok(day.remove_recipe(name))
    }

    /// Attach an analysis to a day, clearing its chosen recipes. An analysis
    /// carrying an error is rejected and the day is left as it was.
    pub fn record_analysis(
        &mut self,
        day_index: usize,
        photo_url: Option<String>,
        analysis: AnalysisResult,
    ) -> LedgerResult<()> {
        if let Some(error) = &analysis.error {
            return Err(LedgerError::AnalysisFailed(error.clone()));
        }
        let day = self.day_mut(day_index)?;
        day.record_analysis(photo_url, analysis);
        Ok(())
    }

    /// Clear a day back to an empty day of the same date
    pub fn reset_day(&mut self, index: usize) -> LedgerResult<()> {
        self.day_mut(index)?.reset();
        Ok(())
    }

    fn check_index(&self, index: usize) -> LedgerResult<()> {
        if index < self.days.len() {
            Ok(())
        } else {
            Err(LedgerError::DayOutOfRange {
                index,
                len: self.days.len(),
            })
        }
    }

    fn day_mut(&mut self, index: usize) -> LedgerResult<&mut Day> {
        self.check_index(index)?;
        Ok(&mut self.days[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{recompute_totals, Macros, MicroValues, Micronutrient};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 29).unwrap()
    }

    fn recipe(name: &str, calories: f64) -> Recipe {
        Recipe::new(
            name,
            Macros {
                calories,
                protein: calories / 20.0,
                carbs: calories / 8.0,
                fat: calories / 30.0,
                sugar: 0.0,
            },
            MicroValues::zero().with(Micronutrient::VitaminC, calories / 10.0),
        )
    }

    #[test]
    fn test_fresh_ledger_spans_a_week() {
        let ledger = DayLedger::fresh(today(), DayLedger::DEFAULT_DAYS);
        assert_eq!(ledger.len(), 7);
        assert_eq!(ledger.current_index(), 0);
        assert_eq!(ledger.days()[0].id, "2025-12-29");
        // crosses the year boundary
        assert_eq!(ledger.days()[6].id, "2026-01-04");
    }

    #[test]
    fn test_fresh_ledger_never_empty() {
        let ledger = DayLedger::fresh(today(), 0);
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_empty());
    }

    #[test]
    fn test_append_day_follows_last_day() {
        let mut ledger = DayLedger::fresh(today(), 3);
        ledger.select_day(1);
        let appended = ledger.append_day().unwrap().id.clone();
        assert_eq!(appended, "2026-01-01");
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.current_index(), 1);
    }

    #[test]
    fn test_append_after_deleting_last_uses_new_last() {
        let mut ledger = DayLedger::fresh(today(), 3);
        ledger.delete_day(2).unwrap();
        assert_eq!(ledger.append_day().unwrap().id, "2025-12-31");
    }

    #[test]
    fn test_append_refused_at_last_representable_date() {
        let mut ledger = DayLedger::fresh(NaiveDate::MAX, 1);
        let before = ledger.clone();
        assert_eq!(
            ledger.append_day().map(|d| d.id.clone()),
            Err(LedgerError::DateOverflow(NaiveDate::MAX))
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_delete_last_remaining_day_rejected() {
        let mut ledger = DayLedger::fresh(today(), 1);
        let before = ledger.clone();
        assert_eq!(ledger.delete_day(0), Err(LedgerError::LastDay));
        assert_eq!(ledger, before);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_delete_out_of_range_rejected() {
        let mut ledger = DayLedger::fresh(today(), 3);
        assert_eq!(
            ledger.delete_day(5),
            Err(LedgerError::DayOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_delete_before_cursor_decrements() {
        let mut ledger = DayLedger::fresh(today(), 5);
        ledger.select_day(3);
        let selected = ledger.current_day().id.clone();
        ledger.delete_day(1).unwrap();
        assert_eq!(ledger.current_index(), 2);
        assert_eq!(ledger.current_day().id, selected);
    }

    #[test]
    fn test_delete_after_cursor_keeps_index() {
        let mut ledger = DayLedger::fresh(today(), 5);
        ledger.select_day(1);
        ledger.delete_day(3).unwrap();
        assert_eq!(ledger.current_index(), 1);
    }

    #[test]
    fn test_delete_selected_last_day_clamps() {
        let mut ledger = DayLedger::fresh(today(), 4);
        ledger.select_day(3);
        ledger.delete_day(3).unwrap();
        assert_eq!(ledger.current_index(), 2);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_delete_selected_middle_day_moves_to_next() {
        let mut ledger = DayLedger::fresh(today(), 4);
        ledger.select_day(1);
        let removed = ledger.delete_day(1).unwrap();
        assert_eq!(removed.id, "2025-12-30");
        assert_eq!(ledger.current_index(), 1);
        assert_eq!(ledger.current_day().id, "2025-12-31");
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let mut ledger = DayLedger::fresh(today(), 3);
        ledger.select_day(2);
        assert!(!ledger.select_day(3));
        assert_eq!(ledger.current_index(), 2);
    }

    #[test]
    fn test_add_recipe_idempotent() {
        let mut ledger = DayLedger::fresh(today(), 2);
        assert_eq!(ledger.add_recipe(0, recipe("Soup", 400.0)), Ok(true));
        let snapshot = ledger.clone();
        assert_eq!(ledger.add_recipe(0, recipe("Soup", 800.0)), Ok(false));
        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn test_recipe_ops_reject_bad_index() {
        let mut ledger = DayLedger::fresh(today(), 2);
        assert!(ledger.add_recipe(2, recipe("Soup", 400.0)).is_err());
        assert!(ledger.remove_recipe(9, "Soup").is_err());
        assert!(ledger.reset_day(2).is_err());
        assert!(ledger.days().iter().all(|d| d.chosen_recipes().is_empty()));
    }

    #[test]
    fn test_totals_equal_sum_after_every_mutation() {
        let mut ledger = DayLedger::fresh(today(), 2);
        let names = ["a", "b", "c", "d"];
        for (step, name) in names.iter().cycle().take(20).enumerate() {
            if step % 3 == 2 {
                ledger.remove_recipe(1, name).unwrap();
            } else {
                ledger.add_recipe(1, recipe(name, 100.0 + step as f64 * 0.1)).unwrap();
            }
            let day = &ledger.days()[1];
            assert_eq!(*day.totals(), recompute_totals(day.chosen_recipes()));
        }
    }

    #[test]
    fn test_record_analysis_resets_recipes() {
        let mut ledger = DayLedger::fresh(today(), 2);
        ledger.add_recipe(0, recipe("Soup", 400.0)).unwrap();
        ledger
            .record_analysis(0, Some("photo.jpg".into()), AnalysisResult::default())
            .unwrap();
        assert!(ledger.days()[0].chosen_recipes().is_empty());
        assert_eq!(ledger.days()[0].totals().calories, 0.0);
    }

    #[test]
    fn test_record_failed_analysis_rejected() {
        let mut ledger = DayLedger::fresh(today(), 2);
        ledger.add_recipe(0, recipe("Soup", 400.0)).unwrap();
        let before = ledger.clone();
        let failed = AnalysisResult {
            error: Some("Invalid JSON".into()),
            ..Default::default()
        };
        assert_eq!(
            ledger.record_analysis(0, None, failed),
            Err(LedgerError::AnalysisFailed("Invalid JSON".into()))
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_from_persisted() {
        let days = DayLedger::fresh(today(), 3).days().to_vec();
        let ledger = DayLedger::from_persisted(days.clone(), 7).unwrap();
        assert_eq!(ledger.current_index(), 2);

        let mut repeated = days.clone();
        repeated.push(days[0].clone());
        assert_eq!(DayLedger::from_persisted(repeated, 0).unwrap().len(), 3);

        assert!(DayLedger::from_persisted(Vec::new(), 0).is_none());
    }

    #[test]
    fn test_position_by_id() {
        let ledger = DayLedger::fresh(today(), 3);
        assert_eq!(ledger.position("2025-12-31"), Some(2));
        assert!(ledger.position("2024-01-01").is_none());
    }
}
