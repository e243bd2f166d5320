use std::collections::HashSet;

use crate::repository::SupplyRepository;
use crate::types::{DemandUnit, SupplyItem, efficiency_pct};

/// How candidates are filtered and ordered.
#[derive(Debug, Clone, Copy)]
pub enum SearchMode<'u> {
    /// Both tolerance bounds apply, repository order is kept.
    Single,
    /// Only the lower bound applies (kerf included), items already in `used`
    /// are skipped, and each profile's items come longest first.
    Batch { used: &'u HashSet<String> },
}

#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub item: &'a SupplyItem,
    /// `length - required - kerf`. Negative when the short tolerance was used.
    pub leftover_mm: f64,
    pub efficiency_pct: f64,
    pub exact_profile: bool,
}

pub struct CandidateFinder<'a, R: SupplyRepository + ?Sized> {
    repo: &'a R,
    kerf_mm: f64,
}

impl<'a, R: SupplyRepository + ?Sized> CandidateFinder<'a, R> {
    pub fn new(repo: &'a R, kerf_mm: f64) -> Self {
        Self { repo, kerf_mm }
    }

    /// Eligible items for `unit`, in discovery order: profiles as given, then
    /// per-profile order according to `mode`.
    pub fn find(&self, unit: &DemandUnit, profiles: &[&str], mode: SearchMode<'_>) -> Vec<Candidate<'a>> {
        let mut candidates = Vec::new();

        for &profile in profiles {
            let mut items = self.repo.find_by_profile(profile, true);
            if let SearchMode::Batch { used } = mode {
                items.retain(|item| !used.contains(&item.id));
                items.sort_by(|a, b| b.length_mm.total_cmp(&a.length_mm));
            }

            for item in items {
                if !self.fits(unit, item, mode) {
                    continue;
                }
                candidates.push(Candidate {
                    item,
                    leftover_mm: item.length_mm - unit.length_mm - self.kerf_mm,
                    efficiency_pct: efficiency_pct(unit.length_mm, item.length_mm),
                    exact_profile: profile == unit.profile,
                });
            }
        }

        candidates
    }

    fn fits(&self, unit: &DemandUnit, item: &SupplyItem, mode: SearchMode<'_>) -> bool {
        if !item.length_mm.is_finite() || item.length_mm <= 0.0 {
            return false;
        }
        match mode {
            SearchMode::Single => {
                item.length_mm >= unit.length_mm - unit.tolerance_under_mm
                    && item.length_mm <= unit.length_mm + unit.tolerance_over_mm
            }
            SearchMode::Batch { .. } => {
                item.length_mm - unit.length_mm - self.kerf_mm >= -unit.tolerance_under_mm
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Inventory;
    use crate::types::{Demand, SupplyStatus};

    fn unit(profile: &str, length: f64, over: f64, under: f64) -> DemandUnit {
        let demand = Demand::new("u", profile, length, 1).with_tolerance(over, under);
        DemandUnit::from_demand(&demand, 0, "u".to_string(), vec![])
    }

    fn ids(candidates: &[Candidate<'_>]) -> Vec<String> {
        candidates.iter().map(|c| c.item.id.clone()).collect()
    }

    fn pool() -> Inventory {
        Inventory::from_items([
            SupplyItem::new("s1", "X", 5000.0),
            SupplyItem::new("s2", "X", 5080.0),
            SupplyItem::new("s3", "X", 4990.0),
            SupplyItem::new("s4", "X", 9000.0),
            SupplyItem::new("s5", "X", 7000.0).with_status(SupplyStatus::Reserved),
            SupplyItem::new("y1", "Y", 5050.0),
        ])
    }

    #[test]
    fn test_single_mode_applies_both_bounds() {
        let inv = pool();
        let finder = CandidateFinder::new(&inv, 5.0);
        let found = finder.find(&unit("X", 5000.0, 100.0, 10.0), &["X"], SearchMode::Single);
        assert_eq!(ids(&found), vec!["s1", "s2", "s3"]);
        assert!(found.iter().all(|c| c.exact_profile));
        // 4990 sits under the request: leftover goes negative, efficiency caps.
        assert_eq!(found[2].leftover_mm, -15.0);
        assert_eq!(found[2].efficiency_pct, 100.0);
    }

    #[test]
    fn test_batch_mode_has_no_upper_bound_and_sorts_longest_first() {
        let inv = pool();
        let finder = CandidateFinder::new(&inv, 5.0);
        let used = HashSet::new();
        let found = finder.find(&unit("X", 5000.0, 0.0, 0.0), &["X"], SearchMode::Batch { used: &used });
        // 5000 and 4990 fail once kerf is counted; the reserved 7000 is never offered.
        assert_eq!(ids(&found), vec!["s4", "s2"]);
        assert_eq!(found[0].leftover_mm, 3995.0);
    }

    #[test]
    fn test_batch_mode_skips_used_items() {
        let inv = pool();
        let finder = CandidateFinder::new(&inv, 5.0);
        let used: HashSet<String> = ["s4".to_string()].into();
        let found = finder.find(&unit("X", 5000.0, 0.0, 0.0), &["X"], SearchMode::Batch { used: &used });
        assert_eq!(ids(&found), vec!["s2"]);
    }

    #[test]
    fn test_profiles_searched_in_order_and_flagged() {
        let inv = pool();
        let finder = CandidateFinder::new(&inv, 5.0);
        let found = finder.find(&unit("Y", 5000.0, 100.0, 0.0), &["Y", "X"], SearchMode::Single);
        assert_eq!(ids(&found), vec!["y1", "s1", "s2"]);
        assert!(found[0].exact_profile);
        assert!(!found[1].exact_profile);
    }

    #[test]
    fn test_unknown_profile_is_empty() {
        let inv = pool();
        let finder = CandidateFinder::new(&inv, 5.0);
        let found = finder.find(&unit("NOPE", 1000.0, 100.0, 0.0), &["NOPE"], SearchMode::Single);
        assert!(found.is_empty());
    }

    #[test]
    fn test_degenerate_lengths_never_offered() {
        let inv = Inventory::from_items([
            SupplyItem::new("zero", "X", 0.0),
            SupplyItem::new("neg", "X", -50.0),
            SupplyItem::new("nan", "X", f64::NAN),
            SupplyItem::new("inf", "X", f64::INFINITY),
        ]);
        let finder = CandidateFinder::new(&inv, 5.0);
        // The 200 mm short tolerance puts zero and negative lengths inside the bounds.
        let u = unit("X", 100.0, 100.0, 200.0);
        assert!(finder.find(&u, &["X"], SearchMode::Single).is_empty());
        let used = HashSet::new();
        assert!(finder.find(&u, &["X"], SearchMode::Batch { used: &used }).is_empty());
    }
}
