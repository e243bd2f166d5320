use crate::allocator::{unit_id, validate_demand};
use crate::candidates::{CandidateFinder, SearchMode};
use crate::config::MatchConfig;
use crate::error::Result;
use crate::repository::SupplyRepository;
use crate::scoring::pick_best;
use crate::types::{Demand, DemandUnit, MatchOutcome, MatchResult};

/// Outcome class for a single lookup.
pub fn classify(efficiency_pct: f64) -> MatchOutcome {
    if efficiency_pct >= 95.0 {
        MatchOutcome::Perfect
    } else if efficiency_pct >= 80.0 {
        MatchOutcome::Good
    } else {
        MatchOutcome::Fair
    }
}

/// Ad-hoc best-match lookups. Calls are independent: two lookups may return
/// the same supply item.
pub struct Matcher<'a, R: SupplyRepository + ?Sized> {
    repo: &'a R,
    config: &'a MatchConfig,
}

impl<'a, R: SupplyRepository + ?Sized> Matcher<'a, R> {
    pub fn new(repo: &'a R, config: &'a MatchConfig) -> Self {
        Self { repo, config }
    }

    /// Best-scoring supply item for one piece of `demand`, searching the
    /// primary profile and then its substitutes.
    pub fn best_match(&self, demand: &Demand) -> Result<MatchResult> {
        self.best_match_line(demand, 0)
    }

    /// Same as [`best_match`](Self::best_match) for the `line`-th (0-based)
    /// entry of a demand list. An id-less line is reported as `D<line + 1>`.
    pub fn best_match_line(&self, demand: &Demand, line: usize) -> Result<MatchResult> {
        validate_demand(demand, line)?;
        let substitutes = if demand.substitutes.is_empty() {
            self.config.substitutes.lookup(&demand.profile).to_vec()
        } else {
            demand.substitutes.clone()
        };
        let unit = DemandUnit::from_demand(demand, line, unit_id(demand, line, 1, 1), substitutes);
        Ok(self.match_unit(&unit))
    }

    pub fn match_unit(&self, unit: &DemandUnit) -> MatchResult {
        let finder = CandidateFinder::new(self.repo, self.config.kerf_mm);
        let candidates = finder.find(unit, &unit.search_order(), SearchMode::Single);

        match pick_best(&candidates, &self.config.weights) {
            Some((best, score)) => {
                let outcome = classify(best.efficiency_pct);
                tracing::debug!(
                    demand = %unit.id,
                    supply = %best.item.id,
                    score,
                    candidates = candidates.len(),
                    %outcome,
                    "best match"
                );
                MatchResult::assigned(unit, best.item, self.config.kerf_mm, outcome)
            }
            None => {
                tracing::debug!(demand = %unit.id, profile = %unit.profile, "no candidates");
                MatchResult::unmatched(unit)
            }
        }
    }
}
