use std::collections::HashSet;

use crate::candidates::{CandidateFinder, SearchMode};
use crate::config::{MatchConfig, SubstituteTable};
use crate::error::{Error, Result};
use crate::repository::SupplyRepository;
use crate::types::{Allocation, CuttingPlan, Demand, DemandUnit, MatchOutcome, MatchResult};

/// Largest quantity accepted on a single demand line.
pub const MAX_LINE_QTY: i64 = 10_000;

/// Largest number of units one run will expand.
pub const MAX_UNITS: i64 = 100_000;

/// Rejects lines that cannot be expanded into units.
pub fn validate_demand(demand: &Demand, line: usize) -> Result<()> {
    let id = line_id(demand, line);
    if !demand.length_mm.is_finite() || demand.length_mm <= 0.0 {
        return Err(Error::invalid_demand(
            &id,
            format!("length must be positive, got {}", demand.length_mm),
        ));
    }
    if demand.qty < 0 {
        return Err(Error::invalid_demand(
            &id,
            format!("quantity must not be negative, got {}", demand.qty),
        ));
    }
    if demand.qty > MAX_LINE_QTY {
        return Err(Error::invalid_demand(
            &id,
            format!("quantity {} exceeds the limit of {}", demand.qty, MAX_LINE_QTY),
        ));
    }
    let bad_tolerance = |tol: f64| tol.is_nan() || tol < 0.0;
    if bad_tolerance(demand.tolerance_over_mm) || bad_tolerance(demand.tolerance_under_mm) {
        return Err(Error::invalid_demand(&id, "tolerances must be non-negative numbers"));
    }
    Ok(())
}

fn line_id(demand: &Demand, line: usize) -> String {
    if demand.id.is_empty() {
        format!("D{}", line + 1)
    } else {
        demand.id.clone()
    }
}

/// Id of the `k`-th (1-based) unit of a line with `qty` units.
pub fn unit_id(demand: &Demand, line: usize, k: i64, qty: i64) -> String {
    let base = line_id(demand, line);
    if qty == 1 { base } else { format!("{base}/{k}") }
}

/// Validates every line, then expands each into `qty` units. Lines without
/// declared substitutes take theirs from `table`.
pub fn expand_demands(demands: &[Demand], table: &SubstituteTable) -> Result<Vec<DemandUnit>> {
    let mut total = 0;
    for (line, demand) in demands.iter().enumerate() {
        validate_demand(demand, line)?;
        total += demand.qty;
        if total > MAX_UNITS {
            return Err(Error::invalid_demand(
                &line_id(demand, line),
                format!("demand set exceeds {} units", MAX_UNITS),
            ));
        }
    }

    let mut units = Vec::new();
    for (line, demand) in demands.iter().enumerate() {
        let substitutes = if demand.substitutes.is_empty() {
            table.lookup(&demand.profile).to_vec()
        } else {
            demand.substitutes.clone()
        };
        for k in 1..=demand.qty {
            units.push(DemandUnit::from_demand(
                demand,
                line,
                unit_id(demand, line, k, demand.qty),
                substitutes.clone(),
            ));
        }
    }
    Ok(units)
}

/// Supply consumed so far in one run.
#[derive(Debug, Default)]
struct Ledger {
    used: HashSet<String>,
}

impl Ledger {
    fn consume(&mut self, supply_id: &str) {
        let fresh = self.used.insert(supply_id.to_string());
        debug_assert!(fresh, "supply {supply_id} consumed twice");
    }
}

/// First-fit-decreasing allocation of a whole demand set, one cut per supply
/// item.
pub struct Allocator<'a, R: SupplyRepository + ?Sized> {
    repo: &'a R,
    config: &'a MatchConfig,
}

impl<'a, R: SupplyRepository + ?Sized> Allocator<'a, R> {
    pub fn new(repo: &'a R, config: &'a MatchConfig) -> Self {
        Self { repo, config }
    }

    /// Results follow allocation order: grouped by profile, longest request
    /// first. Unmet units come back as `none` results, never as errors.
    pub fn allocate(&self, demands: &[Demand]) -> Result<Allocation> {
        let units = self.expand_demands(demands)?;
        let finder = CandidateFinder::new(self.repo, self.config.kerf_mm);
        let mut ledger = Ledger::default();
        let mut allocation = Allocation::default();

        for unit in &units {
            let profiles = if self.config.honor_substitutes {
                unit.search_order()
            } else {
                vec![unit.profile.as_str()]
            };

            let first = finder
                .find(unit, &profiles, SearchMode::Batch { used: &ledger.used })
                .into_iter()
                .next();

            match first {
                Some(candidate) => {
                    let item = candidate.item;
                    let outcome = if candidate.efficiency_pct >= 80.0 {
                        MatchOutcome::Good
                    } else {
                        MatchOutcome::Fair
                    };
                    ledger.consume(&item.id);
                    tracing::debug!(
                        demand = %unit.id,
                        supply = %item.id,
                        length_mm = unit.length_mm,
                        stock_mm = item.length_mm,
                        %outcome,
                        "assigned"
                    );
                    allocation
                        .results
                        .push(MatchResult::assigned(unit, item, self.config.kerf_mm, outcome));
                    allocation
                        .plans
                        .push(CuttingPlan::single_cut(unit, item, self.config.kerf_mm));
                }
                None => {
                    tracing::debug!(demand = %unit.id, profile = %unit.profile, "unmatched");
                    allocation.results.push(MatchResult::unmatched(unit));
                }
            }
        }

        let summary = allocation.summary();
        tracing::info!(
            units = units.len(),
            matched = allocation.matched_count(),
            match_percentage = summary.match_percentage,
            total_offcut_mm = summary.total_offcut_mm,
            "allocation finished"
        );
        Ok(allocation)
    }

    fn expand_demands(&self, demands: &[Demand]) -> Result<Vec<DemandUnit>> {
        let mut units = expand_demands(demands, &self.config.substitutes)?;
        // Group by profile, longest first within a group (stable).
        units.sort_by(|a, b| {
            a.profile
                .cmp(&b.profile)
                .then(b.length_mm.total_cmp(&a.length_mm))
        });
        Ok(units)
    }
}
