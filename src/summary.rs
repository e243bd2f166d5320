use serde::Serialize;

use crate::types::MatchResult;

/// Roll-up of a batch of match results.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EfficiencySummary {
    pub match_percentage: f64,
    pub average_efficiency: f64,
    pub total_offcut_mm: f64,
    pub total_cost: f64,
}

impl EfficiencySummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let matched: Vec<&MatchResult> = results.iter().filter(|r| r.is_matched()).collect();
        if matched.is_empty() {
            return Self::default();
        }

        let n = matched.len() as f64;
        Self {
            match_percentage: n / results.len() as f64 * 100.0,
            average_efficiency: matched.iter().map(|r| r.efficiency_pct).sum::<f64>() / n,
            total_offcut_mm: matched.iter().map(|r| r.leftover_mm).sum(),
            total_cost: matched.iter().map(|r| r.estimated_cost).sum(),
        }
    }

    /// Export form: percentages to one decimal, cost to cents.
    pub fn rounded(&self) -> Self {
        Self {
            match_percentage: round_to(self.match_percentage, 1),
            average_efficiency: round_to(self.average_efficiency, 1),
            total_offcut_mm: round_to(self.total_offcut_mm, 1),
            total_cost: round_to(self.total_cost, 2),
        }
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchOutcome;

    fn result(id: &str, efficiency: f64, leftover: f64, cost: f64) -> MatchResult {
        MatchResult {
            demand_id: id.to_string(),
            supply_id: Some(format!("s-{id}")),
            outcome: MatchOutcome::Good,
            requested_profile: "X".to_string(),
            matched_profile: Some("X".to_string()),
            requested_length_mm: 1000.0,
            matched_length_mm: 1000.0,
            leftover_mm: leftover,
            efficiency_pct: efficiency,
            estimated_cost: cost,
            priority: 1,
        }
    }

    fn unmatched(id: &str) -> MatchResult {
        MatchResult {
            supply_id: None,
            outcome: MatchOutcome::None,
            matched_profile: None,
            matched_length_mm: 0.0,
            leftover_mm: 0.0,
            efficiency_pct: 0.0,
            estimated_cost: 0.0,
            ..result(id, 0.0, 0.0, 0.0)
        }
    }

    #[test]
    fn test_three_of_four_matched() {
        let results = vec![
            result("a", 95.0, 100.0, 10.0),
            result("b", 85.0, 200.0, 20.5),
            result("c", 75.0, 300.0, 30.25),
            unmatched("d"),
        ];
        let s = EfficiencySummary::from_results(&results);
        assert_eq!(s.match_percentage, 75.0);
        assert_eq!(s.average_efficiency, 85.0);
        assert_eq!(s.total_offcut_mm, 600.0);
        assert_eq!(s.total_cost, 60.75);
    }

    #[test]
    fn test_nothing_matched_is_all_zero() {
        let s = EfficiencySummary::from_results(&[unmatched("a"), unmatched("b")]);
        assert_eq!(s, EfficiencySummary::default());
        assert_eq!(EfficiencySummary::from_results(&[]), EfficiencySummary::default());
    }

    #[test]
    fn test_rounded_and_field_names() {
        let s = EfficiencySummary::from_results(&[
            result("a", 91.666, 495.0, 274.999),
            result("b", 90.0, 10.0, 0.004),
            unmatched("c"),
        ]);
        let r = s.rounded();
        assert_eq!(r.match_percentage, 66.7);
        assert_eq!(r.average_efficiency, 90.8);
        assert_eq!(r.total_cost, 275.0);

        let json = serde_json::to_value(r).unwrap();
        for key in ["match_percentage", "average_efficiency", "total_offcut_mm", "total_cost"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
