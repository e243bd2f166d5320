use crate::candidates::Candidate;
use crate::config::ScoreWeights;

/// Desirability of a candidate; higher is better.
///
/// Exact profile and efficiency dominate. Salvaged stock gets a bonus when
/// preferred, and an offcut below the floor is penalised: it is scrap, even
/// though it makes the raw efficiency look better.
pub fn score(candidate: &Candidate<'_>, weights: &ScoreWeights) -> f64 {
    let mut s = candidate.efficiency_pct;
    if candidate.exact_profile {
        s += weights.exact_bonus;
    }
    if weights.prefer_salvaged && candidate.item.salvaged {
        s += weights.salvage_bonus;
    }
    if candidate.leftover_mm < weights.offcut_floor_mm {
        s -= weights.offcut_penalty;
    }
    s
}

/// Highest scoring candidate. On a tie the earlier candidate wins.
pub fn pick_best<'c, 'a>(
    candidates: &'c [Candidate<'a>],
    weights: &ScoreWeights,
) -> Option<(&'c Candidate<'a>, f64)> {
    let mut best: Option<(&Candidate<'a>, f64)> = None;
    for candidate in candidates {
        let s = score(candidate, weights);
        if best.is_none_or(|(_, top)| s > top) {
            best = Some((candidate, s));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SupplyItem;

    fn candidate(item: &SupplyItem, leftover: f64, efficiency: f64, exact: bool) -> Candidate<'_> {
        Candidate {
            item,
            leftover_mm: leftover,
            efficiency_pct: efficiency,
            exact_profile: exact,
        }
    }

    #[test]
    fn test_score_terms() {
        let weights = ScoreWeights::default();
        let new = SupplyItem::new("n", "X", 6000.0);
        let old = SupplyItem::new("o", "X", 6000.0).salvaged();

        assert_eq!(score(&candidate(&new, 1000.0, 80.0, true), &weights), 180.0);
        assert_eq!(score(&candidate(&new, 1000.0, 80.0, false), &weights), 80.0);
        assert_eq!(score(&candidate(&old, 1000.0, 80.0, true), &weights), 200.0);
        assert_eq!(score(&candidate(&new, 499.0, 80.0, true), &weights), 170.0);
    }

    #[test]
    fn test_salvage_bonus_only_when_preferred() {
        let weights = ScoreWeights {
            prefer_salvaged: false,
            ..ScoreWeights::default()
        };
        let old = SupplyItem::new("o", "X", 6000.0).salvaged();
        assert_eq!(score(&candidate(&old, 1000.0, 80.0, true), &weights), 180.0);
    }

    #[test]
    fn test_thin_offcut_loses_to_usable_offcut() {
        // 98% efficient but leaves a sliver vs 90% with a reusable offcut.
        let weights = ScoreWeights::default();
        let sliver = SupplyItem::new("a", "X", 5100.0);
        let usable = SupplyItem::new("b", "X", 5555.0);
        let candidates = [
            candidate(&sliver, 95.0, 98.0, true),
            candidate(&usable, 550.0, 90.0, true),
        ];
        let s_sliver = score(&candidates[0], &weights);
        let s_usable = score(&candidates[1], &weights);
        assert_eq!(s_sliver, 188.0);
        assert_eq!(s_usable, 190.0);
        let (best, _) = pick_best(&candidates, &weights).unwrap();
        assert_eq!(best.item.id, "b");
    }

    #[test]
    fn test_tie_goes_to_first_found() {
        let weights = ScoreWeights::default();
        let a = SupplyItem::new("a", "X", 6000.0);
        let b = SupplyItem::new("b", "X", 6000.0);
        let candidates = [
            candidate(&a, 600.0, 90.0, true),
            candidate(&b, 600.0, 90.0, true),
        ];
        let (best, s) = pick_best(&candidates, &weights).unwrap();
        assert_eq!(best.item.id, "a");
        assert_eq!(s, 190.0);
        assert!(pick_best(&[], &weights).is_none());
    }
}
