use serde::Serialize;

use crate::catalog::ProfileCatalog;
use crate::summary::round_to;
use crate::types::{CuttingPlan, MatchOutcome, MatchResult};

const MAX_WIDTH: f64 = 60.0;

/// Flat export row for one match result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    pub demand_id: String,
    pub supply_id: Option<String>,
    pub outcome: MatchOutcome,
    pub requested_profile: String,
    pub matched_profile: Option<String>,
    pub requested_length_mm: f64,
    pub matched_length_mm: f64,
    pub leftover_mm: f64,
    pub efficiency_pct: f64,
    pub estimated_cost: f64,
    /// Mass of the requested piece, when the profile is in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piece_mass_kg: Option<f64>,
}

impl MatchRow {
    pub fn from_result(result: &MatchResult, catalog: &ProfileCatalog) -> Self {
        let profile = result
            .matched_profile
            .as_deref()
            .unwrap_or(&result.requested_profile);
        Self {
            demand_id: result.demand_id.clone(),
            supply_id: result.supply_id.clone(),
            outcome: result.outcome,
            requested_profile: result.requested_profile.clone(),
            matched_profile: result.matched_profile.clone(),
            requested_length_mm: result.requested_length_mm,
            matched_length_mm: result.matched_length_mm,
            leftover_mm: round_to(result.leftover_mm, 1),
            efficiency_pct: round_to(result.efficiency_pct, 1),
            estimated_cost: round_to(result.estimated_cost, 2),
            piece_mass_kg: catalog
                .mass_kg(profile, result.requested_length_mm)
                .map(|kg| round_to(kg, 1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutRow {
    pub length_mm: f64,
    pub demand_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    pub supply_id: String,
    pub profile: String,
    pub stock_length_mm: f64,
    pub cuts: Vec<CutRow>,
    pub offcut_mm: f64,
    pub utilisation_pct: f64,
}

impl PlanRow {
    pub fn from_plan(plan: &CuttingPlan) -> Self {
        Self {
            supply_id: plan.supply_id.clone(),
            profile: plan.profile.clone(),
            stock_length_mm: plan.stock_length_mm,
            cuts: plan
                .cuts
                .iter()
                .map(|c| CutRow {
                    length_mm: c.length_mm,
                    demand_id: c.demand_id.clone(),
                })
                .collect(),
            offcut_mm: round_to(plan.offcut_mm, 1),
            utilisation_pct: round_to(plan.utilisation_pct, 1),
        }
    }
}

/// One-line ASCII picture of a cutting plan, scaled to the stock length:
///
/// ```text
/// [=========5500=========|~~495~~]
/// ```
///
/// `=` is a cut piece, `|` a saw cut and `~` the offcut.
pub fn render_plan(plan: &CuttingPlan) -> String {
    if plan.stock_length_mm <= 0.0 {
        return String::new();
    }
    let scale = MAX_WIDTH / plan.stock_length_mm;
    let mut bar = String::from("[");

    for (i, cut) in plan.cuts.iter().enumerate() {
        if i > 0 {
            bar.push('|');
        }
        let width = ((cut.length_mm * scale).round() as usize).max(1);
        bar.push_str(&label_segment('=', width, &format!("{}", cut.length_mm)));
    }

    if plan.offcut_mm > 0.0 {
        bar.push('|');
        let width = ((plan.offcut_mm * scale).round() as usize).max(1);
        bar.push_str(&label_segment('~', width, &format!("{}", plan.offcut_mm)));
    }

    bar.push(']');
    bar
}

fn label_segment(fill: char, width: usize, label: &str) -> String {
    let mut cells = vec![fill; width];
    let chars: Vec<char> = label.chars().collect();
    // Only label segments with room to spare
    if chars.len() + 2 <= width {
        let start = (width - chars.len()) / 2;
        cells[start..start + chars.len()].copy_from_slice(&chars);
    }
    cells.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cut;

    fn plan(stock: f64, cut: f64, offcut: f64) -> CuttingPlan {
        CuttingPlan {
            supply_id: "s1".to_string(),
            profile: "HEA 200".to_string(),
            stock_length_mm: stock,
            cuts: vec![Cut {
                length_mm: cut,
                demand_id: "d1".to_string(),
            }],
            offcut_mm: offcut,
            utilisation_pct: cut / stock * 100.0,
        }
    }

    #[test]
    fn test_render_cut_and_offcut() {
        let out = render_plan(&plan(6000.0, 3000.0, 2995.0));
        assert!(out.starts_with('['));
        assert!(out.ends_with(']'));
        assert!(out.contains("3000"));
        assert!(out.contains("2995"));
        assert!(out.contains('|'));
        assert!(out.contains('~'));
    }

    #[test]
    fn test_render_without_offcut() {
        let out = render_plan(&plan(5000.0, 5000.0, 0.0));
        assert!(out.contains("5000"));
        assert!(!out.contains('~'));
        assert!(!out.contains('|'));
    }

    #[test]
    fn test_render_tiny_offcut_still_visible() {
        let out = render_plan(&plan(6000.0, 5990.0, 5.0));
        assert!(out.contains('~'));
        assert!(!out.contains("5]"));
    }

    #[test]
    fn test_match_row_rounding_and_mass() {
        let result = MatchResult {
            demand_id: "d1".to_string(),
            supply_id: Some("s1".to_string()),
            outcome: MatchOutcome::Good,
            requested_profile: "HEA 200".to_string(),
            matched_profile: Some("HEA 200".to_string()),
            requested_length_mm: 5500.0,
            matched_length_mm: 6000.0,
            leftover_mm: 495.0,
            efficiency_pct: 91.666_666,
            estimated_cost: 274.999_9,
            priority: 1,
        };
        let row = MatchRow::from_result(&result, &ProfileCatalog::standard());
        assert_eq!(row.efficiency_pct, 91.7);
        assert_eq!(row.estimated_cost, 275.0);
        // 42.3 kg/m over 5.5 m
        let mass = row.piece_mass_kg.unwrap();
        assert!((mass - 232.65).abs() <= 0.05, "mass {mass}");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["outcome"], "good");
        assert_eq!(json["requested_profile"], "HEA 200");
    }

    #[test]
    fn test_match_row_unknown_profile_has_no_mass() {
        let result = MatchResult {
            demand_id: "d".to_string(),
            supply_id: None,
            outcome: MatchOutcome::None,
            requested_profile: "MYSTERY".to_string(),
            matched_profile: None,
            requested_length_mm: 100.0,
            matched_length_mm: 0.0,
            leftover_mm: 0.0,
            efficiency_pct: 0.0,
            estimated_cost: 0.0,
            priority: 1,
        };
        let row = MatchRow::from_result(&result, &ProfileCatalog::standard());
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["outcome"], "none");
        assert!(json.get("piece_mass_kg").is_none());
    }

    #[test]
    fn test_plan_row() {
        let row = PlanRow::from_plan(&plan(6000.0, 5500.0, 495.0));
        assert_eq!(row.utilisation_pct, 91.7);
        assert_eq!(row.cuts.len(), 1);
        assert_eq!(row.cuts[0].demand_id, "d1");
    }
}
