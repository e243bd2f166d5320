use serde::{Deserialize, Deserializer, Serialize};

use crate::summary::EfficiencySummary;

/// Lengths arrive from spreadsheets and hand-edited JSON as either numbers or
/// numeric strings ("5500"). Accept both.
pub fn deserialize_length<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid length '{s}'"))),
    }
}

fn default_tolerance_over() -> f64 {
    100.0
}

fn default_priority() -> u32 {
    1
}

fn default_qty() -> i64 {
    1
}

/// One line of a demand set: a requested profile and length, `qty` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    #[serde(default)]
    pub id: String,
    pub profile: String,
    #[serde(deserialize_with = "deserialize_length")]
    pub length_mm: f64,
    #[serde(default = "default_qty")]
    pub qty: i64,
    #[serde(default = "default_tolerance_over")]
    pub tolerance_over_mm: f64,
    #[serde(default)]
    pub tolerance_under_mm: f64,
    /// Alternate profiles, searched in this order after the primary one.
    #[serde(default)]
    pub substitutes: Vec<String>,
    /// Lower is more urgent. Carried through to results; allocation order
    /// does not depend on it yet.
    #[serde(default = "default_priority")]
    pub priority: u32,
}

impl Demand {
    pub fn new(id: impl Into<String>, profile: impl Into<String>, length_mm: f64, qty: i64) -> Self {
        Self {
            id: id.into(),
            profile: profile.into(),
            length_mm,
            qty,
            tolerance_over_mm: default_tolerance_over(),
            tolerance_under_mm: 0.0,
            substitutes: Vec::new(),
            priority: default_priority(),
        }
    }

    pub fn with_tolerance(mut self, over_mm: f64, under_mm: f64) -> Self {
        self.tolerance_over_mm = over_mm;
        self.tolerance_under_mm = under_mm;
        self
    }

    pub fn with_substitutes<I, S>(mut self, substitutes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.substitutes = substitutes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

/// A single required piece, expanded from a [`Demand`] line.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandUnit {
    pub id: String,
    /// Index of the originating demand line.
    pub line: usize,
    pub profile: String,
    pub length_mm: f64,
    pub tolerance_over_mm: f64,
    pub tolerance_under_mm: f64,
    pub substitutes: Vec<String>,
    pub priority: u32,
}

impl DemandUnit {
    pub fn from_demand(demand: &Demand, line: usize, id: String, substitutes: Vec<String>) -> Self {
        Self {
            id,
            line,
            profile: demand.profile.clone(),
            length_mm: demand.length_mm,
            tolerance_over_mm: demand.tolerance_over_mm,
            tolerance_under_mm: demand.tolerance_under_mm,
            substitutes,
            priority: demand.priority,
        }
    }

    /// Primary profile first, then substitutes in declared order.
    pub fn search_order(&self) -> Vec<&str> {
        std::iter::once(self.profile.as_str())
            .chain(self.substitutes.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyStatus {
    #[default]
    Available,
    Reserved,
    Sold,
    InProcess,
}

/// A physical beam in stock, new or salvaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyItem {
    pub id: String,
    pub profile: String,
    #[serde(deserialize_with = "deserialize_length")]
    pub length_mm: f64,
    #[serde(default)]
    pub salvaged: bool,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub status: SupplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub certified: bool,
}

impl SupplyItem {
    pub fn new(id: impl Into<String>, profile: impl Into<String>, length_mm: f64) -> Self {
        Self {
            id: id.into(),
            profile: profile.into(),
            length_mm,
            salvaged: false,
            unit_price: 0.0,
            status: SupplyStatus::Available,
            origin: None,
            location: None,
            certified: false,
        }
    }

    pub fn salvaged(mut self) -> Self {
        self.salvaged = true;
        self
    }

    pub fn priced(mut self, unit_price: f64) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn with_status(mut self, status: SupplyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_available(&self) -> bool {
        self.status == SupplyStatus::Available
    }
}

impl std::fmt::Display for SupplyItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}mm", self.id, self.profile, self.length_mm)
    }
}

/// Share of a stock item that ends up in the requested piece. A piece accepted
/// under the short tolerance uses the whole item, so the ratio caps at 100.
pub fn efficiency_pct(required_mm: f64, stock_mm: f64) -> f64 {
    if stock_mm <= 0.0 {
        return 0.0;
    }
    required_mm.min(stock_mm) / stock_mm * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Perfect,
    Good,
    Fair,
    None,
}

impl MatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOutcome::Perfect => "perfect",
            MatchOutcome::Good => "good",
            MatchOutcome::Fair => "fair",
            MatchOutcome::None => "none",
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
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
    pub priority: u32,
}

impl MatchResult {
    pub fn unmatched(unit: &DemandUnit) -> Self {
        Self {
            demand_id: unit.id.clone(),
            supply_id: None,
            outcome: MatchOutcome::None,
            requested_profile: unit.profile.clone(),
            matched_profile: None,
            requested_length_mm: unit.length_mm,
            matched_length_mm: 0.0,
            leftover_mm: 0.0,
            efficiency_pct: 0.0,
            estimated_cost: 0.0,
            priority: unit.priority,
        }
    }

    pub fn assigned(unit: &DemandUnit, item: &SupplyItem, kerf_mm: f64, outcome: MatchOutcome) -> Self {
        let ratio = efficiency_pct(unit.length_mm, item.length_mm) / 100.0;
        Self {
            demand_id: unit.id.clone(),
            supply_id: Some(item.id.clone()),
            outcome,
            requested_profile: unit.profile.clone(),
            matched_profile: Some(item.profile.clone()),
            requested_length_mm: unit.length_mm,
            matched_length_mm: item.length_mm,
            leftover_mm: (item.length_mm - unit.length_mm - kerf_mm).max(0.0),
            efficiency_pct: ratio * 100.0,
            estimated_cost: item.unit_price * ratio,
            priority: unit.priority,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.outcome != MatchOutcome::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cut {
    pub length_mm: f64,
    pub demand_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuttingPlan {
    pub supply_id: String,
    pub profile: String,
    pub stock_length_mm: f64,
    pub cuts: Vec<Cut>,
    pub offcut_mm: f64,
    pub utilisation_pct: f64,
}

impl CuttingPlan {
    pub fn single_cut(unit: &DemandUnit, item: &SupplyItem, kerf_mm: f64) -> Self {
        Self {
            supply_id: item.id.clone(),
            profile: item.profile.clone(),
            stock_length_mm: item.length_mm,
            cuts: vec![Cut {
                length_mm: unit.length_mm,
                demand_id: unit.id.clone(),
            }],
            offcut_mm: (item.length_mm - unit.length_mm - kerf_mm).max(0.0),
            utilisation_pct: efficiency_pct(unit.length_mm, item.length_mm),
        }
    }
}

/// Output of one batch run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Allocation {
    pub results: Vec<MatchResult>,
    pub plans: Vec<CuttingPlan>,
}

impl Allocation {
    pub fn matched_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_matched()).count()
    }

    pub fn summary(&self) -> EfficiencySummary {
        EfficiencySummary::from_results(&self.results)
    }
}
