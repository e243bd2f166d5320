use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_KERF_MM: f64 = 5.0;
pub const DEFAULT_MIN_OFFCUT_MM: f64 = 500.0;
pub const DEFAULT_SALVAGE_BONUS: f64 = 20.0;

/// Weights for [`crate::scoring::score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub exact_bonus: f64,
    pub salvage_bonus: f64,
    pub prefer_salvaged: bool,
    /// Offcuts shorter than this are scrap.
    pub offcut_floor_mm: f64,
    pub offcut_penalty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            exact_bonus: 100.0,
            salvage_bonus: DEFAULT_SALVAGE_BONUS,
            prefer_salvaged: true,
            offcut_floor_mm: DEFAULT_MIN_OFFCUT_MM,
            offcut_penalty: 10.0,
        }
    }
}

/// Profiles that may stand in for a requested profile, in preference order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstituteTable(BTreeMap<String, Vec<String>>);

impl SubstituteTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.insert("HEA 200", ["HEB 180", "IPE 240"]);
        table.insert("HEB 200", ["HEA 220", "IPE 270"]);
        table.insert("IPE 200", ["HEA 160"]);
        table
    }

    pub fn insert<I, S>(&mut self, profile: &str, substitutes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(
            profile.to_string(),
            substitutes.into_iter().map(Into::into).collect(),
        );
    }

    pub fn lookup(&self, profile: &str) -> &[String] {
        self.0.get(profile).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Saw blade loss per cut.
    pub kerf_mm: f64,
    pub weights: ScoreWeights,
    /// Let the batch allocator fall back to substitute profiles. The single
    /// match resolver always searches them.
    pub honor_substitutes: bool,
    pub substitutes: SubstituteTable,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            kerf_mm: DEFAULT_KERF_MM,
            weights: ScoreWeights::default(),
            honor_substitutes: false,
            substitutes: SubstituteTable::standard(),
        }
    }
}
