//! Standard European steel profiles.
//!
//! The catalog is an ordinary value: build it once (usually with
//! [`ProfileCatalog::standard`]) and pass references to whatever needs
//! dimension or mass lookups.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProfileFamily {
    Hea,
    Heb,
    Ipe,
}

impl ProfileFamily {
    pub fn prefix(&self) -> &'static str {
        match self {
            ProfileFamily::Hea => "HEA",
            ProfileFamily::Heb => "HEB",
            ProfileFamily::Ipe => "IPE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub name: String,
    pub family: ProfileFamily,
    pub height_mm: f64,
    pub flange_width_mm: f64,
    pub mass_kg_per_m: f64,
}

// (height, flange width, kg/m)
const HEA: &[(f64, f64, f64)] = &[
    (100.0, 100.0, 16.7),
    (120.0, 120.0, 19.9),
    (140.0, 140.0, 24.7),
    (160.0, 160.0, 30.4),
    (180.0, 180.0, 35.5),
    (200.0, 200.0, 42.3),
    (220.0, 220.0, 50.5),
    (240.0, 240.0, 60.3),
    (260.0, 260.0, 68.2),
    (280.0, 280.0, 76.4),
    (300.0, 300.0, 88.3),
    (320.0, 310.0, 97.6),
    (340.0, 300.0, 105.0),
    (360.0, 300.0, 112.0),
    (400.0, 300.0, 125.0),
    (450.0, 300.0, 140.0),
    (500.0, 300.0, 155.0),
    (550.0, 300.0, 166.0),
    (600.0, 300.0, 178.0),
];

const HEB: &[(f64, f64, f64)] = &[
    (100.0, 100.0, 20.4),
    (120.0, 120.0, 26.7),
    (140.0, 140.0, 33.7),
    (160.0, 160.0, 42.6),
    (180.0, 180.0, 51.2),
    (200.0, 200.0, 61.3),
    (220.0, 220.0, 71.5),
    (240.0, 240.0, 83.2),
    (260.0, 260.0, 93.0),
    (280.0, 280.0, 103.0),
    (300.0, 300.0, 117.0),
    (320.0, 300.0, 127.0),
    (340.0, 300.0, 134.0),
    (360.0, 300.0, 142.0),
    (400.0, 300.0, 155.0),
    (450.0, 300.0, 171.0),
    (500.0, 300.0, 187.0),
    (550.0, 300.0, 199.0),
    (600.0, 300.0, 212.0),
];

const IPE: &[(f64, f64, f64)] = &[
    (80.0, 46.0, 6.0),
    (100.0, 55.0, 8.1),
    (120.0, 64.0, 10.4),
    (140.0, 73.0, 12.9),
    (160.0, 82.0, 15.8),
    (180.0, 91.0, 18.8),
    (200.0, 100.0, 22.4),
    (220.0, 110.0, 26.2),
    (240.0, 120.0, 30.7),
    (270.0, 135.0, 36.1),
    (300.0, 150.0, 42.2),
    (330.0, 160.0, 49.1),
    (360.0, 170.0, 57.1),
    (400.0, 180.0, 66.3),
    (450.0, 190.0, 77.6),
    (500.0, 200.0, 90.7),
    (550.0, 210.0, 106.0),
    (600.0, 220.0, 122.0),
];

#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// HEA, HEB and IPE series.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (family, rows) in [
            (ProfileFamily::Hea, HEA),
            (ProfileFamily::Heb, HEB),
            (ProfileFamily::Ipe, IPE),
        ] {
            for &(height_mm, flange_width_mm, mass_kg_per_m) in rows {
                catalog.insert(Profile {
                    name: format!("{} {}", family.prefix(), height_mm as u32),
                    family,
                    height_mm,
                    flange_width_mm,
                    mass_kg_per_m,
                });
            }
        }
        catalog
    }

    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn by_family(&self, family: ProfileFamily) -> impl Iterator<Item = &Profile> {
        self.profiles.values().filter(move |p| p.family == family)
    }

    /// Mass in kg of `length_mm` of the named profile.
    pub fn mass_kg(&self, name: &str, length_mm: f64) -> Option<f64> {
        self.get(name).map(|p| p.mass_kg_per_m * length_mm / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = ProfileCatalog::standard();
        assert_eq!(catalog.len(), HEA.len() + HEB.len() + IPE.len());
        let hea200 = catalog.get("HEA 200").unwrap();
        assert_eq!(hea200.family, ProfileFamily::Hea);
        assert_eq!(hea200.mass_kg_per_m, 42.3);
        assert_eq!(catalog.by_family(ProfileFamily::Ipe).count(), IPE.len());
    }

    #[test]
    fn test_mass_lookup() {
        let catalog = ProfileCatalog::standard();
        let mass = catalog.mass_kg("IPE 200", 6000.0).unwrap();
        assert!((mass - 134.4).abs() < 1e-9);
        assert!(catalog.mass_kg("HEA 999", 6000.0).is_none());
    }
}
