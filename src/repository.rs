use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::ProfileCatalog;
use crate::error::{Error, Result};
use crate::types::{Allocation, SupplyItem, SupplyStatus};

/// Read side of a stock store, as seen by the matching engine.
pub trait SupplyRepository {
    /// Items of `profile` in a stable order. Unknown profiles yield nothing.
    fn find_by_profile(&self, profile: &str, only_available: bool) -> Vec<&SupplyItem>;
}

#[derive(Serialize, Deserialize)]
struct InventoryFile {
    items: Vec<SupplyItem>,
}

/// In-memory stock, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: Vec<SupplyItem>,
    index: HashMap<String, usize>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = SupplyItem>) -> Self {
        let mut inventory = Self::new();
        for item in items {
            inventory.insert(item);
        }
        inventory
    }

    /// Adds an item. An item with the same id is replaced in place.
    pub fn insert(&mut self, item: SupplyItem) {
        match self.index.get(&item.id) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.index.insert(item.id.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<SupplyItem> {
        let pos = self.index.remove(id)?;
        let item = self.items.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(item)
    }

    pub fn get(&self, id: &str) -> Option<&SupplyItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SupplyItem> {
        self.items.iter()
    }

    /// Available items within `[min_mm, max_mm]`, optionally of one profile.
    pub fn find_by_length(
        &self,
        min_mm: f64,
        max_mm: Option<f64>,
        profile: Option<&str>,
    ) -> Vec<&SupplyItem> {
        self.items
            .iter()
            .filter(|item| item.is_available())
            .filter(|item| item.length_mm >= min_mm)
            .filter(|item| max_mm.is_none_or(|max| item.length_mm <= max))
            .filter(|item| profile.is_none_or(|p| item.profile == p))
            .collect()
    }

    pub fn find_certified(&self) -> Vec<&SupplyItem> {
        self.items.iter().filter(|item| item.certified).collect()
    }

    /// Available mass per profile in kg. Profiles missing from the catalog
    /// are left out.
    pub fn available_mass_by_profile(&self, catalog: &ProfileCatalog) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for item in self.items.iter().filter(|item| item.is_available()) {
            if let Some(kg) = catalog.mass_kg(&item.profile, item.length_mm) {
                *totals.entry(item.profile.clone()).or_insert(0.0) += kg;
            }
        }
        totals
    }

    /// Copy of the available items, for running an allocation without
    /// holding on to the live inventory.
    pub fn available_snapshot(&self) -> Inventory {
        Inventory::from_items(self.items.iter().filter(|i| i.is_available()).cloned())
    }

    /// Marks every planned supply item as reserved. Either all items are
    /// reserved or, if any is missing or no longer available, none are.
    pub fn commit_reservations(&mut self, allocation: &Allocation) -> Result<usize> {
        let mut positions = Vec::with_capacity(allocation.plans.len());
        for plan in &allocation.plans {
            match self.index.get(&plan.supply_id) {
                Some(&pos) if self.items[pos].is_available() => positions.push(pos),
                _ => {
                    return Err(Error::SupplyUnavailable {
                        supply_id: plan.supply_id.clone(),
                    });
                }
            }
        }
        for &pos in &positions {
            self.items[pos].status = SupplyStatus::Reserved;
        }
        tracing::info!(reserved = positions.len(), "committed reservations");
        Ok(positions.len())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Inventory> {
        let text = std::fs::read_to_string(path)?;
        let file: InventoryFile = serde_json::from_str(&text)?;
        Ok(Inventory::from_items(file.items))
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = InventoryFile {
            items: self.items.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// Demo stock: new beams in three mill lengths plus a few salvaged ones.
    pub fn sample() -> Inventory {
        let mut inventory = Inventory::new();

        for profile in ["HEA 200", "HEA 300", "HEB 200", "IPE 200"] {
            for length in [6000.0, 8000.0, 12000.0] {
                let mut item = SupplyItem::new(
                    format!("N-{}-{}", profile.replace(' ', ""), length as u32),
                    profile,
                    length,
                )
                .priced(length / 1000.0 * 50.0);
                item.location = Some("Hall A".to_string());
                item.certified = true;
                inventory.insert(item);
            }
        }

        for (profile, length, origin) in [
            ("HEA 200", 5800.0, "Old Factory"),
            ("HEA 300", 5950.0, "Old Factory"),
            ("HEB 200", 4500.0, "Office North"),
            ("IPE 300", 7200.0, "Old Factory"),
        ] {
            let mut item = SupplyItem::new(
                format!("S-{}-{}", profile.replace(' ', ""), length as u32),
                profile,
                length,
            )
            .salvaged()
            .priced(length / 1000.0 * 35.0);
            item.origin = Some(origin.to_string());
            item.location = Some("Hall B".to_string());
            item.certified = true;
            inventory.insert(item);
        }

        inventory
    }
}

impl SupplyRepository for Inventory {
    fn find_by_profile(&self, profile: &str, only_available: bool) -> Vec<&SupplyItem> {
        self.items
            .iter()
            .filter(|item| item.profile == profile)
            .filter(|item| !only_available || item.is_available())
            .collect()
    }
}
