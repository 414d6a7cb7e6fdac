//! In-memory lookup maps over reference data.
//!
//! Built once from the bulk list endpoints when a command starts and used to
//! resolve references (material, customer, ship-to, depot, vehicle) during
//! validation and form population. Material and vehicle keys are parsed into
//! [`MaterialCode`] and [`VehicleId`], so a padded code in the master data
//! still matches its cleaned counterpart. Entries whose code is blank are
//! not indexed.
//!
//! Reference lists may repeat a key (several price rows per product, say).
//! The first occurrence wins and later duplicates are dropped.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use fuelops_core::{MaterialCode, VehicleId};

use crate::api::{Client, Plant, PriceEntry, Product, ReferenceData, Truck};

/// Keep the first item for each key, preserving input order.
pub fn dedupe_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Index items by key; the first item for each key wins.
pub fn index_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> HashMap<K, T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut map = HashMap::new();
    for item in items {
        map.entry(key(&item)).or_insert(item);
    }
    map
}

/// Index items by a parsed code, skipping items whose code does not parse.
/// The first item for each code wins.
fn index_by_code<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> BTreeMap<K, T>
where
    K: Ord,
    F: FnMut(&T) -> Option<K>,
{
    let mut map = BTreeMap::new();
    for item in items {
        if let Some(code) = key(&item) {
            map.entry(code).or_insert(item);
        }
    }
    map
}

/// One row per material out of a price list.
#[must_use]
pub fn priced_materials(prices: Vec<PriceEntry>) -> Vec<PriceEntry> {
    dedupe_by(prices, |p| material_key(&p.material))
}

fn material_key(code: &str) -> Option<MaterialCode> {
    MaterialCode::parse(code).ok()
}

fn code_key(code: &str) -> String {
    code.trim().to_string()
}

fn vehicle_key(code: &str) -> Option<VehicleId> {
    VehicleId::parse(code).ok()
}

/// Lookup maps keyed by natural business keys.
#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    products: BTreeMap<MaterialCode, Product>,
    sold_to: HashMap<String, Client>,
    ship_to: HashMap<String, Client>,
    plants: HashMap<String, Plant>,
    trucks: BTreeMap<VehicleId, Truck>,
}

impl LookupCache {
    /// Build the maps from freshly fetched reference lists.
    #[must_use]
    pub fn new(data: ReferenceData) -> Self {
        let ship_to = index_by(
            data.clients.iter().filter(|c| !c.ship_to.is_empty()).cloned(),
            |c| code_key(&c.ship_to),
        );
        Self {
            products: index_by_code(data.products, |p| material_key(&p.material)),
            sold_to: index_by(data.clients, |c| code_key(&c.sold_to)),
            ship_to,
            plants: index_by(data.plants, |p| code_key(&p.code)),
            trucks: index_by_code(data.trucks, |t| vehicle_key(&t.vehicle)),
        }
    }

    #[must_use]
    pub fn product(&self, material_code: &str) -> Option<&Product> {
        self.products.get(&material_key(material_code)?)
    }

    /// Client by its sold-to (billing) code.
    #[must_use]
    pub fn customer(&self, sold_to: &str) -> Option<&Client> {
        self.sold_to.get(&code_key(sold_to))
    }

    /// Client by its ship-to (delivery) code.
    #[must_use]
    pub fn ship_to(&self, ship_to: &str) -> Option<&Client> {
        self.ship_to.get(&code_key(ship_to))
    }

    #[must_use]
    pub fn plant(&self, plant_code: &str) -> Option<&Plant> {
        self.plants.get(&code_key(plant_code))
    }

    #[must_use]
    pub fn truck(&self, vehicle: &str) -> Option<&Truck> {
        self.trucks.get(&vehicle_key(vehicle)?)
    }

    /// All trucks, ordered by normalized registration.
    pub fn trucks(&self) -> impl Iterator<Item = &Truck> {
        self.trucks.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(material: &str, description: &str) -> Product {
        Product {
            material: material.to_string(),
            description: Some(description.to_string()),
            ..Product::default()
        }
    }

    #[test]
    fn test_dedupe_first_wins_and_keeps_order() {
        let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
        let unique = dedupe_by(items, |(k, _)| *k);
        assert_eq!(unique, vec![("a", 1), ("b", 2), ("c", 4)]);
    }

    #[test]
    fn test_priced_materials_one_row_per_product() {
        let prices = vec![
            PriceEntry {
                material: "000200123".to_string(),
                price: Some(Decimal::from(10)),
                ..PriceEntry::default()
            },
            PriceEntry {
                material: "200123".to_string(),
                price: Some(Decimal::from(12)),
                ..PriceEntry::default()
            },
            PriceEntry {
                material: "300001".to_string(),
                ..PriceEntry::default()
            },
        ];
        let unique = priced_materials(prices);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].price, Some(Decimal::from(10)));
    }

    #[test]
    fn test_lookup_normalises_keys() {
        let cache = LookupCache::new(ReferenceData {
            products: vec![product("000200123", "Gasoil"), product("200123", "Duplicate")],
            trucks: vec![Truck {
                vehicle: "12345-a-6".to_string(),
                ..Truck::default()
            }],
            ..ReferenceData::default()
        });

        assert_eq!(
            cache.product("200123").unwrap().description.as_deref(),
            Some("Gasoil")
        );
        assert!(cache.product("0200123").is_some());
        assert!(cache.truck("12345A6").is_some());
        assert!(cache.truck("99999A9").is_none());
        assert!(cache.product("000").is_none());
    }

    #[test]
    fn test_trucks_listed_by_registration() {
        let truck = |vehicle: &str| Truck {
            vehicle: vehicle.to_string(),
            ..Truck::default()
        };
        let cache = LookupCache::new(ReferenceData {
            trucks: vec![
                truck("56789-B-1"),
                truck("12345-A-6"),
                truck(""),
                truck("34567-a-2"),
                truck("12345A6"),
            ],
            ..ReferenceData::default()
        });
        let listed: Vec<&str> = cache.trucks().map(|t| t.vehicle.as_str()).collect();
        assert_eq!(listed, vec!["12345-A-6", "34567-a-2", "56789-B-1"]);
    }

    #[test]
    fn test_customer_and_ship_to_roles() {
        let cache = LookupCache::new(ReferenceData {
            clients: vec![Client {
                sold_to: "100234".to_string(),
                ship_to: "500777".to_string(),
                ..Client::default()
            }],
            ..ReferenceData::default()
        });
        assert!(cache.customer("100234").is_some());
        assert!(cache.customer("500777").is_none());
        assert!(cache.ship_to("500777").is_some());
    }
}
