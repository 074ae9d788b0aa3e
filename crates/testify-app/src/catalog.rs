// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::{Category, Lab, LabId, MapPosition, TestOffering};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog defines no labs")]
    NoLabs,
    #[error("lab #{index} has an empty id")]
    EmptyLabId { index: usize },
    #[error("lab id {id:?} is defined more than once")]
    DuplicateLab { id: String },
    #[error("lab {id:?} has an empty name")]
    EmptyLabName { id: String },
    #[error("lab {id:?} map position ({x}, {y}) is outside 0..=100")]
    PositionOutOfBounds { id: String, x: u8, y: u8 },
    #[error("category #{index} has an empty name")]
    EmptyCategoryName { index: usize },
}

/// Labs in definition order.
///
/// Definition order is load-bearing: [`CatalogStore::first_offering_for`]
/// returns the offering of the first lab that lists a test, so reordering
/// labs changes the representative price shown on catalog tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStore {
    labs: Vec<Lab>,
}

impl CatalogStore {
    pub fn list_labs(&self) -> &[Lab] {
        &self.labs
    }

    pub fn lab(&self, id: &LabId) -> Option<&Lab> {
        self.labs.iter().find(|lab| &lab.id == id)
    }

    /// `None` means "not offered"; unknown lab ids and test names both land
    /// here.
    pub fn get_offering(&self, lab_id: &LabId, test: &str) -> Option<&TestOffering> {
        self.lab(lab_id).and_then(|lab| lab.offering(test))
    }

    pub fn first_offering_for(&self, test: &str) -> Option<&TestOffering> {
        self.first_lab_offering(test).map(|(_, offering)| offering)
    }

    pub fn first_lab_offering(&self, test: &str) -> Option<(&Lab, &TestOffering)> {
        self.labs
            .iter()
            .find_map(|lab| lab.offering(test).map(|offering| (lab, offering)))
    }

    pub fn filter_labs(&self, query: &str) -> Vec<&Lab> {
        self.labs
            .iter()
            .filter(|lab| lab.matches_query(query))
            .collect()
    }

    pub fn offered_tests(&self) -> BTreeSet<&str> {
        self.labs
            .iter()
            .flat_map(|lab| lab.offerings.keys().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryIndex {
    categories: Vec<Category>,
}

impl CategoryIndex {
    pub fn list_categories(&self) -> &[Category] {
        &self.categories
    }

    /// Case-insensitive substring search over test and category names.
    ///
    /// A category whose own name matches keeps every test; otherwise only
    /// matching tests survive and emptied categories are dropped. A blank
    /// query returns the full index.
    pub fn search(&self, query: &str) -> Vec<Category> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.categories.clone();
        }

        self.categories
            .iter()
            .filter_map(|category| {
                let tests = if category.name.to_lowercase().contains(&query) {
                    category.tests.clone()
                } else {
                    category
                        .tests
                        .iter()
                        .filter(|test| test.to_lowercase().contains(&query))
                        .cloned()
                        .collect::<Vec<_>>()
                };
                (!tests.is_empty()).then(|| Category {
                    name: category.name.clone(),
                    tests,
                })
            })
            .collect()
    }

    pub fn category_of(&self, test: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.tests.iter().any(|item| item == test))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub store: CatalogStore,
    pub index: CategoryIndex,
}

impl Catalog {
    pub fn new(labs: Vec<Lab>, categories: Vec<Category>) -> Result<Self, CatalogError> {
        validate_labs(&labs)?;
        for (index, category) in categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                return Err(CatalogError::EmptyCategoryName { index });
            }
        }

        Ok(Self {
            store: CatalogStore { labs },
            index: CategoryIndex { categories },
        })
    }

    pub fn from_spec(spec: CatalogSpec) -> Result<Self, CatalogError> {
        let labs = spec
            .labs
            .into_iter()
            .map(|lab| Lab {
                id: LabId::new(lab.id.trim()),
                name: lab.name,
                address: lab.address,
                position: lab.position,
                certified: lab.certified,
                offerings: lab.tests,
            })
            .collect();
        Self::new(labs, spec.categories)
    }

    /// Tests that appear in a category but that no lab offers.
    pub fn unoffered_tests(&self) -> Vec<&str> {
        let offered = self.store.offered_tests();
        let mut seen = BTreeSet::new();
        self.index
            .list_categories()
            .iter()
            .flat_map(|category| category.tests.iter().map(String::as_str))
            .filter(|test| !offered.contains(test) && seen.insert(*test))
            .collect()
    }
}

fn validate_labs(labs: &[Lab]) -> Result<(), CatalogError> {
    if labs.is_empty() {
        return Err(CatalogError::NoLabs);
    }

    let mut ids = BTreeSet::new();
    for (index, lab) in labs.iter().enumerate() {
        let id = lab.id.as_str();
        if id.trim().is_empty() {
            return Err(CatalogError::EmptyLabId { index });
        }
        if !ids.insert(id) {
            return Err(CatalogError::DuplicateLab { id: id.to_owned() });
        }
        if lab.name.trim().is_empty() {
            return Err(CatalogError::EmptyLabName { id: id.to_owned() });
        }
        if !lab.position.in_bounds() {
            return Err(CatalogError::PositionOutOfBounds {
                id: id.to_owned(),
                x: lab.position.x,
                y: lab.position.y,
            });
        }
    }
    Ok(())
}

/// On-disk catalog layout; see `testify --print-example-config` for where it
/// is referenced from.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSpec {
    pub labs: Vec<LabSpec>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub position: MapPosition,
    #[serde(default)]
    pub certified: bool,
    #[serde(default)]
    pub tests: BTreeMap<String, TestOffering>,
}

#[cfg(test)]
mod tests {
    use super::{Catalog, CatalogError, CategoryIndex};
    use crate::{Category, Lab, LabId, MapPosition, TestOffering};
    use std::collections::BTreeMap;

    fn lab(id: &str, tests: &[(&str, &str)]) -> Lab {
        Lab {
            id: LabId::from(id),
            name: format!("{id} lab"),
            address: String::new(),
            position: MapPosition::new(50, 50),
            certified: false,
            offerings: tests
                .iter()
                .map(|(name, price)| {
                    (
                        (*name).to_owned(),
                        TestOffering::new(*price, "10 mg", "2 days"),
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn category(name: &str, tests: &[&str]) -> Category {
        Category {
            name: name.to_owned(),
            tests: tests.iter().map(|test| (*test).to_owned()).collect(),
        }
    }

    #[test]
    fn first_offering_prefers_definition_order_over_price() -> Result<(), CatalogError> {
        let catalog = Catalog::new(
            vec![
                lab("a", &[("XRD", "₹900/sample")]),
                lab("b", &[("XRD", "₹100/sample"), ("TGA", "₹50/sample")]),
            ],
            Vec::new(),
        )?;

        let (owner, offering) = catalog
            .store
            .first_lab_offering("XRD")
            .expect("XRD offered");
        assert_eq!(owner.id.as_str(), "a");
        assert_eq!(offering.price, "₹900/sample");
        assert_eq!(
            catalog.store.first_offering_for("TGA").map(|o| o.price.as_str()),
            Some("₹50/sample")
        );
        assert!(catalog.store.first_offering_for("NMR").is_none());
        Ok(())
    }

    #[test]
    fn get_offering_is_soft_for_unknown_ids() -> Result<(), CatalogError> {
        let catalog = Catalog::new(vec![lab("a", &[("XRD", "₹1/sample")])], Vec::new())?;
        assert!(catalog.store.get_offering(&LabId::from("zzz"), "XRD").is_none());
        assert!(catalog.store.get_offering(&LabId::from("a"), "").is_none());
        assert!(catalog.store.get_offering(&LabId::from("a"), "XRD").is_some());
        Ok(())
    }

    #[test]
    fn search_keeps_whole_category_on_category_name_match() {
        let index = CategoryIndex {
            categories: vec![
                category("Thermal Analysis", &["DSC", "TGA"]),
                category("Spectroscopy", &["FTIR", "Thermal imaging"]),
            ],
        };

        let found = index.search("THERMAL");
        assert_eq!(
            found,
            vec![
                category("Thermal Analysis", &["DSC", "TGA"]),
                category("Spectroscopy", &["Thermal imaging"]),
            ]
        );
    }

    #[test]
    fn search_drops_empty_categories_and_ignores_blank_query() {
        let index = CategoryIndex {
            categories: vec![category("A", &["FTIR"]), category("B", &["NMR"])],
        };
        assert_eq!(index.search("nmr"), vec![category("B", &["NMR"])]);
        assert_eq!(index.search("   "), index.list_categories().to_vec());
        assert!(index.search("nothing-matches").is_empty());
    }

    #[test]
    fn new_rejects_duplicate_and_out_of_bounds_labs() {
        let error = Catalog::new(vec![lab("a", &[]), lab("a", &[])], Vec::new())
            .expect_err("duplicate ids should fail");
        assert_eq!(error, CatalogError::DuplicateLab { id: "a".to_owned() });

        let mut far = lab("far", &[]);
        far.position = MapPosition::new(120, 4);
        let error = Catalog::new(vec![far], Vec::new()).expect_err("position should fail");
        assert!(error.to_string().contains("outside 0..=100"));

        assert_eq!(
            Catalog::new(Vec::new(), Vec::new()).expect_err("empty catalog"),
            CatalogError::NoLabs
        );
    }

    #[test]
    fn unoffered_tests_are_reported_once() -> Result<(), CatalogError> {
        let catalog = Catalog::new(
            vec![lab("a", &[("FTIR", "₹1/sample")])],
            vec![
                category("A", &["FTIR", "Ghost"]),
                category("B", &["Ghost"]),
            ],
        )?;
        assert_eq!(catalog.unoffered_tests(), vec!["Ghost"]);
        Ok(())
    }
}
