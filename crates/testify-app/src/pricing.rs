// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{CatalogStore, Category, Lab, LabId, MapPosition, SelectionState, TestOffering};

pub const PRICE_PLACEHOLDER: &str = "Select lab for price";
pub const SELECT_TEST_FIRST: &str = "Select test first";
/// Price slot of a lab card whose lab lacks the selected test. The web
/// booking page shows the same prompt there, next to "Not available".
pub const NOT_OFFERED_PRICE: &str = SELECT_TEST_FIRST;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability<'a> {
    SelectTestFirst,
    Available(&'a TestOffering),
    NotAvailable,
}

impl<'a> Availability<'a> {
    pub fn for_lab(lab: &'a Lab, selection: &SelectionState) -> Self {
        match selection.test() {
            None => Self::SelectTestFirst,
            Some(test) => lab
                .offering(test)
                .map_or(Self::NotAvailable, Self::Available),
        }
    }

    pub fn price(self) -> &'a str {
        match self {
            Self::SelectTestFirst => SELECT_TEST_FIRST,
            Self::NotAvailable => NOT_OFFERED_PRICE,
            Self::Available(offering) => &offering.price,
        }
    }

    pub fn status_label(self) -> &'static str {
        match self {
            Self::SelectTestFirst => "",
            Self::Available(_) => "Available",
            Self::NotAvailable => "Not available",
        }
    }
}

/// What the current selection resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Idle,
    Browsing {
        test: &'a str,
        representative: Option<&'a TestOffering>,
        labs: Vec<(&'a Lab, Availability<'a>)>,
    },
    Resolved {
        lab: &'a Lab,
        test: &'a str,
        offering: &'a TestOffering,
    },
    /// The pair has no offering. Callers must not fill summary fields from
    /// an earlier resolution.
    Unavailable { test: &'a str, lab: &'a LabId },
}

pub fn resolve<'a>(store: &'a CatalogStore, selection: &'a SelectionState) -> Resolution<'a> {
    let Some(test) = selection.test() else {
        return Resolution::Idle;
    };

    match selection.lab() {
        None => Resolution::Browsing {
            test,
            representative: store.first_offering_for(test),
            labs: store
                .list_labs()
                .iter()
                .map(|lab| (lab, Availability::for_lab(lab, selection)))
                .collect(),
        },
        Some(lab_id) => match store.lab(lab_id) {
            Some(lab) => match lab.offering(test) {
                Some(offering) => Resolution::Resolved {
                    lab,
                    test,
                    offering,
                },
                None => Resolution::Unavailable { test, lab: lab_id },
            },
            None => Resolution::Unavailable { test, lab: lab_id },
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestTile<'a> {
    pub name: &'a str,
    pub category: &'a str,
    pub offering: Option<&'a TestOffering>,
}

impl<'a> TestTile<'a> {
    pub fn price(&self) -> &'a str {
        self.offering
            .map_or(PRICE_PLACEHOLDER, |offering| offering.price.as_str())
    }

    pub fn quantity(&self) -> &'a str {
        self.offering
            .map_or("", |offering| offering.quantity.as_str())
    }

    pub fn turnaround(&self) -> &'a str {
        self.offering
            .map_or("", |offering| offering.turnaround.as_str())
    }
}

pub fn catalog_tiles<'a>(categories: &'a [Category], store: &'a CatalogStore) -> Vec<TestTile<'a>> {
    categories
        .iter()
        .flat_map(|category| {
            category.tests.iter().map(|test| TestTile {
                name: test,
                category: &category.name,
                offering: store.first_offering_for(test),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabCard<'a> {
    pub lab: &'a Lab,
    pub selected: bool,
    pub availability: Availability<'a>,
}

pub fn lab_cards<'a>(
    store: &'a CatalogStore,
    selection: &SelectionState,
    filter: &str,
) -> Vec<LabCard<'a>> {
    store
        .filter_labs(filter)
        .into_iter()
        .map(|lab| LabCard {
            lab,
            selected: selection.lab() == Some(&lab.id),
            availability: Availability::for_lab(lab, selection),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapPin<'a> {
    pub lab_id: &'a LabId,
    pub name: &'a str,
    pub position: MapPosition,
    pub certified: bool,
    pub selected: bool,
}

pub fn map_pins<'a>(
    store: &'a CatalogStore,
    selection: &SelectionState,
    filter: &str,
) -> Vec<MapPin<'a>> {
    store
        .filter_labs(filter)
        .into_iter()
        .map(|lab| MapPin {
            lab_id: &lab.id,
            name: &lab.name,
            position: lab.position,
            certified: lab.certified,
            selected: selection.lab() == Some(&lab.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        Availability, NOT_OFFERED_PRICE, PRICE_PLACEHOLDER, Resolution, SELECT_TEST_FIRST,
        catalog_tiles, lab_cards, resolve,
    };
    use crate::{Catalog, Category, Lab, LabId, MapPosition, SelectionState, TestOffering};
    use std::collections::BTreeMap;

    fn catalog() -> Catalog {
        let lab = |id: &str, rows: &[(&str, &str)]| Lab {
            id: LabId::from(id),
            name: format!("{id} institute"),
            address: format!("{id} road"),
            position: MapPosition::new(20, 30),
            certified: id == "a",
            offerings: rows
                .iter()
                .map(|(test, price)| ((*test).to_owned(), TestOffering::new(*price, "1 g", "8 days")))
                .collect::<BTreeMap<_, _>>(),
        };
        Catalog::new(
            vec![
                lab("a", &[("XRD", "₹2000/sample")]),
                lab("b", &[("XRD", "₹1200/sample"), ("XRF", "₹2500/sample")]),
            ],
            vec![Category {
                name: "Diffraction".to_owned(),
                tests: vec!["XRD".to_owned(), "XRF".to_owned(), "Ghost".to_owned()],
            }],
        )
        .expect("valid catalog")
    }

    #[test]
    fn idle_without_test() {
        let catalog = catalog();
        let selection = SelectionState::new();
        assert_eq!(resolve(&catalog.store, &selection), Resolution::Idle);
    }

    #[test]
    fn browsing_lists_per_lab_availability() {
        let catalog = catalog();
        let mut selection = SelectionState::new();
        selection.choose_test("XRF");

        let Resolution::Browsing {
            representative,
            labs,
            ..
        } = resolve(&catalog.store, &selection)
        else {
            panic!("expected browsing resolution");
        };
        assert_eq!(representative.map(|o| o.price.as_str()), Some("₹2500/sample"));
        let statuses = labs
            .iter()
            .map(|(lab, availability)| (lab.id.as_str(), availability.status_label()))
            .collect::<Vec<_>>();
        assert_eq!(statuses, vec![("a", "Not available"), ("b", "Available")]);
    }

    #[test]
    fn card_price_text_per_availability() {
        let catalog = catalog();
        let a = catalog.store.lab(&LabId::from("a")).expect("lab a");
        let mut selection = SelectionState::new();
        assert_eq!(Availability::for_lab(a, &selection).price(), SELECT_TEST_FIRST);

        selection.choose_test("XRF");
        let missing = Availability::for_lab(a, &selection);
        assert_eq!(missing, Availability::NotAvailable);
        assert_eq!(missing.price(), NOT_OFFERED_PRICE);

        selection.choose_test("XRD");
        assert_eq!(Availability::for_lab(a, &selection).price(), "₹2000/sample");
    }

    #[test]
    fn resolved_and_unavailable_pairs() {
        let catalog = catalog();
        let mut selection = SelectionState::new();
        selection.choose_test("XRD");
        let b = catalog.store.lab(&LabId::from("b")).expect("lab b");
        selection.choose_lab(b).expect("b offers XRD");

        match resolve(&catalog.store, &selection) {
            Resolution::Resolved { offering, .. } => assert_eq!(offering.price, "₹1200/sample"),
            other => panic!("unexpected resolution {other:?}"),
        }

        selection.choose_test("Ghost");
        assert_eq!(
            resolve(&catalog.store, &selection),
            Resolution::Unavailable {
                test: "Ghost",
                lab: &LabId::from("b"),
            }
        );
    }

    #[test]
    fn tiles_use_first_lab_price_or_placeholder() {
        let catalog = catalog();
        let tiles = catalog_tiles(catalog.index.list_categories(), &catalog.store);
        let summary = tiles
            .iter()
            .map(|tile| (tile.name, tile.price(), tile.quantity()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("XRD", "₹2000/sample", "1 g"),
                ("XRF", "₹2500/sample", "1 g"),
                ("Ghost", PRICE_PLACEHOLDER, ""),
            ]
        );
        assert!(tiles.iter().all(|tile| tile.category == "Diffraction"));
    }

    #[test]
    fn lab_cards_show_placeholder_until_test_is_chosen() {
        let catalog = catalog();
        let mut selection = SelectionState::new();
        let cards = lab_cards(&catalog.store, &selection, "");
        assert!(
            cards
                .iter()
                .all(|card| card.availability == Availability::SelectTestFirst)
        );
        assert_eq!(cards[0].availability.price(), "Select test first");

        selection.choose_test("XRD");
        let b = catalog.store.lab(&LabId::from("b")).expect("lab b");
        selection.choose_lab(b).expect("b offers XRD");
        let cards = lab_cards(&catalog.store, &selection, "B ROAD");
        assert_eq!(cards.len(), 1);
        assert!(cards[0].selected);
        assert_eq!(cards[0].availability.price(), "₹1200/sample");
    }
}
