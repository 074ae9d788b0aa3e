// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use testify_app::{
    Catalog, Category, ContactPreference, Lab, LabId, MapPosition, POSITION_MAX,
    RequirementsFormInput, SafetyFlags, StorageCondition, TestOffering, Urgency,
};
use time::OffsetDateTime;
use time::macros::datetime;

const TEST_NAMES: [&str; 14] = [
    "XRD",
    "XRF",
    "XPS",
    "FTIR",
    "Raman",
    "TGA",
    "DSC",
    "SEM",
    "TEM",
    "AFM",
    "BET",
    "NMR (400 MHz)",
    "ICP-MS",
    "UV-Vis",
];

const CATEGORY_NAMES: [&str; 4] = ["Diffraction", "Spectroscopy", "Microscopy", "Thermal"];

const LAB_PREFIXES: [&str; 8] = [
    "Central", "Regional", "National", "Applied", "Coastal", "Deccan", "Western", "Northern",
];
const LAB_KINDS: [&str; 5] = [
    "Materials Lab",
    "Analytical Centre",
    "Research Institute",
    "Instrumentation Facility",
    "Characterisation Hub",
];
const CITIES: [&str; 8] = [
    "Pune",
    "Mumbai",
    "Bengaluru",
    "Chennai",
    "Hyderabad",
    "Kolkata",
    "Delhi",
    "Ahmedabad",
];
const QUANTITIES: [&str; 6] = ["5 mg", "10 mg", "20 mg", "50 mg", "100 mg", "1 g"];

const SAMPLE_CATALOG_TOML: &str = r#"
[[labs]]
id = "north"
name = "Northern Analytical Centre"
address = "Ring Road, Delhi"
position = { x = 30, y = 20 }
certified = true

[labs.tests."XRD"]
price = "₹1500/sample"
quantity = "50 mg"
turnaround = "5 days"

[labs.tests."FTIR"]
price = "₹800/sample"
quantity = "10 mg"
turnaround = "2 days"

[[labs]]
id = "south"
name = "Southern Materials Lab"
address = "Harbour Road, Chennai"
position = { x = 60, y = 85 }

[labs.tests."XRD"]
price = "₹1200/sample"
quantity = "100 mg"
turnaround = "7 days"

[labs.tests."TEM"]
price = "₹9000/sample"
quantity = "5 mg"
turnaround = "14 days"

[[categories]]
name = "Diffraction"
tests = ["XRD"]

[[categories]]
name = "Spectroscopy"
tests = ["FTIR"]

[[categories]]
name = "Microscopy"
tests = ["TEM", "AFM"]
"#;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of labs and categories for property-style tests.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn offering(&mut self) -> TestOffering {
        let price = 500 + 250 * self.rng.int_n(60);
        let days = 1 + self.rng.int_n(21);
        TestOffering::new(
            format!("₹{price}/sample"),
            *self.pick(&QUANTITIES),
            format!("{days} days"),
        )
    }

    /// A lab offering a random, possibly empty, subset of the known tests.
    pub fn lab(&mut self, index: usize) -> Lab {
        let prefix = *self.pick(&LAB_PREFIXES);
        let kind = *self.pick(&LAB_KINDS);
        let city = *self.pick(&CITIES);
        let position = MapPosition::new(self.coordinate(), self.coordinate());

        let mut offerings = BTreeMap::new();
        for test in TEST_NAMES {
            if self.rng.bool() {
                offerings.insert(test.to_owned(), self.offering());
            }
        }

        Lab {
            id: LabId::new(format!("lab-{index}")),
            name: format!("{prefix} {kind}, {city}"),
            address: format!("{} Road, {city}", 1 + self.rng.int_n(200)),
            position,
            certified: self.rng.bool(),
            offerings,
        }
    }

    /// Every known test lands in exactly one category. Some of them may be
    /// offered by no lab at all.
    pub fn categories(&mut self) -> Vec<Category> {
        let mut categories = CATEGORY_NAMES
            .iter()
            .map(|name| Category {
                name: (*name).to_owned(),
                tests: Vec::new(),
            })
            .collect::<Vec<_>>();
        for test in TEST_NAMES {
            let slot = self.rng.int_n(categories.len());
            categories[slot].tests.push(test.to_owned());
        }
        categories.retain(|category| !category.tests.is_empty());
        categories
    }

    pub fn catalog(&mut self, lab_count: usize) -> Result<Catalog> {
        let labs = (0..lab_count.max(1)).map(|index| self.lab(index)).collect();
        let categories = self.categories();
        Catalog::new(labs, categories).context("build generated catalog")
    }

    /// A query that hits some names and misses others.
    pub fn query(&mut self) -> String {
        let source = *self.pick(&TEST_NAMES);
        let len = 1 + self.rng.int_n(source.len());
        let start = self.rng.int_n(source.len() - len + 1);
        let fragment = &source[start..start + len];
        if self.rng.bool() {
            fragment.to_lowercase()
        } else {
            fragment.to_owned()
        }
    }

    fn coordinate(&mut self) -> u8 {
        self.rng.int_n(usize::from(POSITION_MAX) + 1) as u8
    }

    fn pick<'a, T>(&mut self, values: &'a [T]) -> &'a T {
        &values[self.rng.int_n(values.len())]
    }
}

pub fn test_names() -> &'static [&'static str] {
    &TEST_NAMES
}

pub fn sample_catalog_toml() -> &'static str {
    SAMPLE_CATALOG_TOML
}

pub fn temp_catalog_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("catalog.toml");
    Ok((dir, path))
}

pub fn write_sample_catalog() -> Result<(tempfile::TempDir, PathBuf)> {
    let (dir, path) = temp_catalog_path()?;
    std::fs::write(&path, SAMPLE_CATALOG_TOML)
        .with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}

pub fn sample_requirements() -> RequirementsFormInput {
    RequirementsFormInput {
        description: "Thin polymer film on glass".to_owned(),
        quantity: "20 mg".to_owned(),
        storage: StorageCondition::Refrigerated,
        urgency: Urgency::Priority,
        special_instructions: "Keep away from light.".to_owned(),
        safety: SafetyFlags {
            flammable: true,
            ..SafetyFlags::default()
        },
        expected_results: "Carbonyl stretch near 1715 cm⁻¹".to_owned(),
        contact: ContactPreference::Phone,
    }
}

pub fn fixture_now() -> OffsetDateTime {
    datetime!(2026-02-19 12:34:56.789 UTC)
}

#[cfg(test)]
mod tests {
    use super::{
        CatalogFaker, fixture_now, sample_catalog_toml, sample_requirements, test_names,
        write_sample_catalog,
    };
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_catalog() -> anyhow::Result<()> {
        let left = CatalogFaker::new(42).catalog(4)?;
        let right = CatalogFaker::new(42).catalog(4)?;
        assert_eq!(left, right);
        Ok(())
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(CatalogFaker::new(0).seed(), 1);
    }

    #[test]
    fn generated_labs_stay_on_the_map() {
        for seed in 0_u64..50 {
            let mut faker = CatalogFaker::new(seed);
            let lab = faker.lab(0);
            assert!(lab.position.in_bounds(), "seed {seed}");
            assert!(lab.name.ends_with(lab.address.rsplit(", ").next().unwrap_or("")));
        }
    }

    #[test]
    fn categories_cover_every_test_once() {
        let mut faker = CatalogFaker::new(7);
        let categories = faker.categories();
        let tests = categories
            .iter()
            .flat_map(|category| category.tests.iter().map(String::as_str))
            .collect::<Vec<_>>();
        assert_eq!(tests.len(), test_names().len());
        assert_eq!(
            tests.iter().copied().collect::<BTreeSet<_>>(),
            test_names().iter().copied().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn queries_are_fragments_of_known_tests() {
        let mut faker = CatalogFaker::new(9);
        for _ in 0..20 {
            let query = faker.query().to_lowercase();
            assert!(
                test_names()
                    .iter()
                    .any(|name| name.to_lowercase().contains(&query)),
                "query {query}"
            );
        }
    }

    #[test]
    fn sample_catalog_is_written() -> anyhow::Result<()> {
        let (_dir, path) = write_sample_catalog()?;
        assert_eq!(std::fs::read_to_string(path)?, sample_catalog_toml());
        Ok(())
    }

    #[test]
    fn sample_requirements_validate() {
        assert!(sample_requirements().validate().is_ok());
        assert_eq!(fixture_now().year(), 2026);
    }
}
