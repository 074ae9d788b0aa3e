// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use testify_app::{Catalog, CatalogSpec};
use tracing::{info, warn};

/// Reads a catalog TOML file (labs plus categories) and validates it.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read catalog file {}", path.display()))?;
    let spec: CatalogSpec = toml::from_str(&raw)
        .with_context(|| format!("parse catalog TOML {}", path.display()))?;
    let catalog = Catalog::from_spec(spec)
        .with_context(|| format!("invalid catalog {}", path.display()))?;

    info!(
        path = %path.display(),
        labs = catalog.store.list_labs().len(),
        categories = catalog.index.list_categories().len(),
        "catalog loaded"
    );
    for test in catalog.unoffered_tests() {
        warn!(test, "listed in a category but offered by no lab");
    }
    Ok(catalog)
}
