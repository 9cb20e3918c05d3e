//! Loading of shop catalogs from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use skirmish_system_shop::ShopCatalog;

/// Reads the catalog at `path`, or the standard catalog when no path is given.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<ShopCatalog> {
    let Some(path) = path else {
        return Ok(ShopCatalog::standard());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read shop catalog {}", path.display()))?;
    parse_catalog(&contents)
        .with_context(|| format!("failed to parse shop catalog {}", path.display()))
}

fn parse_catalog(contents: &str) -> Result<ShopCatalog> {
    let catalog: ShopCatalog = toml::from_str(contents)?;
    Ok(catalog)
}
