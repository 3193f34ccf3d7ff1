//! Rule-set catalog file loading
//!
//! Rule sets (categories, rules, exceptions, presets) are data, not code:
//! they live in a YAML or TOML file and are validated and compiled wholly
//! at load time. Nothing invalid survives into scanning.

use std::path::PathBuf;
use tracing::{debug, error, info};

use traceveil_core::{Catalog, CatalogSpec, Error, Result};

/// Expand a leading tilde to the user's home directory
fn expand_tilde(path: PathBuf) -> Result<PathBuf> {
    if path.starts_with("~") {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(path.strip_prefix("~").unwrap()))
    } else {
        Ok(path)
    }
}

/// Read and parse a catalog spec from a YAML or TOML file.
///
/// The format is chosen by file extension; anything that is not `.toml`
/// is parsed as YAML.
pub fn load_catalog_spec(path: impl Into<PathBuf>) -> Result<CatalogSpec> {
    let path = expand_tilde(path.into())?;

    if !path.exists() {
        return Err(Error::ConfigNotFound);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        error!("Failed to read rule-set file: {}", e);
        Error::Io(e)
    })?;

    let spec: CatalogSpec = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::from_str(&contents).map_err(|e| {
            error!("Failed to parse TOML rule set: {}", e);
            Error::Config(format!("Invalid TOML: {}", e))
        })?
    } else {
        serde_yaml::from_str(&contents).map_err(|e| {
            error!("Failed to parse YAML rule set: {}", e);
            Error::Config(format!("Invalid YAML: {}", e))
        })?
    };

    debug!("Successfully read rule-set file {:?}", path);
    Ok(spec)
}

/// Load, validate, and compile a catalog from a rule-set file
pub fn load_catalog(path: impl Into<PathBuf>) -> Result<Catalog> {
    let spec = load_catalog_spec(path)?;
    let catalog = Catalog::compile(spec)?;

    info!(
        rules = catalog.registry().len(),
        exceptions = catalog.exceptions().len(),
        "rule-set catalog loaded"
    );
    Ok(catalog)
}
