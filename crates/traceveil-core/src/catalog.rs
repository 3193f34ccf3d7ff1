//! Rule-set catalog
//!
//! A catalog bundles everything the engine needs for one deployment: the
//! rule registry, exception patterns, per-product presets, and scan options.
//! Catalogs are compiled once at load time and are read-only during
//! scanning.

use crate::error::{Error, Result};
use crate::preset::{Preset, PresetSpec};
use crate::registry::RuleRegistry;
use crate::rule::{ExceptionPattern, ExceptionSpec, RuleSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_header_lines() -> usize {
    8
}

fn default_hash_secret() -> String {
    // Pseudonymization key, not a confidentiality key. Deployments that need
    // unlinkable digests across installations must set their own secret.
    "traceveil-default-hash-key".to_string()
}

fn default_hash_len() -> usize {
    16
}

/// Tunable scan options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOptions {
    /// How many leading input lines header probes are checked against
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,

    /// Secret mixed into hash-action digests
    #[serde(default = "default_hash_secret")]
    pub hash_secret: String,

    /// Length of the base64 digest kept in hash-action masked values
    #[serde(default = "default_hash_len")]
    pub hash_len: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            header_lines: default_header_lines(),
            hash_secret: default_hash_secret(),
            hash_len: default_hash_len(),
        }
    }
}

/// Uncompiled catalog as it appears in a rule-set file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSpec {
    #[serde(default)]
    pub options: CatalogOptions,

    pub rules: Vec<RuleSpec>,

    #[serde(default)]
    pub exceptions: Vec<ExceptionSpec>,

    pub presets: Vec<PresetSpec>,
}

/// A compiled catalog
#[derive(Debug)]
pub struct Catalog {
    registry: RuleRegistry,
    exceptions: Vec<ExceptionPattern>,
    presets: Vec<Preset>,
    options: CatalogOptions,
}

impl Catalog {
    /// Compile and validate a whole catalog.
    ///
    /// Every failure mode is surfaced here, before any scanning: patterns
    /// that do not compile, duplicate rule ids, presets referencing unknown
    /// rules, and multiple default presets for one product.
    pub fn compile(spec: CatalogSpec) -> Result<Self> {
        let mut registry = RuleRegistry::new();
        for rule_spec in spec.rules {
            registry.register(rule_spec)?;
        }

        let mut exceptions = Vec::with_capacity(spec.exceptions.len());
        for exception_spec in spec.exceptions {
            exceptions.push(ExceptionPattern::compile(exception_spec)?);
        }

        let mut defaults_seen: HashSet<String> = HashSet::new();
        let mut presets = Vec::with_capacity(spec.presets.len());
        for preset_spec in spec.presets {
            if preset_spec.default && !defaults_seen.insert(preset_spec.product_id.clone()) {
                return Err(Error::Config(format!(
                    "product '{}' has more than one default preset",
                    preset_spec.product_id
                )));
            }
            presets.push(Preset::compile(preset_spec, |id| registry.get(id))?);
        }

        Ok(Self {
            registry,
            exceptions,
            presets,
            options: spec.options,
        })
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn exceptions(&self) -> &[ExceptionPattern] {
        &self.exceptions
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Presets belonging to a product, in declaration order
    pub fn presets_for_product<'s, 'p>(
        &'s self,
        product_id: &'p str,
    ) -> impl Iterator<Item = &'s Preset> {
        self.presets
            .iter()
            .filter(move |preset| preset.product_id == product_id)
    }

    /// The product's designated fallback preset, if any
    pub fn default_preset(&self, product_id: &str) -> Option<&Preset> {
        self.presets_for_product(product_id)
            .find(|preset| preset.is_default)
    }
}
