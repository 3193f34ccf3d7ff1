//! Product presets
//!
//! A preset is an ordered, product-scoped set of rules plus header-matching
//! probes used to select itself for a given input. Rule order within a
//! preset is significant: list position is priority, and the first matching
//! rule for a span wins.

use crate::error::{Error, Result};
use crate::rule::{MaskAction, Rule};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One rule entry in a preset definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetRuleSpec {
    /// Id of a registered rule
    pub rule_id: String,

    /// Optional override of the rule's masking action for this preset
    #[serde(default)]
    pub action: Option<MaskAction>,
}

/// Uncompiled preset definition as it appears in a rule-set file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetSpec {
    /// Unique preset id
    pub id: String,

    /// Product this preset belongs to
    pub product_id: String,

    /// Human-readable name
    pub name: String,

    /// Ordered patterns checked against the first lines of the input
    #[serde(default)]
    pub header_match: Vec<String>,

    /// Ordered rule list; position is priority
    pub rules: Vec<PresetRuleSpec>,

    /// Whether this preset is the product's fallback
    #[serde(default)]
    pub default: bool,
}

/// A rule bound into a preset, with its effective action resolved
#[derive(Debug, Clone)]
pub struct PresetRule {
    pub rule: Arc<Rule>,
    action_override: Option<MaskAction>,
}

impl PresetRule {
    pub fn new(rule: Arc<Rule>, action_override: Option<MaskAction>) -> Self {
        Self {
            rule,
            action_override,
        }
    }

    /// The action used when masking values this entry locates
    pub fn effective_action(&self) -> &MaskAction {
        self.action_override.as_ref().unwrap_or(&self.rule.action)
    }
}

/// A compiled preset
#[derive(Debug, Clone)]
pub struct Preset {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub is_default: bool,
    header_probes: Vec<Regex>,
    rules: Vec<PresetRule>,
}

impl Preset {
    /// Compile a preset spec against already-registered rules
    pub fn compile(
        spec: PresetSpec,
        lookup_rule: impl Fn(&str) -> Option<Arc<Rule>>,
    ) -> Result<Self> {
        let mut header_probes = Vec::with_capacity(spec.header_match.len());
        for pattern in &spec.header_match {
            let probe = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
                rule: format!("preset '{}' header probe", spec.id),
                reason: e.to_string(),
            })?;
            header_probes.push(probe);
        }

        let mut rules = Vec::with_capacity(spec.rules.len());
        for entry in spec.rules {
            let rule = lookup_rule(&entry.rule_id).ok_or_else(|| Error::UnknownRule {
                preset: spec.id.clone(),
                rule_id: entry.rule_id.clone(),
            })?;
            rules.push(PresetRule::new(rule, entry.action));
        }

        Ok(Self {
            id: spec.id,
            product_id: spec.product_id,
            name: spec.name,
            is_default: spec.default,
            header_probes,
            rules,
        })
    }

    /// Whether any header probe matches any of the given head lines
    pub fn matches_header(&self, head_lines: &[&str]) -> bool {
        self.header_probes
            .iter()
            .any(|probe| head_lines.iter().any(|line| probe.is_match(line)))
    }

    /// Rules in priority order (list position is priority)
    pub fn rules(&self) -> &[PresetRule] {
        &self.rules
    }
}
