//! Rule registry
//!
//! Holds validated, compiled rules. Compilation happens here, at
//! registration time; the scan engine only ever sees rules whose patterns
//! are known to be executable.

use crate::category::Category;
use crate::error::{Error, Result};
use crate::rule::{Rule, RuleSpec};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of compiled rules, keyed by rule id
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<Rule>>,
    // Registration order, for stable listing
    order: Vec<String>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a rule spec without registering it
    pub fn validate(spec: RuleSpec) -> Result<Rule> {
        Rule::compile(spec)
    }

    /// Validate and register a rule; duplicate ids are rejected
    pub fn register(&mut self, spec: RuleSpec) -> Result<Arc<Rule>> {
        if self.rules.contains_key(&spec.id) {
            return Err(Error::Config(format!("duplicate rule id: {}", spec.id)));
        }

        let rule = Arc::new(Rule::compile(spec)?);
        self.order.push(rule.id.clone());
        self.rules.insert(rule.id.clone(), Arc::clone(&rule));
        Ok(rule)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Rule>> {
        self.rules.get(id).cloned()
    }

    /// List registered rules, optionally filtered by category, in
    /// registration order
    pub fn list(&self, category: Option<&Category>) -> Vec<Arc<Rule>> {
        self.order
            .iter()
            .filter_map(|id| self.rules.get(id))
            .filter(|rule| category.is_none_or(|c| &rule.category == c))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
