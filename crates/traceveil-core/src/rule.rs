//! Pattern rules and masking actions
//!
//! Rules are defined as data records (typically loaded from a rule-set file)
//! and compiled into executable matchers exactly once, at registration time.
//! A pattern that fails to compile is rejected immediately and never reaches
//! the scan engine.

use crate::category::Category;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How the masker computes a masked value for a new original value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaskAction {
    /// Replace every instance in the category with the configured literal
    /// (many-to-one masking)
    Replace { literal: String },

    /// Replace with a fixed redaction marker
    Redact,

    /// Replace with a deterministic one-way digest scoped by category
    Hash,
}

/// Uncompiled rule definition as it appears in a rule-set file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Unique rule id
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Category assigned to values this rule locates
    pub category: Category,

    /// Regex pattern; capture group 1 (or `value_group`) carries the value
    pub pattern: String,

    /// Which capture group represents the maskable value.
    /// Defaults to group 1 when the pattern declares groups, else the whole
    /// match.
    #[serde(default)]
    pub value_group: Option<usize>,

    /// Masking action applied to values this rule locates
    pub action: MaskAction,
}

/// A compiled, validated rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub action: MaskAction,
    regex: Regex,
    value_group: usize,
}

/// One located value within the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMatch {
    /// Byte offset of the value's start
    pub start: usize,
    /// Byte offset one past the value's end
    pub end: usize,
    /// The matched value text
    pub value: String,
}

impl Rule {
    /// Compile a rule spec, rejecting invalid patterns synchronously
    pub fn compile(spec: RuleSpec) -> Result<Self> {
        let regex = Regex::new(&spec.pattern).map_err(|e| Error::InvalidPattern {
            rule: spec.id.clone(),
            reason: e.to_string(),
        })?;

        let group_count = regex.captures_len();
        let value_group = match spec.value_group {
            Some(group) => {
                if group >= group_count {
                    return Err(Error::InvalidPattern {
                        rule: spec.id,
                        reason: format!(
                            "value_group {} out of range (pattern has {} groups)",
                            group,
                            group_count - 1
                        ),
                    });
                }
                group
            }
            // captures_len counts group 0; >1 means at least one explicit group
            None if group_count > 1 => 1,
            None => 0,
        };

        Ok(Self {
            id: spec.id,
            name: spec.name,
            category: spec.category,
            action: spec.action,
            regex,
            value_group,
        })
    }

    /// Run the pattern over the full text and collect every value match.
    ///
    /// A match where the selected capture group did not participate is
    /// skipped for that match only.
    pub fn find_values(&self, text: &str) -> Vec<ValueMatch> {
        let mut matches = Vec::new();

        for captures in self.regex.captures_iter(text) {
            if let Some(group) = captures.get(self.value_group) {
                matches.push(ValueMatch {
                    start: group.start(),
                    end: group.end(),
                    value: group.as_str().to_string(),
                });
            }
        }

        matches
    }
}

/// Scope of an exception pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ExceptionScope {
    /// Applies to candidates of every category
    Global,
    /// Applies only to candidates of the given category
    Category { category: Category },
}

/// Uncompiled exception definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionSpec {
    pub pattern: String,
    #[serde(flatten)]
    pub scope: ExceptionScope,
}

/// A compiled exception pattern
///
/// Exceptions are tested against a candidate's value itself, not the whole
/// text; a matching exception suppresses masking of that candidate.
#[derive(Debug, Clone)]
pub struct ExceptionPattern {
    regex: Regex,
    scope: ExceptionScope,
}

impl ExceptionPattern {
    pub fn compile(spec: ExceptionSpec) -> Result<Self> {
        let regex = Regex::new(&spec.pattern).map_err(|e| Error::InvalidPattern {
            rule: format!("exception '{}'", spec.pattern),
            reason: e.to_string(),
        })?;

        Ok(Self {
            regex,
            scope: spec.scope,
        })
    }

    /// Whether this exception applies to candidates of `category`
    pub fn applies_to(&self, category: &Category) -> bool {
        match &self.scope {
            ExceptionScope::Global => true,
            ExceptionScope::Category { category: scoped } => scoped == category,
        }
    }

    /// Whether the candidate value is suppressed by this exception
    pub fn suppresses(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}
