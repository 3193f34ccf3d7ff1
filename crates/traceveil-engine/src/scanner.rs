//! Scan engine
//!
//! Applies a preset's rules, in priority order, across the input text.
//! Exception patterns are applied to candidate values first to suppress
//! false positives, then overlapping spans are resolved in favor of the
//! earlier rule. The result is deterministic for a given text and preset.

use traceveil_core::{Category, ExceptionPattern, MaskAction, Preset};

/// A located span proposed for masking, after exception filtering and
/// overlap resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Byte offset of the value's start
    pub start: usize,
    /// Byte offset one past the value's end
    pub end: usize,
    pub category: Category,
    /// The original value located in the text
    pub value: String,
    /// Id of the producing rule
    pub rule_id: String,
    /// Position of the producing rule in the preset (lower wins overlaps)
    pub priority: usize,
    /// Effective action for this candidate (preset override applied)
    pub action: MaskAction,
}

impl Candidate {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Scan `text` with the preset's rules and the catalog's exceptions.
///
/// Empty text yields no candidates. Survivors are sorted by span start.
pub fn scan(text: &str, preset: &Preset, exceptions: &[ExceptionPattern]) -> Vec<Candidate> {
    if text.is_empty() {
        return Vec::new();
    }

    // Accepted candidates, kept sorted by span start. Candidates are offered
    // in priority order, so the first to claim a span keeps it.
    let mut accepted: Vec<Candidate> = Vec::new();

    for (priority, entry) in preset.rules().iter().enumerate() {
        let rule = &entry.rule;

        'matches: for located in rule.find_values(text) {
            for exception in exceptions {
                if exception.applies_to(&rule.category) && exception.suppresses(&located.value) {
                    tracing::trace!(
                        rule = %rule.id,
                        value_len = located.value.len(),
                        "candidate suppressed by exception pattern"
                    );
                    continue 'matches;
                }
            }

            let insert_at = accepted.partition_point(|c| c.start < located.start);

            // Neighbors are enough: accepted spans never overlap each other
            let overlaps_prev = insert_at > 0
                && accepted[insert_at - 1].overlaps(located.start, located.end);
            let overlaps_next = insert_at < accepted.len()
                && accepted[insert_at].overlaps(located.start, located.end);
            if overlaps_prev || overlaps_next {
                continue;
            }

            accepted.insert(
                insert_at,
                Candidate {
                    start: located.start,
                    end: located.end,
                    category: rule.category.clone(),
                    value: located.value,
                    rule_id: rule.id.clone(),
                    priority,
                    action: entry.effective_action().clone(),
                },
            );
        }
    }

    accepted
}
