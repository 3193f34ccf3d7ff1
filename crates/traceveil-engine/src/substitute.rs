//! Span substitution
//!
//! Replacements are computed from the full candidate list and applied in
//! one pass, so masked output is produced atomically: either every span is
//! substituted or none is.

/// One span replacement, produced by resolving a candidate through the
/// masking map
#[derive(Debug, Clone)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub masked: String,
}

/// Apply non-overlapping replacements, sorted by span start, to `text`.
pub fn apply_replacements(text: &str, replacements: &[Replacement]) -> String {
    if replacements.is_empty() {
        return text.to_string();
    }

    debug_assert!(
        replacements
            .windows(2)
            .all(|w| w[0].end <= w[1].start),
        "replacements must be sorted and non-overlapping"
    );

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for replacement in replacements {
        result.push_str(&text[last_end..replacement.start]);
        result.push_str(&replacement.masked);
        last_end = replacement.end;
    }

    result.push_str(&text[last_end..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_replacements_returns_input() {
        assert_eq!(apply_replacements("no pii here", &[]), "no pii here");
    }

    #[test]
    fn test_multiple_replacements() {
        let text = "sip:+44123456789@domain.com";
        let replacements = vec![
            Replacement {
                start: 4,
                end: 16,
                masked: "[PHONE]".to_string(),
            },
            Replacement {
                start: 17,
                end: 27,
                masked: "[DOMAIN:AbCd]".to_string(),
            },
        ];

        assert_eq!(
            apply_replacements(text, &replacements),
            "sip:[PHONE]@[DOMAIN:AbCd]"
        );
    }

    #[test]
    fn test_adjacent_spans() {
        let text = "abcdef";
        let replacements = vec![
            Replacement {
                start: 0,
                end: 3,
                masked: "X".to_string(),
            },
            Replacement {
                start: 3,
                end: 6,
                masked: "Y".to_string(),
            },
        ];

        assert_eq!(apply_replacements(text, &replacements), "XY");
    }

    #[test]
    fn test_replacement_at_end_of_text() {
        let text = "host example.com";
        let replacements = vec![Replacement {
            start: 5,
            end: 16,
            masked: "[REDACTED]".to_string(),
        }];

        assert_eq!(apply_replacements(text, &replacements), "host [REDACTED]");
    }
}
