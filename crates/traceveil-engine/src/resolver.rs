//! Preset resolution
//!
//! Inputs do not name the preset that applies to them; the resolver infers
//! it from the first lines of the text. Presets are checked in declaration
//! order and the first one with a matching header probe wins, falling back
//! to the product's default preset.

use traceveil_core::{Catalog, Error, Preset, Result};

/// The first `n` lines of `text`, trailing carriage returns stripped
pub fn head_lines(text: &str, n: usize) -> Vec<&str> {
    text.lines().take(n).collect()
}

/// Resolve the preset that applies to `text` for the given product.
///
/// Returns `NoPresetResolved` when no header probe matches and the product
/// has no default preset.
pub fn resolve_preset<'a>(
    catalog: &'a Catalog,
    product_id: &str,
    text: &str,
) -> Result<&'a Preset> {
    let lines = head_lines(text, catalog.options().header_lines);

    for preset in catalog.presets_for_product(product_id) {
        if preset.matches_header(&lines) {
            tracing::debug!(preset = %preset.id, product = product_id, "preset resolved via header probe");
            return Ok(preset);
        }
    }

    match catalog.default_preset(product_id) {
        Some(preset) => {
            tracing::debug!(preset = %preset.id, product = product_id, "falling back to default preset");
            Ok(preset)
        }
        None => Err(Error::NoPresetResolved(product_id.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traceveil_core::{
        CatalogOptions, CatalogSpec, Category, MaskAction, PresetRuleSpec, PresetSpec, RuleSpec,
    };

    fn catalog_with_presets(presets: Vec<PresetSpec>) -> Catalog {
        Catalog::compile(CatalogSpec {
            options: CatalogOptions::default(),
            rules: vec![RuleSpec {
                id: "domain".to_string(),
                name: "Domain".to_string(),
                category: Category::domain(),
                pattern: r"\b([a-z0-9-]+\.[a-z]{2,})\b".to_string(),
                value_group: None,
                action: MaskAction::Hash,
            }],
            exceptions: vec![],
            presets,
        })
        .unwrap()
    }

    fn preset(id: &str, header_match: Vec<&str>, default: bool) -> PresetSpec {
        PresetSpec {
            id: id.to_string(),
            product_id: "pbx".to_string(),
            name: id.to_string(),
            header_match: header_match.into_iter().map(String::from).collect(),
            rules: vec![PresetRuleSpec {
                rule_id: "domain".to_string(),
                action: None,
            }],
            default,
        }
    }

    #[test]
    fn test_first_matching_preset_wins() {
        let catalog = catalog_with_presets(vec![
            preset("sip", vec![r"^INVITE sip:"], false),
            preset("syslog", vec![r"^<\d+>"], false),
            preset("generic", vec![], true),
        ]);

        let resolved = resolve_preset(&catalog, "pbx", "INVITE sip:bob@host SIP/2.0\n").unwrap();
        assert_eq!(resolved.id, "sip");

        let resolved = resolve_preset(&catalog, "pbx", "<34>Oct 11 22:14:15 host\n").unwrap();
        assert_eq!(resolved.id, "syslog");
    }

    #[test]
    fn test_probe_window_is_bounded() {
        let catalog = catalog_with_presets(vec![
            preset("sip", vec![r"^INVITE sip:"], false),
            preset("generic", vec![], true),
        ]);

        // The probe line sits beyond the default 8-line window
        let mut text = "noise\n".repeat(10);
        text.push_str("INVITE sip:bob@host SIP/2.0\n");

        let resolved = resolve_preset(&catalog, "pbx", &text).unwrap();
        assert_eq!(resolved.id, "generic");
    }

    #[test]
    fn test_fallback_to_default() {
        let catalog = catalog_with_presets(vec![
            preset("sip", vec![r"^INVITE sip:"], false),
            preset("generic", vec![], true),
        ]);

        let resolved = resolve_preset(&catalog, "pbx", "nothing matches here\n").unwrap();
        assert_eq!(resolved.id, "generic");
    }

    #[test]
    fn test_no_preset_resolved_error() {
        let catalog = catalog_with_presets(vec![preset("sip", vec![r"^INVITE sip:"], false)]);

        let err = resolve_preset(&catalog, "pbx", "nothing matches here\n").unwrap_err();
        assert!(matches!(err, Error::NoPresetResolved(_)));

        let err = resolve_preset(&catalog, "unknown-product", "anything").unwrap_err();
        assert!(matches!(err, Error::NoPresetResolved(_)));
    }

    #[test]
    fn test_head_lines() {
        assert_eq!(head_lines("a\nb\nc\n", 2), vec!["a", "b"]);
        assert_eq!(head_lines("a\r\nb", 5), vec!["a", "b"]);
        assert!(head_lines("", 5).is_empty());
    }
}
