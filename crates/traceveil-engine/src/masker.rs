//! Masked-value computation
//!
//! The masker turns a new (category, original value) pair into its masked
//! replacement according to the rule's action. Replace and redact are
//! many-to-one; hash is a deterministic HMAC-SHA256 digest scoped by
//! category, so equal values in different categories get different digests.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use traceveil_core::{CatalogOptions, Category, MaskAction, MaskedValue};

type HmacSha256 = Hmac<Sha256>;

/// Fixed marker produced by the redact action
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Computes masked values for new mappings
#[derive(Debug, Clone)]
pub struct Masker {
    secret: Vec<u8>,
    digest_len: usize,
}

impl Masker {
    pub fn new(secret: impl Into<Vec<u8>>, digest_len: usize) -> Self {
        Self {
            secret: secret.into(),
            digest_len: digest_len.max(1),
        }
    }

    pub fn from_options(options: &CatalogOptions) -> Self {
        Self::new(options.hash_secret.as_bytes().to_vec(), options.hash_len)
    }

    /// Compute the masked value for a new (category, original) pair
    pub fn mask_value(
        &self,
        category: &Category,
        original: &str,
        action: &MaskAction,
    ) -> MaskedValue {
        match action {
            MaskAction::Replace { literal } => MaskedValue {
                value: literal.clone(),
                collision_checked: false,
            },
            MaskAction::Redact => MaskedValue {
                value: REDACTION_MARKER.to_string(),
                collision_checked: false,
            },
            MaskAction::Hash => MaskedValue {
                value: self.hash_token(category, original),
                collision_checked: true,
            },
        }
    }

    fn hash_token(&self, category: &Category, original: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(category.as_str().as_bytes());
        mac.update(b"\0");
        mac.update(original.as_bytes());
        let digest = mac.finalize();

        let encoded = base64::engine::general_purpose::STANDARD.encode(digest.into_bytes());
        let short = &encoded[..self.digest_len.min(encoded.len())];

        format!("[{}:{}]", category.as_str().to_uppercase(), short)
    }
}
