//! TraceVeil Scan Engine
//!
//! This crate locates and masks regulated identifiers in raw text:
//! - Preset resolution from header probes
//! - Priority-ordered scanning with exception filtering and overlap
//!   resolution
//! - Masked-value computation (replace, redact, hash)
//! - Atomic span substitution

pub mod masker;
pub mod resolver;
pub mod scanner;
pub mod substitute;

pub use masker::{Masker, REDACTION_MARKER};
pub use resolver::{head_lines, resolve_preset};
pub use scanner::{Candidate, scan};
pub use substitute::{Replacement, apply_replacements};
