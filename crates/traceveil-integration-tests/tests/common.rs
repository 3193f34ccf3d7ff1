//! Shared helpers for integration tests

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use traceveil_core::Catalog;
use traceveil_observability::Metrics;
use traceveil_pipeline::{Pipeline, PipelineConfig};
use traceveil_store::MappingStore;

/// Rule set exercising every action kind, exceptions, and two presets with
/// header-based selection
pub const RULESET_YAML: &str = r#"
options:
  header_lines: 5
  hash_secret: integration-test-secret
  hash_len: 16

rules:
  - id: phone-sip
    name: SIP phone number
    category: phone_num
    pattern: '(\+[1-9]\d{2,14})@'
    action:
      type: hash
  - id: domain
    name: Domain after at-sign
    category: domain
    pattern: '@([a-z0-9-]+(?:\.[a-z0-9-]+)+)'
    action:
      type: hash
  - id: bare-domain
    name: Bare domain
    category: domain
    pattern: '\b([a-z0-9-]+(?:\.[a-z0-9-]+)+)\b'
    action:
      type: hash
  - id: email-token
    name: Email-like token
    category: username
    pattern: '(\w+@[\w.]+)'
    action:
      type: redact
  - id: dn
    name: Directory number
    category: phone_num
    pattern: '\[DN:\s*(\d{7,15})\]'
    action:
      type: replace
      literal: '[DN]'
  - id: mac
    name: MAC address
    category: mac_address
    pattern: '(?:^|[^0-9A-Fa-f:])((?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2})(?:[^0-9A-Fa-f:]|$)'
    action:
      type: hash

exceptions:
  - pattern: '^\d{4}\.\d{2}\.\d{2}$'
    scope: category
    category: phone_num
  - pattern: '^localhost$'
    scope: global

presets:
  - id: sip
    product_id: pbx
    name: SIP traces
    header_match:
      - '^INVITE sip:'
    rules:
      - rule_id: phone-sip
      - rule_id: domain
      - rule_id: dn
    default: false
  - id: netlog
    product_id: pbx
    name: Network logs
    header_match:
      - '^# netlog'
    rules:
      - rule_id: mac
      - rule_id: bare-domain
      - rule_id: email-token
    default: false
  - id: generic
    product_id: pbx
    name: Generic fallback
    header_match: []
    rules:
      - rule_id: domain
      - rule_id: dn
    default: true
"#;

pub struct TestEnv {
    pub work: TempDir,
    pub input_dir: PathBuf,
    pub out_dir: PathBuf,
    pub export_dir: PathBuf,
    pub rules_path: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let work = TempDir::new().unwrap();
        let input_dir = work.path().join("in");
        let out_dir = work.path().join("out");
        let export_dir = work.path().join("exports");
        std::fs::create_dir_all(&input_dir).unwrap();

        let rules_path = work.path().join("rules.yaml");
        std::fs::write(&rules_path, RULESET_YAML).unwrap();

        Self {
            work,
            input_dir,
            out_dir,
            export_dir,
            rules_path,
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::new(traceveil_config_file::load_catalog(&self.rules_path).unwrap())
    }

    pub fn pipeline(&self, store: Arc<dyn MappingStore>) -> Pipeline {
        Pipeline::new(
            self.catalog(),
            store,
            Metrics::new().unwrap(),
            PipelineConfig {
                workers: 4,
                out_dir: self.out_dir.clone(),
                export_dir: Some(self.export_dir.clone()),
            },
        )
    }

    pub fn write_input(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.input_dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn read_output(&self, name: &str) -> String {
        std::fs::read_to_string(self.out_dir.join(name)).unwrap()
    }

    pub fn db_path(&self) -> PathBuf {
        self.work.path().join("mappings.db")
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
