//! Full-flow masking tests over the in-memory store

mod common;

use common::TestEnv;
use std::sync::Arc;

use traceveil_core::Category;
use traceveil_pipeline::{CancelToken, FileJob, FileState};
use traceveil_store::{MappingFilter, MappingStore, MemoryMappingStore, SortKey};

#[tokio::test]
async fn test_sip_scenario_two_mappings() {
    let env = TestEnv::new();
    let store = Arc::new(MemoryMappingStore::new());
    let pipeline = env.pipeline(Arc::clone(&store) as Arc<dyn MappingStore>);

    let input = env.write_input(
        "call.log",
        "INVITE sip:+44123456789@domain.com SIP/2.0\n",
    );
    let report = pipeline
        .run_file(&FileJob::from_path(input, "pbx"), &CancelToken::new())
        .await;

    assert_eq!(report.state, FileState::Completed);
    assert_eq!(report.preset_id.as_deref(), Some("sip"));
    assert_eq!(report.candidate_count, 2);

    let output = env.read_output("call.log");
    assert!(!output.contains("+44123456789"));
    assert!(!output.contains("domain.com"));
    assert!(output.contains("[PHONE_NUM:"));
    assert!(output.contains("[DOMAIN:"));

    // The mapping store contains exactly the two new rows
    assert_eq!(store.count().await.unwrap(), 2);
    let phone = store
        .get(&Category::phone_num(), "+44123456789")
        .await
        .unwrap()
        .unwrap();
    assert!(phone.masked_value.starts_with("[PHONE_NUM:"));
}

#[tokio::test]
async fn test_header_probes_select_preset() {
    let env = TestEnv::new();
    let store = Arc::new(MemoryMappingStore::new());
    let pipeline = env.pipeline(Arc::clone(&store) as Arc<dyn MappingStore>);

    // netlog header routes to the netlog preset, which masks MAC addresses
    let input = env.write_input(
        "net.log",
        "# netlog v1\nlease for 00:1B:44:11:3A:B7 renewed\n",
    );
    let report = pipeline
        .run_file(&FileJob::from_path(input, "pbx"), &CancelToken::new())
        .await;

    assert_eq!(report.preset_id.as_deref(), Some("netlog"));
    let output = env.read_output("net.log");
    assert!(!output.contains("00:1B:44:11:3A:B7"));
    assert!(output.contains("[MAC_ADDRESS:"));

    // Without the header the generic fallback applies and MACs pass through
    let input = env.write_input(
        "plain.log",
        "lease for 00:1B:44:11:3A:B7 renewed\n",
    );
    let report = pipeline
        .run_file(&FileJob::from_path(input, "pbx"), &CancelToken::new())
        .await;

    assert_eq!(report.preset_id.as_deref(), Some("generic"));
    let output = env.read_output("plain.log");
    assert!(output.contains("00:1B:44:11:3A:B7"));
}

#[tokio::test]
async fn test_rule_priority_on_email_like_token() {
    let env = TestEnv::new();
    let store = Arc::new(MemoryMappingStore::new());
    let pipeline = env.pipeline(Arc::clone(&store) as Arc<dyn MappingStore>);

    // In the netlog preset, bare-domain is listed before email-token, so
    // the domain match claims the overlapping span
    let input = env.write_input(
        "overlap.log",
        "# netlog v1\nmail from alice@internal.example.com\n",
    );
    pipeline
        .run_file(&FileJob::from_path(input, "pbx"), &CancelToken::new())
        .await;

    let output = env.read_output("overlap.log");
    assert!(output.contains("[DOMAIN:"));
    assert!(!output.contains("[REDACTED]"));
    assert!(output.contains("alice@"), "the local part is untouched");

    let mappings = store
        .search(&MappingFilter::builder().sort(SortKey::Category).build().unwrap())
        .await
        .unwrap();
    assert!(
        mappings
            .items
            .iter()
            .all(|m| m.category == Category::domain())
    );
}

#[tokio::test]
async fn test_directory_number_bounds_end_to_end() {
    let env = TestEnv::new();
    let store = Arc::new(MemoryMappingStore::new());
    let pipeline = env.pipeline(Arc::clone(&store) as Arc<dyn MappingStore>);

    let input = env.write_input(
        "dn.log",
        "setup [DN: 22334455] teardown [DN: 123456] done\n",
    );
    let report = pipeline
        .run_file(&FileJob::from_path(input, "pbx"), &CancelToken::new())
        .await;

    assert_eq!(report.candidate_count, 1);
    let output = env.read_output("dn.log");
    assert!(output.contains("[DN]"), "7+ digit number replaced");
    assert!(output.contains("123456"), "6 digit number untouched");
}

#[tokio::test]
async fn test_determinism_across_fresh_stores() {
    let env = TestEnv::new();
    let text = "INVITE sip:+44123456789@domain.com SIP/2.0\ncall to +49876543210@other.example.org\n";

    let mut outputs = Vec::new();
    for run in 0..2 {
        let store = Arc::new(MemoryMappingStore::new());
        let pipeline = env.pipeline(store as Arc<dyn MappingStore>);
        let input = env.write_input(&format!("run-{run}.log"), text);
        let report = pipeline
            .run_file(&FileJob::from_path(input, "pbx"), &CancelToken::new())
            .await;
        assert!(report.is_completed());
        outputs.push(env.read_output(&format!("run-{run}.log")));
    }

    // Hash masking is keyed by the catalog secret, so fresh stores still
    // produce identical output
    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_export_artifact_contents() {
    let env = TestEnv::new();
    let store = Arc::new(MemoryMappingStore::new());
    let pipeline = env.pipeline(store as Arc<dyn MappingStore>);

    let input = env.write_input(
        "trace.log",
        "INVITE sip:+44123456789@domain.com SIP/2.0\n",
    );
    let report = pipeline
        .run_file(&FileJob::from_path(input, "pbx"), &CancelToken::new())
        .await;

    let export_path = report.export_path.unwrap();
    let artifact = common::read_json(&export_path);

    assert_eq!(artifact["file_id"], "trace");
    assert_eq!(artifact["product_name"], "pbx");
    assert_eq!(artifact["total_mappings"], 2);
    assert!(artifact["export_timestamp"].is_string());

    let mappings = artifact["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 2);
    for mapping in mappings {
        assert!(mapping["id"].is_i64());
        assert!(mapping["original_value"].is_string());
        assert!(mapping["masked_value"].is_string());
        assert!(mapping["category"].is_string());
        assert!(mapping["created_at"].is_string());
    }
}
