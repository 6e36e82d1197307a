//! Orchestrator guarantees exercised through the public API.

use stylepatch::core::context::FileSet;
use stylepatch::core::provider::CannedProvider;
use stylepatch::core::synth::PatchSynthesizer;
use stylepatch::ingest::tickets::Ticket;

fn synth() -> PatchSynthesizer {
    PatchSynthesizer::new(Box::new(CannedProvider), 80, 20)
}

fn ticket(key: &str) -> Ticket {
    Ticket {
        key: key.to_string(),
        summary: "Fix it".to_string(),
        description: String::new(),
    }
}

#[test]
fn empty_fileset_and_default_ticket_still_produce_a_diff() {
    let diff = synth()
        .synthesize(&Ticket::default(), &FileSet::new(), 0.4)
        .expect("synthesize");

    assert!(!diff.is_empty());
    assert!(diff.starts_with("--- a/"));
}

#[test]
fn wb1_low_mimicness_targets_the_pager() {
    let diff = synth()
        .synthesize(&ticket("WB-1"), &FileSet::new(), 0.4)
        .expect("synthesize");

    assert!(diff.starts_with("--- a/src/pager.py"));
    assert!(diff.contains("+++ b/src/pager.py"));
}

#[test]
fn wb2_buckets_differ_in_logging_style() {
    let mut files = FileSet::new();
    files.insert(
        "src/exporter.py".to_string(),
        "class Exporter:\n    def run(self, items): ...\n".to_string(),
    );

    let s = synth();
    let high = s.synthesize(&ticket("WB-2"), &files, 0.8).expect("synthesize");
    let low = s.synthesize(&ticket("WB-2"), &files, 0.4).expect("synthesize");

    assert!(high.contains("src/exporter.py"));
    assert!(high.contains('+'));
    assert_ne!(high, low);
}

#[test]
fn synthesis_is_deterministic_for_identical_inputs() {
    let s = synth();
    let t = ticket("WB-1");

    let a = s.synthesize(&t, &FileSet::new(), 0.7).expect("synthesize");
    let b = s.synthesize(&t, &FileSet::new(), 0.7).expect("synthesize");

    assert_eq!(a, b);
}

#[test]
fn profiled_tokens_flow_into_the_request_without_changing_guarantees() {
    let s = synth().with_style_tokens(vec![
        "avg_func_len=7.0".to_string(),
        "camel_ratio=0.25".to_string(),
        "docstring_ratio=0.75".to_string(),
        "log_usage=1.20".to_string(),
    ]);

    let diff = s
        .synthesize(&ticket("WB-1"), &FileSet::new(), 0.9)
        .expect("synthesize");

    assert!(diff.starts_with("--- a/"));
}
