//! End-to-end consolidation and snapshot-resume tests.

use newsgraph_core::kb::KbStore;
use newsgraph_core::resolve::{Consolidator, RelationshipUnifier};
use newsgraph_core::types::{EntityKind, MentionRecord, RelationshipCandidate, SourceContext};

fn mention(raw: &str, article: &str) -> MentionRecord {
    MentionRecord::new(
        raw,
        Some(EntityKind::Person),
        format!("{} did something notable.", raw),
        vec![0.5, 0.5],
        SourceContext::new(article, "block text").with_headline("Council votes"),
    )
}

#[test]
fn consolidation_survives_snapshot_resume() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kb.json");

    let consolidator = Consolidator::default();

    // First run: two articles' worth of mentions.
    let mut kb = KbStore::new();
    consolidator.consolidate(
        vec![
            mention("Jacob Frey", "article-1"),
            mention("Mayor Frey", "article-1"),
            mention("Tim Walz", "article-2"),
        ],
        &mut kb,
    );
    assert_eq!(kb.len(), 2);
    kb.save_json(&path).unwrap();

    // Second run resumes from the snapshot; a known alias merges instead
    // of minting a duplicate entity.
    let mut kb = KbStore::load_json(&path).unwrap();
    let out = consolidator.consolidate(vec![mention("Jacob Lawrence Frey", "article-3")], &mut kb);

    assert_eq!(kb.len(), 2);
    assert_eq!(out[0].canonical_name, "jacob frey");
    let entry = kb.get(out[0].kb_id).unwrap();
    assert!(entry.aliases.contains(&"mayor frey".to_string()));
    assert!(entry.aliases.contains(&"jacob lawrence frey".to_string()));
}

#[test]
fn snapshot_json_is_structurally_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kb.json");

    let consolidator = Consolidator::default();
    let mut kb = KbStore::new();
    consolidator.consolidate(
        vec![mention("Jacob Frey", "a1"), mention("Mayor Frey", "a1")],
        &mut kb,
    );
    kb.save_json(&path).unwrap();

    let first: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    // Load and immediately save again: same structure, same content.
    let kb = KbStore::load_json(&path).unwrap();
    kb.save_json(&path).unwrap();
    let second: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(first, second);

    // The external shape: id -> { canonical_name, aliases, embeddings }.
    let obj = first.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    for entry in obj.values() {
        assert!(entry.get("canonical_name").is_some());
        assert!(entry["aliases"].is_array());
        assert!(entry["embeddings"].is_array());
    }
}

#[test]
fn block_relationships_resolve_against_block_mentions() {
    let consolidator = Consolidator::default();
    let unifier = RelationshipUnifier::default();
    let mut kb = KbStore::new();

    let block = consolidator.consolidate(
        vec![
            mention("Mayor Jacob Frey", "article-1"),
            mention("Minneapolis City Council", "article-1"),
        ],
        &mut kb,
    );

    let record = unifier.resolve(
        RelationshipCandidate::new(
            "Jacob Frey",
            "OPPOSED",
            "City Council",
            "Frey opposed the council's amendment.",
        ),
        &block,
        SourceContext::new("article-1", "block text"),
    );

    assert_eq!(record.subject_kb_id, Some(block[0].kb_id));
    assert_eq!(record.object_kb_id, Some(block[1].kb_id));
    assert!(record.is_fully_resolved());
}
