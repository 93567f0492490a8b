#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{contents, ids, three_paragraph_engine, two_paragraph_engine};
use pretty_assertions::assert_eq;
use redline_core::markup::{accept_all, reject_all, strip_tracked_markup, StripMode, StripOptions};
use redline_core::model::BlockKind;
use redline_core::{
    ChangeEngine, Element, ElementMetadata, InsertPosition, OperationData, OperationKind,
    RedlineError,
};

// ===== End-to-end scenarios =====

#[test]
fn test_edit_shows_replacement_and_clean_output() {
    // GIVEN two paragraphs
    let mut engine = two_paragraph_engine();

    // WHEN the first is rewritten
    engine.edit("p-1", "Modified first paragraph").unwrap();

    // THEN clean output holds the new text
    assert_eq!(
        engine.to_clean_markdown(),
        "Modified first paragraph\n\nSecond paragraph"
    );

    // AND the tracked view shows both sides
    let tracked = engine.element_content_with_tracked_changes("p-1").unwrap();
    assert!(tracked.contains("{--First paragraph--}"));
    assert!(tracked.contains("{++Modified first paragraph++}"));
}

#[test]
fn test_delete_then_insert_after() {
    let mut engine = two_paragraph_engine();

    engine.delete("p-2").unwrap();
    let new_id = engine
        .insert(
            "New paragraph",
            ElementMetadata::para(),
            InsertPosition::After("p-1".into()),
        )
        .unwrap();

    let clean = engine.to_clean_markdown();
    assert!(clean.contains("New paragraph"));
    assert!(!clean.contains("Second paragraph"));
    assert!(new_id.is_inserted());
    assert_eq!(ids(&engine), vec!["p-1".to_string(), new_id.to_string()]);
    assert_eq!(
        engine.summarize_operations(),
        "Added 1 element(s); Deleted 1 element(s)"
    );
}

#[test]
fn test_tracked_markdown_marks_inserted_element_as_addition() {
    let mut engine = two_paragraph_engine();
    engine.delete("p-2").unwrap();
    engine
        .insert(
            "New paragraph",
            ElementMetadata::para(),
            InsertPosition::After("p-1".into()),
        )
        .unwrap();

    assert_eq!(
        engine.to_tracked_markdown(),
        "First paragraph\n\n{++New paragraph++}"
    );
}

// ===== Undo / redo =====

#[test]
fn test_undo_redo_identity() {
    let mut engine = three_paragraph_engine();
    engine.edit("p-2", "Two, revised").unwrap();
    let after_edit = engine.current_state();

    assert!(engine.undo());
    assert_eq!(contents(&engine), vec!["One", "Two", "Three"]);
    assert!(engine.redo());
    assert_eq!(engine.current_state(), after_edit);
}

#[test]
fn test_delete_undo_restores_position() {
    let mut engine = three_paragraph_engine();

    engine.delete("p-2").unwrap();
    assert_eq!(ids(&engine), vec!["p-1", "p-3"]);
    match &engine.operations()[0].data {
        OperationData::Delete {
            removed_content,
            index,
            ..
        } => {
            assert_eq!(removed_content, "Two");
            assert_eq!(*index, 1);
        }
        other => panic!("unexpected {:?}", other),
    }

    assert!(engine.undo());
    assert_eq!(ids(&engine), vec!["p-1", "p-2", "p-3"]);
    assert_eq!(engine.element("p-2").unwrap().content, "Two");
}

#[test]
fn test_new_edit_after_undo_truncates_history() {
    let mut engine = three_paragraph_engine();
    engine.edit("p-1", "A").unwrap();
    engine.edit("p-1", "B").unwrap();
    engine.undo();
    engine.edit("p-1", "C").unwrap();

    let new_contents: Vec<String> = engine
        .operations()
        .iter()
        .map(|op| match &op.data {
            OperationData::Edit { new_content, .. } => new_content.clone(),
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(new_contents, vec!["A", "C"]);
    assert_eq!(engine.all_operations().len(), 2);
    assert!(!engine.can_redo());
}

#[test]
fn test_undo_on_empty_history_is_noop() {
    let mut engine = three_paragraph_engine();
    assert!(!engine.undo());
    assert!(!engine.redo());
    assert_eq!(ids(&engine), vec!["p-1", "p-2", "p-3"]);
}

#[test]
fn test_undo_insert_then_reinsert_gets_fresh_id() {
    let mut engine = three_paragraph_engine();
    let first = engine
        .insert("X", ElementMetadata::para(), InsertPosition::Index(0))
        .unwrap();
    engine.undo();
    let second = engine
        .insert("Y", ElementMetadata::para(), InsertPosition::Index(0))
        .unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_undo_of_insert_before_edit_keeps_order() {
    let mut engine = three_paragraph_engine();
    let id = engine
        .insert(
            "Between",
            ElementMetadata::para(),
            InsertPosition::Before("p-3".into()),
        )
        .unwrap();
    engine.edit(id.as_str(), "Between, edited").unwrap();
    engine.undo();
    assert_eq!(
        contents(&engine),
        vec!["One", "Two", "Between", "Three"]
    );
    engine.undo();
    assert_eq!(contents(&engine), vec!["One", "Two", "Three"]);
    engine.redo();
    engine.redo();
    assert_eq!(
        contents(&engine),
        vec!["One", "Two", "Between, edited", "Three"]
    );
}

// ===== Errors =====

#[test]
fn test_edit_unknown_element_does_not_touch_log() {
    let mut engine = three_paragraph_engine();
    let err = engine.edit("p-9", "nope").unwrap_err();
    assert_eq!(
        err,
        RedlineError::ElementNotFound {
            element_id: "p-9".to_string()
        }
    );
    assert!(engine.operations().is_empty());
    assert!(!engine.has_unsaved_operations());
}

#[test]
fn test_delete_twice_fails_second_time() {
    let mut engine = three_paragraph_engine();
    engine.delete("p-1").unwrap();
    assert!(matches!(
        engine.delete("p-1"),
        Err(RedlineError::ElementNotFound { .. })
    ));
    assert_eq!(engine.operations().len(), 1);
}

#[test]
fn test_insert_with_missing_anchor_is_reported() {
    let mut engine = three_paragraph_engine();
    let err = engine
        .insert(
            "Orphan",
            ElementMetadata::para(),
            InsertPosition::After("gone".into()),
        )
        .unwrap_err();
    assert!(matches!(err, RedlineError::InvalidPosition { anchor } if anchor == "gone"));
    assert_eq!(engine.current_state().len(), 3);
    assert!(engine.operations().is_empty());
}

#[test]
fn test_insert_against_deleted_anchor_is_invalid() {
    let mut engine = three_paragraph_engine();
    engine.delete("p-2").unwrap();
    assert!(matches!(
        engine.insert(
            "x",
            ElementMetadata::para(),
            InsertPosition::Before("p-2".into())
        ),
        Err(RedlineError::InvalidPosition { .. })
    ));
}

#[test]
fn test_index_position_clamps() {
    let mut engine = three_paragraph_engine();
    engine
        .insert("Tail", ElementMetadata::para(), InsertPosition::Index(99))
        .unwrap();
    assert_eq!(contents(&engine).last().map(String::as_str), Some("Tail"));
}

// ===== Baselines and tracked output =====

#[test]
fn test_baseline_matching_content_clears_tracking() {
    let mut engine = three_paragraph_engine();
    engine.edit("p-1", "One more").unwrap();
    assert!(engine.is_modified("p-1"));
    assert_eq!(
        engine.element_content_with_tracked_changes("p-1").unwrap(),
        "One{++ more++}"
    );

    engine.set_element_baseline("p-1", "One more");
    assert!(!engine.is_modified("p-1"));
    assert_eq!(
        engine.element_content_with_tracked_changes("p-1").unwrap(),
        "One more"
    );

    engine.clear_element_baseline("p-1");
    assert!(engine.is_modified("p-1"));
}

#[test]
fn test_tracked_markdown_omits_deleted_elements() {
    let mut engine = three_paragraph_engine();
    engine.delete("p-2").unwrap();
    assert_eq!(engine.to_tracked_markdown(), "One\n\nThree");
}

#[test]
fn test_tracked_lookup_of_unknown_element() {
    let engine = three_paragraph_engine();
    assert!(matches!(
        engine.element_content_with_tracked_changes("p-42"),
        Err(RedlineError::ElementNotFound { .. })
    ));
}

#[test]
fn test_clean_markdown_strips_literal_markup_in_content() {
    let mut engine = three_paragraph_engine();
    engine
        .edit("p-2", "Two {++added++} {--removed--} {>>note<<}")
        .unwrap();
    let clean = engine.to_clean_markdown();
    assert!(clean.contains("Two added"));
    assert!(!clean.contains("removed"));
    assert!(clean.contains("<!-- review-comment note -->"));
}

#[test]
fn test_clean_markdown_at_earlier_point() {
    let mut engine = three_paragraph_engine();
    engine.edit("p-1", "Uno").unwrap();
    engine.edit("p-2", "Dos").unwrap();
    assert_eq!(
        engine.clean_markdown_at(1).unwrap(),
        "Uno\n\nTwo\n\nThree"
    );
}

#[test]
fn test_code_block_edit_resolves_both_ways() {
    let old = "```rust\nlet x = 1;\n```";
    let new = "```rust\nlet y = 2;\n```";
    let mut engine = ChangeEngine::new(vec![
        Element::para("p-1", "Intro"),
        Element::new("c-1", old, ElementMetadata::new(BlockKind::CodeBlock)),
    ])
    .unwrap();
    engine.edit("c-1", new).unwrap();

    let tracked = engine.element_content_with_tracked_changes("c-1").unwrap();
    assert_eq!(accept_all(&tracked), new);
    assert_eq!(reject_all(&tracked), old);
    assert_eq!(
        strip_tracked_markup(&tracked, StripMode::Accept, StripOptions::default()),
        new
    );
    assert_eq!(
        strip_tracked_markup(&tracked, StripMode::Reject, StripOptions::default()),
        old
    );
    assert_eq!(engine.to_clean_markdown(), format!("Intro\n\n{}", new));
}

#[test]
fn test_tracked_text_with_literal_closer_resolves() {
    let mut engine = three_paragraph_engine();
    engine.set_element_baseline("p-2", "x --} y");
    engine.edit("p-2", "q r s").unwrap();

    let tracked = engine.element_content_with_tracked_changes("p-2").unwrap();
    assert_eq!(accept_all(&tracked), "q r s");
    assert_eq!(reject_all(&tracked), "x --} y");
}

// ===== Summaries =====

#[test]
fn test_summary_counts_only_active_operations() {
    let mut engine = three_paragraph_engine();
    engine.edit("p-1", "Uno").unwrap();
    engine.edit("p-2", "Dos").unwrap();
    engine.move_element("p-3", 0).unwrap();
    assert_eq!(
        engine.summarize_operations(),
        "Edited 2 element(s); Moved 1 element(s)"
    );
    engine.undo();
    assert_eq!(engine.summarize_operations(), "Edited 2 element(s)");
    engine.undo();
    engine.undo();
    assert_eq!(engine.summarize_operations(), "No changes");
}

#[test]
fn test_operation_kinds_recorded() {
    let mut engine = three_paragraph_engine();
    engine.edit("p-1", "Uno").unwrap();
    engine
        .insert("Cuatro", ElementMetadata::para(), InsertPosition::Index(3))
        .unwrap();
    engine.delete("p-2").unwrap();
    engine.move_element("p-1", 2).unwrap();
    let kinds: Vec<OperationKind> = engine.operations().iter().map(|o| o.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            OperationKind::Edit,
            OperationKind::Insert,
            OperationKind::Delete,
            OperationKind::Move
        ]
    );
    let report = engine.change_report();
    assert!(report.contains("4. Moved `p-1` from position 0 to 2"));
}
