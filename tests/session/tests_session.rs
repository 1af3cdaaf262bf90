//! ParseSession behavior: idempotence, resumability, budgets and edits.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rstest::rstest;
use reweave::{TextEdit, TextRange, TextSize};

use crate::helpers::host_helpers::{parse_fully, session};
use crate::helpers::source_fixtures::*;

#[rstest]
#[case::empty(EMPTY)]
#[case::single_line(SINGLE_LINE)]
#[case::plain(PLAIN_LINES)]
#[case::fenced(FENCED_BLOCKS)]
#[case::unterminated(UNTERMINATED_BLOCK)]
fn test_full_parse_covers_document(#[case] text: &str) {
    let mut session = session(text);
    let tree = parse_fully(&mut session);

    assert_eq!(tree.len(), TextSize::of(text));
    assert_eq!(tree.text(), text);
    assert!(session.is_done(None));
    assert!(!session.is_parsing());
}

#[rstest]
#[case::plain(PLAIN_LINES)]
#[case::fenced(FENCED_BLOCKS)]
fn test_covered_tree_does_no_more_work(#[case] text: &str) {
    let mut session = session(text);
    parse_fully(&mut session);
    let steps = session.steps();

    assert!(session.work(Duration::from_secs(1), None));
    assert!(session.work(Duration::ZERO, None));
    assert!(session.work_steps(usize::MAX, Some(TextSize::new(3))));
    assert_eq!(session.steps(), steps);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[case(13)]
fn test_split_work_matches_single_call(#[case] first: usize) {
    let text = format!("{}{}", FENCED_BLOCKS, numbered_lines(30));
    let mut whole = session(&text);
    let mut split = session(&text);

    let expected = parse_fully(&mut whole);
    assert!(!split.work_steps(first, None));
    let actual = parse_fully(&mut split);

    assert_eq!(actual, expected);
    assert_eq!(split.steps(), whole.steps());
}

#[test]
fn test_tree_length_never_decreases_while_working() {
    let text = format!("{}{}", numbered_lines(40), UNTERMINATED_BLOCK);
    let mut session = session(&text);
    let doc_len = session.document().len();
    let mut last = TextSize::new(0);

    while !session.work_steps(1, None) {
        let len = session.take_tree().len();
        assert!(len >= last, "tree shrank from {last:?} to {len:?}");
        assert!(len <= doc_len);
        last = len;
    }
    assert_eq!(session.tree().len(), doc_len);
}

#[test]
fn test_empty_document_completes_without_steps() {
    let mut session = session(EMPTY);
    assert!(session.work(Duration::from_millis(5), None));
    assert!(session.tree().is_empty());
    assert_eq!(session.steps(), 0);
}

#[test]
fn test_zero_budget_on_large_document_runs_nothing() {
    let mut session = session(&numbered_lines(100_000));
    assert!(!session.work(Duration::ZERO, None));
    assert!(!session.work(Duration::ZERO, Some(TextSize::new(1))));
    assert_eq!(session.steps(), 0);
    assert!(session.tree().is_empty());
}

#[rstest]
#[case::first_line(4)]
#[case::middle(40)]
#[case::whole(u32::MAX)]
fn test_up_to_target_is_covered(#[case] up_to: u32) {
    let text = numbered_lines(20);
    let mut session = session(&text);
    let target = TextSize::new(up_to).min(TextSize::of(&*text));

    assert!(session.work_steps(usize::MAX, Some(TextSize::new(up_to))));
    assert!(session.tree().len() >= target);
    assert!(session.is_done(Some(target)));
}

#[test]
fn test_trailing_append_to_10k_document() {
    let text = sized_document(10_000);
    let mut old = session(&text);
    let original = parse_fully(&mut old);
    assert_eq!(original.len(), TextSize::new(10_000));

    let change = old
        .document()
        .apply_edits(&[TextEdit::insert(TextSize::new(10_000), "x")]);
    let mut next = old.with_changes(&change.changes, change.document);

    // Only the final line touched the append.
    assert_eq!(next.fragments().len(), old.fragments().len() - 1);
    assert_eq!(
        next.fragments().last().map(|f| f.end()),
        Some(TextSize::new(9_995))
    );

    let reusable = next.fragments().len();
    let tree = parse_fully(&mut next);
    assert_eq!(tree.len(), TextSize::new(10_001));
    assert_eq!(next.reused_nodes(), reusable);
}

#[test]
fn test_edit_after_partial_work_keeps_parsed_prefix() {
    let text = numbered_lines(200);
    let mut old = session(&text);
    assert!(!old.work_steps(50, None));

    let end = old.document().len();
    let change = old
        .document()
        .apply_edits(&[TextEdit::insert(end, "appended\n")]);
    let mut next = old.with_changes(&change.changes, change.document.clone());

    // Everything parsed before the edit survives, except the cut-off tail.
    assert_eq!(old.tree().len(), TextSize::new(offset_of(&text, "line 50 ")));
    assert_eq!(next.fragments().len(), 49);

    let tree = parse_fully(&mut next);
    assert_eq!(tree.text(), change.document.to_string());
    assert_eq!(next.reused_nodes(), 49);
}

#[rstest]
#[case::insert_line_in_block(TextEdit::insert(TextSize::new(21), "    y = 2\n"))]
#[case::open_new_block(TextEdit::insert(TextSize::new(0), "```rust\n"))]
#[case::break_closing_fence(TextEdit::delete(TextRange::new(45.into(), 46.into())))]
#[case::insert_line_after_block(TextEdit::insert(TextSize::new(48), "added\n"))]
#[case::rename_language(TextEdit::replace(TextRange::new(14.into(), 20.into()), "ruby"))]
fn test_incremental_reparse_matches_fresh_parse(#[case] edit: TextEdit) {
    let mut old = session(FENCED_BLOCKS);
    parse_fully(&mut old);

    let change = old.document().apply_edits(&[edit]);
    let mut next = old.with_changes(&change.changes, change.document.clone());
    let incremental = parse_fully(&mut next);

    let fresh = parse_fully(&mut session(&change.document.to_string()));
    assert_eq!(incremental, fresh);
}

#[test]
fn test_line_inserted_before_a_line_keeps_that_line_reusable() {
    let mut old = session(FENCED_BLOCKS);
    parse_fully(&mut old);

    let pos = TextSize::new(offset_of(FENCED_BLOCKS, "between"));
    let change = old
        .document()
        .apply_edits(&[TextEdit::insert(pos, "added\n")]);
    let mut next = old.with_changes(&change.changes, change.document.clone());

    // The "between" line starts at the insertion point and only moves.
    let moved = pos + TextSize::of("added\n");
    assert!(next.fragments().iter().any(|fragment| fragment.start() == moved));

    let reusable = next.fragments().len();
    let tree = parse_fully(&mut next);
    assert_eq!(tree.text(), change.document.to_string());
    assert_eq!(next.reused_nodes(), reusable);
}
