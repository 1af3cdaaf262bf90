//! LanguageHost entry points: get_tree, ensure_tree, language_data_at.

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use rstest::rstest;
use reweave::{NotReady, TextEdit, TextSize, WorkConfig};

use crate::helpers::host_helpers::{drive_to_completion, lazy_config, timer_host};
use crate::helpers::source_fixtures::*;

#[rstest]
#[case::intro("intro", "notes")]
#[case::python_def("def f", "python")]
#[case::python_body("return x", "python")]
#[case::between("between", "notes")]
#[case::sql_body("select 1", "sql")]
#[case::outro("outro", "notes")]
fn test_language_data_at_resolves_embedded_scopes(#[case] needle: &str, #[case] expected: &str) {
    let host = timer_host(FENCED_BLOCKS, WorkConfig::default(), Instant::now());
    assert!(host.state().is_complete());

    let pos = TextSize::new(offset_of(FENCED_BLOCKS, needle) + 1);
    assert_eq!(host.language_data_at(pos).name, expected);
}

#[test]
fn test_language_data_at_uses_nested_configuration() {
    let host = timer_host(FENCED_BLOCKS, WorkConfig::default(), Instant::now());
    let pos = TextSize::new(offset_of(FENCED_BLOCKS, "select"));

    let data = host.language_data_at(pos);
    assert_eq!(data.line_comment.as_deref(), Some("--"));
}

#[test]
fn test_unknown_scope_falls_back_to_top_level() {
    let text = "```haskell\nmain = pure ()\n```\n";
    let host = timer_host(text, WorkConfig::default(), Instant::now());

    assert_eq!(host.language_data_at(TextSize::new(14)).name, "notes");
}

#[test]
fn test_language_data_past_partial_tree_is_top_level() {
    let mut host = timer_host(FENCED_BLOCKS, lazy_config(), Instant::now());
    let inside_sql = TextSize::new(offset_of(FENCED_BLOCKS, "select 1") + 1);

    host.ensure_tree(TextSize::new(5), Duration::from_secs(5))
        .unwrap();
    assert!(host.get_tree().len() < inside_sql);
    assert_eq!(host.language_data_at(inside_sql).name, "notes");

    host.ensure_tree(TextSize::of(FENCED_BLOCKS), Duration::from_secs(5))
        .unwrap();
    assert_eq!(host.language_data_at(inside_sql).name, "sql");
}

#[test]
fn test_get_tree_is_empty_before_any_work() {
    let host = timer_host(&numbered_lines(10), lazy_config(), Instant::now());
    assert!(host.get_tree().is_empty());
    assert!(!host.state().is_complete());
}

#[test]
fn test_ensure_tree_zero_timeout_on_huge_document() {
    let mut host = timer_host(&numbered_lines(200_000), lazy_config(), Instant::now());
    let end = host.state().document().len();

    let error = host.ensure_tree(end, Duration::ZERO).unwrap_err();
    assert_eq!(
        error,
        NotReady {
            up_to: end,
            timeout: Duration::ZERO
        }
    );
    assert_eq!(
        error.to_string(),
        format!("syntax tree not available up to position {end:?} within 0ns")
    );
    assert_eq!(host.state().session().lock().steps(), 0);
}

#[test]
fn test_ensure_tree_uses_progress_already_made() {
    let mut host = timer_host(&numbered_lines(200), lazy_config(), Instant::now());
    assert!(!host.state().session().lock().work_steps(50, None));
    assert!(host.get_tree().is_empty());
    let steps = host.state().session().lock().steps();

    // The handle is past the target, so no parser step is needed.
    let tree = host.ensure_tree(TextSize::new(10), Duration::ZERO).unwrap();
    assert!(tree.len() >= TextSize::new(10));
    assert_eq!(host.get_tree(), tree);
    assert_eq!(host.state().session().lock().steps(), steps);
}

#[test]
fn test_ensure_tree_past_end_is_clamped() {
    let mut host = timer_host(PLAIN_LINES, lazy_config(), Instant::now());

    let tree = host
        .ensure_tree(TextSize::new(u32::MAX), Duration::from_secs(5))
        .unwrap();
    assert_eq!(tree.len(), TextSize::of(PLAIN_LINES));
}

#[test]
fn test_ensure_tree_returns_published_tree_without_work() {
    let mut host = timer_host(PLAIN_LINES, WorkConfig::default(), Instant::now());
    let steps = host.state().session().lock().steps();

    let tree = host.ensure_tree(TextSize::new(10), Duration::ZERO).unwrap();
    assert_eq!(tree, host.get_tree());
    assert_eq!(host.state().session().lock().steps(), steps);
}

#[test]
fn test_edit_reaches_complete_tree_in_background() {
    let start = Instant::now();
    let text = numbered_lines(2_000);
    let mut host = timer_host(&text, lazy_config(), start);
    drive_to_completion(&mut host, start, Duration::from_millis(100));

    let change = host
        .state()
        .document()
        .apply_edits(&[TextEdit::insert(TextSize::new(0), "```sql\n")]);
    host.apply_change(&change, start);
    assert!(host.get_tree().is_empty());

    drive_to_completion(&mut host, start, Duration::from_millis(100));
    assert_eq!(host.get_tree().text(), change.document.to_string());
    assert_eq!(host.language_data_at(TextSize::new(20)).name, "sql");
}
