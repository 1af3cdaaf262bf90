//! Background scheduling through a LanguageHost.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use reweave::parser::LineParser;
use reweave::scheduler::SchedulerState;
use reweave::text::TextCursor;
use reweave::{
    AnyWakeups, Document, Language, LanguageData, LanguageHost, PartialParse, Parser, TextEdit,
    TextSize, Tree, TreeFragment,
};
use tokio_util::sync::CancellationToken;

use crate::helpers::host_helpers::{drive_to_completion, idle_host, lazy_config, timer_host};
use crate::helpers::source_fixtures::*;

const MS: Duration = Duration::from_millis(1);

#[test]
fn test_timer_host_publishes_monotonically() {
    let start = Instant::now();
    let config = lazy_config().with_slice(MS);
    let mut host = timer_host(&numbered_lines(20_000), config, start);
    let doc_len = host.state().document().len();

    let mut now = start;
    let mut last = TextSize::new(0);
    while !host.state().is_complete() {
        now += 100 * MS;
        host.poll(now);
        let len = host.get_tree().len();
        assert!(len >= last);
        assert!(len <= doc_len);
        last = len;
    }
    assert_eq!(host.scheduler().state(), SchedulerState::Idle);
}

#[test]
fn test_idle_host_waits_for_idle_window_or_deferral() {
    let start = Instant::now();
    let mut host = idle_host(PLAIN_LINES, lazy_config(), start);
    assert!(matches!(
        host.scheduler().state(),
        SchedulerState::Scheduled(_)
    ));

    // Busy host, deferral not reached yet.
    assert!(!host.poll(start + 100 * MS));
    assert!(host.get_tree().is_empty());

    host.scheduler_mut()
        .wakeups_mut()
        .report_idle(start + 200 * MS);
    assert!(host.poll(start + 150 * MS));
    assert!(host.state().is_complete());
}

#[test]
fn test_idle_host_forced_after_max_deferral() {
    let start = Instant::now();
    let mut host = idle_host(PLAIN_LINES, lazy_config(), start);
    let deferral = host.scheduler().config().max_deferral;

    assert!(!host.poll(start + deferral - MS));
    assert!(host.poll(start + deferral));
    assert!(host.state().is_complete());
}

#[test]
fn test_update_from_superseded_session_is_dropped() {
    let start = Instant::now();
    let text = numbered_lines(50);
    let mut host = timer_host(&text, lazy_config(), start);
    let old_state = host.state().clone();

    let change = host
        .state()
        .document()
        .apply_edits(&[TextEdit::insert(TextSize::new(0), "new first line\n")]);
    host.apply_change(&change, start);

    // Drive the old session directly, as a slice already in flight would.
    assert!(host.scheduler_mut().tick(start + 100 * MS, &old_state));
    assert!(!host.poll(start + 100 * MS));
    assert!(host.get_tree().is_empty());

    drive_to_completion(&mut host, start + 100 * MS, 100 * MS);
    assert_eq!(host.get_tree().text(), change.document.to_string());
}

#[test]
fn test_teardown_stops_background_work() {
    let start = Instant::now();
    let mut host = timer_host(&numbered_lines(50), lazy_config(), start);

    host.teardown();
    assert_eq!(host.scheduler().state(), SchedulerState::TornDown);
    assert_eq!(host.scheduler().wakeups().pending(), 0);

    for i in 1..20 {
        assert!(!host.poll(start + i * 100 * MS));
    }
    assert!(host.get_tree().is_empty());
    assert_eq!(host.state().session().lock().steps(), 0);
}

/// A parser that tears its owner down during its first step.
struct TearingParser(Arc<OnceLock<CancellationToken>>);

struct TearingParse {
    inner: Box<dyn PartialParse>,
    owner: Arc<OnceLock<CancellationToken>>,
    fired: bool,
}

impl Parser for TearingParser {
    fn start(&self, input: TextCursor, fragments: &[TreeFragment]) -> Box<dyn PartialParse> {
        Box::new(TearingParse {
            inner: LineParser.start(input, fragments),
            owner: self.0.clone(),
            fired: false,
        })
    }
}

impl PartialParse for TearingParse {
    fn advance(&mut self) -> Option<Tree> {
        if !self.fired {
            if let Some(handle) = self.owner.get() {
                handle.cancel();
                self.fired = true;
            }
        }
        self.inner.advance()
    }

    fn parsed_pos(&self) -> TextSize {
        self.inner.parsed_pos()
    }

    fn force_finish(&self) -> Tree {
        self.inner.force_finish()
    }
}

#[test]
fn test_teardown_during_slice_stops_after_current_step() {
    let start = Instant::now();
    let config = lazy_config().with_slice(Duration::from_secs(5));
    let cell = Arc::new(OnceLock::new());
    let language = Language::new(LanguageData::new("notes"), TearingParser(cell.clone()));
    let mut host = LanguageHost::new(
        language,
        Document::new(&numbered_lines(200)),
        AnyWakeups::select(false, &config),
        config,
        start,
    );
    cell.set(host.scheduler().cancellation_token()).unwrap();

    // The step that tore the host down finishes; nothing runs after it.
    assert!(!host.poll(start + 100 * MS));
    assert_eq!(host.state().session().lock().steps(), 1);
    assert!(host.get_tree().is_empty());
    assert_eq!(host.scheduler().state(), SchedulerState::TornDown);
    assert!(host.scheduler().is_torn_down());

    assert!(!host.poll(start + 1_000 * MS));
    assert_eq!(host.state().session().lock().steps(), 1);
}

#[test]
fn test_edit_during_background_work_keeps_consumed_prefix() {
    let start = Instant::now();
    let text = numbered_lines(200_000);
    let config = lazy_config().with_slice(5 * MS);
    let mut host = timer_host(&text, config, start);

    // One slice parses part of the document and publishes nothing.
    assert!(!host.poll(start + 100 * MS));
    assert!(host.get_tree().is_empty());
    let consumed = host.state().session().lock().parsed_pos().unwrap();
    assert!(consumed > TextSize::new(0));
    assert!(consumed < host.state().document().len());

    let end = host.state().document().len();
    let change = host
        .state()
        .document()
        .apply_edits(&[TextEdit::insert(end, "appended\n")]);
    host.apply_change(&change, start + 100 * MS);

    // The new session's fragments cover the consumed input from the start,
    // without gaps, minus at most the last line before the cut.
    let (covered, reusable) = {
        let session = host.state().session().lock();
        let fragments = session.fragments();
        assert_eq!(fragments.first().map(TreeFragment::start), Some(TextSize::new(0)));
        for pair in fragments.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        let covered = fragments.last().map_or(TextSize::new(0), TreeFragment::end);
        (covered, fragments.len())
    };
    assert!(covered <= consumed);
    assert!(consumed - covered <= TextSize::of("line 199999 = 199999\n"));

    let tree = host.ensure_tree(covered, Duration::from_secs(5)).unwrap();
    assert!(tree.len() >= covered);
    assert_eq!(host.state().session().lock().reused_nodes(), reusable);
}
