//! Helpers for building languages, sessions and hosts.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use reweave::parser::LineParser;
use reweave::{
    AnyWakeups, Document, Language, LanguageData, LanguageHost, ParseSession, Tree, WorkConfig,
};

/// The line grammar with python and sql registered as embedded languages.
pub fn notes_language() -> Language {
    Language::new(
        LanguageData::new("notes").with_line_comment("#"),
        LineParser,
    )
    .with_nested(
        LanguageData::new("python")
            .with_line_comment("#")
            .with_close_brackets(['(', '[', '{']),
    )
    .with_nested(LanguageData::new("sql").with_line_comment("--"))
}

pub fn session(text: &str) -> ParseSession {
    ParseSession::new(Arc::new(LineParser), Document::new(text))
}

/// Run a session until its tree covers the document.
pub fn parse_fully(session: &mut ParseSession) -> Tree {
    assert!(session.work_steps(usize::MAX, None));
    session.tree().clone()
}

/// A config that does no synchronous parsing, leaving all work to the
/// background scheduler or explicit calls.
pub fn lazy_config() -> WorkConfig {
    WorkConfig::default().with_apply_budget(Duration::ZERO)
}

pub fn timer_host(text: &str, config: WorkConfig, now: Instant) -> LanguageHost {
    LanguageHost::new(
        notes_language(),
        Document::new(text),
        AnyWakeups::select(false, &config),
        config,
        now,
    )
}

pub fn idle_host(text: &str, config: WorkConfig, now: Instant) -> LanguageHost {
    LanguageHost::new(
        notes_language(),
        Document::new(text),
        AnyWakeups::select(true, &config),
        config,
        now,
    )
}

/// Poll a host on a simulated clock until its tree is complete.
/// Returns the number of polls that changed the tree.
pub fn drive_to_completion(host: &mut LanguageHost, mut now: Instant, step: Duration) -> usize {
    let mut published = 0;
    for _ in 0..10_000 {
        if host.state().is_complete() {
            return published;
        }
        now += step;
        if host.poll(now) {
            published += 1;
        }
    }
    panic!("background parsing never completed");
}
