//! Languages and the per-document state wired into a host.
//!
//! - [`Language`] - A parser plus its configuration data, and the data of
//!   languages that may be embedded in it
//! - [`LanguageState`] - Immutable snapshot of a published tree and the
//!   session still working on it
//! - [`LanguageHost`] - Applies edits, runs the background scheduler, and
//!   answers `get_tree` / `ensure_tree` / `language_data_at`

mod host;
mod state;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::parser::Parser;

pub use host::LanguageHost;
pub use state::LanguageState;

/// Per-language configuration looked up by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageData {
    pub name: SmolStr,
    pub line_comment: Option<SmolStr>,
    pub close_brackets: Vec<char>,
}

impl LanguageData {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            line_comment: None,
            close_brackets: Vec::new(),
        }
    }

    pub fn with_line_comment(mut self, comment: impl Into<SmolStr>) -> Self {
        self.line_comment = Some(comment.into());
        self
    }

    pub fn with_close_brackets(mut self, brackets: impl IntoIterator<Item = char>) -> Self {
        self.close_brackets = brackets.into_iter().collect();
        self
    }
}

/// A parser and the data that configures editing in its documents.
#[derive(Clone)]
pub struct Language {
    data: Arc<LanguageData>,
    parser: Arc<dyn Parser>,
    /// Embedded languages, keyed by the scope name the parser reports.
    nested: FxHashMap<SmolStr, Arc<LanguageData>>,
}

impl Language {
    pub fn new(data: LanguageData, parser: impl Parser + 'static) -> Self {
        Self {
            data: Arc::new(data),
            parser: Arc::new(parser),
            nested: FxHashMap::default(),
        }
    }

    /// Register an embedded language under its name.
    pub fn with_nested(mut self, data: LanguageData) -> Self {
        self.nested.insert(data.name.clone(), Arc::new(data));
        self
    }

    pub fn data(&self) -> &Arc<LanguageData> {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn parser(&self) -> &Arc<dyn Parser> {
        &self.parser
    }

    pub fn nested(&self, scope: &str) -> Option<&Arc<LanguageData>> {
        self.nested.get(scope)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nested: Vec<_> = self.nested.keys().collect();
        nested.sort();
        f.debug_struct("Language")
            .field("name", &self.data.name)
            .field("nested", &nested)
            .finish()
    }
}
