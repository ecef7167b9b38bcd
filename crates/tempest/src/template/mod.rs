// File: src/template/mod.rs
// Purpose: Template text buffer with a lazily scanned token list

pub mod token;

pub use token::{scan, Behaviours, Token, TokenPart};

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// A template body plus the tokens discovered in it
///
/// The token list is computed once per content and thrown away whenever the
/// content is replaced, so it always describes the current text.
#[derive(Debug, Clone, Default)]
pub struct Template {
    content: String,
    tokens: OnceCell<Arc<[Token]>>,
}

impl Template {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tokens: OnceCell::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Tokens in source order, scanned on first use
    pub fn tokens(&self) -> &[Token] {
        self.tokens.get_or_init(|| scan(&self.content).into())
    }

    /// True when no token markers remain
    pub fn is_bound(&self) -> bool {
        self.tokens().is_empty()
    }

    /// Content-only copy that shares nothing with `self`
    ///
    /// ```
    /// use tempest::Template;
    ///
    /// let page = Template::new("<li>{{ name }}</li>");
    /// let copy = page.duplicate();
    /// assert_eq!(copy.content(), page.content());
    /// ```
    pub fn duplicate(&self) -> Self {
        Self::new(self.content.clone())
    }

    /// Swaps in new content and drops the stale token list
    pub(crate) fn replace_content(&mut self, content: String) {
        self.content = content;
        self.tokens = OnceCell::new();
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl From<String> for Template {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

impl From<&str> for Template {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}
