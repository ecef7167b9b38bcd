// File: src/template/token.rs
// Purpose: Token grammar and the single-pass token scanner

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

/// Flag character: HTML-escape the output
pub const FLAG_ESCAPE: char = '!';
/// Flag character: render `null` as an empty string
pub const FLAG_NULL_AS_EMPTY: char = '?';
/// Flag character: drop the marker when the path does not resolve
pub const FLAG_OMIT_UNRESOLVED: char = '~';

// {{ <flags> <@context> <path> <:hooks> }}
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\{\{\s*(?P<flags>(?:[!?~]\s*)*)\s*(?:@(?P<context>[A-Za-z_][A-Za-z0-9_]*)\s+)?(?P<path>[A-Za-z0-9_]+(?:\(\))?(?:\.[A-Za-z0-9_]+(?:\(\))?)*)\s*(?::(?P<hooks>[A-Za-z0-9_:\s]*))?\}\}",
    )
    .expect("token grammar is a valid regex")
});

/// Per-token behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Behaviours {
    pub escape: bool,
    pub null_as_empty: bool,
    pub omit_unresolved: bool,
}

impl Behaviours {
    /// Parses flag characters; whitespace and characters outside the closed set are ignored
    pub fn parse(flags: &str) -> Self {
        flags.chars().fold(Self::default(), |mut behaviours, flag| {
            match flag {
                FLAG_ESCAPE => behaviours.escape = true,
                FLAG_NULL_AS_EMPTY => behaviours.null_as_empty = true,
                FLAG_OMIT_UNRESOLVED => behaviours.omit_unresolved = true,
                _ => {}
            }
            behaviours
        })
    }
}

/// One step of a token's dotted path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPart {
    /// `name`
    Field(String),
    /// `name()`
    MethodCall(String),
}

impl TokenPart {
    fn parse(part: &str) -> Self {
        match part.strip_suffix("()") {
            Some(name) => TokenPart::MethodCall(name.to_string()),
            None => TokenPart::Field(part.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TokenPart::Field(name) | TokenPart::MethodCall(name) => name,
        }
    }
}

impl fmt::Display for TokenPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenPart::Field(name) => f.write_str(name),
            TokenPart::MethodCall(name) => write!(f, "{}()", name),
        }
    }
}

/// A `{{ ... }}` marker found in template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Exact source text of the marker
    pub source: String,
    /// Byte range of the marker in the scanned text
    pub span: Range<usize>,
    pub behaviours: Behaviours,
    pub context: Option<String>,
    pub parts: Vec<TokenPart>,
    pub hooks: Vec<String>,
}

impl Token {
    /// Dotted path as written, e.g. `user.name()`
    pub fn path(&self) -> String {
        self.parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether this token takes part in a bind pass with `context`
    pub fn is_eligible(&self, context: Option<&str>) -> bool {
        self.context.as_deref() == context
    }
}

/// Scans `text` once and returns every token in source order
///
/// ```
/// use tempest::template::{scan, TokenPart};
///
/// let tokens = scan("Hi {{ !@item user.name():ucase }}!");
/// assert_eq!(tokens.len(), 1);
/// assert!(tokens[0].behaviours.escape);
/// assert_eq!(tokens[0].context.as_deref(), Some("item"));
/// assert_eq!(tokens[0].parts[1], TokenPart::MethodCall("name".into()));
/// assert_eq!(tokens[0].hooks, vec!["ucase"]);
/// ```
pub fn scan(text: &str) -> Vec<Token> {
    TOKEN_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let path = caps.name("path")?.as_str();

            Some(Token {
                source: whole.as_str().to_string(),
                span: whole.range(),
                behaviours: Behaviours::parse(caps.name("flags").map_or("", |m| m.as_str())),
                context: caps.name("context").map(|m| m.as_str().to_string()),
                parts: path.split('.').map(TokenPart::parse).collect(),
                hooks: caps
                    .name("hooks")
                    .map(|m| {
                        m.as_str()
                            .split(|c: char| c == ':' || c.is_whitespace())
                            .filter(|hook| !hook.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_token() {
        let tokens = scan("Hello {{ name }}!");
        assert_eq!(tokens.len(), 1);

        let token = &tokens[0];
        assert_eq!(token.source, "{{ name }}");
        assert_eq!(token.span, 6..16);
        assert_eq!(token.behaviours, Behaviours::default());
        assert_eq!(token.context, None);
        assert_eq!(token.parts, vec![TokenPart::Field("name".into())]);
        assert!(token.hooks.is_empty());
    }

    #[test]
    fn test_flags() {
        let token = &scan("{{ !?~bio }}")[0];
        assert!(token.behaviours.escape);
        assert!(token.behaviours.null_as_empty);
        assert!(token.behaviours.omit_unresolved);

        let token = &scan("{{ ? missing }}")[0];
        assert!(token.behaviours.null_as_empty);
        assert!(!token.behaviours.escape);
    }

    #[test]
    fn test_spaced_flags() {
        let tokens = scan("{{ ! ? bio }} {{ ~ ! @row name }}");
        assert_eq!(tokens.len(), 2);

        assert!(tokens[0].behaviours.escape);
        assert!(tokens[0].behaviours.null_as_empty);
        assert_eq!(tokens[0].path(), "bio");

        assert!(tokens[1].behaviours.omit_unresolved);
        assert!(tokens[1].behaviours.escape);
        assert_eq!(tokens[1].context.as_deref(), Some("row"));
    }

    #[test]
    fn test_tight_whitespace() {
        let token = &scan("{{!name:ucase}}")[0];
        assert!(token.behaviours.escape);
        assert_eq!(token.hooks, vec!["ucase"]);
    }

    #[test]
    fn test_hook_lists() {
        assert_eq!(scan("{{ name:ucase:trim }}")[0].hooks, vec!["ucase", "trim"]);
        assert_eq!(scan("{{ name : ucase trim }}")[0].hooks, vec!["ucase", "trim"]);
        assert_eq!(scan("{{ name: }}")[0].hooks, Vec::<String>::new());
    }

    #[test]
    fn test_dotted_path_with_methods() {
        let token = &scan("{{ order.customer().address.city }}")[0];
        assert_eq!(
            token.parts,
            vec![
                TokenPart::Field("order".into()),
                TokenPart::MethodCall("customer".into()),
                TokenPart::Field("address".into()),
                TokenPart::Field("city".into()),
            ]
        );
        assert_eq!(token.path(), "order.customer().address.city");
    }

    #[test]
    fn test_context() {
        let token = &scan("{{ @row title }}")[0];
        assert_eq!(token.context.as_deref(), Some("row"));
        assert!(token.is_eligible(Some("row")));
        assert!(!token.is_eligible(None));

        assert!(scan("{{ title }}")[0].is_eligible(None));
        assert!(!scan("{{ title }}")[0].is_eligible(Some("row")));
    }

    #[test]
    fn test_non_tokens_are_ignored() {
        assert!(scan("{{ }}").is_empty());
        assert!(scan("{{ a b }}").is_empty());
        assert!(scan("{{ name.}}").is_empty());
        assert!(scan("{ name }").is_empty());
        assert!(scan("plain text").is_empty());
    }

    #[test]
    fn test_multiple_tokens_in_order() {
        let tokens = scan("{{ a }} and {{ b }} and {{ a }}");
        let paths: Vec<String> = tokens.iter().map(Token::path).collect();
        assert_eq!(paths, vec!["a", "b", "a"]);
        assert!(tokens[0].span.end <= tokens[1].span.start);
    }
}
