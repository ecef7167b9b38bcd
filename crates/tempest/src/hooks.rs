// File: src/hooks.rs
// Purpose: Named post-processing transforms applied to token output

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A pure string transform
pub type HookFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Registry of hooks available to `{{ value:hook }}` tokens
///
/// `HookRegistry::default()` carries the built-in set; `HookRegistry::new()`
/// starts empty.
#[derive(Clone)]
pub struct HookRegistry {
    hooks: HashMap<String, HookFn>,
}

impl HookRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Registry with every built-in hook
    pub fn builtin() -> Self {
        Self::new()
            .with("ucase", |s| s.to_uppercase())
            .with("lcase", |s| s.to_lowercase())
            .with("ucfirst", ucfirst)
            .with("ucwords", |s| {
                s.split(' ').map(ucfirst).collect::<Vec<_>>().join(" ")
            })
            .with("trim", |s| s.trim().to_string())
            .with("nl2br", |s| s.replace("\r\n", "\n").replace('\n', "<br />\n"))
            .with("escape", escape_html)
            .with("striptags", strip_tags)
            .with("urlencode", |s| urlencoding::encode(s).into_owned())
            .with("link", |s| {
                let href = escape_html(s);
                format!(r#"<a href="{href}">{href}</a>"#)
            })
            .with("sha256", |s| {
                Sha256::digest(s.as_bytes())
                    .iter()
                    .map(|byte| format!("{:02x}", byte))
                    .collect()
            })
            .with("date", |s| format_date(s, "%Y-%m-%d"))
            .with("datetime", |s| format_date(s, "%Y-%m-%d %H:%M:%S"))
            .with("length", |s| s.chars().count().to_string())
    }

    /// Adds or replaces a hook (builder style)
    pub fn with<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.register(name, hook);
        self
    }

    /// Adds or replaces a hook
    pub fn register<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.hooks.insert(name.into(), Arc::new(hook));
    }

    pub fn get(&self, name: &str) -> Option<&HookFn> {
        self.hooks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Runs the named hook, `None` if it is not registered
    pub fn apply(&self, name: &str, input: &str) -> Option<String> {
        self.hooks.get(name).map(|hook| hook(input))
    }

    /// Registered hook names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}

/// HTML-escapes `& < > " '`
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn ucfirst(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn strip_tags(input: &str) -> String {
    static TAG_REGEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));
    TAG_REGEX.replace_all(input, "").into_owned()
}

/// Formats a unix timestamp, RFC 3339 string or `YYYY-MM-DD[ HH:MM:SS]`
///
/// Input that is none of those passes through unchanged.
fn format_date(input: &str, format: &str) -> String {
    let trimmed = input.trim();

    let parsed = trimmed
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });

    match parsed {
        Some(dt) => dt.format(format).to_string(),
        None => input.to_string(),
    }
}
