// File: src/renderer.rs
// Purpose: Token resolution and substitution

use crate::hooks::{escape_html, HookRegistry};
use crate::template::{scan, Template, Token, TokenPart};
use crate::value::{format_number, Value};
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Non-fatal problems found while rendering a single token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("token {token}: path '{path}' did not resolve")]
    UnresolvedPath { token: String, path: String },

    #[error("token {token}: '{path}' is an array or object and cannot be inserted as text")]
    CollectionValue { token: String, path: String },

    #[error("token {token}: '{path}' has no text form")]
    NotDisplayable { token: String, path: String },

    #[error("token {token}: unknown hook '{hook}'")]
    UnknownHook { token: String, hook: String },
}

/// Output of a render pass along with its diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Template engine: resolves tokens against data and substitutes them
///
/// ```
/// use tempest::{Engine, Value};
///
/// let engine = Engine::default();
/// let data = Value::object([("name", "World")]);
/// assert_eq!(engine.render("Hello {{ name }}!", &data, None), "Hello World!");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    hooks: Arc<HookRegistry>,
}

impl Engine {
    pub fn new(hooks: HookRegistry) -> Self {
        Self {
            hooks: Arc::new(hooks),
        }
    }

    pub fn with_hooks(hooks: Arc<HookRegistry>) -> Self {
        Self { hooks }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Renders `text`, logging diagnostics and discarding them
    pub fn render(&self, text: &str, data: &Value, context: Option<&str>) -> String {
        self.render_report(text, data, context).text
    }

    /// Renders `text` and returns the diagnostics with the output
    pub fn render_report(&self, text: &str, data: &Value, context: Option<&str>) -> Rendered {
        let tokens = scan(text);
        self.substitute(text, &tokens, data, context)
    }

    /// Binds `data` into `template` in place for one context pass
    ///
    /// Tokens belonging to other contexts keep their markers, so a template
    /// can be bound in several passes.
    ///
    /// ```
    /// use tempest::{Engine, Template, Value};
    ///
    /// let engine = Engine::default();
    /// let mut row = Template::new("<tr>{{ title }}: {{ @row name }}</tr>");
    ///
    /// engine.bind(&mut row, &Value::object([("title", "Users")]), None);
    /// assert_eq!(row.content(), "<tr>Users: {{ @row name }}</tr>");
    ///
    /// engine.bind(&mut row, &Value::object([("name", "Ada")]), Some("row"));
    /// assert_eq!(row.content(), "<tr>Users: Ada</tr>");
    /// ```
    pub fn bind(&self, template: &mut Template, data: &Value, context: Option<&str>) -> Vec<Diagnostic> {
        let rendered = self.substitute(template.content(), template.tokens(), data, context);
        template.replace_content(rendered.text);
        rendered.diagnostics
    }

    /// Renders `template` once per item and concatenates the results
    ///
    /// With no items the `empty` text is returned verbatim.
    ///
    /// ```
    /// use tempest::{Engine, Template, Value};
    ///
    /// let engine = Engine::default();
    /// let item = Template::new("<li>{{ name }}</li>");
    /// let items = vec![Value::object([("name", "a")]), Value::object([("name", "b")])];
    ///
    /// assert_eq!(engine.render_each(&item, &items, None, "none"), "<li>a</li><li>b</li>");
    /// assert_eq!(engine.render_each(&item, &[], None, "<li>{{ none }}</li>"), "<li>{{ none }}</li>");
    /// ```
    pub fn render_each(
        &self,
        template: &Template,
        items: &[Value],
        context: Option<&str>,
        empty: &str,
    ) -> String {
        if items.is_empty() {
            return empty.to_string();
        }

        items
            .iter()
            .map(|item| {
                self.substitute(template.content(), template.tokens(), item, context)
                    .text
            })
            .collect()
    }

    /// One sweep over the text, copying literal runs and token output
    fn substitute(&self, text: &str, tokens: &[Token], data: &Value, context: Option<&str>) -> Rendered {
        let mut output = String::with_capacity(text.len());
        let mut diagnostics = Vec::new();
        let mut cursor = 0;

        for token in tokens {
            output.push_str(&text[cursor..token.span.start]);
            cursor = token.span.end;

            if !token.is_eligible(context) {
                output.push_str(&token.source);
                continue;
            }

            match self.render_token(token, data, &mut diagnostics) {
                Some(rendered) => output.push_str(&rendered),
                None if token.behaviours.omit_unresolved => {}
                None => output.push_str(&token.source),
            }
        }
        output.push_str(&text[cursor..]);

        for diagnostic in &diagnostics {
            warn!(%diagnostic, "template token");
        }

        Rendered {
            text: output,
            diagnostics,
        }
    }

    /// Computes the text for one token; `None` when its path does not resolve
    fn render_token(&self, token: &Token, data: &Value, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
        let Some(value) = resolve(data, &token.parts) else {
            diagnostics.push(Diagnostic::UnresolvedPath {
                token: token.source.clone(),
                path: token.path(),
            });
            return None;
        };

        let mut text = match display(&value) {
            Ok(text) => text.into_owned(),
            Err(kind) => {
                diagnostics.push(kind.into_diagnostic(token));
                String::new()
            }
        };

        if token.behaviours.escape {
            text = escape_html(&text);
        }

        if token.behaviours.null_as_empty && value.is_null() {
            text.clear();
        }

        for hook in &token.hooks {
            match self.hooks.apply(hook, &text) {
                Some(transformed) => text = transformed,
                None => diagnostics.push(Diagnostic::UnknownHook {
                    token: token.source.clone(),
                    hook: hook.clone(),
                }),
            }
        }

        Some(text)
    }
}

/// Walks `parts` from `root`; `None` as soon as a step fails
///
/// ```
/// use tempest::renderer::resolve;
/// use tempest::template::TokenPart;
/// use tempest::Value;
///
/// let data = Value::object([("user", Value::object([("name", "Ada")]))]);
/// let path = [TokenPart::Field("user".into()), TokenPart::Field("name".into())];
/// assert_eq!(resolve(&data, &path), Some(Value::from("Ada")));
/// ```
pub fn resolve(root: &Value, parts: &[TokenPart]) -> Option<Value> {
    let (first, rest) = parts.split_first()?;
    let mut current = step(root, first)?;
    for part in rest {
        current = step(&current, part)?;
    }
    Some(current)
}

fn step(value: &Value, part: &TokenPart) -> Option<Value> {
    match (value, part) {
        (Value::Object(map), TokenPart::Field(name)) => map.get(name).cloned(),
        (Value::Record(record), TokenPart::Field(name)) => record.field(name),
        (Value::Record(record), TokenPart::MethodCall(name)) => record.call(name),
        _ => None,
    }
}

enum DisplayError {
    Collection,
    NotDisplayable,
}

impl DisplayError {
    fn into_diagnostic(self, token: &Token) -> Diagnostic {
        let token_source = token.source.clone();
        let path = token.path();
        match self {
            DisplayError::Collection => Diagnostic::CollectionValue {
                token: token_source,
                path,
            },
            DisplayError::NotDisplayable => Diagnostic::NotDisplayable {
                token: token_source,
                path,
            },
        }
    }
}

/// Text form of a resolved value
fn display(value: &Value) -> Result<Cow<'_, str>, DisplayError> {
    match value {
        Value::Null => Ok(Cow::Borrowed("null")),
        Value::Bool(true) => Ok(Cow::Borrowed("true")),
        Value::Bool(false) => Ok(Cow::Borrowed("false")),
        Value::Number(n) => Ok(Cow::Owned(format_number(*n))),
        Value::String(s) => Ok(Cow::Borrowed(s)),
        Value::Array(_) | Value::Object(_) => Err(DisplayError::Collection),
        Value::Record(record) => record
            .display()
            .map(Cow::Owned)
            .ok_or(DisplayError::NotDisplayable),
    }
}
