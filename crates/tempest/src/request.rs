// File: src/request.rs
// Purpose: Request path, format and the query/body/named data stack

use crate::value::Value;
use axum::http::{HeaderMap, Method};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use tempest_router::Path;
use thiserror::Error;

/// One of the three request data buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// URL query string (`get`)
    Query,
    /// Form or JSON body (`post`)
    Body,
    /// Parameters captured by the matched route (`route`)
    Named,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown request data bucket '{0}'")]
pub struct UnknownBucket(pub String);

impl FromStr for Bucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" | "get" => Ok(Bucket::Query),
            "body" | "post" => Ok(Bucket::Body),
            "named" | "route" => Ok(Bucket::Named),
            _ => Err(UnknownBucket(s.to_string())),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bucket::Query => "query",
            Bucket::Body => "body",
            Bucket::Named => "named",
        })
    }
}

/// String fields of one bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataBag {
    fields: HashMap<String, String>,
    raw_json: Option<JsonValue>,
}

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from fields, trimming every value
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .collect();

        Self {
            fields,
            raw_json: None,
        }
    }

    /// Create from a JSON body; non-string members are kept in JSON form
    pub fn from_json(json: JsonValue) -> Self {
        let mut fields = HashMap::new();

        if let JsonValue::Object(map) = &json {
            for (key, value) in map {
                if let Some(s) = value.as_str() {
                    fields.insert(key.clone(), s.trim().to_string());
                } else {
                    fields.insert(key.clone(), value.to_string());
                }
            }
        }

        Self {
            fields,
            raw_json: Some(json),
        }
    }

    /// Decode `a=1&b=two+words` style input
    pub fn from_urlencoded(input: &str) -> Self {
        let fields = input
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();

        Self::from_fields(fields)
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.fields.get(key)
    }

    /// Get a field parsed as a specific type
    pub fn get_as<T: FromStr>(&self, key: &str) -> Option<T> {
        self.fields.get(key)?.parse().ok()
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> Vec<&String> {
        self.fields.keys().collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Raw JSON body, if the bag came from one
    pub fn json(&self) -> Option<&JsonValue> {
        self.raw_json.as_ref()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.raw_json.is_none()
    }

    /// Template view: the JSON body when present, otherwise the string fields
    pub fn to_value(&self) -> Value {
        match &self.raw_json {
            Some(json @ JsonValue::Object(_)) => Value::from(json.clone()),
            _ => Value::from(self.fields.clone()),
        }
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Query, body and named buckets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataStack {
    pub query: DataBag,
    pub body: DataBag,
    pub named: DataBag,
}

impl DataStack {
    pub fn bucket(&self, bucket: Bucket) -> &DataBag {
        match bucket {
            Bucket::Query => &self.query,
            Bucket::Body => &self.body,
            Bucket::Named => &self.named,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut DataBag {
        match bucket {
            Bucket::Query => &mut self.query,
            Bucket::Body => &mut self.body,
            Bucket::Named => &mut self.named,
        }
    }
}

/// An incoming request
///
/// Derefs to its [`Path`], so `request.segment(1)` reads the path directly.
///
/// ```
/// use tempest::{Bucket, Request};
/// use axum::http::Method;
///
/// let request = Request::new(Method::GET, "/users/5.json?tab=posts");
/// assert_eq!(request.as_str(), "/users/5");
/// assert_eq!(request.format(), "json");
/// assert_eq!(request.input(Bucket::Query, "tab", "all"), "posts");
/// assert_eq!(request.input(Bucket::Query, "page", "1"), "1");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub headers: HeaderMap,
    path: Path,
    format: Option<String>,
    data: DataStack,
}

impl Request {
    /// Parse a URI: query string into the query bucket, extension into the format
    pub fn new(method: Method, uri: &str) -> Self {
        let (raw_path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        let (raw_path, format) = split_format(raw_path);

        let data = DataStack {
            query: query.map(DataBag::from_urlencoded).unwrap_or_default(),
            ..DataStack::default()
        };

        Self {
            method,
            headers: HeaderMap::new(),
            path: Path::parse(raw_path),
            format,
            data,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query(mut self, query: DataBag) -> Self {
        self.data.query = query;
        self
    }

    pub fn with_body(mut self, body: DataBag) -> Self {
        self.data.body = body;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Response format from the extension suffix, `html` when there was none
    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or("html")
    }

    pub fn data(&self) -> &DataStack {
        &self.data
    }

    /// Replace the named bucket with parameters captured by routing
    pub fn set_named(&mut self, params: HashMap<String, String>) {
        self.data.named = DataBag::from_fields(params);
    }

    /// Field lookup in one bucket with a fallback
    pub fn input<'a>(&'a self, bucket: Bucket, field: &str, default: &'a str) -> &'a str {
        self.data
            .bucket(bucket)
            .get(field)
            .map_or(default, String::as_str)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// Template view of the request
    ///
    /// Exposes `path`, `method`, `format`, `segments` and the `query`, `body`
    /// and `named` buckets.
    pub fn to_value(&self) -> Value {
        Value::object([
            ("path", Value::from(self.path.as_str())),
            ("method", Value::from(self.method.as_str())),
            ("format", Value::from(self.format())),
            (
                "segments",
                Value::Array(self.path.segments().iter().map(|s| Value::from(s.as_str())).collect()),
            ),
            ("query", self.data.query.to_value()),
            ("body", self.data.body.to_value()),
            ("named", self.data.named.to_value()),
        ])
    }
}

impl Deref for Request {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

/// Split `name.ext` off the last segment; only alphanumeric extensions count
fn split_format(raw: &str) -> (&str, Option<String>) {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    let last_start = trimmed.rfind(['/', '\\']).map_or(0, |i| i + 1);

    match trimmed[last_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let ext = &trimmed[last_start + dot + 1..];
            if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                (&trimmed[..last_start + dot], Some(ext.to_ascii_lowercase()))
            } else {
                (raw, None)
            }
        }
        _ => (raw, None),
    }
}
