/// Route declarations and per-route scoring
///
/// A `Route` pairs a parsed pattern with the handler that serves it.
/// Scoring a route against a request path is a pure function; the `Router`
/// decides between candidates.

pub mod pattern;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::path::{normalize_path, Path};
use crate::RouteError;
pub use pattern::{classify_segment, parse_segments, Segment};

/// Points awarded for a literal segment that equals the request segment
pub const LITERAL_SCORE: usize = 2;
/// Points awarded for a dynamic segment
pub const DYNAMIC_SCORE: usize = 1;
/// Score of the index route when the request is `/`
pub const ROOT_SCORE: usize = 1;

/// Method used when a handler spec names only the class
pub const DEFAULT_METHOD: &str = "index";

/// Handler reference: `Class` or `Class:method`
///
/// # Examples
///
/// ```
/// use tempest_router::HandlerSpec;
///
/// let spec: HandlerSpec = "Users:show".parse().unwrap();
/// assert_eq!(spec.class, "Users");
/// assert_eq!(spec.method, "show");
///
/// let spec: HandlerSpec = "Home".parse().unwrap();
/// assert_eq!(spec.method, "index");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerSpec {
    pub class: String,
    pub method: String,
}

impl HandlerSpec {
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl FromStr for HandlerSpec {
    type Err = RouteError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec = spec.trim();
        let (class, method) = match spec.split_once(':') {
            Some((class, method)) => (class.trim(), method.trim()),
            None => (spec, DEFAULT_METHOD),
        };

        if class.is_empty() || method.is_empty() {
            return Err(RouteError::InvalidHandler(spec.to_string()));
        }

        Ok(Self::new(class, method))
    }
}

impl fmt::Display for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.method)
    }
}

/// A registered URI pattern and its handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Normalized pattern like "/users/[id]"
    pub pattern: String,
    /// Parsed pattern segments
    pub segments: Vec<Segment>,
    /// Controller and action serving this route
    pub handler: HandlerSpec,
}

impl Route {
    /// Builds a route from a pattern and an already parsed handler
    ///
    /// # Examples
    ///
    /// ```
    /// use tempest_router::{HandlerSpec, Route};
    ///
    /// let route = Route::new("/users/[id]/", HandlerSpec::new("Users", "show"));
    /// assert_eq!(route.pattern, "/users/[id]");
    /// assert_eq!(route.params(), vec!["id"]);
    /// ```
    pub fn new(pattern: &str, handler: HandlerSpec) -> Self {
        let pattern = normalize_path(pattern).into_owned();
        let segments = parse_segments(&pattern);

        Self {
            pattern,
            segments,
            handler,
        }
    }

    /// Builds a route from a pattern and a `Class[:method]` handler string
    pub fn parse(pattern: &str, handler: &str) -> Result<Self, RouteError> {
        Ok(Self::new(pattern, handler.parse()?))
    }

    /// True for the explicit index route (zero segments)
    pub fn is_index(&self) -> bool {
        self.segments.is_empty()
    }

    /// Names of the dynamic segments, in pattern order
    pub fn params(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Dynamic(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Scores this route against a request path
    ///
    /// Returns `None` when the route cannot serve the path: segment counts
    /// differ, a literal segment mismatches, or only one side is the root.
    /// Otherwise returns the score and the captured parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempest_router::{Path, Route};
    ///
    /// let route = Route::parse("/users/[id]", "Users:show").unwrap();
    /// let (score, params) = route.score(&Path::parse("/users/42")).unwrap();
    /// assert_eq!(score, 3);
    /// assert_eq!(params["id"], "42");
    ///
    /// assert!(route.score(&Path::parse("/posts/42")).is_none());
    /// ```
    pub fn score(&self, path: &Path) -> Option<(usize, HashMap<String, String>)> {
        if path.is_root() {
            return self.is_index().then(|| (ROOT_SCORE, HashMap::new()));
        }

        if self.segments.len() != path.segment_count() {
            return None;
        }

        self.segments.iter().zip(path.segments()).try_fold(
            (0, HashMap::new()),
            |(score, mut params), (segment, actual)| match segment {
                Segment::Literal(text) if text == actual => Some((score + LITERAL_SCORE, params)),
                Segment::Literal(_) => None,
                Segment::Dynamic(name) => {
                    params.insert(name.clone(), actual.clone());
                    Some((score + DYNAMIC_SCORE, params))
                }
            },
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.pattern, self.handler)
    }
}
