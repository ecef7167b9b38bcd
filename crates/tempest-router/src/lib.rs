//! # Tempest Router
//!
//! Scored route matching for the Tempest framework:
//! - Literal segments (`/about`) score 2 points each
//! - Dynamic segments (`/users/[id]`) score 1 point and capture the value
//! - A literal mismatch disqualifies the route outright
//! - The index route (`/`) only answers the root path
//!
//! The single highest-scoring route wins. A tie at the top is reported as
//! [`RouteError::Ambiguous`] instead of being resolved silently.
//!
//! ## Path Normalization
//!
//! Patterns and request paths go through the same normalization:
//! - Trailing slashes: `/path/` → `/path`
//! - Double slashes: `/path//to` → `/path/to`
//! - Backslashes: `\path\to` → `/path/to`
//!
//! ## Example
//!
//! ```
//! use tempest_router::{Path, Router};
//!
//! let mut router = Router::new();
//! router
//!     .register([("/users/new", "Users:create"), ("/users/[id]", "Users:show")])
//!     .unwrap();
//!
//! let route_match = router.resolve(&Path::parse("/users/123")).unwrap().unwrap();
//! assert_eq!(route_match.params.get("id"), Some(&"123".to_string()));
//! assert_eq!(route_match.route.handler.method, "show");
//! ```

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// Module Declarations
// ============================================================================

pub mod path;
pub mod route;

pub use path::{is_valid_path, normalize_path, Path};
pub use route::pattern::{classify_segment, Segment};
pub use route::{HandlerSpec, Route, DEFAULT_METHOD, DYNAMIC_SCORE, LITERAL_SCORE, ROOT_SCORE};

// ============================================================================
// Core Types
// ============================================================================

/// Errors raised while registering or resolving routes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Handler spec is not `Class` or `Class:method`
    #[error("invalid handler spec '{0}', expected 'Class' or 'Class:method'")]
    InvalidHandler(String),

    /// Two or more routes share the top score for a request
    #[error("ambiguous request '{path}': {} routes tie at score {score} ({})", .candidates.len(), .candidates.join(", "))]
    Ambiguous {
        path: String,
        score: usize,
        candidates: Vec<String>,
    },
}

/// Result of matching a route against a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The matched route
    pub route: Route,
    /// Extracted parameters from the path
    pub params: HashMap<String, String>,
    /// Score the route reached
    pub score: usize,
}

/// Where a router is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchState {
    Unregistered,
    Registered,
    Matched(RouteMatch),
    Unmatched,
    Ambiguous(Vec<Route>),
}

/// Holds the declared routes and the outcome of the last resolution
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
    state: MatchState,
}

// ============================================================================
// Router Implementation
// ============================================================================

impl Router {
    /// Creates an empty router
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            state: MatchState::Unregistered,
        }
    }

    /// Creates a router from already parsed routes
    ///
    /// # Examples
    ///
    /// ```
    /// use tempest_router::{Route, Router};
    ///
    /// let routes = vec![Route::parse("/", "Home").unwrap()];
    /// let router = Router::with_routes(routes);
    /// assert_eq!(router.routes().len(), 1);
    /// ```
    pub fn with_routes<I>(routes: I) -> Self
    where
        I: IntoIterator<Item = Route>,
    {
        let mut router = Self::new();
        router.routes.extend(routes);
        router.state = MatchState::Registered;
        router
    }

    /// Registers routes from `(pattern, handler spec)` pairs
    ///
    /// Fails on the first malformed handler spec; routes before it stay
    /// registered.
    pub fn register<I, P, S>(&mut self, routes: I) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<str>,
        S: AsRef<str>,
    {
        for (pattern, spec) in routes {
            let route = Route::parse(pattern.as_ref(), spec.as_ref())?;
            debug!(route = %route, "registered route");
            self.routes.push(route);
        }
        self.state = MatchState::Registered;
        Ok(self)
    }

    /// Finds the best route for a path
    ///
    /// Returns `Ok(None)` when nothing matches and `Err(RouteError::Ambiguous)`
    /// when the top score is shared. The outcome is also kept in
    /// [`Router::state`] and, on success, [`Router::get_match`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tempest_router::{Path, Router, RouteError};
    ///
    /// let mut router = Router::new();
    /// router.register([("/[a]", "One"), ("/[b]", "Two")]).unwrap();
    ///
    /// let result = router.resolve(&Path::parse("/x"));
    /// assert!(matches!(result, Err(RouteError::Ambiguous { .. })));
    /// ```
    pub fn resolve(&mut self, path: &Path) -> Result<Option<&RouteMatch>, RouteError> {
        let mut by_score: BTreeMap<usize, Vec<(&Route, HashMap<String, String>)>> = BTreeMap::new();

        for route in &self.routes {
            if let Some((score, params)) = route.score(path) {
                debug!(pattern = %route.pattern, score, "route candidate");
                by_score.entry(score).or_default().push((route, params));
            }
        }

        let top = by_score.into_iter().next_back().filter(|(score, _)| *score > 0);

        let outcome = match top {
            None => {
                debug!(path = %path, "no route matched");
                Ok(MatchState::Unmatched)
            }
            Some((score, mut group)) if group.len() == 1 => {
                let (route, params) = group.remove(0);
                debug!(path = %path, pattern = %route.pattern, score, "route matched");
                Ok(MatchState::Matched(RouteMatch {
                    route: route.clone(),
                    params,
                    score,
                }))
            }
            Some((score, group)) => {
                let tied: Vec<Route> = group.into_iter().map(|(route, _)| route.clone()).collect();
                let error = RouteError::Ambiguous {
                    path: path.to_string(),
                    score,
                    candidates: tied.iter().map(ToString::to_string).collect(),
                };
                warn!(%error, "ambiguous request");
                self.state = MatchState::Ambiguous(tied);
                Err(error)
            }
        };

        self.state = outcome?;
        Ok(self.get_match())
    }

    /// Returns the match computed by the last successful [`Router::resolve`]
    pub fn get_match(&self) -> Option<&RouteMatch> {
        match &self.state {
            MatchState::Matched(route_match) => Some(route_match),
            _ => None,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Returns all registered routes in registration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
