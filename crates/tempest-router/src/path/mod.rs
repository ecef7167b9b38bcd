/// Path value object plus validation and normalization helpers
///
/// The free functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;
use std::fmt;

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
/// - Must not be empty
///
/// # Examples
///
/// ```
/// use tempest_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/users/123"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("about")); // Missing leading /
/// assert!(!is_valid_path("/about/")); // Trailing /
/// assert!(!is_valid_path("/about//page")); // Double //
/// assert!(!is_valid_path("/about\\page")); // Backslash
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a path to canonical form
///
/// Returns `Cow::Borrowed` when input is already valid (zero allocations).
/// Returns `Cow::Owned` when normalization is needed.
///
/// - Trailing slashes: `/path/` → `/path`
/// - Double slashes: `/path//to` → `/path/to`
/// - Backslashes: `\path\to` → `/path/to`
/// - Missing leading slash: `path/to` → `/path/to`
///
/// # Examples
///
/// ```
/// use tempest_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// let path = normalize_path("/about");
/// assert!(matches!(path, Cow::Borrowed("/about")));
///
/// assert_eq!(normalize_path("\\users\\123\\"), "/users/123");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// An immutable, normalized URI path split into segments
///
/// The root path `/` has zero segments.
///
/// # Examples
///
/// ```
/// use tempest_router::Path;
///
/// let path = Path::parse("/users//42/");
/// assert_eq!(path.as_str(), "/users/42");
/// assert_eq!(path.segments(), ["users", "42"]);
/// assert_eq!(path.segment(1), Some("42"));
///
/// assert!(Path::parse("/").is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    normalized: String,
    segments: Vec<String>,
}

impl Path {
    /// Parses and normalizes a raw path string
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize_path(raw).into_owned();
        let segments = normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            normalized,
            segments,
        }
    }

    /// The normalized string form (always starts with `/`)
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segment at position `index`, if any
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// True for `/` (zero segments)
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_path() {
        assert!(is_valid_path("/"));
        assert!(is_valid_path("/about"));
        assert!(is_valid_path("/blog/posts/hello-world"));

        assert!(!is_valid_path(""));
        assert!(!is_valid_path("about"));
        assert!(!is_valid_path("/about/"));
        assert!(!is_valid_path("/about//page"));
        assert!(!is_valid_path("/about\\page"));
    }

    #[test]
    fn test_normalize_path_valid_is_borrowed() {
        let path = normalize_path("/about");
        assert!(matches!(path, Cow::Borrowed("/about")));

        let path = normalize_path("/");
        assert!(matches!(path, Cow::Borrowed("/")));
    }

    #[test]
    fn test_normalize_path_repairs_mistakes() {
        assert_eq!(normalize_path("/about/"), "/about");
        assert_eq!(normalize_path("/path///to////page"), "/path/to/page");
        assert_eq!(normalize_path("\\users\\123"), "/users/123");
        assert_eq!(normalize_path("users/123"), "/users/123");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("///"), "/");
    }

    #[test]
    fn test_segment_count_matches_components() {
        assert_eq!(Path::parse("/").segment_count(), 0);
        assert_eq!(Path::parse("").segment_count(), 0);
        assert_eq!(Path::parse("/a").segment_count(), 1);
        assert_eq!(Path::parse("/a/b/c/").segment_count(), 3);
        assert_eq!(Path::parse("a//b").segment_count(), 2);
    }

    #[test]
    fn test_segment_access() {
        let path = Path::parse("/users/7/edit");
        assert_eq!(path.segment(0), Some("users"));
        assert_eq!(path.segment(2), Some("edit"));
        assert_eq!(path.segment(3), None);
        assert_eq!(path.to_string(), "/users/7/edit");
    }
}
