/// Pattern parsing for route segments
///
/// Pure parsing of route patterns into typed segments.

/// One segment of a route pattern
///
/// # Examples
///
/// ```
/// use tempest_router::route::pattern::{classify_segment, Segment};
///
/// assert_eq!(classify_segment("users"), Segment::Literal("users".to_string()));
/// assert_eq!(classify_segment("[id]"), Segment::Dynamic("id".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Must equal the request segment verbatim
    Literal(String),
    /// Captures the request segment under this name
    Dynamic(String),
}

impl Segment {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Segment::Dynamic(_))
    }

    /// Source form of the segment (`users` or `[id]`)
    pub fn as_pattern(&self) -> String {
        match self {
            Segment::Literal(text) => text.clone(),
            Segment::Dynamic(name) => format!("[{}]", name),
        }
    }
}

/// Classifies a segment into a pattern type (pure function)
///
/// A segment is dynamic when it is wrapped in square brackets. The captured
/// name is the segment with every leading and trailing bracket trimmed, so
/// `[[id]]` also captures `id`.
pub fn classify_segment(segment: &str) -> Segment {
    if segment.len() >= 2 && segment.starts_with('[') && segment.ends_with(']') {
        let name = segment.trim_matches(|c| c == '[' || c == ']');
        Segment::Dynamic(name.to_string())
    } else {
        Segment::Literal(segment.to_string())
    }
}

/// Splits a normalized pattern into typed segments
pub fn parse_segments(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(classify_segment)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literal() {
        assert_eq!(classify_segment("about"), Segment::Literal("about".into()));
        // A lone bracket is not a dynamic segment
        assert_eq!(classify_segment("["), Segment::Literal("[".into()));
        assert_eq!(classify_segment("[id"), Segment::Literal("[id".into()));
    }

    #[test]
    fn test_classify_dynamic() {
        assert_eq!(classify_segment("[id]"), Segment::Dynamic("id".into()));
        assert_eq!(classify_segment("[[slug]]"), Segment::Dynamic("slug".into()));
        assert!(classify_segment("[id]").is_dynamic());
    }

    #[test]
    fn test_parse_segments() {
        let segments = parse_segments("/users/[id]/edit");
        assert_eq!(
            segments,
            vec![
                Segment::Literal("users".into()),
                Segment::Dynamic("id".into()),
                Segment::Literal("edit".into()),
            ]
        );
        assert!(parse_segments("/").is_empty());
    }

    #[test]
    fn test_as_pattern_round_trip() {
        assert_eq!(Segment::Dynamic("id".into()).as_pattern(), "[id]");
        assert_eq!(Segment::Literal("users".into()).as_pattern(), "users");
    }
}
