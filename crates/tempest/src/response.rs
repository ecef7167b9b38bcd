use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;

// ============================================================================
// Content types
// ============================================================================

/// Content type for a request format; unknown formats are served as HTML
pub fn content_type_for(format: &str) -> &'static str {
    match format {
        "json" => "application/json",
        "txt" | "text" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        _ => "text/html; charset=utf-8",
    }
}

fn insert_header(headers: &mut HeaderMap, key: &str, value: &str) {
    if let (Ok(name), Ok(val)) = (
        HeaderName::from_bytes(key.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        headers.insert(name, val);
    }
}

// ============================================================================
// Response
// ============================================================================

/// Transport-neutral response produced by the kernel
///
/// ```
/// use tempest::Response;
/// use axum::http::StatusCode;
///
/// let response = Response::ok("<h1>Hi</h1>").with_format("html");
/// assert_eq!(response.status, StatusCode::OK);
/// assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    pub fn internal_error(body: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// 303 See Other to `location`
    pub fn redirect(location: &str) -> Self {
        Self::new(StatusCode::SEE_OTHER, "").header(LOCATION.as_str(), location)
    }

    /// Add a custom response header
    pub fn header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        insert_header(&mut self.headers, key.as_ref(), value.as_ref());
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set the content type from a request format unless one is already set
    pub fn with_format(mut self, format: &str) -> Self {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type_for(format)));
        }
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.headers, self.body).into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================
