//! Response model with duplication support for store-then-return.

use std::collections::HashMap;

use http::StatusCode;

/// A response from the network or the cache.
///
/// Cloneable so a strategy can store one copy in the cache and return the
/// other, the same way a platform response is duplicated before its body is
/// consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    opaque: bool,
}

impl FetchResponse {
    /// Create a 200 response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    /// Create a response with an explicit status.
    pub fn with_status(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
            opaque: false,
        }
    }

    /// Create an opaque cross-origin response.
    ///
    /// Opaque responses carry no readable status or body; the only available
    /// signal is that the fetch resolved at all. `is_ok` is always false for
    /// them, so they are never cached.
    pub fn opaque() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HashMap::new(),
            body: Vec::new(),
            opaque: true,
        }
    }

    /// Synthetic 503 placeholder served when both network and cache fail.
    pub fn service_unavailable(message: &str) -> Self {
        Self::with_status(StatusCode::SERVICE_UNAVAILABLE, message.as_bytes())
    }

    /// Attach a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the response has a readable success status.
    pub fn is_ok(&self) -> bool {
        !self.opaque && self.status.is_success()
    }

    /// Whether this is an opaque cross-origin response.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Response headers.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Response body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Response body as UTF-8, lossy.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response() {
        let resp = FetchResponse::ok("hello");
        assert!(resp.is_ok());
        assert_eq!(resp.body_text(), "hello");
    }

    #[test]
    fn test_service_unavailable() {
        let resp = FetchResponse::service_unavailable("Offline - Content not available");
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!resp.is_ok());
    }

    #[test]
    fn test_opaque_is_never_ok() {
        let resp = FetchResponse::opaque();
        assert!(resp.is_opaque());
        assert!(!resp.is_ok());
    }

    #[test]
    fn test_clone_preserves_body() {
        let resp = FetchResponse::ok("body").with_header("content-type", "text/plain");
        let copy = resp.clone();
        assert_eq!(copy, resp);
        assert_eq!(copy.headers().get("content-type").unwrap(), "text/plain");
    }
}
