//! Request descriptors for the authenticated pipeline.

use std::fmt;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use dsatrack_core::Result;
use dsatrack_core::error::InvalidInputError;
use dsatrack_core::types::normalize_path;

/// A request to a protected resource.
///
/// The descriptor is owned by one call to
/// [`Session::auth_fetch`](crate::Session::auth_fetch) and is replayed as-is
/// if the first attempt is answered with `401`. The pipeline only ever
/// touches its `Authorization` header.
///
/// # Example
///
/// ```
/// use dsatrack_http::AuthRequest;
///
/// let request = AuthRequest::patch("api/users/me/update/")
///     .json(&serde_json::json!({"first_name": "Ada"}))
///     .unwrap();
/// assert_eq!(request.path(), "/api/users/me/update/");
/// ```
#[derive(Clone)]
pub struct AuthRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl AuthRequest {
    /// Create a request with the given method and resource path.
    ///
    /// The path is normalized to a single leading `/`.
    pub fn new(method: Method, path: impl AsRef<str>) -> Self {
        Self {
            method,
            path: normalize_path(path.as_ref()),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl AsRef<str>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl AsRef<str>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl AsRef<str>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl AsRef<str>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl AsRef<str>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header, replacing any previous value for the same name.
    ///
    /// An `Authorization` header set here is always replaced by the session's
    /// bearer token.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a header from strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not valid in HTTP.
    pub fn try_header(self, name: &str, value: &str) -> Result<Self> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| InvalidInputError::Header {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| InvalidInputError::Header {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.header(header_name, header_value))
    }

    /// Set a JSON body. A `Content-Type` header is added unless one is
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| InvalidInputError::Body {
            reason: e.to_string(),
        })?;
        self.headers
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/json"));
        self.body = Some(bytes);
        Ok(self)
    }

    /// Set a raw body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the normalized resource path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the caller-supplied headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body bytes, if any.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

// Bodies may carry passwords; only show their size.
impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::ACCEPT;

    #[test]
    fn path_is_normalized() {
        assert_eq!(AuthRequest::get("api/x").path(), "/api/x");
        assert_eq!(AuthRequest::get("//api/x").path(), "/api/x");
        assert_eq!(AuthRequest::get("").path(), "/");
    }

    #[test]
    fn json_sets_content_type_once() {
        let request = AuthRequest::post("/api/x")
            .header(CONTENT_TYPE, HeaderValue::from_static("application/vnd.api+json"))
            .json(&serde_json::json!({"a": 1}))
            .unwrap();

        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/vnd.api+json"
        );
        assert_eq!(request.body_bytes().unwrap(), br#"{"a":1}"#);
    }

    #[test]
    fn try_header_rejects_bad_values() {
        assert!(AuthRequest::get("/").try_header("x-ok", "fine").is_ok());
        assert!(AuthRequest::get("/").try_header("bad header", "v").is_err());
        assert!(AuthRequest::get("/").try_header("x-bad", "line\nbreak").is_err());
    }

    #[test]
    fn debug_hides_body() {
        let request = AuthRequest::post("/api/users/me/password/")
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&serde_json::json!({"new_password": "hunter22"}))
            .unwrap();
        let debug = format!("{:?}", request);
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("body_len"));
    }
}
