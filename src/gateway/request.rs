//! Request and response values flowing through the gateway
//!
//! Both types are plain owned values. Interceptors receive them by value and
//! return a (possibly modified) copy, so nothing is mutated in place.

use std::collections::BTreeMap;

use serde_json::Value;

/// HTTP methods supported by the backend API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the uppercase method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One logical request against the API, relative to the configured base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API prefix (e.g. `players/42`)
    pub path: String,
    /// Flat query parameters, serialized in key order
    pub query: BTreeMap<String, String>,
    /// Extra headers; names are stored lowercase
    pub headers: BTreeMap<String, String>,
    /// JSON body for POST/PUT/PATCH
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Adds a query parameter, replacing any previous value for the key
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Adds a query parameter only when a value is present
    pub fn with_optional_query<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    /// Sets a header; the name is normalized to lowercase
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Key used by the response cache: method, path and sorted query
    pub fn cache_key(&self) -> String {
        if self.query.is_empty() {
            return format!("{} {}", self.method.as_str(), self.path);
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        format!("{} {}?{}", self.method.as_str(), self.path, query.join("&"))
    }
}

/// Decoded response body, selected by the response content type
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Empty,
}

impl Payload {
    /// Decodes raw bytes using the content type to choose JSON or text
    ///
    /// A JSON content type whose body does not parse is kept as text so the
    /// typed decode step can report it.
    pub fn from_bytes(content_type: Option<&str>, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Payload::Empty;
        }

        let is_json = content_type
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("application/json") || ct.contains("+json")
            })
            .unwrap_or(false);

        if is_json {
            if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
                return Payload::Json(value);
            }
        }

        Payload::Text(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Extracts a human-readable message from the backend's error envelopes
    ///
    /// Django REST responses carry one of `message`, `detail` or `error`.
    pub fn message(&self) -> Option<String> {
        match self {
            Payload::Json(value) => ["message", "detail", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            Payload::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.chars().take(200).collect())
                }
            }
            Payload::Empty => None,
        }
    }
}

/// A received response after content-type decoding
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Response headers with lowercase names
    pub headers: BTreeMap<String, String>,
    pub body: Payload,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_key_without_query() {
        let request = ApiRequest::get("teams");
        assert_eq!(request.cache_key(), "GET teams");
    }

    #[test]
    fn test_cache_key_sorts_query_parameters() {
        let a = ApiRequest::get("players")
            .with_query("position", 3)
            .with_query("page", 2);
        let b = ApiRequest::get("players")
            .with_query("page", 2)
            .with_query("position", 3);

        assert_eq!(a.cache_key(), "GET players?page=2&position=3");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_optional_query_skips_none() {
        let request = ApiRequest::get("players")
            .with_optional_query("position", None::<u8>)
            .with_optional_query("search", Some("salah"));

        assert_eq!(request.query.len(), 1);
        assert_eq!(request.query.get("search").map(String::as_str), Some("salah"));
    }

    #[test]
    fn test_header_names_are_lowercased() {
        let request = ApiRequest::get("teams").with_header("X-Trace-Id", "abc");
        assert_eq!(request.headers.get("x-trace-id").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_payload_json_by_content_type() {
        let payload = Payload::from_bytes(Some("application/json; charset=utf-8"), br#"{"a":1}"#);
        assert_eq!(payload, Payload::Json(json!({"a": 1})));
    }

    #[test]
    fn test_payload_problem_json_is_json() {
        let payload = Payload::from_bytes(Some("application/problem+json"), br#"{"detail":"x"}"#);
        assert!(payload.as_json().is_some());
    }

    #[test]
    fn test_payload_text_when_not_json() {
        let payload = Payload::from_bytes(Some("text/html"), b"<h1>Bad Gateway</h1>");
        assert_eq!(payload, Payload::Text("<h1>Bad Gateway</h1>".to_string()));
    }

    #[test]
    fn test_payload_invalid_json_falls_back_to_text() {
        let payload = Payload::from_bytes(Some("application/json"), b"{not json");
        assert_eq!(payload, Payload::Text("{not json".to_string()));
    }

    #[test]
    fn test_payload_empty_body() {
        assert_eq!(Payload::from_bytes(Some("application/json"), b""), Payload::Empty);
    }

    #[test]
    fn test_payload_message_from_django_envelopes() {
        let detail = Payload::Json(json!({"detail": "Not found."}));
        let error = Payload::Json(json!({"error": "invalid_operation"}));
        let message = Payload::Json(json!({"message": "Team not found", "error": "x"}));

        assert_eq!(detail.message().as_deref(), Some("Not found."));
        assert_eq!(error.message().as_deref(), Some("invalid_operation"));
        assert_eq!(message.message().as_deref(), Some("Team not found"));
        assert_eq!(Payload::Empty.message(), None);
    }

    #[test]
    fn test_response_success_range() {
        let mut response = ApiResponse {
            status: 204,
            headers: BTreeMap::new(),
            body: Payload::Empty,
        };
        assert!(response.is_success());
        response.status = 301;
        assert!(!response.is_success());
    }
}
