//! Framework-agnostic HTTP traits used by the login handlers.
//!
//! Web frameworks implement these on newtype wrappers of their own request and
//! response types, so the handlers in `twofactor_adapters` never depend on a
//! specific framework.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  twofactor_core: HTTP traits             │
//! └──────────────┬───────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────┐
//! │  twofactor_axum: newtype wrappers        │
//! │  struct AxumRequest(request::Parts)      │
//! │  impl AuthRequest for AxumRequest { }    │
//! └──────────────┬───────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────┐
//! │  Login handlers use AuthRequest and      │
//! │  AuthResponseBuilder only                │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Responses follow the JSend convention: `success` with data, `fail` with
//! data for problems the client can fix (400), `error` with a message for
//! faults on the server side (500).

use serde_json::{Map, Value, json};

/// Read access to an incoming HTTP request.
pub trait AuthRequest {
    /// Get a header value by name.
    ///
    /// Header lookup should be case-insensitive (RFC 9110).
    /// Returns `None` if the header doesn't exist or isn't valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Get a cookie value by name.
    fn cookie(&self, name: &str) -> Option<&str>;

    /// Get the HTTP method (GET, POST, etc.)
    fn method(&self) -> &str;

    /// Get the request path
    fn path(&self) -> &str;
}

/// Builder for HTTP responses, implemented per framework.
///
/// ```ignore
/// builder
///     .status(200)
///     .cookie("session=abc; HttpOnly; SameSite=Lax; Path=/")
///     .json_body(json!({"status": "success", "data": {"login": true}}))
///     .build()
/// ```
pub trait AuthResponseBuilder: Sized {
    /// The final response type produced by this builder
    type Response;

    /// Set the HTTP status code
    fn status(self, code: u16) -> Self;

    /// Add an HTTP header
    fn header(self, name: &str, value: &str) -> Self;

    /// Add a Set-Cookie header
    ///
    /// The cookie_value should be a complete cookie string like:
    /// `"session=abc; HttpOnly; Secure; SameSite=Lax; Path=/"`
    fn cookie(self, cookie_value: &str) -> Self {
        self.header("set-cookie", cookie_value)
    }

    /// Set a JSON body with Content-Type header
    fn json_body(self, body: Value) -> Self;

    /// Build the final response
    fn build(self) -> Self::Response;
}

pub const DEFAULT_FAIL_MESSAGE: &str = "Check your input for invalid data.";
pub const DEFAULT_ERROR_MESSAGE: &str = "An internal error has occurred.";

/// JSend responses, available on every `AuthResponseBuilder`.
pub trait AuthResponseHelpers: AuthResponseBuilder {
    /// `{"status": "success", "data": ...}` with 200.
    fn jsend_success(self, data: Value) -> Self::Response {
        self.status(200)
            .json_body(json!({ "status": "success", "data": data }))
            .build()
    }

    /// `{"status": "fail", "data": ...}` with 400. Empty data is replaced by a
    /// generic hint so the client always has something to show.
    fn jsend_fail(self, data: Value) -> Self::Response {
        let data = match data {
            Value::Null => json!({ "fail": DEFAULT_FAIL_MESSAGE }),
            Value::Object(map) if map.is_empty() => json!({ "fail": DEFAULT_FAIL_MESSAGE }),
            other => other,
        };
        self.status(400)
            .json_body(json!({ "status": "fail", "data": data }))
            .build()
    }

    /// `{"status": "error", "message": ...}` with 500, plus `data` when given.
    fn jsend_error(self, message: Option<&str>, data: Option<Value>) -> Self::Response {
        let mut body = Map::new();
        body.insert("status".into(), Value::from("error"));
        body.insert(
            "message".into(),
            Value::from(message.unwrap_or(DEFAULT_ERROR_MESSAGE)),
        );
        if let Some(data) = data {
            body.insert("data".into(), data);
        }
        self.status(500).json_body(Value::Object(body)).build()
    }
}

// Blanket implementation for all AuthResponseBuilder types
impl<T: AuthResponseBuilder> AuthResponseHelpers for T {}
