use std::time::SystemTime;

use crate::http::request::HeaderFields;

pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP status codes the server produces.
///
/// - `Ok` (200): Request successful
/// - `NotFound` (404): Resource not found
/// - `InternalServerError` (500): A catalogued file could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Formats `time` the way the `Date` header carries it,
/// e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}

/// A complete HTTP response, built fresh for every request.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Version token written on the status line
    pub version: String,
    /// Value of the `Date` line
    pub date: String,
    /// Header fields, serialized head first
    pub headers: HeaderFields,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain")
///     .body(b"hi".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    date: Option<String>,
    headers: HeaderFields,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            date: None,
            headers: HeaderFields::new(),
            body: Vec::new(),
        }
    }

    /// Sets or replaces a header field.
    ///
    /// Fields set later are written earlier on the wire.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(key, value.into());
        self
    }

    /// Overrides the `Date` value, which otherwise is the build time.
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds a Content-Length matching the body when none was set.
    pub fn build(mut self) -> Response {
        if !self.headers.contains_key("Content-Length") {
            self.headers
                .set("Content-Length", self.body.len().to_string());
        }

        Response {
            status: self.status,
            version: HTTP_VERSION.to_string(),
            date: self
                .date
                .unwrap_or_else(|| http_date(SystemTime::now())),
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// A response carrying `body` with the given content type.
    ///
    /// Content-Length is set before Content-Type, so Content-Type is
    /// serialized first.
    pub fn with_content(status: StatusCode, content_type: &str, body: Vec<u8>) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Length", body.len().to_string())
            .header("Content-Type", content_type)
            .body(body)
            .build()
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::with_content(
            StatusCode::InternalServerError,
            "text/plain",
            b"500 Internal Server Error".to_vec(),
        )
    }
}
