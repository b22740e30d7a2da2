use std::fmt;

use crate::collections::AssocList;
use crate::http::parser::{self, ParseError};

/// Header fields keyed by field name, most recently set first.
pub type HeaderFields = AssocList<String>;

/// HTTP request methods.
///
/// The nine methods a request line may carry. Anything else is rejected
/// while parsing the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// PUT - Replace a resource
    PUT,
    /// POST - Create or submit data
    POST,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// DELETE - Delete a resource
    DELETE,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// TRACE - Loop-back test
    TRACE,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            "PUT" => Some(Method::PUT),
            "POST" => Some(Method::POST),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            "CONNECT" => Some(Method::CONNECT),
            "OPTIONS" => Some(Method::OPTIONS),
            "TRACE" => Some(Method::TRACE),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::PUT => "PUT",
            Method::POST => "POST",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed HTTP request.
///
/// Owns all of its parts, so the receive buffer it was parsed from can be
/// dropped right after parsing.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target exactly as sent (e.g., "/index.html")
    pub path: String,
    /// HTTP version token (typically "HTTP/1.1")
    pub version: String,
    /// Request header fields
    pub headers: HeaderFields,
    /// Body bytes that arrived after the header block, if any
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Retrieves a header value by exact field name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// The declared body length; 0 when absent, an error when not a number.
    pub fn content_length(&self) -> Result<usize, ParseError> {
        parser::content_length(&self.headers)
    }

    /// The path with any `?query` or `#fragment` suffix removed.
    pub fn resource_path(&self) -> &str {
        let end = self.path.find(['?', '#']).unwrap_or(self.path.len());
        &self.path[..end]
    }
}
