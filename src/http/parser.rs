use thiserror::Error;
use tracing::warn;

use crate::http::request::{HeaderFields, Method, Request};

/// Longest version token accepted, `HTTP/XX.XX`.
pub const MAX_VERSION_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("request contains no request line")]
    Empty,
    #[error("request line is not valid UTF-8")]
    InvalidEncoding,
    #[error("request line has {0} tokens, expected 3")]
    InvalidRequestLine(usize),
    #[error("unsupported method {0:?}")]
    InvalidMethod(String),
    #[error("version token {0:?} is longer than {MAX_VERSION_LEN} bytes")]
    InvalidVersion(String),
    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),
}

/// The three tokens of a request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub path: String,
    pub version: String,
}

/// Splits `buf` into lines terminated by CRLF.
///
/// The final line may be unterminated. Only CR immediately followed by LF
/// ends a line; a lone CR or LF stays part of the line. Run this over the
/// whole accumulated buffer, never over a single read, so a terminator
/// split across two reads is still seen.
pub fn split_lines(buf: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut saw_cr = false;

    for (i, &byte) in buf.iter().enumerate() {
        if saw_cr && byte == b'\n' {
            lines.push(&buf[start..i - 1]);
            start = i + 1;
            saw_cr = false;
            continue;
        }
        saw_cr = byte == b'\r';
    }

    if start < buf.len() {
        lines.push(&buf[start..]);
    }
    lines
}

/// Offset just past the blank line ending the header block.
pub fn header_block_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Parses `METHOD SP target SP version`.
///
/// Runs of whitespace separate tokens; leading and trailing runs are
/// ignored. Exactly three tokens are required.
pub fn parse_request_line(line: &[u8]) -> Result<RequestLine, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
    let tokens: Vec<&str> = line.split_ascii_whitespace().collect();

    let &[method, path, version] = tokens.as_slice() else {
        return Err(ParseError::InvalidRequestLine(tokens.len()));
    };

    let method =
        Method::from_str(method).ok_or_else(|| ParseError::InvalidMethod(method.to_string()))?;

    if version.len() > MAX_VERSION_LEN {
        return Err(ParseError::InvalidVersion(version.to_string()));
    }

    Ok(RequestLine {
        method,
        path: path.to_string(),
        version: version.to_string(),
    })
}

fn trim_ows(value: &str) -> &str {
    value.trim_matches(|c| c == ' ' || c == '\t')
}

/// Parses `name: value` lines into `fields` up to the first empty line.
///
/// Malformed lines are logged and skipped. A repeated name overwrites the
/// earlier value. Returns the number of distinct fields stored.
pub fn parse_header_fields(lines: &[&[u8]], fields: &mut HeaderFields) -> usize {
    store_header_fields(lines, fields, true)
}

fn store_header_fields(lines: &[&[u8]], fields: &mut HeaderFields, report: bool) -> usize {
    for (index, raw) in lines.iter().enumerate() {
        if raw.is_empty() {
            break;
        }

        let Ok(line) = std::str::from_utf8(raw) else {
            if report {
                warn!(line = index + 1, "Skipping header line with invalid UTF-8");
            }
            continue;
        };

        let Some((key, value)) = line.split_once(':') else {
            if report {
                warn!(line = index + 1, content = %line, "Skipping header line without colon");
            }
            continue;
        };

        if key.is_empty() {
            if report {
                warn!(line = index + 1, content = %line, "Skipping header line with empty name");
            }
            continue;
        }

        fields.set(key, trim_ows(value).to_string());
    }

    fields.len()
}

fn parse_length(value: &str) -> Result<usize, ParseError> {
    let value = trim_ows(value);
    value
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidContentLength(value.to_string()))
}

/// Content-Length from parsed fields; 0 when absent.
pub fn content_length(fields: &HeaderFields) -> Result<usize, ParseError> {
    let value = fields.get("Content-Length").or_else(|| {
        fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
            .map(|(_, v)| v)
    });

    match value {
        Some(v) => parse_length(v),
        None => Ok(0),
    }
}

/// Content-Length declared in a raw header block.
///
/// Builds the same field list the final parse does, without logging, so
/// completion and body capping always agree on the length.
pub fn declared_content_length(head: &[u8]) -> Result<usize, ParseError> {
    let lines = split_lines(head);
    let Some(first) = lines.iter().position(|l| !l.is_empty()) else {
        return Ok(0);
    };

    let mut fields = HeaderFields::new();
    store_header_fields(&lines[first + 1..], &mut fields, false);
    content_length(&fields)
}

/// Builds a [`Request`] from an accumulated receive buffer.
///
/// Without a blank line the whole buffer is treated as the header block.
/// The body is whatever follows the blank line, capped at Content-Length.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    let (head, rest) = match header_block_end(buf) {
        Some(end) => buf.split_at(end),
        None => (buf, &[][..]),
    };

    let lines = split_lines(head);
    let first = lines
        .iter()
        .position(|l| !l.is_empty())
        .ok_or(ParseError::Empty)?;

    let RequestLine {
        method,
        path,
        version,
    } = parse_request_line(lines[first])?;

    let mut headers = HeaderFields::new();
    parse_header_fields(&lines[first + 1..], &mut headers);

    let mut request = Request {
        method,
        path,
        version,
        headers,
        body: None,
    };

    let body = &rest[..rest.len().min(request.content_length()?)];
    request.body = (!body.is_empty()).then(|| body.to_vec());
    Ok(request)
}
