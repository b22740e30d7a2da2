//! Tracks how much of a request has arrived.
//!
//! The header block is complete once the blank line is seen. From then on
//! the request is complete when the bytes after the blank line cover the
//! declared Content-Length (0 when absent).

use crate::http::parser::{ParseError, declared_content_length, header_block_end};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestProgress {
    header_end: Option<usize>,
    expected_body: usize,
}

impl RequestProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-examines the accumulated buffer after new bytes were appended.
    ///
    /// Returns `true` once the whole request is present.
    pub fn observe(&mut self, buf: &[u8]) -> Result<bool, ParseError> {
        let header_end = match self.header_end {
            Some(end) => end,
            None => {
                let Some(end) = header_block_end(buf) else {
                    return Ok(false);
                };
                self.expected_body = declared_content_length(&buf[..end])?;
                self.header_end = Some(end);
                end
            }
        };

        Ok(buf.len() - header_end >= self.expected_body)
    }

    pub fn header_complete(&self) -> bool {
        self.header_end.is_some()
    }

    pub fn expected_body(&self) -> usize {
        self.expected_body
    }

    /// Body bytes present in a buffer of `buffered` bytes.
    pub fn body_received(&self, buffered: usize) -> usize {
        self.header_end.map_or(0, |end| buffered.saturating_sub(end))
    }
}
