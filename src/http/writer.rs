use std::io::{self, Write};

use thiserror::Error;

use crate::buffer::{BufferError, ByteBuffer};
use crate::http::response::Response;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("response has no Content-Length field")]
    MissingContentLength,
    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),
    #[error("Content-Length {declared} exceeds body of {available} bytes")]
    BodyTooShort { declared: usize, available: usize },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Writes the wire form of `resp` into `out`.
///
/// Status line, `Date` line, header fields in container order, a blank
/// line, then exactly Content-Length bytes of body. Returns the total size
/// of `out`.
pub fn serialize_response(resp: &Response, out: &mut ByteBuffer) -> Result<usize, SerializeError> {
    let declared = resp
        .headers
        .get("Content-Length")
        .ok_or(SerializeError::MissingContentLength)?;
    let declared: usize = declared
        .trim()
        .parse()
        .map_err(|_| SerializeError::InvalidContentLength(declared.clone()))?;
    if declared > resp.body.len() {
        return Err(SerializeError::BodyTooShort {
            declared,
            available: resp.body.len(),
        });
    }

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    out.append(status_line.as_bytes())?;
    out.append(format!("Date: {}\r\n", resp.date).as_bytes())?;

    for (k, v) in resp.headers.iter() {
        out.append(k.as_bytes())?;
        out.append(b": ")?;
        out.append(v.as_bytes())?;
        out.append(b"\r\n")?;
    }

    out.append(b"\r\n")?;
    out.append(&resp.body[..declared])?;

    Ok(out.len())
}

/// A serialized response and how much of it has reached the socket.
#[derive(Debug)]
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, initial_capacity: usize) -> Result<Self, SerializeError> {
        let mut out = ByteBuffer::with_capacity(initial_capacity);
        serialize_response(response, &mut out)?;
        Ok(Self {
            buffer: out.into_vec(),
            written: 0,
        })
    }

    /// Writes as much as the sink accepts.
    ///
    /// Returns `Ok(true)` when everything is written and `Ok(false)` when the
    /// sink would block with bytes still pending.
    pub fn write_to<W: Write>(&mut self, sink: &mut W) -> io::Result<bool> {
        while self.written < self.buffer.len() {
            match sink.write(&self.buffer[self.written..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "connection closed while writing",
                    ));
                }
                Ok(n) => self.written += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(true)
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.written
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}
