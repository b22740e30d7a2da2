use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use mio::net::TcpStream;
use thiserror::Error;

use crate::buffer::{BufferError, ByteBuffer};
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::progress::RequestProgress;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::{ResponseWriter, SerializeError};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// What one receive cycle produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The socket drained but the request is still incomplete.
    Pending,
    /// The header block and the declared body are buffered.
    Complete,
    /// The peer closed before a complete request arrived.
    Closed,
}

pub enum ConnectionState {
    Reading,
    Writing(ResponseWriter),
    Closed,
}

/// One client socket: its receive buffer, parse progress and, once a
/// response exists, the pending write.
pub struct Connection<S = TcpStream> {
    stream: S,
    peer: SocketAddr,
    buffer: ByteBuffer,
    progress: RequestProgress,
    state: ConnectionState,
    last_activity: Instant,
}

impl<S: Read + Write> Connection<S> {
    pub fn new(stream: S, peer: SocketAddr, initial_capacity: usize) -> Self {
        Self {
            stream,
            peer,
            buffer: ByteBuffer::with_capacity(initial_capacity),
            progress: RequestProgress::new(),
            state: ConnectionState::Reading,
            last_activity: Instant::now(),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn is_reading(&self) -> bool {
        matches!(self.state, ConnectionState::Reading)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ConnectionState::Closed)
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn progress(&self) -> &RequestProgress {
        &self.progress
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Reads until the socket would block, the request completes or the
    /// peer goes away.
    ///
    /// Completion is checked against the whole accumulated buffer after
    /// every read.
    pub fn receive(&mut self, scratch: &mut [u8]) -> Result<ReadOutcome, ConnectionError> {
        loop {
            match self.stream.read(scratch) {
                Ok(0) => return Ok(ReadOutcome::Closed),
                Ok(n) => {
                    self.buffer.append(&scratch[..n])?;
                    self.last_activity = Instant::now();
                    if self.progress.observe(self.buffer.as_slice())? {
                        return Ok(ReadOutcome::Complete);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(ReadOutcome::Pending),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Parses whatever has been buffered and releases the buffer.
    pub fn take_request(&mut self) -> Result<Request, ParseError> {
        let buffer = std::mem::take(&mut self.buffer);
        parse_http_request(buffer.as_slice())
    }

    /// Serializes `response` and moves to the writing state.
    pub fn start_response(
        &mut self,
        response: &Response,
        initial_capacity: usize,
    ) -> Result<(), SerializeError> {
        let writer = ResponseWriter::new(response, initial_capacity)?;
        self.state = ConnectionState::Writing(writer);
        self.last_activity = Instant::now();
        Ok(())
    }

    /// Pushes pending response bytes. Returns `true` once the response is
    /// fully written, after which the connection is closed.
    pub fn flush(&mut self) -> io::Result<bool> {
        let ConnectionState::Writing(writer) = &mut self.state else {
            return Ok(self.is_closed());
        };

        let before = writer.remaining();
        let done = writer.write_to(&mut self.stream)?;
        if writer.remaining() != before {
            self.last_activity = Instant::now();
        }
        if done {
            self.state = ConnectionState::Closed;
        }
        Ok(done)
    }

    pub fn close(&mut self) {
        self.state = ConnectionState::Closed;
    }
}
