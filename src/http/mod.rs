//! HTTP protocol implementation.
//!
//! Requests are rebuilt from bytes that may arrive over any number of socket
//! reads; responses are serialized into exact wire bytes. One request is
//! served per connection.
//!
//! # Architecture
//!
//! - **`connection`**: Per-socket state machine driven by the multiplexer
//! - **`parser`**: Line splitting, request-line and header parsing
//! - **`progress`**: Header-end and Content-Length completion tracking
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes responses and drives partial writes
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate bytes until the request is complete
//!        └──────┬──────┘   (or the read timeout expires)
//!               │ Request routed
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Flush the serialized response
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ← Removed from the tracked set
//!        └──────────────────┘
//! ```
//!
//! A peer hang-up, an I/O error or a malformed request line jumps straight
//! to `Closed` without a response.

pub mod connection;
pub mod parser;
pub mod progress;
pub mod request;
pub mod response;
pub mod writer;
