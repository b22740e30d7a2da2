//! Lantern - a small readiness-driven HTTP/1.1 static file server.
//!
//! One thread multiplexes every socket through `mio`, assembles requests
//! from raw bytes, and answers them from a route table and a static file
//! catalogue built once at startup.

pub mod buffer;
pub mod collections;
pub mod config;
pub mod http;
pub mod router;
pub mod server;
