//! Socket bootstrap and the connection multiplexer.

pub mod listener;
pub mod multiplexer;

pub use listener::{BindError, bind, resolve};
pub use multiplexer::{Multiplexer, ShutdownHandle};
