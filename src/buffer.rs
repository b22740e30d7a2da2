//! Growable byte accumulator.
//!
//! Used to assemble inbound socket data and outbound serialized responses.
//! Appends never truncate: when an append would reach or exceed the current
//! capacity the backing store grows to `size + capacity + appended + 1`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("unable to grow buffer from {capacity} to {requested} bytes")]
    Allocation { capacity: usize, requested: usize },
}

#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl ByteBuffer {
    /// Creates an empty buffer with `capacity` bytes reserved up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `bytes`, growing the backing store first if needed.
    ///
    /// Returns the number of bytes written.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize, BufferError> {
        let size = self.data.len();
        if size + bytes.len() >= self.capacity {
            let requested = size + self.capacity + bytes.len() + 1;
            self.data
                .try_reserve_exact(requested - size)
                .map_err(|_| BufferError::Allocation {
                    capacity: self.capacity,
                    requested,
                })?;
            self.capacity = requested;
        }

        self.data.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical capacity under the growth policy.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
