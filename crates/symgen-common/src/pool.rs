//! Scratch buffer pooling for parallel emission.

use std::sync::Mutex;

/// A take/return pool of reusable values.
///
/// Workers take a value (falling back to the factory when the pool is empty),
/// use it as scratch space, and return it when done. The pool never blocks a
/// worker on availability and is bounded in practice by the worker count.
pub struct BufferPool<T> {
    items: Mutex<Vec<T>>,
    make: fn() -> T,
}

impl<T> BufferPool<T> {
    pub fn new(make: fn() -> T) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            make,
        }
    }

    pub fn take(&self) -> T {
        self.items
            .lock()
            .expect("buffer pool lock poisoned")
            .pop()
            .unwrap_or_else(self.make)
    }

    pub fn put(&self, item: T) {
        self.items
            .lock()
            .expect("buffer pool lock poisoned")
            .push(item);
    }
}

impl BufferPool<String> {
    /// Pool of string buffers; returned buffers are cleared before reuse.
    pub fn strings() -> Self {
        Self::new(String::new)
    }

    pub fn take_cleared(&self) -> String {
        let mut buffer = self.take();
        buffer.clear();
        buffer
    }
}
