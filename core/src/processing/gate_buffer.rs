/// Per-ray array that keeps its allocation from ray to ray.
///
/// The current length tracks the gate count of the ray being processed;
/// the backing storage only grows, so rays of equal or smaller size
/// never reallocate.
#[derive(Debug, Clone, Default)]
pub struct GateBuffer<T> {
    data: Vec<T>,
    len: usize,
}

impl<T: Copy> GateBuffer<T> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(n_gates: usize) -> Self {
        Self {
            data: Vec::with_capacity(n_gates),
            len: 0,
        }
    }

    /// Set the length to `n_gates` and fill every gate with `init`.
    pub fn prepare(&mut self, n_gates: usize, init: T) {
        if self.data.len() < n_gates {
            self.data.resize(n_gates, init);
        }
        self.len = n_gates;
        self.data[..n_gates].fill(init);
    }

    /// Replace the contents with `src`, length included.
    pub fn load(&mut self, src: &[T]) {
        if self.data.len() < src.len() {
            // contents are overwritten below, any fill value will do
            self.data.resize(src.len(), src[0]);
        }
        self.len = src.len();
        self.data[..self.len].copy_from_slice(src);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[..self.len]
    }

    /// Drop the storage entirely.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.len = 0;
    }
}
