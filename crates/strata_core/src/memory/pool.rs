//! # Resource Pool
//!
//! Growable free-list for objects that are expensive to create and cheap to
//! recycle (chunk render instances, instance batches).

/// A free-list pool that recycles released objects.
///
/// Unlike a fixed-capacity allocator, this pool grows on demand: acquiring
/// from an empty pool creates a fresh object instead of failing. Objects are
/// never created while a released one is waiting, so the number of objects
/// ever created is bounded by the peak number simultaneously in use.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned by exactly one manager.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: ResourcePool<Vec<f32>> = ResourcePool::new();
///
/// let (buffer, reused) = pool.acquire_or_else(Vec::new);
/// assert!(!reused);
///
/// pool.release(buffer);
/// let (_, reused) = pool.acquire_or_else(Vec::new);
/// assert!(reused);
/// ```
#[derive(Debug)]
pub struct ResourcePool<T> {
    /// Released objects waiting for reuse.
    free_list: Vec<T>,
    /// Total objects ever created through this pool.
    allocated_count: usize,
    /// Objects currently handed out.
    in_use: usize,
    /// Historical maximum of `in_use`.
    peak_in_use: usize,
}

impl<T> ResourcePool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            free_list: Vec::new(),
            allocated_count: 0,
            in_use: 0,
            peak_in_use: 0,
        }
    }

    /// Takes a released object if one is available, otherwise creates one.
    ///
    /// Returns the object and whether it was reused from the free list.
    pub fn acquire_or_else(&mut self, create: impl FnOnce() -> T) -> (T, bool) {
        let (value, reused) = match self.free_list.pop() {
            Some(value) => (value, true),
            None => {
                self.allocated_count += 1;
                (create(), false)
            }
        };

        self.in_use += 1;
        self.peak_in_use = self.peak_in_use.max(self.in_use);

        (value, reused)
    }

    /// Returns an object to the free list.
    ///
    /// Releasing more objects than were acquired is ignored, keeping the
    /// free list bounded by the historical peak.
    pub fn release(&mut self, value: T) {
        if self.in_use == 0 {
            return;
        }
        self.in_use -= 1;
        self.free_list.push(value);
    }

    /// Number of released objects waiting for reuse.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Number of objects currently handed out.
    #[inline]
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.in_use
    }

    /// Total objects ever created.
    #[inline]
    #[must_use]
    pub const fn allocated_count(&self) -> usize {
        self.allocated_count
    }

    /// Historical maximum of objects in use at once.
    #[inline]
    #[must_use]
    pub const fn peak_in_use(&self) -> usize {
        self.peak_in_use
    }
}

impl<T> Default for ResourcePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_allocates_when_empty() {
        let mut pool: ResourcePool<u32> = ResourcePool::new();

        let (value, reused) = pool.acquire_or_else(|| 42);
        assert_eq!(value, 42);
        assert!(!reused);
        assert_eq!(pool.allocated_count(), 1);
        assert_eq!(pool.in_use(), 1);
    }

    #[test]
    fn test_pool_reuse() {
        let mut pool: ResourcePool<u32> = ResourcePool::new();

        let (first, _) = pool.acquire_or_else(|| 1);
        pool.release(first);
        assert_eq!(pool.free_count(), 1);

        let (second, reused) = pool.acquire_or_else(|| 2);
        assert!(reused);
        assert_eq!(second, 1); // Same object recycled
        assert_eq!(pool.allocated_count(), 1);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_free_list_bounded_by_peak() {
        let mut pool: ResourcePool<usize> = ResourcePool::new();

        let mut held = Vec::new();
        for i in 0..8 {
            held.push(pool.acquire_or_else(|| i).0);
        }
        for value in held.drain(..) {
            pool.release(value);
        }
        // Spurious extra release is ignored
        pool.release(99);

        assert_eq!(pool.peak_in_use(), 8);
        assert_eq!(pool.free_count(), 8);
        assert!(pool.free_count() <= pool.peak_in_use());

        // Churn never grows the pool past the peak
        for _ in 0..100 {
            let (a, _) = pool.acquire_or_else(|| 0);
            let (b, _) = pool.acquire_or_else(|| 0);
            pool.release(a);
            pool.release(b);
        }
        assert_eq!(pool.allocated_count(), 8);
    }
}
