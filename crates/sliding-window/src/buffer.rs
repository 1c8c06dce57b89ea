//! Fixed-Capacity Sliding Window Implementation

/// FIFO window over the last `N` items, stored inline.
///
/// Items stay contiguous and oldest-first, so the window can be handed to
/// consumers as a plain slice. When full, a push evicts index 0.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T, const N: usize> {
    /// Pre-allocated storage; only `..len` is live
    storage: [T; N],
    len: usize,
    /// Total items pushed (for statistics)
    total_pushed: usize,
}

impl<T: Copy + Default, const N: usize> SlidingWindow<T, N> {
    /// Create an empty window
    pub fn new() -> Self {
        Self {
            storage: [T::default(); N],
            len: 0,
            total_pushed: 0,
        }
    }

    /// Append an item, evicting the oldest if the window is full
    pub fn push(&mut self, item: T) {
        if N == 0 {
            return;
        }
        if self.len == N {
            self.storage.copy_within(1.., 0);
            self.storage[N - 1] = item;
        } else {
            self.storage[self.len] = item;
            self.len += 1;
        }
        self.total_pushed += 1;
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if window is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if window holds `N` items
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Window capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Live items, oldest first
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    /// The most recent `count` items, oldest first
    pub fn last(&self, count: usize) -> &[T] {
        let count = count.min(self.len);
        &self.storage[self.len - count..self.len]
    }

    /// Most recent item
    pub fn newest(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// The full window as an array, once it is full
    pub fn to_array(&self) -> Option<[T; N]> {
        self.is_full().then_some(self.storage)
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Total items pushed since creation (not reset by `clear`)
    pub fn total_pushed(&self) -> usize {
        self.total_pushed
    }

    /// Empty the window
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<T: Copy + Default, const N: usize> Default for SlidingWindow<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Copy + Default, const N: usize> IntoIterator for &'a SlidingWindow<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read() {
        let mut window: SlidingWindow<u32, 10> = SlidingWindow::new();
        for i in 0..5 {
            window.push(i * 100);
        }

        assert_eq!(window.len(), 5);
        assert!(!window.is_full());
        assert_eq!(window.as_slice(), &[0, 100, 200, 300, 400]);
        assert_eq!(window.last(3), &[200, 300, 400]);
        assert_eq!(window.newest(), Some(&400));
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut window: SlidingWindow<u32, 20> = SlidingWindow::new();
        for i in 0..25 {
            window.push(i);
        }

        assert_eq!(window.len(), 20);
        assert!(window.is_full());
        let expected: Vec<u32> = (5..25).collect();
        assert_eq!(window.as_slice(), expected.as_slice());
        assert_eq!(window.total_pushed(), 25);
    }

    #[test]
    fn test_last_clamps_to_len() {
        let mut window: SlidingWindow<u8, 4> = SlidingWindow::new();
        window.push(1);
        window.push(2);
        assert_eq!(window.last(10), &[1, 2]);
        assert_eq!(window.last(0), &[] as &[u8]);
    }

    #[test]
    fn test_to_array_requires_full() {
        let mut window: SlidingWindow<u8, 3> = SlidingWindow::new();
        window.push(1);
        window.push(2);
        assert!(window.to_array().is_none());
        window.push(3);
        window.push(4);
        assert_eq!(window.to_array(), Some([2, 3, 4]));
    }

    #[test]
    fn test_clear() {
        let mut window: SlidingWindow<u8, 3> = SlidingWindow::new();
        window.push(7);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.newest(), None);
        window.push(8);
        assert_eq!(window.as_slice(), &[8]);
    }
}
