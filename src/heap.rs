//! Binary min-heap ordered by a caller-provided comparator.
//!
//! [`std::collections::BinaryHeap`] requires items to implement [`Ord`], which is not possible
//! when ordering depends on runtime state such as a collator. This heap takes the comparator
//! on every mutating call instead, so the same comparator must be used for all operations.

use std::cmp::Ordering;

pub struct MinHeap<T> {
    items: Vec<T>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        MinHeap { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MinHeap {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the smallest item without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Inserts an item. Takes *O*(log(*n*)) time.
    pub fn push_by<F>(&mut self, item: T, compare: F)
    where
        F: Fn(&T, &T) -> Ordering,
    {
        self.items.push(item);
        self.sift_up(self.items.len() - 1, compare);
    }

    /// Removes the smallest item. Takes *O*(log(*n*)) time.
    pub fn pop_by<F>(&mut self, compare: F) -> Option<T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        if self.items.is_empty() {
            return None;
        }

        let item = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0, compare);
        }

        return Some(item);
    }

    fn sift_up<F>(&mut self, mut pos: usize, compare: F)
    where
        F: Fn(&T, &T) -> Ordering,
    {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if compare(&self.items[pos], &self.items[parent]) != Ordering::Less {
                break;
            }
            self.items.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down<F>(&mut self, mut pos: usize, compare: F)
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let len = self.items.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;

            if left < len && compare(&self.items[left], &self.items[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && compare(&self.items[right], &self.items[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == pos {
                break;
            }

            self.items.swap(pos, smallest);
            pos = smallest;
        }
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        MinHeap::new()
    }
}

#[cfg(test)]
mod test {
    use rand::seq::SliceRandom;
    use rstest::*;

    use super::MinHeap;

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_min_heap(#[case] reversed: bool) {
        let mut input = Vec::from_iter(0..100);
        input.shuffle(&mut rand::thread_rng());

        let compare = if reversed {
            |a: &i32, b: &i32| a.cmp(b).reverse()
        } else {
            |a: &i32, b: &i32| a.cmp(b)
        };

        let mut heap = MinHeap::with_capacity(input.len());
        for item in input {
            heap.push_by(item, compare);
        }
        assert_eq!(heap.len(), 100);
        assert_eq!(heap.peek(), Some(if reversed { &99 } else { &0 }));

        let mut actual_result = Vec::new();
        while let Some(item) = heap.pop_by(compare) {
            actual_result.push(item);
        }

        let expected_result = if reversed {
            Vec::from_iter((0..100).rev())
        } else {
            Vec::from_iter(0..100)
        };

        assert_eq!(actual_result, expected_result);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_interleaved_push_pop() {
        let compare = |a: &i32, b: &i32| a.cmp(b);
        let mut heap = MinHeap::new();

        heap.push_by(5, compare);
        heap.push_by(3, compare);
        assert_eq!(heap.pop_by(compare), Some(3));

        heap.push_by(4, compare);
        heap.push_by(4, compare);
        heap.push_by(1, compare);
        assert_eq!(heap.pop_by(compare), Some(1));
        assert_eq!(heap.pop_by(compare), Some(4));
        assert_eq!(heap.pop_by(compare), Some(4));
        assert_eq!(heap.pop_by(compare), Some(5));
        assert_eq!(heap.pop_by(compare), None);
    }
}
