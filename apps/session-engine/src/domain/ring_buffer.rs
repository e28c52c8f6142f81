//! Fixed-capacity circular buffer shared between request paths and timers.
//!
//! Used as the turn-order ring (`dequeue` the current player, `push` them back),
//! as the slot sequence of a board row, and as a counting set where [`RingBuffer::full`]
//! signals that every expected entry has arrived.

use parking_lot::Mutex;

#[derive(Debug)]
struct Ring<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }

    fn retreat(&self, index: usize) -> usize {
        (index + self.capacity() - 1) % self.capacity()
    }

    /// Slot indices from oldest to newest.
    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |offset| (self.head + offset) % self.capacity())
    }

    fn push(&mut self, value: T) {
        if self.capacity() == 0 {
            return;
        }
        if self.len == self.capacity() {
            // Lapped: the oldest entry sits under the tail and is overwritten.
            self.head = self.advance(self.head);
        } else {
            self.len += 1;
        }
        self.slots[self.tail] = Some(value);
        self.tail = self.advance(self.tail);
    }

    fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.tail = self.retreat(self.tail);
        self.len -= 1;
        self.slots[self.tail].take()
    }

    fn dequeue(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = self.advance(self.head);
        self.len -= 1;
        value
    }

    fn rebuild(&mut self, capacity: usize, values: Vec<T>) {
        *self = Ring::with_capacity(capacity);
        for value in values {
            self.push(value);
        }
    }

    fn drain_ordered(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        while let Some(value) = self.dequeue() {
            out.push(value);
        }
        out
    }
}

/// Internally synchronised ring; every method takes `&self`.
#[derive(Debug)]
pub struct RingBuffer<T> {
    inner: Mutex<Ring<T>>,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Ring::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once at least one element exists and writes have caught up with reads.
    pub fn full(&self) -> bool {
        let ring = self.inner.lock();
        ring.len > 0 && ring.head == ring.tail
    }

    /// Appends at the tail. When full, the oldest element is overwritten.
    pub fn push(&self, value: T) {
        self.inner.lock().push(value);
    }

    /// Removes the most recently pushed element.
    pub fn pop(&self) -> Option<T> {
        self.inner.lock().pop()
    }

    /// Removes the oldest element.
    pub fn dequeue(&self) -> Option<T> {
        self.inner.lock().dequeue()
    }

    /// Moves the oldest element to the tail and returns the new head.
    ///
    /// Runs under one lock so concurrent readers never see the ring one entry short.
    pub fn rotate(&self) -> Option<T>
    where
        T: Clone,
    {
        let mut ring = self.inner.lock();
        let head = ring.dequeue()?;
        ring.push(head);
        ring.slots[ring.head].clone()
    }

    /// Changes the capacity, keeping the newest elements when shrinking below `len`.
    pub fn resize(&self, capacity: usize) {
        let mut ring = self.inner.lock();
        let values = ring.drain_ordered();
        ring.rebuild(capacity, values);
    }

    /// Mutable access to the first element for which `f` returns `Some`.
    pub fn find_map_mut<R>(&self, mut f: impl FnMut(&mut T) -> Option<R>) -> Option<R> {
        let mut ring = self.inner.lock();
        let indices: Vec<usize> = ring.indices().collect();
        for index in indices {
            if let Some(value) = ring.slots[index].as_mut() {
                if let Some(found) = f(value) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Visits every element, oldest first, without cloning.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        let ring = self.inner.lock();
        for index in ring.indices() {
            if let Some(value) = ring.slots[index].as_ref() {
                f(value);
            }
        }
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Oldest element, left in place.
    pub fn peek(&self) -> Option<T> {
        let ring = self.inner.lock();
        if ring.len == 0 {
            return None;
        }
        ring.slots[ring.head].clone()
    }

    /// Snapshot from oldest to newest.
    pub fn values(&self) -> Vec<T> {
        let ring = self.inner.lock();
        ring.indices()
            .filter_map(|index| ring.slots[index].clone())
            .collect()
    }
}

impl<T: PartialEq> RingBuffer<T> {
    pub fn contains(&self, value: &T) -> bool {
        let ring = self.inner.lock();
        let mut indices = ring.indices();
        indices.any(|index| ring.slots[index].as_ref() == Some(value))
    }

    /// Removes `value` and shrinks the capacity by one, keeping the remaining order.
    ///
    /// Returns false when the value is absent; the ring is left untouched in that case.
    pub fn evict(&self, value: &T) -> bool {
        let mut ring = self.inner.lock();
        let present = ring
            .indices()
            .any(|index| ring.slots[index].as_ref() == Some(value));
        if !present {
            return false;
        }

        let capacity = ring.capacity().saturating_sub(1);
        let kept: Vec<T> = ring
            .drain_ordered()
            .into_iter()
            .filter(|v| v != value)
            .collect();
        ring.rebuild(capacity, kept);
        true
    }
}
