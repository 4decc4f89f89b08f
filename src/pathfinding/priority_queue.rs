//! Indexed binary min-heap used by both search tiers

/// Min-heap of `(id, priority)` entries with in-place priority updates.
///
/// Each id appears at most once. Equal priorities pop in ascending id order,
/// which keeps searches deterministic.
#[derive(Debug, Clone)]
pub struct PriorityQueue<P> {
    heap: Vec<(usize, P)>,
    /// Heap slot of each id, indexed by id
    positions: Vec<Option<usize>>,
}

impl<P: PartialOrd + Copy> Default for PriorityQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PartialOrd + Copy> PriorityQueue<P> {
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Queue pre-sized for ids in `0..id_capacity`
    pub fn with_capacity(id_capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(id_capacity),
            positions: vec![None; id_capacity],
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.slot(id).is_some()
    }

    pub fn priority_of(&self, id: usize) -> Option<P> {
        self.slot(id).map(|slot| self.heap[slot].1)
    }

    pub fn peek(&self) -> Option<(usize, P)> {
        self.heap.first().copied()
    }

    /// Insert `id`, or move it to `priority` if already queued
    pub fn push(&mut self, id: usize, priority: P) {
        if !self.update(id, priority) {
            if id >= self.positions.len() {
                self.positions.resize(id + 1, None);
            }
            self.heap.push((id, priority));
            let slot = self.heap.len() - 1;
            self.positions[id] = Some(slot);
            self.sift_up(slot);
        }
    }

    /// Change the priority of a queued id; false if it is not queued
    pub fn update(&mut self, id: usize, priority: P) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        let previous = self.heap[slot].1;
        self.heap[slot].1 = priority;
        if priority < previous {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
        true
    }

    /// Remove and return the entry with the lowest priority
    pub fn pop(&mut self) -> Option<(usize, P)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.positions[entry.0] = None;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(entry)
    }

    pub fn clear(&mut self) {
        for (id, _) in self.heap.drain(..) {
            self.positions[id] = None;
        }
    }

    fn slot(&self, id: usize) -> Option<usize> {
        self.positions.get(id).copied().flatten()
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let (id_a, priority_a) = self.heap[a];
        let (id_b, priority_b) = self.heap[b];
        priority_a < priority_b || (!(priority_b < priority_a) && id_a < id_b)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a].0] = Some(a);
        self.positions[self.heap[b].0] = Some(b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let left = slot * 2 + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < self.heap.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.heap.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }
}
