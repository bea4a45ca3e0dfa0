//! Tracked storage for foreign cells.
//!
//! The heap owns every boxed native value; the embedding runtime's collector
//! owns the heap and decides when a cell is reclaimed. Slots are reused
//! through a free list. A reclaimed slot holds `None`, which doubles as the
//! per-slot reclaimed flag: the payload can be taken at most once, so the
//! embedded value's destructor runs exactly once.

use std::any::Any;

/// Handle to a heap-allocated foreign cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// One constructed native value plus its capability-table tag.
pub struct ForeignCell {
    pub tag: &'static str,
    pub data: Box<dyn Any>,
}

pub struct Heap {
    cells: Vec<Option<ForeignCell>>,
    free_list: Vec<usize>,
    alloc_count: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            cells: Vec::with_capacity(64),
            free_list: Vec::new(),
            alloc_count: 0,
        }
    }

    /// Allocate a slot for a fully constructed cell. The value is moved in
    /// whole; a failed construction never produces a visible slot.
    pub fn alloc(&mut self, cell: ForeignCell) -> ObjectId {
        self.alloc_count += 1;
        if let Some(id) = self.free_list.pop() {
            self.cells[id] = Some(cell);
            ObjectId(id)
        } else {
            let id = self.cells.len();
            self.cells.push(Some(cell));
            ObjectId(id)
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&ForeignCell> {
        self.cells.get(id.0).and_then(|c| c.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ForeignCell> {
        self.cells.get_mut(id.0).and_then(|c| c.as_mut())
    }

    /// Take a cell out of its slot, leaving the slot free for reuse. Returns
    /// `None` when the slot was already reclaimed.
    pub fn take(&mut self, id: ObjectId) -> Option<ForeignCell> {
        let cell = self.cells.get_mut(id.0).and_then(|c| c.take());
        if cell.is_some() {
            self.free_list.push(id.0);
        }
        cell
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn alloc_count(&self) -> usize {
        self.alloc_count
    }

    /// Ids of every live cell, oldest slot first. Used by shutdown sweeps.
    pub fn live_ids(&self) -> Vec<ObjectId> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|_| ObjectId(i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_reused_through_the_free_list() {
        let mut heap = Heap::new();
        let a = heap.alloc(ForeignCell { tag: "t", data: Box::new(1u8) });
        let b = heap.alloc(ForeignCell { tag: "t", data: Box::new(2u8) });
        assert_ne!(a, b);
        assert!(heap.take(a).is_some());
        let c = heap.alloc(ForeignCell { tag: "t", data: Box::new(3u8) });
        assert_eq!(a, c);
        assert_eq!(heap.live_count(), 2);
    }

    #[test]
    fn take_is_at_most_once() {
        let mut heap = Heap::new();
        let id = heap.alloc(ForeignCell { tag: "t", data: Box::new(7i32) });
        assert!(heap.take(id).is_some());
        assert!(heap.take(id).is_none());
        assert!(heap.get(id).is_none());
    }
}
