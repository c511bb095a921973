use std::sync::Arc;

use crate::common::config::SlotOffset;
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::storage::page::page_id::HeapPageId;
use crate::storage::table::tuple::Tuple;

/// Number of tuple slots a page of `page_size` bytes holds for rows of
/// `tuple_size` bytes: each slot costs the row plus one header bit.
pub fn slots_per_page(page_size: usize, tuple_size: usize) -> usize {
    (page_size * 8) / (tuple_size * 8 + 1)
}

/// An in-memory heap page: a fixed number of slots, each empty or holding a tuple.
#[derive(Debug, Clone)]
pub struct HeapPage {
    pid: HeapPageId,
    slots: Vec<Option<Arc<Tuple>>>,
}

impl HeapPage {
    pub fn new(pid: HeapPageId, num_slots: usize) -> Self {
        Self {
            pid,
            slots: vec![None; num_slots],
        }
    }

    pub fn get_id(&self) -> HeapPageId {
        self.pid
    }

    pub fn get_num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn get_num_tuples(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn get_num_empty_slots(&self) -> usize {
        self.slots.len() - self.get_num_tuples()
    }

    pub fn get_tuple(&self, slot: SlotOffset) -> Option<Arc<Tuple>> {
        self.slots.get(slot as usize).and_then(|s| s.clone())
    }

    /// Stores `tuple` in the first empty slot and stamps it with its RID.
    ///
    /// Returns `None` when the page is full.
    pub fn insert_tuple(&mut self, mut tuple: Tuple) -> Option<RID> {
        let slot = self.slots.iter().position(Option::is_none)?;
        let rid = RID::new(self.pid, slot as SlotOffset);
        tuple.set_rid(rid);
        self.slots[slot] = Some(Arc::new(tuple));
        Some(rid)
    }

    pub fn delete_tuple(&mut self, rid: RID) -> Result<Arc<Tuple>, DBError> {
        if rid.get_page_id() != self.pid {
            return Err(DBError::Storage(format!(
                "tuple {} is not on page {}",
                rid, self.pid
            )));
        }
        self.slots
            .get_mut(rid.get_slot_num() as usize)
            .and_then(Option::take)
            .ok_or_else(|| DBError::Storage(format!("slot {} is empty", rid)))
    }

    /// Iterates the occupied slots in slot order.
    ///
    /// The iterator keeps the page alive on its own, so the page cache is free
    /// to drop or replace its copy while a scan is still reading it.
    pub fn tuple_iter(self: Arc<Self>) -> PageTupleIter {
        PageTupleIter {
            page: self,
            next_slot: 0,
        }
    }
}

/// One-shot iterator over the rows of a single [`HeapPage`].
#[derive(Debug)]
pub struct PageTupleIter {
    page: Arc<HeapPage>,
    next_slot: usize,
}

impl PageTupleIter {
    pub fn get_page_id(&self) -> HeapPageId {
        self.page.get_id()
    }

    /// Whether another occupied slot remains, without consuming it.
    pub fn has_next(&self) -> bool {
        self.page.slots[self.next_slot.min(self.page.slots.len())..]
            .iter()
            .any(Option::is_some)
    }
}

impl Iterator for PageTupleIter {
    type Item = Arc<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_slot < self.page.slots.len() {
            let slot = self.next_slot;
            self.next_slot += 1;
            if let Some(tuple) = &self.page.slots[slot] {
                return Some(Arc::clone(tuple));
            }
        }
        None
    }
}
