use crate::common::config::SlotOffset;
use crate::storage::page::page_id::HeapPageId;
use std::fmt;

/// Represents a Record ID (RID): the page and slot a row is stored at.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Ord)]
pub struct RID {
    page_id: HeapPageId,
    slot_num: SlotOffset,
}

impl RID {
    /// Creates a new RID with the given page ID and slot number.
    ///
    /// # Arguments
    ///
    /// * `page_id` - The page identifier.
    /// * `slot_num` - The slot number within the page.
    pub fn new(page_id: HeapPageId, slot_num: SlotOffset) -> Self {
        Self { page_id, slot_num }
    }

    /// Returns the page ID of the RID.
    pub fn get_page_id(&self) -> HeapPageId {
        self.page_id
    }

    /// Returns the slot number of the RID.
    pub fn get_slot_num(&self) -> SlotOffset {
        self.slot_num
    }
}

impl fmt::Display for RID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} slot_num: {}", self.page_id, self.slot_num)
    }
}
