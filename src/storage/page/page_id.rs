use crate::common::config::{storage_bincode_config, PageNumber, TableOidT};
use crate::common::exception::DBError;
use bincode::{Decode, Encode};
use std::fmt;

/// Encoded size of a [`HeapPageId`]: two little-endian `u32`s.
pub const PAGE_ID_SERIALIZED_SIZE: usize = 8;

/// Identifies one page of one heap file.
///
/// Used as the key of the buffer pool's page table, so equality is exact over
/// both fields and the derived `Hash` feeds both fields into the hasher.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct HeapPageId {
    table_id: TableOidT,
    page_number: PageNumber,
}

impl HeapPageId {
    /// Creates a page id for page `page_number` of table `table_id`.
    pub fn new(table_id: TableOidT, page_number: PageNumber) -> Self {
        Self {
            table_id,
            page_number,
        }
    }

    /// Returns the table this page belongs to.
    pub fn get_table_id(&self) -> TableOidT {
        self.table_id
    }

    /// Returns the page number within the table.
    pub fn get_page_number(&self) -> PageNumber {
        self.page_number
    }

    /// Returns `[table_id, page_number]`, the form used when a page id has to
    /// cross a process or storage boundary.
    pub fn serialize(&self) -> [u32; 2] {
        [self.table_id, self.page_number]
    }

    pub fn deserialize(data: [u32; 2]) -> Self {
        Self::new(data[0], data[1])
    }

    /// Encodes this id as a fixed 8-byte record.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DBError> {
        Ok(bincode::encode_to_vec(self, storage_bincode_config())?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DBError> {
        if data.len() < PAGE_ID_SERIALIZED_SIZE {
            return Err(DBError::Serialization(format!(
                "page id record needs {} bytes, got {}",
                PAGE_ID_SERIALIZED_SIZE,
                data.len()
            )));
        }
        let (pid, _): (HeapPageId, usize) =
            bincode::decode_from_slice(&data[..PAGE_ID_SERIALIZED_SIZE], storage_bincode_config())?;
        Ok(pid)
    }
}

impl fmt::Display for HeapPageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table_id: {} page_number: {}",
            self.table_id, self.page_number
        )
    }
}
