use std::fmt;
use std::fmt::{Display, Formatter};

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::common::config::STRING_LEN;

// Every field type a heap-file row can hold. All widths are fixed.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Timestamp,
    VarChar,
}

impl TypeId {
    /// Fixed number of bytes a field of this type occupies in a row.
    ///
    /// `VarChar` is stored as a 4-byte length prefix followed by a
    /// `STRING_LEN`-byte payload.
    pub fn get_size(&self) -> usize {
        match self {
            TypeId::Boolean | TypeId::TinyInt => 1,
            TypeId::SmallInt => 2,
            TypeId::Integer => 4,
            TypeId::BigInt | TypeId::Decimal | TypeId::Timestamp => 8,
            TypeId::VarChar => STRING_LEN + 4,
        }
    }
}

impl Display for TypeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeId::Boolean => "BOOLEAN",
            TypeId::TinyInt => "TINYINT",
            TypeId::SmallInt => "SMALLINT",
            TypeId::Integer => "INTEGER",
            TypeId::BigInt => "BIGINT",
            TypeId::Decimal => "DECIMAL",
            TypeId::Timestamp => "TIMESTAMP",
            TypeId::VarChar => "VARCHAR",
        };
        write!(f, "{}", name)
    }
}
