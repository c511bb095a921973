use crate::types_db::type_id::TypeId;
use bincode::{Decode, Encode};
use std::fmt;
use std::fmt::{Display, Formatter};

/// One field of a [`Schema`](crate::catalog::schema::Schema): a type and an optional name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Column {
    column_name: Option<String>,
    column_type: TypeId,
}

impl Column {
    pub fn new(column_name: &str, column_type: TypeId) -> Self {
        Self {
            column_name: Some(column_name.to_string()),
            column_type,
        }
    }

    pub fn new_anonymous(column_type: TypeId) -> Self {
        Self {
            column_name: None,
            column_type,
        }
    }

    pub fn with_name(&self, new_name: &str) -> Self {
        Self {
            column_name: Some(new_name.to_string()),
            column_type: self.column_type,
        }
    }

    pub fn get_name(&self) -> Option<&str> {
        self.column_name.as_deref()
    }

    pub fn get_type(&self) -> TypeId {
        self.column_type
    }

    pub fn get_storage_size(&self) -> usize {
        self.column_type.get_size()
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.column_name {
            Some(name) => write!(f, "{}({})", self.column_type, name),
            None => write!(f, "{}", self.column_type),
        }
    }
}
