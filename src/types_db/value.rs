use std::fmt;
use std::fmt::{Display, Formatter};

use crate::types_db::type_id::TypeId;

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Decimal(f64),
    Timestamp(u64),
    VarLen(String),
}

/// A single typed field value of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    value_: Val,
    type_id_: TypeId,
}

impl Value {
    pub fn new<T: Into<Val>>(value: T) -> Self {
        let val = value.into();
        let type_id = match &val {
            Val::Boolean(_) => TypeId::Boolean,
            Val::TinyInt(_) => TypeId::TinyInt,
            Val::SmallInt(_) => TypeId::SmallInt,
            Val::Integer(_) => TypeId::Integer,
            Val::BigInt(_) => TypeId::BigInt,
            Val::Decimal(_) => TypeId::Decimal,
            Val::Timestamp(_) => TypeId::Timestamp,
            Val::VarLen(_) => TypeId::VarChar,
        };
        Self {
            value_: val,
            type_id_: type_id,
        }
    }

    pub fn get_type_id(&self) -> TypeId {
        self.type_id_
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self.value_ {
            Val::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value_ {
            Val::VarLen(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Val {
    fn from(v: bool) -> Self {
        Val::Boolean(v)
    }
}

impl From<i8> for Val {
    fn from(v: i8) -> Self {
        Val::TinyInt(v)
    }
}

impl From<i16> for Val {
    fn from(v: i16) -> Self {
        Val::SmallInt(v)
    }
}

impl From<i32> for Val {
    fn from(v: i32) -> Self {
        Val::Integer(v)
    }
}

impl From<i64> for Val {
    fn from(v: i64) -> Self {
        Val::BigInt(v)
    }
}

impl From<f64> for Val {
    fn from(v: f64) -> Self {
        Val::Decimal(v)
    }
}

impl From<u64> for Val {
    fn from(v: u64) -> Self {
        Val::Timestamp(v)
    }
}

impl From<&str> for Val {
    fn from(v: &str) -> Self {
        Val::VarLen(v.to_string())
    }
}

impl From<String> for Val {
    fn from(v: String) -> Self {
        Val::VarLen(v)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.value_ {
            Val::Boolean(b) => write!(f, "{}", b),
            Val::TinyInt(i) => write!(f, "{}", i),
            Val::SmallInt(i) => write!(f, "{}", i),
            Val::Integer(i) => write!(f, "{}", i),
            Val::BigInt(i) => write!(f, "{}", i),
            Val::Decimal(d) => write!(f, "{}", d),
            Val::Timestamp(t) => write!(f, "{}", t),
            Val::VarLen(s) => write!(f, "{}", s),
        }
    }
}
