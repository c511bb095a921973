use crate::catalog::schema::Schema;
use crate::common::config::STRING_LEN;
use crate::common::exception::SchemaError;
use crate::common::rid::RID;
use crate::types_db::value::Value;
use std::fmt::{Display, Formatter};

/// A row: one value per schema column, plus where it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    values: Vec<Value>,
    rid: Option<RID>,
}

impl Tuple {
    /// Builds a tuple after checking `values` against `schema`.
    pub fn new(values: Vec<Value>, schema: &Schema) -> Result<Self, SchemaError> {
        Self::check_against(&values, schema)?;
        Ok(Self { values, rid: None })
    }

    fn check_against(values: &[Value], schema: &Schema) -> Result<(), SchemaError> {
        if values.len() != schema.get_column_count() {
            return Err(SchemaError::InvalidSchema(format!(
                "tuple has {} values but schema has {} columns",
                values.len(),
                schema.get_column_count()
            )));
        }
        for (index, (value, column)) in values.iter().zip(schema.iter()).enumerate() {
            if value.get_type_id() != column.get_type() {
                return Err(SchemaError::InvalidSchema(format!(
                    "value {} is {} but column {} is {}",
                    index,
                    value.get_type_id(),
                    index,
                    column.get_type()
                )));
            }
            if let Some(s) = value.as_str() {
                if s.len() > STRING_LEN {
                    return Err(SchemaError::InvalidSchema(format!(
                        "value {} is {} bytes, longer than {}",
                        index,
                        s.len(),
                        STRING_LEN
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn get_value(&self, column_index: usize) -> Option<&Value> {
        self.values.get(column_index)
    }

    pub fn get_values(&self) -> &[Value] {
        &self.values
    }

    pub fn get_column_count(&self) -> usize {
        self.values.len()
    }

    /// Returns the RID assigned when the tuple was stored, if any.
    pub fn get_rid(&self) -> Option<RID> {
        self.rid
    }

    pub fn set_rid(&mut self, rid: RID) {
        self.rid = Some(rid);
    }
}

impl Display for Tuple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", values.join("\t"))
    }
}
