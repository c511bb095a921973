//! # Schema Definition
//!
//! This module provides the `Schema` type describing the shape of every row
//! in a heap file: an ordered, immutable, non-empty list of typed columns,
//! each with an optional name.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │                   Schema                     │
//!   │  columns: Vec<Column>                        │
//!   │  ┌───────────┐ ┌─────────────┐ ┌─────────┐   │
//!   │  │INTEGER(id)│ │VARCHAR(name)│ │ BIGINT  │   │
//!   │  │  4 bytes  │ │  132 bytes  │ │ 8 bytes │   │
//!   │  └───────────┘ └─────────────┘ └─────────┘   │
//!   │  length: 144 (sum of fixed widths)           │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! ## Key Operations
//!
//! | Method                  | Description                                    |
//! |-------------------------|------------------------------------------------|
//! | `new(types, names)`     | Build a schema, rejecting empty/mismatched     |
//! | `from_types(types)`     | Build a schema of anonymous columns            |
//! | `get_column_name(i)`    | Name of column `i`, error if missing/anonymous |
//! | `get_column_type(i)`    | Type of column `i`                             |
//! | `get_column_index(name)`| First column with exactly this name            |
//! | `get_size()`            | Fixed row width in bytes                       |
//! | `merge(left, right)`    | Concatenate two schemas                        |
//! | `with_alias(alias)`     | Prefix every named column with `alias.`        |
//!
//! ## Equality
//!
//! Two schemas are equal when they have the same number of columns and the
//! column *types* match pairwise. Names are ignored, so a schema and its
//! aliased copy compare equal. `Hash` follows the same rule.
//!
//! ## Serialization
//!
//! `to_bytes`/`from_bytes` encode the column list with the crate's pinned
//! bincode configuration; decoding re-runs construction so the cached size
//! and the non-empty invariant always hold.

use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use crate::catalog::column::Column;
use crate::common::config::{storage_bincode_config, MAX_DECODE_BYTES};
use crate::common::exception::{DBError, SchemaError};
use crate::types_db::type_id::TypeId;

/// Describes the structure of the rows of a table.
///
/// # Example
/// ```rust
/// use heapdb::catalog::schema::Schema;
/// use heapdb::types_db::type_id::TypeId;
///
/// let schema = Schema::new(
///     vec![TypeId::Integer, TypeId::VarChar],
///     vec![Some("id"), Some("name")],
/// )
/// .unwrap();
/// assert_eq!(schema.get_column_index("name"), Ok(1));
/// assert_eq!(schema.to_string(), "INTEGER(id) VARCHAR(name)");
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    /// The ordered list of columns in this schema.
    columns: Vec<Column>,
    /// Total row width in bytes, computed once at construction.
    length: usize,
}

impl Schema {
    /// Creates a schema from parallel lists of types and optional names.
    ///
    /// # Errors
    /// `InvalidSchema` if `types` is empty or the two lists differ in length.
    pub fn new<S: Into<String>>(
        types: Vec<TypeId>,
        names: Vec<Option<S>>,
    ) -> Result<Schema, SchemaError> {
        if types.len() != names.len() {
            return Err(SchemaError::InvalidSchema(format!(
                "{} types but {} names",
                types.len(),
                names.len()
            )));
        }
        let columns = types
            .into_iter()
            .zip(names)
            .map(|(column_type, name)| match name {
                Some(name) => Column::new(&name.into(), column_type),
                None => Column::new_anonymous(column_type),
            })
            .collect();
        Schema::from_columns(columns)
    }

    /// Creates a schema whose columns are all anonymous.
    pub fn from_types(types: Vec<TypeId>) -> Result<Schema, SchemaError> {
        Schema::from_columns(types.into_iter().map(Column::new_anonymous).collect())
    }

    /// Creates a schema from already-built columns.
    pub fn from_columns(columns: Vec<Column>) -> Result<Schema, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "a schema must contain at least one column".to_string(),
            ));
        }
        let length = columns.iter().map(Column::get_storage_size).sum();
        Ok(Schema { columns, length })
    }

    pub fn get_columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Returns the column at `column_index`, or `None` when out of bounds.
    pub fn get_column(&self, column_index: usize) -> Option<&Column> {
        self.columns.get(column_index)
    }

    pub fn get_column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the name of the column at `column_index`.
    ///
    /// Fails with `NoSuchField` if the index is out of bounds or the column is
    /// anonymous. Use [`get_column`](Self::get_column) to tell the two apart.
    pub fn get_column_name(&self, column_index: usize) -> Result<&str, SchemaError> {
        let column = self.column_at(column_index)?;
        column.get_name().ok_or_else(|| {
            SchemaError::NoSuchField(format!("column {} has no name", column_index))
        })
    }

    pub fn get_column_type(&self, column_index: usize) -> Result<TypeId, SchemaError> {
        Ok(self.column_at(column_index)?.get_type())
    }

    /// Returns the index of the first column named exactly `column_name`.
    ///
    /// Matching is case-sensitive. Anonymous columns never match, not even
    /// an empty query string.
    pub fn get_column_index(&self, column_name: &str) -> Result<usize, SchemaError> {
        self.columns
            .iter()
            .position(|column| column.get_name() == Some(column_name))
            .ok_or_else(|| SchemaError::NoSuchField(format!("no column named '{}'", column_name)))
    }

    /// Returns the fixed width in bytes of a row described by this schema.
    pub fn get_size(&self) -> usize {
        self.length
    }

    /// Merges two schemas into a new schema by concatenating their columns.
    ///
    /// Columns from `left` come first, followed by the columns of `right`;
    /// names and types are preserved and neither input is modified.
    pub fn merge(left: &Schema, right: &Schema) -> Schema {
        let mut columns = Vec::with_capacity(left.columns.len() + right.columns.len());
        columns.extend(left.columns.iter().cloned());
        columns.extend(right.columns.iter().cloned());
        Schema {
            columns,
            length: left.length + right.length,
        }
    }

    /// Returns a copy whose named columns are qualified as `alias.name`.
    ///
    /// A column that is already qualified has its qualifier replaced.
    /// Anonymous columns stay anonymous.
    pub fn with_alias(&self, alias: &str) -> Schema {
        let columns = self
            .columns
            .iter()
            .map(|column| match column.get_name() {
                Some(name) => {
                    let unqualified = name.rsplit('.').next().unwrap_or(name);
                    column.with_name(&format!("{}.{}", alias, unqualified))
                }
                None => column.clone(),
            })
            .collect();
        Schema {
            columns,
            length: self.length,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DBError> {
        Ok(bincode::encode_to_vec(&self.columns, storage_bincode_config())?)
    }

    /// Decodes a schema written by [`to_bytes`](Self::to_bytes).
    ///
    /// Corrupt input, including a column count larger than the record could
    /// hold, fails with `DBError::Serialization` before anything is allocated.
    pub fn from_bytes(bytes: &[u8]) -> Result<Schema, DBError> {
        let prefix: [u8; 8] = bytes
            .get(..8)
            .and_then(|p| p.try_into().ok())
            .ok_or_else(|| DBError::Serialization("schema record is truncated".to_string()))?;
        let column_count = u64::from_le_bytes(prefix);
        if column_count > (bytes.len() - 8) as u64 {
            return Err(DBError::Serialization(format!(
                "schema record claims {} columns but holds {} bytes",
                column_count,
                bytes.len()
            )));
        }
        let (columns, _): (Vec<Column>, usize) = bincode::decode_from_slice(
            bytes,
            storage_bincode_config().with_limit::<MAX_DECODE_BYTES>(),
        )?;
        Ok(Schema::from_columns(columns)?)
    }

    fn column_at(&self, column_index: usize) -> Result<&Column, SchemaError> {
        self.columns.get(column_index).ok_or_else(|| {
            SchemaError::NoSuchField(format!(
                "column index {} out of range for {} columns",
                column_index,
                self.columns.len()
            ))
        })
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(other.columns.iter())
                .all(|(a, b)| a.get_type() == b.get_type())
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.columns.len().hash(state);
        for column in &self.columns {
            column.get_type().hash(state);
        }
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let column_strings: Vec<String> =
            self.columns.iter().map(|col| col.to_string()).collect();
        write!(f, "{}", column_strings.join(" "))
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
