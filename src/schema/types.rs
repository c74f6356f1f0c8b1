// src/schema/types.rs

use std::fmt;

use super::DatasetType;

/// Column type as declared in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Uuid,
    Text,
    Varchar(u16),
    Date,
    SmallInt,
    Boolean,
    /// A scalar of the named enumerated type.
    Enum(&'static str),
    /// An array of the named enumerated type.
    EnumArray(&'static str),
}

impl SqlType {
    /// Name of the enumerated type this column depends on, if any.
    pub fn enum_name(&self) -> Option<&'static str> {
        match self {
            SqlType::Enum(name) | SqlType::EnumArray(name) => Some(*name),
            _ => None,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Uuid => write!(f, "UUID"),
            SqlType::Text => write!(f, "TEXT"),
            SqlType::Varchar(n) => write!(f, "VARCHAR({})", n),
            SqlType::Date => write!(f, "DATE"),
            SqlType::SmallInt => write!(f, "SMALLINT"),
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::Enum(name) => write!(f, "{}", name),
            SqlType::EnumArray(name) => write!(f, "{}[]", name),
        }
    }
}

/// How the cleaner treats a column's raw provider values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Loaded as delivered.
    Plain,
    /// Provider identifier (`prefix/prefix/actual-id`); only the last path
    /// segment is kept.
    Reference,
    /// Python-style list literal rewritten into a store array literal.
    Classification,
}

/// A single column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub ty: SqlType,
    pub role: ColumnRole,
}

impl Column {
    pub const fn plain(name: &'static str, ty: SqlType) -> Self {
        Self {
            name,
            ty,
            role: ColumnRole::Plain,
        }
    }

    /// Identifier column; always a UUID.
    pub const fn reference(name: &'static str) -> Self {
        Self {
            name,
            ty: SqlType::Uuid,
            role: ColumnRole::Reference,
        }
    }

    pub const fn classification(name: &'static str, ty: SqlType) -> Self {
        Self {
            name,
            ty,
            role: ColumnRole::Classification,
        }
    }
}

/// Dependency of one table on another.
///
/// `enforced` dependencies become `REFERENCES` clauses; unenforced ones only
/// constrain load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    pub column: &'static str,
    pub parent: DatasetType,
    pub enforced: bool,
}

impl ForeignKey {
    pub const fn references(column: &'static str, parent: DatasetType) -> Self {
        Self {
            column,
            parent,
            enforced: true,
        }
    }

    pub const fn loads_after(column: &'static str, parent: DatasetType) -> Self {
        Self {
            column,
            parent,
            enforced: false,
        }
    }
}

/// Table descriptor for one dataset type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub dataset: DatasetType,
    pub columns: &'static [Column],
    pub primary_key: &'static str,
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    pub fn table_name(&self) -> &'static str {
        self.dataset.as_str()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Enumerated types referenced by this table's columns, in column order
    /// and without repeats.
    pub fn enum_types(&self) -> Vec<&'static EnumType> {
        let mut out: Vec<&'static EnumType> = Vec::new();
        for name in self.columns.iter().filter_map(|c| c.ty.enum_name()) {
            if out.iter().any(|e| e.name == name) {
                continue;
            }
            if let Some(e) = EnumType::find(name) {
                out.push(e);
            }
        }
        out
    }
}

/// A closed set of string tokens declared as a store enum type.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumType {
    pub name: &'static str,
    pub labels: &'static [&'static str],
}

impl EnumType {
    pub fn find(name: &str) -> Option<&'static EnumType> {
        super::registry::ENUM_TYPES.iter().find(|e| e.name == name)
    }
}
