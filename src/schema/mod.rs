pub mod ddl;
pub mod order;
pub mod registry;
pub mod types;

pub use order::{dependencies, load_order};
pub use registry::{DatasetType, ENUM_TYPES};
pub use types::{Column, ColumnRole, EnumType, ForeignKey, SqlType, TableSchema};
