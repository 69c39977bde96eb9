//! Mapping of normalized FAST UI records onto actuarial field names.
//!
//! Each product's mapping table renames source fields and may translate
//! values, convert types, scale amounts, apply conditional overrides and run
//! named transformations. Per-target transformation steps run afterwards.

pub mod error;
pub mod mapper;
pub mod summary;
pub mod value_table;

pub use error::MappingError;
pub use mapper::{FieldMapper, MappedRecord, condition_holds};
pub use summary::{FieldSummary, MappingKind, MappingSummary, mapping_summary};
pub use value_table::{invert, lookup};
