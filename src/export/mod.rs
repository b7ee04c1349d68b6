pub mod csv;
pub mod json;

pub use crate::error::ExportError;
pub use self::csv::{export_assignments_csv, export_mappings_csv};
pub use json::export_json;
