//! Uploaded file tables, queryable as `files.<name>`.

mod parser;
mod store;

pub use parser::{parse_payload, FileFormat, ParsedTable};
pub use store::{FileTable, FileTableInfo, FileTableStore};
