pub mod standard;
pub mod utils;

pub use standard::{parse_query, parse_single_statement};
pub use utils::{object_name_parts, parser_options};
