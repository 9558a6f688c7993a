//! Lineage artifact export

mod dot;
mod json;

pub use dot::{to_dot, write_dot};
pub use json::{read_lineage_json, to_json_string, write_lineage_json};
