pub mod attributes;

pub use attributes::{apply_attributes, parse_attributes};
