/*!
parser module maintains the main logic for decoding TABLE_DUMP_V2 dumps.
*/
pub mod bgp;
pub mod mrt;
pub mod utils;

pub use bgp::{apply_attributes, parse_attributes};
pub use mrt::*;
pub use utils::ReadUtils;
