pub mod framer;
pub mod mrt_header;
pub mod table_dump_v2;

pub use framer::{frame_messages, FrameOutcome, MessageHandler, MrtFramer};
pub use mrt_header::{decode_common_header, parse_common_header};
pub use table_dump_v2::*;
