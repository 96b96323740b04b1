//! Structs shared by the decoder, the processing context and the reports.
mod attributes;
mod mrt;
mod network;
mod peer;
mod route;

pub use attributes::*;
pub use mrt::*;
pub use network::*;
pub use peer::*;
pub use route::*;
