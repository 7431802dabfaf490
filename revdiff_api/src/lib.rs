//! Shared revdiff data models consumed by the core library and source crates.

pub mod change;
pub mod region;

pub use change::*;
pub use region::*;
