//! Public data models shared across revdiff crates.
//!
//! The structures live in `revdiff_api` so that source implementations can
//! depend on them without pulling in the core library. They are:
//! - serializable via `serde` for transport and snapshots
//! - plain data with no behavior beyond axis bookkeeping

pub use revdiff_api::{
    ChangeEntry, ChangeType, ContextWindow, LineStats, NumberedLine, Region, RegionKind,
    RevisionPair,
};
