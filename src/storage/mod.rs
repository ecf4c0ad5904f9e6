//! Persistence for trained lattices.

mod format;

pub use format::SnapshotFormat;
