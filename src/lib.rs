//! An in-memory hierarchical file system on top of a simulated sector disk.
//!
//! ### Overview
//!
//! `sector-fs` keeps a directory tree in memory and stores every file's bytes
//! in fixed-size 64-byte sectors of a simulated block device with a fixed
//! number of sectors. Sector allocation is first fit, so files fragment as
//! they are rewritten and removed; `defrag` packs them back from sector zero.
//!
//! **Key ideas**:
//! - **One engine, one caller**: `SectorFS` owns the tree, the current directory
//!   and the disk. Every operation runs to completion before the next one.
//! - **All or nothing**: an operation either succeeds or reports an `FsError`
//!   and leaves the tree and disk untouched (`mkdir -p` keeps what it created).
//! - **Safe structure**: copies never share sectors, moves never nest a
//!   directory inside itself, and deleting a subtree reclaims all its sectors.
//! - **Thin edges**: the `shell` module parses command lines and `host`
//!   moves bytes to and from the real file system; both sit on `FsBackend`.

mod core;
mod disk;
pub mod host;
pub mod shell;
mod vfs;

pub use crate::core::{FsBackend, FsError, MAX_CAPACITY, Result, SECTOR_SIZE};
pub use disk::{Block, BlockStore, Disk, SectorMap};
pub use vfs::{
    DefragReport, DiskUsage, Entry, EntryType, Info, InfoKind, Listing, NodeId, SectorFS, Tree,
};
