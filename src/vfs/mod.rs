mod entry;
mod info;
mod sector_fs;
mod tree;

pub use entry::{Entry, EntryType};
pub use info::{DefragReport, DiskUsage, Info, InfoKind, Listing};
pub use sector_fs::SectorFS;
pub use tree::{NodeId, Tree};
