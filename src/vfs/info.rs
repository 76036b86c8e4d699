use std::fmt;

use super::entry::EntryType;

/// Metadata of a single entry, as reported by `info` and by `ls` on a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub name: String,
    pub path: String,
    pub kind: InfoKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoKind {
    File { size: usize, sectors: Vec<usize> },
    Directory,
}

impl Info {
    pub fn entry_type(&self) -> EntryType {
        match self.kind {
            InfoKind::File { .. } => EntryType::File,
            InfoKind::Directory => EntryType::Directory,
        }
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        write!(f, "Path: {}", self.path)?;
        match &self.kind {
            InfoKind::File { size, sectors } => {
                write!(f, "\nSize: {size} bytes")?;
                if !sectors.is_empty() {
                    let list: Vec<_> = sectors.iter().map(usize::to_string).collect();
                    write!(f, "\nSectors: {}", list.join(" "))?;
                }
                Ok(())
            }
            InfoKind::Directory => write!(f, "\nType: Directory"),
        }
    }
}

/// Result of `ls`: sorted names of a directory, or a single file summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Directory names carry a trailing `/`; sorted lexicographically.
    Entries(Vec<String>),
    File { name: String, path: String, size: usize },
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listing::Entries(names) => write!(f, "{}", names.join("\n")),
            Listing::File { name, path, size } => {
                write!(f, "Name: {name}\nPath: {path}\nSize: {size} bytes")
            }
        }
    }
}

/// Sector accounting of the disk.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: usize,
    pub used: usize,
    pub free: usize,
}

impl fmt::Display for DiskUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total sectors: {}\nUsed sectors: {}\nFree sectors: {}",
            self.total, self.used, self.free
        )
    }
}

/// Outcome of a defragmentation pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefragReport {
    pub files: usize,
    pub used: usize,
    pub free: usize,
}

impl fmt::Display for DefragReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} files", self.files)?;
        writeln!(f, "Defragmentation completed successfully!")?;
        if self.used > 0 {
            writeln!(f, "Used sectors: 0 to {}", self.used - 1)?;
        } else {
            writeln!(f, "Used sectors: none")?;
        }
        write!(f, "Free sectors: {}", self.free)
    }
}
