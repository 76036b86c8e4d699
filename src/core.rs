use thiserror::Error;

use crate::vfs::{DefragReport, DiskUsage, Info, Listing};

/// Size of one disk sector in bytes.
pub const SECTOR_SIZE: usize = 64;

/// Largest disk a file system accepts, in sectors (64 MiB of content).
pub const MAX_CAPACITY: usize = 1 << 20;

/// Every failure the engine can report. No operation retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("{0} does not exist")]
    NotFound(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("{0} is not a file")]
    NotAFile(String),

    #[error("invalid name: '{0}'")]
    InvalidName(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("cannot create directory '{0}': a file with this name exists")]
    NameConflict(String),

    #[error("directory {0} is not empty, use -r flag to remove recursively")]
    DirectoryNotEmpty(String),

    #[error("cannot move {0} into itself")]
    CyclicMove(String),

    #[error("no free sectors available")]
    OutOfSpace,

    #[error("invalid sector number: {sector}, valid range: 0 to {capacity}")]
    InvalidSector { sector: usize, capacity: usize },

    #[error("chunk of {len} bytes does not fit in a {SECTOR_SIZE}-byte sector")]
    ChunkTooLarge { len: usize },

    #[error("disk capacity must be positive")]
    InvalidCapacity,

    #[error("disk capacity of {requested} sectors exceeds the limit of {limit}")]
    CapacityTooLarge { requested: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, FsError>;

/// Command surface of a sector-backed file system.
///
/// Paths are `/`-separated strings, absolute (`/a/b`) or relative to the
/// current directory (`a/b`, `.`, `..`). Operations that take a plain `name`
/// (`touch`, `rm`) only look at the current directory.
pub trait FsBackend {
    /// Returns the absolute path of the current directory.
    fn pwd(&self) -> String;

    /// Changes the current directory. The target must exist and be a directory.
    fn cd(&mut self, path: &str) -> Result<()>;

    /// Lists a directory, or describes a single file when `path` points at one.
    fn ls(&self, path: Option<&str>) -> Result<Listing>;

    /// Creates a directory and all missing parents.
    /// Returns the absolute paths of the directories actually created.
    fn mkdir(&mut self, path: &str) -> Result<Vec<String>>;

    /// Creates an empty file in the current directory.
    fn touch(&mut self, name: &str) -> Result<()>;

    /// Removes an entry of the current directory.
    fn rm(&mut self, name: &str, recursive: bool) -> Result<()>;

    /// Deep copy. Returns the absolute path of the copy.
    fn cp(&mut self, source: &str, dest: &str) -> Result<String>;

    /// Move and/or rename. Returns the new absolute path.
    fn mv(&mut self, source: &str, dest: &str) -> Result<String>;

    /// Reads the whole content of a file back from its sectors.
    fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Stores `content` as a new file `name` inside the directory `dest`.
    fn put(&mut self, content: &[u8], name: &str, dest: &str) -> Result<String>;

    /// Replaces the content of an existing file.
    fn write(&mut self, path: &str, content: &[u8]) -> Result<()>;

    /// Appends to the content of an existing file.
    fn append(&mut self, path: &str, content: &[u8]) -> Result<()>;

    fn info(&self, path: &str) -> Result<Info>;

    /// Repacks all file content into the lowest sectors.
    fn defrag(&mut self) -> Result<DefragReport>;

    fn usage(&self) -> DiskUsage;

    fn exists(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> Result<bool>;
    fn is_file(&self, path: &str) -> Result<bool>;
}

pub mod utils {
    use crate::core::{FsError, Result};

    /// Checks a single entry name: ASCII letters, digits, `_` and `.`,
    /// but never `.` or `..` on its own.
    pub fn is_valid_name(name: &str) -> bool {
        if name.is_empty() || name == "." || name == ".." {
            return false;
        }
        name.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    }

    pub fn validate_name(name: &str) -> Result<()> {
        if is_valid_name(name) {
            Ok(())
        } else {
            Err(FsError::InvalidName(name.to_string()))
        }
    }

    /// Splits a path on `/`, dropping empty segments.
    pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
        path.split('/').filter(|part| !part.is_empty())
    }

    pub fn is_absolute(path: &str) -> bool {
        path.starts_with('/')
    }

    /// Splits a destination path into its directory part and final name.
    /// `a/b` gives `("a", "b")`, `/b` gives `("/", "b")`, `b` gives `(".", "b")`.
    pub fn split_parent(path: &str) -> (&str, &str) {
        match path.rfind('/') {
            None => (".", path),
            Some(0) => ("/", &path[1..]),
            Some(pos) => (&path[..pos], &path[pos + 1..]),
        }
    }

    /// Number of sectors needed to hold `len` bytes.
    pub fn sectors_for(len: usize) -> usize {
        len.div_ceil(super::SECTOR_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("a.txt"));
        assert!(is_valid_name("my_dir"));
        assert!(is_valid_name("..hidden"));
        assert!(is_valid_name("A1"));

        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("with space"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("dash-name"));
        assert!(!is_valid_name("ünicode"));
    }

    #[test]
    fn test_split_path() {
        let parts: Vec<_> = split_path("/a//b/./c/").collect();
        assert_eq!(parts, vec!["a", "b", ".", "c"]);

        assert_eq!(split_path("/").count(), 0);
        assert_eq!(split_path("").count(), 0);
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("a/b"), ("a", "b"));
        assert_eq!(split_parent("/b"), ("/", "b"));
        assert_eq!(split_parent("b"), (".", "b"));
        assert_eq!(split_parent("/x/y/z"), ("/x/y", "z"));
        assert_eq!(split_parent("dir/"), ("dir", ""));
    }

    #[test]
    fn test_sectors_for() {
        assert_eq!(sectors_for(0), 0);
        assert_eq!(sectors_for(1), 1);
        assert_eq!(sectors_for(63), 1);
        assert_eq!(sectors_for(64), 1);
        assert_eq!(sectors_for(65), 2);
        assert_eq!(sectors_for(100), 2);
    }
}
