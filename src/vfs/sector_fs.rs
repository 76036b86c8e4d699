//! This module provides the sector-backed virtual file system engine.

use log::{debug, info};

use crate::core::{FsBackend, FsError, MAX_CAPACITY, Result, utils};
use crate::disk::Disk;

use super::entry::Entry;
use super::info::{DefragReport, DiskUsage, Info, InfoKind, Listing};
use super::tree::{NodeId, Tree};

/// An in-memory file system whose file content lives in the 64-byte sectors of
/// a simulated disk.
///
/// ### Internal state
///
/// * `tree` — the directory tree. Nodes live in an arena and refer to each
///   other by `NodeId`; the root is a directory that is never removed.
///
/// * `cwd` — the current working directory (the *cursor*). Relative paths are
///   resolved from here. It always points at a live directory: `rm` only
///   removes children of the cursor, and `mv` relinks nodes without
///   destroying them.
///
/// * `disk` — allocation bitmap plus block store, sized once at construction.
///
/// ### Invariants
///
/// 1. A sector is allocated iff exactly one file lists it, exactly once.
/// 2. A file's sectors hold its content in order; only the last one may be
///    partially filled.
/// 3. Sibling names are unique and valid (`[A-Za-z0-9_.]+`, not `.`/`..`).
///
/// ### Failure model
///
/// Every operation either succeeds or returns an `FsError` without changing
/// the tree or the disk. The single exception is `mkdir`, which keeps the
/// directories it managed to create before hitting a bad segment.
///
/// ### Example
///
/// ```
/// use sector_fs::{FsBackend, SectorFS};
///
/// let mut fs = SectorFS::new(16).unwrap();
/// fs.mkdir("/docs").unwrap();
/// fs.put(b"Hello", "note.txt", "/docs").unwrap();
///
/// assert_eq!(fs.get("/docs/note.txt").unwrap(), b"Hello");
/// assert_eq!(fs.usage().used, 1);
/// ```
#[derive(Debug, Clone)]
pub struct SectorFS {
    tree: Tree,
    cwd: NodeId,
    disk: Disk,
}

impl SectorFS {
    /// Creates an empty file system on a disk of `capacity` sectors.
    /// A zero capacity, or one above [`MAX_CAPACITY`], is rejected.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(FsError::InvalidCapacity);
        }
        if capacity > MAX_CAPACITY {
            return Err(FsError::CapacityTooLarge {
                requested: capacity,
                limit: MAX_CAPACITY,
            });
        }
        let tree = Tree::new();
        Ok(Self {
            cwd: tree.root(),
            tree,
            disk: Disk::new(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.disk.capacity()
    }

    /// Indices of all allocated sectors in ascending order.
    pub fn allocated_sectors(&self) -> Vec<usize> {
        self.disk.allocated().collect()
    }

    fn resolve(&self, path: &str) -> Result<NodeId> {
        self.tree.resolve(path, self.cwd)
    }

    fn resolve_dir(&self, path: &str) -> Result<NodeId> {
        let id = self.resolve(path)?;
        if !self.tree.get(id).is_dir() {
            return Err(FsError::NotADirectory(path.to_string()));
        }
        Ok(id)
    }

    fn resolve_file(&self, path: &str) -> Result<NodeId> {
        let id = self.resolve(path)?;
        if !self.tree.get(id).is_file() {
            return Err(FsError::NotAFile(path.to_string()));
        }
        Ok(id)
    }

    /// Works out where `cp`/`mv` should put an entry called `name`.
    ///
    /// An existing directory at `dest` receives the entry under its own name.
    /// Anything else is read as `dir/new_name`, where `dir` must be an
    /// existing directory. The returned name is not validated yet.
    fn destination(&self, dest: &str, name: &str) -> Result<(NodeId, String)> {
        if let Ok(id) = self.resolve(dest) {
            if self.tree.get(id).is_dir() {
                return Ok((id, name.to_string()));
            }
        }
        let (dir_path, new_name) = utils::split_parent(dest);
        let dir = self.resolve_dir(dir_path)?;
        Ok((dir, new_name.to_string()))
    }

    /// Fails with `AlreadyExists` if `dir` has a child called `name` other than `except`.
    fn ensure_free_name(&self, dir: NodeId, name: &str, except: Option<NodeId>) -> Result<()> {
        match self.tree.child(dir, name) {
            Some(existing) if Some(existing) != except => {
                let path = self.tree.path_of(existing);
                Err(FsError::AlreadyExists(path))
            }
            _ => Ok(()),
        }
    }

    /// Builds a detached deep copy of `src` called `name`.
    /// Every copied file gets its own freshly written sectors.
    fn clone_detached(&mut self, src: NodeId, name: &str) -> Result<NodeId> {
        let entry = self.tree.get(src);
        if let Some(content) = entry.content() {
            let sectors = self.disk.store(content)?;
            let content = content.to_vec();
            return Ok(self.tree.insert(Entry::file(name, content, sectors)));
        }

        let children = entry.children().to_vec();
        let dir = self.tree.insert(Entry::directory(name));
        for child in children {
            let child_name = self.tree.get(child).name().to_string();
            let copy = self.clone_detached(child, &child_name)?;
            self.tree.attach(dir, copy);
        }
        Ok(dir)
    }

    /// Rematerializes a file with new content. On `OutOfSpace` the file keeps
    /// both its old content and its old sectors.
    fn rewrite_file(&mut self, id: NodeId, content: Vec<u8>) -> Result<()> {
        let sectors = self.disk.rewrite(self.tree.get(id).sectors(), &content)?;
        self.tree.entry_mut(id).set_content(content, sectors);
        Ok(())
    }

    fn info_of(&self, id: NodeId) -> Info {
        let entry = self.tree.get(id);
        let kind = if entry.is_file() {
            InfoKind::File {
                size: entry.size(),
                sectors: entry.sectors().to_vec(),
            }
        } else {
            InfoKind::Directory
        };
        Info {
            name: entry.name().to_string(),
            path: self.tree.path_of(id),
            kind,
        }
    }
}

impl FsBackend for SectorFS {
    fn pwd(&self) -> String {
        self.tree.path_of(self.cwd)
    }

    /// Changes the current working directory.
    /// * `path` can be in relative or absolute form, but it must exist and be a directory.
    fn cd(&mut self, path: &str) -> Result<()> {
        self.cwd = self.resolve_dir(path)?;
        Ok(())
    }

    /// Lists the immediate children of a directory.
    ///
    /// * `path` — `None` lists the current directory.
    ///
    /// Directory names are suffixed with `/`; the listing is sorted here and
    /// only here, children are stored in insertion order. A path pointing at a
    /// file yields `Listing::File` with its name, path and size instead.
    fn ls(&self, path: Option<&str>) -> Result<Listing> {
        let target = match path {
            Some(path) => self.resolve(path)?,
            None => self.cwd,
        };
        let entry = self.tree.get(target);
        if entry.is_file() {
            return Ok(Listing::File {
                name: entry.name().to_string(),
                path: self.tree.path_of(target),
                size: entry.size(),
            });
        }

        let mut names: Vec<String> = entry
            .children()
            .iter()
            .map(|&id| {
                let child = self.tree.get(id);
                if child.is_dir() {
                    format!("{}/", child.name())
                } else {
                    child.name().to_string()
                }
            })
            .collect();
        names.sort();
        Ok(Listing::Entries(names))
    }

    /// Creates directory and all its parents (if needed).
    ///
    /// Existing directories along the way are entered, not reported as errors.
    /// An existing file with a segment's name fails with `NameConflict`.
    /// Directories created before a failing segment are kept.
    fn mkdir(&mut self, path: &str) -> Result<Vec<String>> {
        if utils::split_path(path).next().is_none() {
            return Err(FsError::InvalidName(path.to_string()));
        }

        let mut current = if utils::is_absolute(path) {
            self.tree.root()
        } else {
            self.cwd
        };
        let mut created = Vec::new();
        for part in utils::split_path(path) {
            utils::validate_name(part)?;
            current = match self.tree.child(current, part) {
                Some(id) if self.tree.get(id).is_dir() => id,
                Some(_) => return Err(FsError::NameConflict(part.to_string())),
                None => {
                    let id = self.tree.insert(Entry::directory(part));
                    self.tree.attach(current, id);
                    let created_path = self.tree.path_of(id);
                    debug!("directory created: {created_path}");
                    created.push(created_path);
                    id
                }
            };
        }
        Ok(created)
    }

    fn touch(&mut self, name: &str) -> Result<()> {
        utils::validate_name(name)?;
        self.ensure_free_name(self.cwd, name, None)?;

        let sectors = self.disk.store(&[])?;
        let id = self.tree.insert(Entry::file(name, Vec::new(), sectors));
        self.tree.attach(self.cwd, id);
        debug!("file created: {}", self.tree.path_of(id));
        Ok(())
    }

    /// Removes a child of the current directory.
    ///
    /// Directories with content need `recursive`. Sectors of every file in
    /// the removed subtree are returned to the disk.
    fn rm(&mut self, name: &str, recursive: bool) -> Result<()> {
        let target = self
            .tree
            .child(self.cwd, name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        let entry = self.tree.get(target);
        if entry.is_dir() && !entry.children().is_empty() && !recursive {
            return Err(FsError::DirectoryNotEmpty(name.to_string()));
        }

        let sectors: Vec<usize> = self
            .tree
            .files_preorder(target)
            .into_iter()
            .flat_map(|file| self.tree.get(file).sectors().to_vec())
            .collect();
        self.disk.release(&sectors)?;
        let path = self.tree.path_of(target);
        let removed = self.tree.remove(target);
        debug!(
            "removed {path}: {} entries, {} sectors freed",
            removed.len(),
            sectors.len()
        );
        Ok(())
    }

    /// Deep copy of `source` to `dest`.
    ///
    /// Space for the whole subtree is checked first, so a copy either lands
    /// completely or not at all. A directory may be copied into one of its own
    /// descendants: the copy is built before it is linked in.
    fn cp(&mut self, source: &str, dest: &str) -> Result<String> {
        let src = self.resolve(source)?;
        let src_name = self.tree.get(src).name().to_string();
        let (dir, name) = self.destination(dest, &src_name)?;
        utils::validate_name(&name)?;
        self.ensure_free_name(dir, &name, None)?;
        if self.tree.sectors_below(src) > self.disk.available() {
            return Err(FsError::OutOfSpace);
        }

        let copy = self.clone_detached(src, &name)?;
        self.tree.attach(dir, copy);
        let path = self.tree.path_of(copy);
        debug!("copied {} -> {path}", self.tree.path_of(src));
        Ok(path)
    }

    /// Moves and/or renames `source`. Nodes are relinked, never copied, and
    /// their sectors are left alone.
    ///
    /// Moving a directory into itself or any of its descendants fails with
    /// `CyclicMove`. A collision with the source itself is not a collision,
    /// so `mv a .` is a no-op.
    fn mv(&mut self, source: &str, dest: &str) -> Result<String> {
        let src = self.resolve(source)?;
        let src_name = self.tree.get(src).name().to_string();
        let (dir, name) = self.destination(dest, &src_name)?;
        if self.tree.get(src).is_dir() && self.tree.is_ancestor_or_self(src, dir) {
            return Err(FsError::CyclicMove(source.to_string()));
        }
        utils::validate_name(&name)?;
        self.ensure_free_name(dir, &name, Some(src))?;

        let from = self.tree.path_of(src);
        if self.tree.get(src).parent() != Some(dir) {
            self.tree.detach(src);
            self.tree.attach(dir, src);
        }
        self.tree.rename(src, name);
        let path = self.tree.path_of(src);
        debug!("moved {from} -> {path}");
        Ok(path)
    }

    /// Reads a file back from the block store.
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let entry = self.tree.get(self.resolve_file(path)?);
        self.disk.read(entry.sectors(), entry.size())
    }

    /// Imports `content` as a new file `name` in directory `dest`.
    /// `name` must not collide with any entry of `dest`, file or directory.
    fn put(&mut self, content: &[u8], name: &str, dest: &str) -> Result<String> {
        let dir = self.resolve_dir(dest)?;
        utils::validate_name(name)?;
        self.ensure_free_name(dir, name, None)?;

        let sectors = self.disk.store(content)?;
        let id = self.tree.insert(Entry::file(name, content.to_vec(), sectors));
        self.tree.attach(dir, id);
        let path = self.tree.path_of(id);
        debug!("imported {} bytes -> {path}", content.len());
        Ok(path)
    }

    fn write(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let id = self.resolve_file(path)?;
        self.rewrite_file(id, content.to_vec())?;
        debug!("wrote {} bytes to {}", content.len(), self.tree.path_of(id));
        Ok(())
    }

    fn append(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let id = self.resolve_file(path)?;
        let mut joined = self.tree.get(id).content().unwrap_or_default().to_vec();
        joined.extend_from_slice(content);
        self.rewrite_file(id, joined)?;
        debug!("appended {} bytes to {}", content.len(), self.tree.path_of(id));
        Ok(())
    }

    fn info(&self, path: &str) -> Result<Info> {
        Ok(self.info_of(self.resolve(path)?))
    }

    /// Repacks every file into the lowest sectors, in tree pre-order.
    ///
    /// Files are taken in insertion order, each directory walked completely
    /// before its later siblings, so the resulting layout is reproducible.
    /// Afterwards sectors `0..used` are allocated and the rest are free.
    fn defrag(&mut self) -> Result<DefragReport> {
        let files = self.tree.files_preorder(self.tree.root());
        let needed = self.tree.sectors_below(self.tree.root());
        if needed > self.disk.capacity() {
            return Err(FsError::OutOfSpace);
        }

        info!("starting disk defragmentation, {} files", files.len());
        self.disk.reset();
        for &file in &files {
            let content = self.tree.get(file).content().unwrap_or_default();
            let sectors = self.disk.store(content)?;
            self.tree.entry_mut(file).set_sectors(sectors);
        }

        let report = DefragReport {
            files: files.len(),
            used: self.disk.used(),
            free: self.disk.available(),
        };
        info!(
            "defragmentation finished: {} sectors used, {} free",
            report.used, report.free
        );
        Ok(report)
    }

    fn usage(&self) -> DiskUsage {
        DiskUsage {
            total: self.disk.capacity(),
            used: self.disk.used(),
            free: self.disk.available(),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    fn is_dir(&self, path: &str) -> Result<bool> {
        Ok(self.tree.get(self.resolve(path)?).is_dir())
    }

    fn is_file(&self, path: &str) -> Result<bool> {
        Ok(self.tree.get(self.resolve(path)?).is_file())
    }
}
