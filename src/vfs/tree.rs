//! Arena-backed directory tree and path resolution.

use crate::core::{FsError, Result, utils};

use super::entry::Entry;

/// Handle of a node inside a `Tree`.
///
/// Handles of removed nodes are recycled, so a `NodeId` must not be kept
/// across an operation that removes its node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Directory tree stored in an arena.
///
/// Every node is owned by the arena; structure is expressed only through
/// `NodeId` handles (children lists and parent links), so there is exactly
/// one owner per node and no reference cycles.
///
/// ### Invariants
///
/// 1. The root is always live, is a directory and has no parent.
/// 2. Every other live node has one parent and appears once in its children.
/// 3. Sibling names are unique (checked by callers before `attach`).
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Option<Entry>>,
    vacant: Vec<usize>,
    root: NodeId,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Entry::directory(""))],
            vacant: Vec::new(),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes. The root always counts, so a fresh tree has one.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    /// # Panics
    /// Panics on a handle whose node was removed.
    pub fn get(&self, id: NodeId) -> &Entry {
        self.slots[id.0].as_ref().expect("stale node id")
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Entry {
        self.slots[id.0].as_mut().expect("stale node id")
    }

    /// Stores a detached node and returns its handle.
    pub fn insert(&mut self, entry: Entry) -> NodeId {
        match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(entry));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Appends a detached `child` to the children of directory `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(children) = self.get_mut(parent).children_mut() {
            children.push(child);
            self.get_mut(child).set_parent(Some(parent));
        }
    }

    /// Unlinks `child` from its parent; the node itself stays in the arena.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.get(child).parent() {
            if let Some(children) = self.get_mut(parent).children_mut() {
                children.retain(|&id| id != child);
            }
            self.get_mut(child).set_parent(None);
        }
    }

    pub fn rename<S: Into<String>>(&mut self, id: NodeId, name: S) {
        self.get_mut(id).set_name(name);
    }

    pub(crate) fn entry_mut(&mut self, id: NodeId) -> &mut Entry {
        self.get_mut(id)
    }

    /// Detaches `id` and drops it with all its descendants.
    /// Returns the removed entries so the caller can reclaim their sectors.
    pub fn remove(&mut self, id: NodeId) -> Vec<Entry> {
        self.detach(id);
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(entry) = self.slots[next.0].take() {
                stack.extend_from_slice(entry.children());
                self.vacant.push(next.0);
                removed.push(entry);
            }
        }
        removed
    }

    /// Finds a direct child of `dir` by exact name.
    pub fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.get(dir)
            .children()
            .iter()
            .copied()
            .find(|&id| self.get(id).name() == name)
    }

    /// Returns `true` if `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.get(node).parent();
        }
        false
    }

    /// Absolute path of a node, `/` for the root.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.get(current).parent() {
            names.push(self.get(current).name());
            current = parent;
        }
        if names.is_empty() {
            return "/".to_string();
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Resolves `path` starting from `cwd` (or from the root for absolute paths).
    ///
    /// Empty segments are skipped, `.` stays in place and `..` moves to the
    /// parent, stopping at the root. Any other segment must name an existing
    /// child. Nothing is created and no partial result is returned.
    pub fn resolve(&self, path: &str, cwd: NodeId) -> Result<NodeId> {
        let mut current = if utils::is_absolute(path) {
            self.root
        } else {
            cwd
        };
        for part in utils::split_path(path) {
            current = match part {
                "." => current,
                ".." => self.get(current).parent().unwrap_or(current),
                name => self
                    .child(current, name)
                    .ok_or_else(|| FsError::NotFound(path.to_string()))?,
            };
        }
        Ok(current)
    }

    /// Files below `id` in pre-order: children in insertion order, each
    /// directory walked completely before its later siblings.
    pub fn files_preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut files = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let entry = self.get(next);
            if entry.is_file() {
                files.push(next);
            } else {
                stack.extend(entry.children().iter().rev());
            }
        }
        files
    }

    /// Total sectors held by the files below `id` (or by `id` itself).
    pub fn sectors_below(&self, id: NodeId) -> usize {
        self.files_preorder(id)
            .into_iter()
            .map(|file| utils::sectors_for(self.get(file).size()))
            .sum()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
