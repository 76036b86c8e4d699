use super::tree::NodeId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Payload {
    File { content: Vec<u8>, sectors: Vec<usize> },
    Directory { children: Vec<NodeId> },
}

/// A node of the directory tree.
///
/// Files carry their content and the sectors it is materialized in;
/// directories carry their children in insertion order. `parent` is a plain
/// handle into the owning `Tree`, never an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    parent: Option<NodeId>,
    payload: Payload,
}

impl Entry {
    pub fn directory<S: Into<String>>(name: S) -> Entry {
        Entry {
            name: name.into(),
            parent: None,
            payload: Payload::Directory {
                children: Vec::new(),
            },
        }
    }

    pub fn file<S: Into<String>>(name: S, content: Vec<u8>, sectors: Vec<usize>) -> Entry {
        Entry {
            name: name.into(),
            parent: None,
            payload: Payload::File { content, sectors },
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self.payload {
            Payload::File { .. } => EntryType::File,
            Payload::Directory { .. } => EntryType::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type() == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type() == EntryType::Directory
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children of a directory. Always empty for files.
    pub fn children(&self) -> &[NodeId] {
        match &self.payload {
            Payload::Directory { children } => children,
            Payload::File { .. } => &[],
        }
    }

    /// Content of a file, `None` for directories.
    pub fn content(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::File { content, .. } => Some(content),
            Payload::Directory { .. } => None,
        }
    }

    /// Sectors holding the content of a file, in order. Empty for directories.
    pub fn sectors(&self) -> &[usize] {
        match &self.payload {
            Payload::File { sectors, .. } => sectors,
            Payload::Directory { .. } => &[],
        }
    }

    /// Content length in bytes; zero for directories.
    pub fn size(&self) -> usize {
        self.content().map_or(0, <[u8]>::len)
    }

    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Replaces the content of a file together with its new sector list.
    /// Has no effect on directories.
    pub(crate) fn set_content(&mut self, new_content: Vec<u8>, new_sectors: Vec<usize>) {
        if let Payload::File { content, sectors } = &mut self.payload {
            *content = new_content;
            *sectors = new_sectors;
        }
    }

    /// Points a file at a new sector list, keeping its content.
    pub(crate) fn set_sectors(&mut self, new_sectors: Vec<usize>) {
        if let Payload::File { sectors, .. } = &mut self.payload {
            *sectors = new_sectors;
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.payload {
            Payload::Directory { children } => Some(children),
            Payload::File { .. } => None,
        }
    }
}
