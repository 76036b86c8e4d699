//! Transfers between the virtual file system and the host file system.
//!
//! These are thin wrappers around `FsBackend::get` and `FsBackend::put`; all
//! structural checks stay in the engine.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};

use crate::core::{FsBackend, utils};

type Result<T> = std::result::Result<T, anyhow::Error>;

/// A virtual file written out to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub host_path: PathBuf,
    pub content: Vec<u8>,
}

/// Writes the virtual file `path` into the host directory `host_dir`,
/// keeping its name. The file is read once; its bytes come back with the
/// host path written to.
pub fn export<B: FsBackend, P: AsRef<Path>>(
    fs: &B,
    path: &str,
    host_dir: P,
) -> Result<Exported> {
    let content = fs.get(path)?;
    // `get` succeeded, so the last segment other than `.` names the file
    let name = utils::split_path(path)
        .filter(|part| *part != ".")
        .last()
        .ok_or_else(|| anyhow!("invalid virtual file name: {path}"))?;
    let host_path = host_dir.as_ref().join(name);
    std::fs::write(&host_path, &content)
        .with_context(|| format!("cannot create file: {}", host_path.display()))?;
    Ok(Exported { host_path, content })
}

/// Copies the host file `host_file` into the virtual directory `dest`
/// under the host file's name. Returns the new virtual path.
pub fn import<B: FsBackend, P: AsRef<Path>>(
    fs: &mut B,
    host_file: P,
    dest: &str,
) -> Result<String> {
    let host_file = host_file.as_ref();
    let name = host_file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("invalid host file name: {}", host_file.display()))?;
    let content = std::fs::read(host_file)
        .with_context(|| format!("cannot open real file: {}", host_file.display()))?;
    Ok(fs.put(&content, name, dest)?)
}
