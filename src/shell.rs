//! Line-oriented command interpreter on top of an `FsBackend`.

use std::path::PathBuf;

use anyhow::anyhow;

use crate::core::FsBackend;
use crate::host;

type Result<T> = std::result::Result<T, anyhow::Error>;

pub const HELP: &str = "\
=== Available Commands ===
pwd                     - Print working directory
cd <path>               - Change directory
ls [path]               - List directory contents
mkdir <path>            - Create directory (and parents)
touch <name>            - Create file
rm <name>               - Remove file or empty directory
rm -r <name>            - Remove directory recursively
cp <source> <dest>      - Copy file or directory
mv <source> <dest>      - Move/rename file or directory
get <file>              - Display file content and save it to the host
put <real> <dir>        - Copy real file into a virtual directory
info <path>             - Display file information
defrag                  - Defragment disk
usage                   - Show sector usage
help                    - Show this help
exit                    - Exit program
==========================";

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Nothing,
    Exit,
}

/// Interprets whitespace-separated command lines against a file system.
/// Files fetched with `get` are saved into `export_dir` on the host.
pub struct Shell<B: FsBackend> {
    fs: B,
    export_dir: PathBuf,
}

impl<B: FsBackend> Shell<B> {
    pub fn new<P: Into<PathBuf>>(fs: B, export_dir: P) -> Self {
        Self {
            fs,
            export_dir: export_dir.into(),
        }
    }

    pub fn fs(&self) -> &B {
        &self.fs
    }

    /// Runs one command line. Engine failures and usage mistakes come back
    /// as errors; nothing here panics on user input.
    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = tokens.split_first() else {
            return Ok(Reply::Nothing);
        };

        let reply = match command {
            "exit" | "quit" => Reply::Exit,
            "help" => Reply::Text(HELP.to_string()),
            "pwd" => Reply::Text(self.fs.pwd()),
            "cd" => {
                self.fs.cd(arg(args, 0, "cd requires a path")?)?;
                Reply::Nothing
            }
            "ls" => text(self.fs.ls(args.first().copied())?.to_string()),
            "mkdir" => {
                let created = self.fs.mkdir(arg(args, 0, "mkdir requires a name")?)?;
                let lines: Vec<_> = created
                    .iter()
                    .map(|path| format!("Directory created: {path}"))
                    .collect();
                text(lines.join("\n"))
            }
            "touch" => {
                let name = arg(args, 0, "touch requires a filename")?;
                self.fs.touch(name)?;
                Reply::Text(format!("File created: {name}"))
            }
            "rm" => match args {
                ["-r", name] => {
                    self.fs.rm(name, true)?;
                    Reply::Text(format!("Removed: {name} (recursively)"))
                }
                [name, ..] => {
                    self.fs.rm(name, false)?;
                    Reply::Text(format!("Removed: {name}"))
                }
                [] => return Err(anyhow!("rm requires a name")),
            },
            "cp" => {
                let (source, dest) = two_args(args, "cp requires source and destination")?;
                let path = self.fs.cp(source, dest)?;
                Reply::Text(format!("Copied: {source} -> {path}"))
            }
            "mv" => {
                let (source, dest) = two_args(args, "mv requires source and destination")?;
                let path = self.fs.mv(source, dest)?;
                Reply::Text(format!("Moved: {source} -> {path}"))
            }
            "get" => {
                let path = arg(args, 0, "get requires a filename")?;
                let exported = host::export(&self.fs, path, &self.export_dir)?;
                Reply::Text(format!(
                    "{}\nSaved to: {}",
                    String::from_utf8_lossy(&exported.content),
                    exported.host_path.display()
                ))
            }
            "put" => {
                let (real, dest) =
                    two_args(args, "put requires real file and virtual directory names")?;
                let path = host::import(&mut self.fs, real, dest)?;
                Reply::Text(format!("File copied from real system: {real} -> {path}"))
            }
            "info" => Reply::Text(
                self.fs
                    .info(arg(args, 0, "info requires a filename")?)?
                    .to_string(),
            ),
            "defrag" => {
                let report = self.fs.defrag()?;
                Reply::Text(format!("Starting disk defragmentation...\n{report}"))
            }
            "usage" => Reply::Text(self.fs.usage().to_string()),
            other => {
                return Err(anyhow!(
                    "unknown command: {other}, type 'help' for available commands"
                ));
            }
        };
        Ok(reply)
    }
}

fn arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str> {
    args.get(index).copied().ok_or_else(|| anyhow!("{usage}"))
}

fn two_args<'a>(args: &[&'a str], usage: &str) -> Result<(&'a str, &'a str)> {
    Ok((arg(args, 0, usage)?, arg(args, 1, usage)?))
}

fn text(output: String) -> Reply {
    if output.is_empty() {
        Reply::Nothing
    } else {
        Reply::Text(output)
    }
}
