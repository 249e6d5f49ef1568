//! Recursive directory scan for `.jack` source files.
//!
//! The original C driver opened a single flat directory of `.jack` files via
//! `opendir`/`readdir`, filtering on `strcmp("jack", ext) == 0`. This walks
//! subdirectories too, since the CLI's positional argument is a project root
//! rather than a guaranteed-flat folder of sources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One `.jack` input paired with the `.vm` path it will produce.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
}

/// Recursively finds every `*.jack` file under `root`, returning them sorted
/// by path for a deterministic compile order.
///
/// Errors if `root` does not exist, is not a directory, or a subdirectory
/// can't be read partway through the walk.
pub fn discover_jack_files(root: &Path) -> io::Result<Vec<DiscoveredFile>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("'{}' is not a directory", root.display()),
        ));
    }

    let mut found = Vec::new();
    walk(root, &mut found)?;
    found.sort_by(|a, b| a.source_path.cmp(&b.source_path));
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<DiscoveredFile>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            walk(&path, found)?;
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) == Some("jack") {
            let output_path = path.with_extension("vm");
            found.push(DiscoveredFile { source_path: path, output_path });
        }
    }
    Ok(())
}
