use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(filename).is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// List the immediate subdirectories of `root` that contain `marker`,
/// sorted by path so discovery order is stable across platforms.
///
/// A missing root yields an empty list and a warning rather than an error,
/// since a workspace may name optional roots.
pub fn subdirs_containing(root: &Path, marker: &str) -> std::io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        tracing::warn!("Pack root {} does not exist, skipping", root.display());
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() && path.join(marker).is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)
}
