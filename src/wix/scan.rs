//! Publish directory scanning.
//!
//! Walks the publish directory once with `walkdir` and rebuilds the nested
//! structure as a [`FileSystemNode`] tree. Entries are sorted by file name so
//! the same directory always produces the same tree. Symbolic links are
//! skipped so the walk always terminates, and entries whose names cannot be
//! written into an XML document are skipped with their whole subtree. Both
//! are reported as warnings.

use crate::wix::context::Warning;
use crate::wix::error::{Result, ScanError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of a scanned entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeKind {
    /// A directory; may have children.
    Directory,
    /// A regular file.
    File,
}

/// One scanned filesystem entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileSystemNode {
    /// Entry kind.
    pub kind: NodeKind,
    /// File or directory name. Empty for the scan root.
    pub name: String,
    /// Path relative to the scan root. Empty for the scan root.
    pub relative_path: PathBuf,
    /// Children in lexical order. Always empty for files.
    pub children: Vec<FileSystemNode>,
}

impl FileSystemNode {
    fn directory(name: String, relative_path: PathBuf) -> Self {
        Self {
            kind: NodeKind::Directory,
            name,
            relative_path,
            children: Vec::new(),
        }
    }

    fn file(name: String, relative_path: PathBuf) -> Self {
        Self {
            kind: NodeKind::File,
            name,
            relative_path,
            children: Vec::new(),
        }
    }

    /// Whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Files directly inside this directory, in order.
    pub fn files(&self) -> impl Iterator<Item = &FileSystemNode> {
        self.children.iter().filter(|c| c.kind == NodeKind::File)
    }

    /// Subdirectories directly inside this directory, in order.
    pub fn directories(&self) -> impl Iterator<Item = &FileSystemNode> {
        self.children.iter().filter(|c| c.kind == NodeKind::Directory)
    }

    /// Total number of files in this subtree.
    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children.iter().map(Self::file_count).sum(),
        }
    }
}

/// Result of scanning a publish directory.
#[derive(Clone, Debug)]
pub struct ScannedTree {
    /// The scan root as given by the caller.
    pub root_path: PathBuf,
    /// Root directory node.
    pub root: FileSystemNode,
    /// Entries that were skipped.
    pub warnings: Vec<Warning>,
}

impl ScannedTree {
    /// Absolute (or caller-relative) source path of a scanned entry.
    pub fn source_path(&self, node: &FileSystemNode) -> PathBuf {
        self.root_path.join(&node.relative_path)
    }
}

/// Scans `root` into a [`ScannedTree`].
///
/// # Errors
///
/// Returns [`ScanError::RootNotFound`] or [`ScanError::NotADirectory`] when the
/// root is unusable, and [`ScanError::Walk`] when an entry cannot be read.
pub fn scan(root: &Path) -> Result<ScannedTree> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()).into());
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()).into());
    }

    log::debug!("Scanning {}", root.display());

    let mut warnings = Vec::new();
    // stack[d] is the open directory at depth d
    let mut stack = vec![FileSystemNode::directory(String::new(), PathBuf::new())];

    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1)
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| ScanError::Walk {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
            reason: e.to_string(),
        })?;

        while stack.len() > entry.depth() {
            close_directory(&mut stack);
        }

        let relative_path = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .map_err(|e| ScanError::Walk {
                path: entry.path().to_path_buf(),
                reason: e.to_string(),
            })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if !is_xml_safe(&name) {
            log::debug!("Skipping {}: name is not valid in XML", relative_path.display());
            if file_type.is_dir() {
                walker.skip_current_dir();
            }
            warnings.push(Warning::InvalidName {
                path: relative_path,
            });
        } else if file_type.is_symlink() {
            log::debug!("Skipping symbolic link {}", relative_path.display());
            warnings.push(Warning::SymlinkSkipped {
                path: relative_path,
            });
        } else if file_type.is_dir() {
            stack.push(FileSystemNode::directory(name, relative_path));
        } else if file_type.is_file() {
            log::debug!("Found {}", relative_path.display());
            if let Some(parent) = stack.last_mut() {
                parent.children.push(FileSystemNode::file(name, relative_path));
            }
        }
    }

    while stack.len() > 1 {
        close_directory(&mut stack);
    }

    let root_node = stack.pop().ok_or_else(|| ScanError::Walk {
        path: root.to_path_buf(),
        reason: "scan produced no root".to_string(),
    })?;

    log::info!(
        "Scanned {} file(s) under {}",
        root_node.file_count(),
        root.display()
    );

    Ok(ScannedTree {
        root_path: root.to_path_buf(),
        root: root_node,
        warnings,
    })
}

/// Whether every character of `name` may appear in an XML 1.0 attribute
/// without being altered by attribute-value normalization.
fn is_xml_safe(name: &str) -> bool {
    !name
        .chars()
        .any(|c| c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}')
}

/// Pops the innermost open directory and attaches it to its parent.
fn close_directory(stack: &mut Vec<FileSystemNode>) {
    if let Some(done) = stack.pop()
        && let Some(parent) = stack.last_mut()
    {
        parent.children.push(done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_builds_sorted_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.dll"), b"").unwrap();
        fs::write(dir.path().join("a.exe"), b"").unwrap();
        fs::create_dir_all(dir.path().join("plugins/nested")).unwrap();
        fs::write(dir.path().join("plugins/p.dll"), b"").unwrap();
        fs::write(dir.path().join("plugins/nested/n.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("logs")).unwrap();

        let tree = scan(dir.path()).unwrap();
        let names: Vec<_> = tree.root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a.exe", "b.dll", "logs", "plugins"]);

        let logs = &tree.root.children[2];
        assert!(logs.is_dir());
        assert!(logs.children.is_empty());

        let plugins = &tree.root.children[3];
        assert_eq!(plugins.relative_path, Path::new("plugins"));
        let nested = plugins.directories().next().unwrap();
        assert_eq!(nested.files().next().unwrap().relative_path, Path::new("plugins/nested/n.txt"));
        assert_eq!(tree.root.file_count(), 4);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, crate::wix::Error::Scan(ScanError::RootNotFound(_))));
    }

    #[test]
    fn test_scan_root_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.exe");
        fs::write(&file, b"").unwrap();
        let err = scan(&file).unwrap_err();
        assert!(matches!(err, crate::wix::Error::Scan(ScanError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_names_invalid_in_xml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.exe"), b"").unwrap();
        fs::write(dir.path().join("bad\u{1}name.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("ctl\u{7}dir")).unwrap();
        fs::write(dir.path().join("ctl\u{7}dir").join("inner.dll"), b"").unwrap();

        let tree = scan(dir.path()).unwrap();
        let names: Vec<_> = tree.root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["app.exe"]);
        assert_eq!(tree.root.file_count(), 1);
        assert_eq!(tree.warnings.len(), 2);
        assert!(tree
            .warnings
            .iter()
            .all(|w| matches!(w, Warning::InvalidName { .. })));
    }

    #[test]
    fn test_xml_safe_names() {
        assert!(is_xml_safe("app.exe"));
        assert!(is_xml_safe("Café ñ 日本.txt"));
        assert!(!is_xml_safe("a\tb"));
        assert!(!is_xml_safe("a\u{1}b"));
        assert!(!is_xml_safe("a\u{FFFF}"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.exe"), b"").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let tree = scan(dir.path()).unwrap();
        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.warnings.len(), 1);
        assert!(matches!(&tree.warnings[0], Warning::SymlinkSkipped { path } if path == Path::new("loop")));
    }
}
