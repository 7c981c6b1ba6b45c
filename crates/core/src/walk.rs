//! File enumeration
//!
//! Walks a root path (flat or recursive) and yields file entries filtered
//! by extension. Paths are emitted with forward-slash separators so
//! downstream key derivation is platform-independent, and directory
//! entries are sorted by name so traversal order is deterministic for a
//! static filesystem.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// What kind of filesystem object the root path is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    File,
    Directory,
}

/// A discovered local file: normalized absolute path plus byte size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Forward-slash normalized path
    pub path: String,
    /// Size in bytes at discovery time
    pub size: u64,
}

/// Classify the root path, failing with [`Error::NotFound`] when it exists
/// as neither a file nor a directory
pub fn classify_root(root_path: &str) -> Result<RootKind> {
    let path = Path::new(root_path);
    if path.is_dir() {
        Ok(RootKind::Directory)
    } else if path.exists() {
        Ok(RootKind::File)
    } else {
        Err(Error::NotFound(format!(
            "{root_path} does not exist as a file or directory"
        )))
    }
}

/// Enumerate candidate files under `root_path`.
///
/// A single-file root emits exactly one entry regardless of `recursive`
/// (the flag is a no-op there; callers warn, this never fails). A
/// directory root emits its direct children when `recursive` is false and
/// descends all subdirectories otherwise. When `extensions` is non-empty,
/// only file names ending with one of the suffixes (case-sensitive) are
/// kept.
///
/// The list is collected eagerly rather than streamed: the orchestrator
/// announces each file's position out of the batch total, so the full
/// count must be known before the first upload starts.
pub fn enumerate(root_path: &str, recursive: bool, extensions: &[String]) -> Result<Vec<FileEntry>> {
    match classify_root(root_path)? {
        RootKind::File => {
            if recursive {
                tracing::warn!(
                    root = root_path,
                    "recursive flag has no effect on a single-file root"
                );
            }
            let name = Path::new(root_path)
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::InvalidPath(root_path.to_string()))?;
            if !matches_extensions(name, extensions) {
                return Ok(Vec::new());
            }
            let size = fs::metadata(root_path)?.len();
            Ok(vec![FileEntry {
                path: normalize(root_path),
                size,
            }])
        }
        RootKind::Directory => {
            let mut entries = Vec::new();
            walk_dir(Path::new(root_path), recursive, extensions, &mut entries)?;
            Ok(entries)
        }
    }
}

/// Normalize path separators to forward slashes
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn matches_extensions(name: &str, extensions: &[String]) -> bool {
    extensions.is_empty() || extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

fn walk_dir(
    dir: &Path,
    recursive: bool,
    extensions: &[String],
    out: &mut Vec<FileEntry>,
) -> Result<()> {
    let mut names: Vec<_> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    names.sort();

    let mut subdirs = Vec::new();
    for path in names {
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !matches_extensions(name, extensions) {
            continue;
        }
        let size = fs::metadata(&path)?.len();
        out.push(FileEntry {
            path: normalize(&path.to_string_lossy()),
            size,
        });
    }

    if recursive {
        for sub in subdirs {
            walk_dir(&sub, recursive, extensions, out)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap().write_all(bytes).unwrap();
    }

    fn root_str(dir: &TempDir) -> String {
        dir.path().to_string_lossy().to_string()
    }

    #[test]
    fn test_classify_root() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "f.txt", b"x");

        assert_eq!(classify_root(&root_str(&dir)).unwrap(), RootKind::Directory);
        let file = dir.path().join("f.txt");
        assert_eq!(
            classify_root(&file.to_string_lossy()).unwrap(),
            RootKind::File
        );
        assert!(matches!(
            classify_root("/no/such/path/anywhere"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_flat_excludes_subdirectories() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.txt", b"a");
        write_file(dir.path(), "b.txt", b"b");
        write_file(dir.path(), "sub/c.txt", b"c");

        let flat = enumerate(&root_str(&dir), false, &[]).unwrap();
        assert_eq!(flat.len(), 2);
        assert!(flat.iter().all(|e| !e.path.contains("/sub/")));

        let recursive = enumerate(&root_str(&dir), true, &[]).unwrap();
        assert_eq!(recursive.len(), 3);
        // Recursive output is a superset of the flat output
        for entry in &flat {
            assert!(recursive.contains(entry));
        }
    }

    #[test]
    fn test_extension_filter_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.mp4", b"a");
        write_file(dir.path(), "b.txt", b"b");
        write_file(dir.path(), "c.MP4", b"c");
        write_file(dir.path(), "sub/d.mp4", b"d");

        let entries = enumerate(&root_str(&dir), true, &[".mp4".to_string()]).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(entries.len(), 2);
        assert!(paths.iter().any(|p| p.ends_with("/a.mp4")));
        assert!(paths.iter().any(|p| p.ends_with("/sub/d.mp4")));
    }

    #[test]
    fn test_multiple_suffixes() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.mp4", b"a");
        write_file(dir.path(), "b.mkv", b"b");
        write_file(dir.path(), "c.txt", b"c");

        let entries = enumerate(
            &root_str(&dir),
            false,
            &[".mp4".to_string(), ".mkv".to_string()],
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_single_file_root() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "report.csv", &[0u8; 1000]);
        let file = dir.path().join("report.csv");

        // Recursive flag is a no-op on a file root
        let entries = enumerate(&file.to_string_lossy(), true, &[]).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].size, 1000);
        assert!(entries[0].path.ends_with("/report.csv"));
    }

    #[test]
    fn test_single_file_root_filtered_out() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "report.csv", b"x");
        let file = dir.path().join("report.csv");

        let entries = enumerate(&file.to_string_lossy(), false, &[".mp4".to_string()]).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_root_fails() {
        let err = enumerate("/no/such/path/anywhere", false, &[]).unwrap_err();
        match err {
            Error::NotFound(msg) => assert!(msg.contains("/no/such/path/anywhere")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_deterministic_order() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "z.txt", b"z");
        write_file(dir.path(), "a.txt", b"a");
        write_file(dir.path(), "m/n.txt", b"n");

        let first = enumerate(&root_str(&dir), true, &[]).unwrap();
        let second = enumerate(&root_str(&dir), true, &[]).unwrap();
        assert_eq!(first, second);
        // Files of a directory come sorted, before any subdirectory descent
        assert!(first[0].path.ends_with("/a.txt"));
        assert!(first[1].path.ends_with("/z.txt"));
        assert!(first[2].path.ends_with("/m/n.txt"));
    }
}
