//! Destination key derivation
//!
//! Maps a discovered file path (plus root path and optional key prefix) to
//! the object key it will be stored under. Derivation is a pure function
//! of its inputs: re-running discovery against an unchanged filesystem
//! reproduces identical keys.

use crate::walk::normalize;

/// Derive the destination object key for one file.
///
/// - Without a prefix the key is the file's normalized absolute path.
/// - With a prefix and a directory root, the root segment of the path is
///   substituted by the prefix, preserving the relative sub-path (a
///   trailing slash on the prefix does not produce a doubled slash).
/// - With a prefix and a single-file root, the key is the prefix
///   concatenated with the file's base name; directory structure is
///   discarded.
pub fn derive_key(
    file_path: &str,
    root_path: &str,
    key_prefix: Option<&str>,
    root_is_directory: bool,
) -> String {
    let file_path = normalize(file_path);
    let Some(prefix) = key_prefix.filter(|p| !p.is_empty()) else {
        return file_path;
    };

    if root_is_directory {
        let root = normalize(root_path);
        let rel = file_path
            .strip_prefix(root.trim_end_matches('/'))
            .unwrap_or(&file_path);
        format!("{}{}", prefix.trim_end_matches('/'), rel)
    } else {
        let base = file_path.rsplit('/').next().unwrap_or(&file_path);
        format!("{prefix}{base}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_prefix_keeps_absolute_path() {
        let key = derive_key("/data/videos/x.mp4", "/data/videos", None, true);
        assert_eq!(key, "/data/videos/x.mp4");
    }

    #[test]
    fn test_directory_root_with_prefix() {
        let key = derive_key("/data/videos/x.mp4", "/data/videos", Some("media/"), true);
        assert_eq!(key, "media/x.mp4");
    }

    #[test]
    fn test_directory_root_preserves_subpath() {
        let key = derive_key(
            "/data/videos/sub/y.mp4",
            "/data/videos",
            Some("media/"),
            true,
        );
        assert_eq!(key, "media/sub/y.mp4");
    }

    #[test]
    fn test_prefix_without_trailing_slash() {
        let key = derive_key("/data/videos/x.mp4", "/data/videos", Some("media"), true);
        assert_eq!(key, "media/x.mp4");
    }

    #[test]
    fn test_single_file_root_discards_directories() {
        let key = derive_key(
            "/home/user/report.csv",
            "/home/user/report.csv",
            Some("backups/"),
            false,
        );
        assert_eq!(key, "backups/report.csv");
    }

    #[test]
    fn test_empty_prefix_behaves_like_none() {
        let key = derive_key("/data/x.mp4", "/data", Some(""), true);
        assert_eq!(key, "/data/x.mp4");
    }

    #[test]
    fn test_windows_separators_normalized() {
        let key = derive_key("D:\\Media\\MP4s\\clip.mp4", "D:\\Media\\MP4s", None, true);
        assert_eq!(key, "D:/Media/MP4s/clip.mp4");
    }

    #[test]
    fn test_derivation_is_pure() {
        let a = derive_key("/data/videos/x.mp4", "/data/videos", Some("media/"), true);
        let b = derive_key("/data/videos/x.mp4", "/data/videos", Some("media/"), true);
        assert_eq!(a, b);
    }
}
