//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Sidecar references stored in manifests must render identically on every
/// platform, so all paths are kept with forward slashes and converted to the
/// platform-native form only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next()
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// Check that a string is a well-formed relative path.
///
/// Rejects empty strings, absolute paths, drive-letter paths, empty
/// components, and components that would escape the containing directory.
pub fn is_valid_relative_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let normalized = path.replace('\\', "/");
    if normalized.starts_with('/') {
        return false;
    }
    // Windows drive letters ("C:...") are absolute for our purposes.
    if normalized.len() >= 2 && normalized.as_bytes()[1] == b':' {
        return false;
    }
    normalized
        .split('/')
        .all(|part| !part.is_empty() && part != "." && part != "..")
}

/// Normalize a relative path, resolving `.` and `..` segments.
///
/// Returns `None` for empty or absolute paths, empty components, or a path
/// that escapes its root. Rebased marker references may legitimately contain
/// `..` (one subdirectory pointing into a sibling), so this is the lenient
/// counterpart to [`is_valid_relative_path`].
pub fn normalize_relative(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let normalized = path.replace('\\', "/");
    if normalized.starts_with('/') {
        return None;
    }
    if normalized.len() >= 2 && normalized.as_bytes()[1] == b':' {
        return None;
    }

    let mut out: Vec<&str> = Vec::new();
    for part in normalized.split('/') {
        match part {
            "" => return None,
            "." => {}
            ".." => {
                out.pop()?;
            }
            other => out.push(other),
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out.join("/"))
    }
}

/// Compute `target` relative to `base_dir`, where both are relative paths
/// rooted at the same directory.
///
/// Used when a marker written into a sidecar file must reference its target
/// relative to the sidecar's own directory rather than the manifest's.
pub fn relative_to(target: &str, base_dir: &str) -> String {
    let target_parts: Vec<&str> = target.split('/').filter(|p| !p.is_empty()).collect();
    let base_parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..base_parts.len() {
        parts.push("..");
    }
    parts.extend(&target_parts[common..]);
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_join_and_parent() {
        let p = NormalizedPath::new("/tmp/resources").join("workflow.json");
        assert_eq!(p.as_str(), "/tmp/resources/workflow.json");
        assert_eq!(p.parent().unwrap().as_str(), "/tmp/resources");
        assert_eq!(p.file_name(), Some("workflow.json"));
        assert_eq!(p.extension(), Some("json"));
    }

    #[test]
    fn test_backslashes_normalized() {
        let p = NormalizedPath::new("dir\\sub").join("file.txt");
        assert_eq!(p.as_str(), "dir/sub/file.txt");
    }

    #[rstest]
    #[case("email_1/body.html", true)]
    #[case("body.txt", true)]
    #[case("a/b/c.json", true)]
    #[case("", false)]
    #[case("/abs/path.txt", false)]
    #[case("C:/windows.txt", false)]
    #[case("../escape.txt", false)]
    #[case("a//b.txt", false)]
    #[case("a/./b.txt", false)]
    fn test_is_valid_relative_path(#[case] path: &str, #[case] valid: bool) {
        assert_eq!(is_valid_relative_path(path), valid);
    }

    #[rstest]
    #[case("email_1/body.html", Some("email_1/body.html"))]
    #[case("email_1/../shared/h.html", Some("shared/h.html"))]
    #[case("a/./b.txt", Some("a/b.txt"))]
    #[case("../escape.txt", None)]
    #[case("/abs.txt", None)]
    #[case("", None)]
    #[case("a/..", None)]
    fn test_normalize_relative(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_relative(path).as_deref(), expected);
    }

    #[rstest]
    #[case("blocks/1.content.md", "", "blocks/1.content.md")]
    #[case("email_1/blocks/1.content.md", "email_1", "blocks/1.content.md")]
    #[case("shared/header.html", "email_1", "../shared/header.html")]
    #[case("a/b/c.md", "a/b", "c.md")]
    fn test_relative_to(#[case] target: &str, #[case] base: &str, #[case] expected: &str) {
        assert_eq!(relative_to(target, base), expected);
    }
}
