//! Recursive directory operations used by the transactional writer

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{Error, NormalizedPath, Result};

/// Recursively copy `src` into `dst`, creating `dst` if needed.
///
/// Symlinks are not followed; they are skipped with a warning since resource
/// directories are expected to contain plain files only.
pub fn copy_dir(src: &NormalizedPath, dst: &NormalizedPath) -> Result<()> {
    copy_dir_native(src.as_ref(), dst.as_ref())
}

fn copy_dir_native(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(Error::NotADirectory {
            path: src.to_path_buf(),
        });
    }
    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;

    for entry in fs::read_dir(src).map_err(|e| Error::io(src, e))? {
        let entry = entry.map_err(|e| Error::io(src, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        let target = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_native(&entry.path(), &target)?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(entry.path(), e))?;
        } else {
            tracing::warn!(path = %entry.path().display(), "skipping non-regular file");
        }
    }

    Ok(())
}

/// Remove every entry inside `dir` without removing `dir` itself.
pub fn clear_dir(dir: &NormalizedPath) -> Result<()> {
    let native = dir.to_native();
    if !native.is_dir() {
        return Err(Error::NotADirectory { path: native });
    }

    for entry in fs::read_dir(&native).map_err(|e| Error::io(&native, e))? {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
    }

    debug!(dir = %dir, "cleared directory");
    Ok(())
}

/// Remove a directory and everything under it. A missing directory is fine.
pub fn remove_dir(dir: &NormalizedPath) -> Result<()> {
    let native = dir.to_native();
    if native.exists() {
        fs::remove_dir_all(&native).map_err(|e| Error::io(&native, e))?;
    }
    Ok(())
}

/// List the names of immediate subdirectories of `dir`.
///
/// Hidden directories (leading dot) are skipped; they are never resource
/// directories.
pub fn list_subdirs(dir: &NormalizedPath) -> Result<Vec<String>> {
    let native = dir.to_native();
    if !native.is_dir() {
        return Err(Error::NotADirectory { path: native });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(&native).map_err(|e| Error::io(&native, e))? {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        if entry.path().is_dir()
            && let Some(name) = entry.file_name().to_str()
            && !name.starts_with('.')
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_copy_dir_recursive() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, "workflow.json", "{}");
        write(&src, "email_1/body.html", "<p>hi</p>");

        copy_dir(&NormalizedPath::new(&src), &NormalizedPath::new(&dst)).unwrap();

        assert_eq!(fs::read_to_string(dst.join("workflow.json")).unwrap(), "{}");
        assert_eq!(
            fs::read_to_string(dst.join("email_1/body.html")).unwrap(),
            "<p>hi</p>"
        );
    }

    #[test]
    fn test_clear_dir_keeps_root() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", "a");
        write(temp.path(), "sub/b.txt", "b");

        let dir = NormalizedPath::new(temp.path());
        clear_dir(&dir).unwrap();

        assert!(temp.path().exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_list_subdirs_sorted_and_skips_hidden() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("beta")).unwrap();
        fs::create_dir(temp.path().join("alpha")).unwrap();
        fs::create_dir(temp.path().join(".hidden")).unwrap();
        write(temp.path(), "file.txt", "x");

        let names = list_subdirs(&NormalizedPath::new(temp.path())).unwrap();
        assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let temp = TempDir::new().unwrap();
        let dir = NormalizedPath::new(temp.path()).join("nope");
        assert!(remove_dir(&dir).is_ok());
    }
}
