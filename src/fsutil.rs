//! Path-existence helpers consumed by the store and by tests.

use std::fs;
use std::io;
use std::path::Path;

pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

pub fn path_not_exists(path: &Path) -> bool {
    !path_exists(path)
}

/// Remove the file at `path` if present. A missing file is not an error.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    if path_exists(path) {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_exists_and_remove() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.db");

        assert!(path_not_exists(&path));
        remove_if_exists(&path)?;

        fs::write(&path, b"x")?;
        assert!(path_exists(&path));

        remove_if_exists(&path)?;
        assert!(path_not_exists(&path));

        Ok(())
    }
}
