//! Golden-file helpers

use std::fs;
use std::path::Path;

/// Whether golden files should be rewritten from actual output.
pub fn update_golden() -> bool {
    std::env::var_os("UPDATE_GOLDEN").is_some_and(|value| value != "0")
}

/// Load a testdata file, panicking with a useful message if it is
/// missing.
pub fn testdata(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|error| panic!("failed to read {}: {error}", path.display()))
}

/// Load a golden file, first rewriting it with `got` when
/// [`update_golden`] is set.
pub fn goldendata(path: &Path, got: &[u8]) -> Vec<u8> {
    if update_golden() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|error| panic!("failed to create {}: {error}", parent.display()));
        }
        fs::write(path, got)
            .unwrap_or_else(|error| panic!("failed to update {}: {error}", path.display()));
    }
    testdata(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goldendata_returns_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.golden");
        fs::write(&path, b"expected").unwrap();

        assert_eq!(goldendata(&path, b"actual"), b"expected");
    }

    #[test]
    fn test_testdata_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        fs::write(&path, b"[]").unwrap();

        assert_eq!(testdata(&path), b"[]");
    }
}
