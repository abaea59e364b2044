//! Filesystem assertions for pipeline tests

use std::path::{Path, PathBuf};

/// Every regular file below `base`, as sorted `/`-separated relative paths
pub fn list_files(base: &Path) -> Vec<String> {
    fn walk(dir: &Path, base: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path: PathBuf = entry.path();
            if path.is_dir() {
                walk(&path, base, out);
            } else if let Ok(relative) = path.strip_prefix(base) {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(parts.join("/"));
            }
        }
    }

    let mut files = Vec::new();
    walk(base, base, &mut files);
    files.sort();
    files
}

/// Assert that `base/relative` exists with exactly `expected` as content
pub fn assert_file(base: &Path, relative: &str, expected: &str) {
    let path = base.join(relative);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("expected file {}: {}", path.display(), e));
    assert_eq!(content, expected, "unexpected content in {}", path.display());
}
