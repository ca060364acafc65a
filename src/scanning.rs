//! Directory scanning utilities for harvesting source documents.

use std::fs;
use std::path::{Path, PathBuf};

const NODE_MODULES: &str = "node_modules";

/// Walk `dir` collecting files accepted by `is_source`, in sorted order.
///
/// Hidden entries, `node_modules` and any directory listed in `skip_dirs` (typically the output
/// directory when it lives inside the source tree) are not descended into.
pub fn collect_source_files<F>(dir: &Path, skip_dirs: &[PathBuf], is_source: &F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let mut files = Vec::new();
    collect_recursively(dir, skip_dirs, is_source, &mut files);
    files.sort();
    files
}

fn collect_recursively<F>(dir: &Path, skip_dirs: &[PathBuf], is_source: &F, files: &mut Vec<PathBuf>)
where
    F: Fn(&Path) -> bool,
{
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let name_str = file_name.to_string_lossy();
        if name_str.starts_with('.') {
            continue;
        }

        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if name_str == NODE_MODULES || skip_dirs.iter().any(|skip| skip == &path) {
                continue;
            }
            collect_recursively(&path, skip_dirs, is_source, files);
        } else if file_type.is_file() && is_source(&path) {
            files.push(path);
        }
    }
}

/// Path of `file` relative to `root`, falling back to the file name for unrelated paths.
pub fn relative_to(root: &Path, file: &Path) -> PathBuf {
    match file.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| file.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn is_tsx(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "tsx")
    }

    #[test]
    fn collects_matching_files_recursively() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("routes/blog")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();

        fs::write(root.join("layout.tsx"), "").unwrap();
        fs::write(root.join("routes/blog/post.tsx"), "").unwrap();
        fs::write(root.join("routes/readme.md"), "").unwrap();
        fs::write(root.join("node_modules/pkg/index.tsx"), "").unwrap();
        fs::write(root.join(".cache/stale.tsx"), "").unwrap();
        fs::write(root.join("dist/layout.tsx"), "").unwrap();

        let files = collect_source_files(root, &[root.join("dist")], &is_tsx);

        assert_eq!(files, vec![root.join("layout.tsx"), root.join("routes/blog/post.tsx")]);
    }

    #[test]
    fn missing_directories_yield_nothing() {
        let dir = tempdir().unwrap();
        assert!(collect_source_files(&dir.path().join("absent"), &[], &is_tsx).is_empty());
    }

    #[test]
    fn relative_paths_strip_the_root() {
        let root = Path::new("/work/src");
        assert_eq!(relative_to(root, Path::new("/work/src/a/b.tsx")), PathBuf::from("a/b.tsx"));
        assert_eq!(relative_to(root, Path::new("/elsewhere/c.tsx")), PathBuf::from("c.tsx"));
    }
}
