use std::path::{Component, Path, PathBuf};

use depviz_core::{DiagramError, FileRecord, ScanPolicy};
use tracing::{debug, warn};

/// Walk `root` and return every eligible file under it.
///
/// Entries whose relative path has a component matching an ignore pattern
/// are skipped, and matching directories are not descended into. Remaining
/// regular files are kept when [`ScanPolicy::is_eligible`] accepts them.
/// Unreadable files (permissions, invalid UTF-8) are logged and excluded.
/// Directory entries are visited in file-name order.
///
/// # Errors
///
/// Returns [`DiagramError::RootNotFound`] if `root` is not an existing
/// directory.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use depviz_core::{ScanConfig, ScanPolicy};
/// use depviz_graph::collector::collect;
///
/// let policy = ScanPolicy::from_config(&ScanConfig::default()).unwrap();
/// let files = collect(Path::new("."), &policy).unwrap();
/// for f in &files {
///     println!("{} ({} lines)", f.name, f.line_count);
/// }
/// ```
pub fn collect(root: &Path, policy: &ScanPolicy) -> Result<Vec<FileRecord>, DiagramError> {
    let root = match std::fs::canonicalize(root) {
        Ok(r) if r.is_dir() => r,
        _ => return Err(DiagramError::RootNotFound(root.to_path_buf())),
    };

    let filter_root = root.clone();
    let filter_policy = policy.clone();
    let walker = ignore::WalkBuilder::new(&root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let relative = entry
                .path()
                .strip_prefix(&filter_root)
                .unwrap_or(entry.path());
            !filter_policy.is_ignored(relative)
        })
        .build();

    let mut files = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }

        let path = entry.path();
        if !policy.is_eligible(path) {
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        let relative = path.strip_prefix(&root).unwrap_or(path);
        files.push(FileRecord::new(
            path.to_path_buf(),
            relative_name(relative),
            content,
        ));
    }

    debug!(root = %root.display(), files = files.len(), "collection finished");
    Ok(files)
}

/// Join the normal components of `relative` with `/`.
fn relative_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Lexically normalize `path`, dropping `.` and folding `..` without
/// touching the filesystem.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use depviz_graph::collector::normalize;
///
/// assert_eq!(normalize(Path::new("/a/b/../c/./d.ts")), PathBuf::from("/a/c/d.ts"));
/// ```
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use depviz_core::ScanConfig;
    use std::fs;

    fn default_policy() -> ScanPolicy {
        ScanPolicy::from_config(&ScanConfig::default()).unwrap()
    }

    fn make_temp_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("src/util")).unwrap();
        fs::write(root.join("src/index.ts"), "import './util/fmt';\n").unwrap();
        fs::write(root.join("src/util/fmt.ts"), "export function fmt() {}\n").unwrap();
        fs::write(root.join("src/layout.js"), "class Layout {}\n").unwrap();
        fs::write(root.join("Makefile"), "all:\n\techo hi\n").unwrap();
        fs::write(root.join("logo.png"), [0x89, 0x50, 0x4e, 0x47]).unwrap();

        fs::create_dir_all(root.join("node_modules/lodash")).unwrap();
        fs::write(root.join("node_modules/lodash/index.js"), "module.exports = {}").unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("dist/bundle.js"), "x").unwrap();
        fs::write(root.join("yarn.lock"), "# lock").unwrap();
        fs::write(root.join(".env"), "SECRET=1").unwrap();

        dir
    }

    fn names(files: &[FileRecord]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn collects_allowlisted_and_extensionless_files() {
        let dir = make_temp_repo();
        let files = collect(dir.path(), &default_policy()).unwrap();

        assert_eq!(
            names(&files),
            vec!["Makefile", "src/index.ts", "src/layout.js", "src/util/fmt.ts"]
        );
    }

    #[test]
    fn ignored_paths_and_descendants_never_appear() {
        let dir = make_temp_repo();
        let files = collect(dir.path(), &default_policy()).unwrap();

        for f in &files {
            assert!(!f.name.starts_with("node_modules"), "{}", f.name);
            assert!(!f.name.starts_with(".git"), "{}", f.name);
            assert!(!f.name.starts_with("dist"), "{}", f.name);
            assert_ne!(f.name, "yarn.lock");
            assert_ne!(f.name, ".env");
        }
    }

    #[test]
    fn version_control_dotfiles_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        fs::write(root.join(".gitignore"), "target\n").unwrap();
        fs::write(root.join(".gitattributes"), "* text=auto\n").unwrap();
        fs::write(root.join(".hgignore"), "syntax: glob\n").unwrap();
        fs::create_dir_all(root.join(".github/workflows")).unwrap();
        fs::write(root.join(".github/workflows/ci.yml"), "on: push\n").unwrap();

        let files = collect(root, &default_policy()).unwrap();
        assert_eq!(names(&files), vec!["a.ts"]);
    }

    #[test]
    fn records_carry_absolute_path_and_line_count() {
        let dir = make_temp_repo();
        let files = collect(dir.path(), &default_policy()).unwrap();

        let fmt = files.iter().find(|f| f.name == "src/util/fmt.ts").unwrap();
        assert!(fmt.path.is_absolute());
        assert!(fmt.path.ends_with("src/util/fmt.ts"));
        assert_eq!(fmt.line_count, 1);
        assert!(fmt.content.contains("function fmt"));
    }

    #[test]
    fn injected_policy_replaces_defaults() {
        let dir = make_temp_repo();
        let policy = ScanPolicy::new(["util"], ["js"], false).unwrap();
        let files = collect(dir.path(), &policy).unwrap();

        // node_modules is no longer ignored, util is
        assert_eq!(
            names(&files),
            vec!["dist/bundle.js", "node_modules/lodash/index.js", "src/layout.js"]
        );
    }

    #[test]
    fn invalid_utf8_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.ts"), [0xff, 0xfe, 0xfd]).unwrap();
        fs::write(dir.path().join("good.ts"), "const ok = 1;").unwrap();

        let files = collect(dir.path(), &default_policy()).unwrap();
        assert_eq!(names(&files), vec!["good.ts"]);
    }

    #[test]
    fn empty_directory_yields_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let files = collect(dir.path(), &default_policy()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect(&dir.path().join("nope"), &default_policy()).unwrap_err();
        assert!(matches!(err, DiagramError::RootNotFound(_)));
    }

    #[test]
    fn file_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "").unwrap();
        let err = collect(&file, &default_policy()).unwrap_err();
        assert!(matches!(err, DiagramError::RootNotFound(_)));
    }

    #[test]
    fn normalize_folds_parent_and_current() {
        assert_eq!(normalize(Path::new("/r/src/./a/../b.ts")), PathBuf::from("/r/src/b.ts"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }
}
