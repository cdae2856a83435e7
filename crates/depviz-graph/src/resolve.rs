use std::path::{Path, PathBuf};

use crate::collector::normalize;

/// Resolves relative import strings to files on disk.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use depviz_graph::resolve::Resolver;
///
/// let resolver = Resolver::new(["ts", "js"]);
/// let hit = resolver.resolve(Path::new("/repo/src/main.ts"), "./util");
/// println!("{hit:?}");
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    extensions: Vec<String>,
}

impl Resolver {
    /// Create a resolver that tries `extensions` (without dots) in order.
    pub fn new<I>(extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// True if `import` is a candidate for resolution (starts with `.` or `/`).
    ///
    /// # Examples
    ///
    /// ```
    /// use depviz_graph::resolve::Resolver;
    ///
    /// assert!(Resolver::is_relative("./a"));
    /// assert!(Resolver::is_relative("../a"));
    /// assert!(Resolver::is_relative("/abs/a"));
    /// assert!(!Resolver::is_relative("lodash"));
    /// assert!(!Resolver::is_relative("@scope/pkg"));
    /// ```
    pub fn is_relative(import: &str) -> bool {
        import.starts_with('.') || import.starts_with('/')
    }

    /// The ordered candidate list for `import` as seen from `from_file`.
    ///
    /// The exact path comes first, then the path with each extension
    /// appended, then `index.<ext>` inside the path. Bare imports have no
    /// candidates.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use depviz_graph::resolve::Resolver;
    ///
    /// let resolver = Resolver::new(["ts"]);
    /// let candidates = resolver.candidates(Path::new("/r/src/a.ts"), "./b");
    /// assert_eq!(candidates, vec![
    ///     PathBuf::from("/r/src/b"),
    ///     PathBuf::from("/r/src/b.ts"),
    ///     PathBuf::from("/r/src/b/index.ts"),
    /// ]);
    /// assert!(resolver.candidates(Path::new("/r/a.ts"), "react").is_empty());
    /// ```
    pub fn candidates(&self, from_file: &Path, import: &str) -> Vec<PathBuf> {
        if !Self::is_relative(import) {
            return Vec::new();
        }

        let base = from_file.parent().unwrap_or_else(|| Path::new(""));
        let target = normalize(&base.join(import));

        let mut candidates = Vec::with_capacity(1 + self.extensions.len() * 2);
        candidates.push(target.clone());
        for ext in &self.extensions {
            let mut with_ext = target.clone().into_os_string();
            with_ext.push(".");
            with_ext.push(ext);
            candidates.push(PathBuf::from(with_ext));
        }
        for ext in &self.extensions {
            candidates.push(target.join(format!("index.{ext}")));
        }
        candidates
    }

    /// Resolve `import` to the first candidate that is an existing regular
    /// file. Filesystem errors count as "does not exist".
    pub fn resolve(&self, from_file: &Path, import: &str) -> Option<PathBuf> {
        self.candidates(from_file, import)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn resolver() -> Resolver {
        Resolver::new(["ts", "tsx", "js"])
    }

    #[test]
    fn exact_path_wins_first() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        fs::write(root.join("data.json"), "{}").unwrap();

        let hit = resolver().resolve(&root.join("a.ts"), "./data.json");
        assert_eq!(hit, Some(root.join("data.json")));
    }

    #[test]
    fn extension_candidates_follow_configured_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        fs::write(root.join("b.js"), "").unwrap();
        fs::write(root.join("b.tsx"), "").unwrap();

        let hit = resolver().resolve(&root.join("a.ts"), "./b");
        assert_eq!(hit, Some(root.join("b.tsx")));
    }

    #[test]
    fn dotted_stem_gets_extension_appended() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        fs::write(root.join("user.service.ts"), "").unwrap();

        let hit = resolver().resolve(&root.join("a.ts"), "./user.service");
        assert_eq!(hit, Some(root.join("user.service.ts")));
    }

    #[test]
    fn directory_resolves_to_index_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(root.join("src/main.ts"), "").unwrap();
        fs::write(root.join("src/components/index.js"), "").unwrap();

        let hit = resolver().resolve(&root.join("src/main.ts"), "./components");
        assert_eq!(hit, Some(root.join("src/components/index.js")));
    }

    #[test]
    fn parent_directory_import_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/deep")).unwrap();
        fs::write(root.join("src/deep/a.ts"), "").unwrap();
        fs::write(root.join("src/shared.ts"), "").unwrap();

        let hit = resolver().resolve(&root.join("src/deep/a.ts"), "../shared");
        assert_eq!(hit, Some(root.join("src/shared.ts")));
    }

    #[test]
    fn missing_relative_import_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();

        assert_eq!(resolver().resolve(&root.join("a.ts"), "./ghost"), None);
    }

    #[test]
    fn bare_import_never_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "").unwrap();
        fs::write(root.join("lodash.ts"), "").unwrap();

        assert_eq!(resolver().resolve(&root.join("a.ts"), "lodash"), None);
    }

    #[test]
    fn absolute_import_is_tried_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("abs.ts"), "").unwrap();

        let import = root.join("abs").to_string_lossy().into_owned();
        let hit = resolver().resolve(&root.join("elsewhere/a.ts"), &import);
        assert_eq!(hit, Some(root.join("abs.ts")));
    }

    #[test]
    fn resolved_path_is_always_in_candidate_list() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("a.ts"), "").unwrap();
        fs::write(root.join("lib/index.ts"), "").unwrap();

        let r = resolver();
        let from = root.join("a.ts");
        let hit = r.resolve(&from, "./lib").unwrap();
        assert!(r.candidates(&from, "./lib").contains(&hit));
    }
}
