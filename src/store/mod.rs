pub mod entry;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

pub use entry::{EntryContents, SECRET_FIELD};

/// Suffix of the encrypted files backing each entry.
pub const ENTRY_SUFFIX: &str = ".gpg";

/// Read-only view of the store directory. Entry names are paths relative to
/// the root, `/`-separated, without the `.gpg` suffix.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    root: PathBuf,
}

impl EntryRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All entries under the root, or under `subdir` when given. A missing
    /// directory yields no entries.
    pub fn list(&self, subdir: Option<&str>) -> BTreeSet<String> {
        let start = match subdir.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
            Some(subdir) => self.root.join(subdir),
            None => self.root.clone(),
        };

        let entries: BTreeSet<String> = WalkDir::new(&start)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| self.entry_name(e.path()))
            .collect();

        debug!(root = %start.display(), count = entries.len(), "listed entries");
        entries
    }

    /// Whether `entry` has a backing file.
    pub fn contains(&self, entry: &str) -> bool {
        self.root
            .join(format!("{}{}", entry, ENTRY_SUFFIX))
            .is_file()
    }

    fn entry_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let joined = parts.join("/");
        let name = joined.strip_suffix(ENTRY_SUFFIX)?;
        if name.is_empty() || name.ends_with('/') {
            return None;
        }
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"ciphertext").unwrap();
    }

    #[test]
    fn test_list_maps_files_to_entry_names() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/b.gpg");
        touch(dir.path(), "c.gpg");

        let repo = EntryRepository::new(dir.path());
        let expected: BTreeSet<String> = ["a/b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(repo.list(None), expected);
        assert_eq!(repo.list(Some("")), expected);
    }

    #[test]
    fn test_list_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".gpg-id");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "web/site.gpg");
        touch(dir.path(), "web/.gpg");

        let repo = EntryRepository::new(dir.path());
        let names: Vec<String> = repo.list(None).into_iter().collect();
        assert_eq!(names, vec!["web/site"]);
    }

    #[test]
    fn test_list_subdirectory_keeps_full_names() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "work/mail.gpg");
        touch(dir.path(), "work/vpn/token.gpg");
        touch(dir.path(), "home/wifi.gpg");

        let repo = EntryRepository::new(dir.path());
        let names: Vec<String> = repo.list(Some("work/")).into_iter().collect();
        assert_eq!(names, vec!["work/mail", "work/vpn/token"]);
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = EntryRepository::new(dir.path().join("nope"));
        assert!(repo.list(None).is_empty());
    }

    #[test]
    fn test_contains() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/b.gpg");
        let repo = EntryRepository::new(dir.path());
        assert!(repo.contains("a/b"));
        assert!(!repo.contains("a"));
    }
}
