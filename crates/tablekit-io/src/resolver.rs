use std::fs;
use std::path::{Path, PathBuf};

/// Maps a `source`/`source_csv` node's `file_id` config value to an actual
/// path on disk. The default `DirectoryResolver` matches the legacy
/// behavior of scanning a directory for the first file whose basename
/// starts with `file_id` — uploads are stored under a generated prefix and
/// the graph only ever records that prefix, not the full name.
pub trait FileResolver: Send + Sync {
    fn resolve(&self, file_id: &str) -> Option<PathBuf>;
}

pub struct DirectoryResolver {
    dir: PathBuf,
}

impl DirectoryResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileResolver for DirectoryResolver {
    fn resolve(&self, file_id: &str) -> Option<PathBuf> {
        let direct = self.dir.join(file_id);
        if direct.is_file() {
            return Some(direct);
        }
        let entries = fs::read_dir(&self.dir).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = path.file_name()?.to_str()?;
            if name.starts_with(file_id) {
                return Some(path);
            }
        }
        None
    }
}

/// Resolver over a fixed id -> path map, useful for tests and for
/// embedders that already track uploads outside a single directory.
pub struct MapResolver {
    entries: std::collections::HashMap<String, PathBuf>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self {
            entries: std::collections::HashMap::new(),
        }
    }

    pub fn insert(&mut self, file_id: impl Into<String>, path: impl Into<PathBuf>) -> &mut Self {
        self.entries.insert(file_id.into(), path.into());
        self
    }
}

impl Default for MapResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FileResolver for MapResolver {
    fn resolve(&self, file_id: &str) -> Option<PathBuf> {
        self.entries.get(file_id).cloned()
    }
}

pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn prefix_match_finds_uploaded_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abcd1234_detail.csv");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "a,b").unwrap();

        let resolver = DirectoryResolver::new(dir.path());
        let found = resolver.resolve("abcd1234").unwrap();
        assert_eq!(found, path);
    }

    #[test]
    fn unknown_prefix_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DirectoryResolver::new(dir.path());
        assert!(resolver.resolve("nope").is_none());
    }
}
