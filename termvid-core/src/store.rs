use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoContext, Result};

pub const ARTIFACT_EXTENSION: &str = "txt";

/// Kept when clearing a directory so checked-in placeholders survive.
const PLACEHOLDER: &str = ".gitkeep";

/// One rendered text frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameArtifact {
    pub index: u64,
    pub content: String,
}

/// A persisted frame, not yet loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactRef {
    pub index: u64,
    pub path: PathBuf,
}

/// Frame artifacts on disk, one `<index>.txt` per global index.
///
/// The file name is only the persistence encoding of `index`; nothing else
/// is inferred from it.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.root.join(format!("{index}.{ARTIFACT_EXTENSION}"))
    }

    /// Empty the store, creating the root if needed.
    pub fn clear(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .io_context(|| format!("failed to create {}", self.root.display()))?;
        clear_dir(&self.root)
    }

    pub fn write(&self, artifact: &FrameArtifact) -> Result<PathBuf> {
        let path = self.path_for(artifact.index);
        fs::write(&path, &artifact.content)
            .io_context(|| format!("failed to write frame {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, artifact: &ArtifactRef) -> Result<String> {
        fs::read_to_string(&artifact.path)
            .io_context(|| format!("failed to read frame {}", artifact.path.display()))
    }

    /// All persisted frames in ascending numeric index order.
    /// A missing root is an empty store.
    pub fn discover(&self) -> Result<Vec<ArtifactRef>> {
        Ok(list_numbered(&self.root)?
            .into_iter()
            .map(|(index, path)| ArtifactRef { index, path })
            .collect())
    }
}

/// Parse a numbered file name, ignoring any extension: `"12.txt"` -> 12.
pub fn parse_index(file_name: &str) -> Result<u64> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    stem.parse()
        .map_err(|_| Error::CorruptArtifactName(file_name.to_string()))
}

/// Regular, non-hidden files of `dir` keyed by their numeric stem and sorted
/// numerically ("2" before "10").
pub fn list_numbered(dir: &Path) -> Result<Vec<(u64, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).io_context(|| format!("failed to list {}", dir.display()));
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.io_context(|| format!("failed to list {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .io_context(|| format!("failed to stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        log::trace!("found numbered file {name}");
        files.push((parse_index(&name)?, entry.path()));
    }

    files.sort_by_key(|(index, _)| *index);
    Ok(files)
}

/// Remove everything under `dir` except placeholder files. A missing `dir`
/// is left missing.
pub fn clear_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir).io_context(|| format!("failed to list {}", dir.display()))? {
        let entry = entry.io_context(|| format!("failed to list {}", dir.display()))?;
        if entry.file_name() == PLACEHOLDER {
            continue;
        }
        let path = entry.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.io_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name).unwrap();
    }

    #[test]
    fn sorts_numerically_not_lexicographically() {
        let tmp = TempDir::new().unwrap();
        for name in ["2.txt", "10.txt", "1.txt"] {
            touch(tmp.path(), name);
        }
        let store = ArtifactStore::new(tmp.path());
        let order: Vec<u64> = store.discover().unwrap().iter().map(|a| a.index).collect();
        assert_eq!(order, vec![1, 2, 10]);
    }

    #[test]
    fn skips_hidden_entries_and_directories() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "3.txt");
        touch(tmp.path(), ".gitkeep");
        touch(tmp.path(), ".DS_Store");
        fs::create_dir(tmp.path().join("nested")).unwrap();

        let found = ArtifactStore::new(tmp.path()).discover().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 3);
    }

    #[test]
    fn non_numeric_name_is_corruption() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "1.txt");
        touch(tmp.path(), "frame-two.txt");
        let err = ArtifactStore::new(tmp.path()).discover().unwrap_err();
        assert!(matches!(err, Error::CorruptArtifactName(name) if name == "frame-two.txt"));
    }

    #[test]
    fn parse_index_ignores_extension() {
        assert_eq!(parse_index("42.txt").unwrap(), 42);
        assert_eq!(parse_index("7.jpg").unwrap(), 7);
        assert_eq!(parse_index("9").unwrap(), 9);
        assert!(parse_index("-1.txt").is_err());
        assert!(parse_index("").is_err());
    }

    #[test]
    fn missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("nope"));
        assert!(store.discover().unwrap().is_empty());
    }

    #[test]
    fn write_then_read() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let path = store
            .write(&FrameArtifact { index: 5, content: "@@\n..".into() })
            .unwrap();
        assert_eq!(path, tmp.path().join("5.txt"));

        let found = store.discover().unwrap();
        assert_eq!(store.read(&found[0]).unwrap(), "@@\n..");
    }

    #[test]
    fn clear_keeps_placeholder() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), ".gitkeep");
        touch(tmp.path(), "1.txt");
        fs::create_dir_all(tmp.path().join("chunk-0/deep")).unwrap();

        clear_dir(tmp.path()).unwrap();

        let left: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(left, vec![".gitkeep"]);
    }

    #[test]
    fn clear_dir_ignores_missing_dir() {
        let tmp = TempDir::new().unwrap();
        clear_dir(&tmp.path().join("absent")).unwrap();
        assert!(!tmp.path().join("absent").exists());
    }

    #[test]
    fn clear_creates_missing_root() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("ascii"));
        store.clear().unwrap();
        assert!(store.root().is_dir());
    }
}
