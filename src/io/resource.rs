//! Loading resources referenced by a document (images for embedding).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;

/// Reads the bytes behind a URI.
///
/// Loaders are shared across conversions, so they must be thread-safe.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, uri: &str) -> io::Result<Vec<u8>>;
}

/// Loads relative and `file:` URIs from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    base: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative URIs against `base` instead of the working directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, uri: &str) -> io::Result<PathBuf> {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        if let Some((scheme, _)) = path.split_once("://") {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("cannot load {scheme} URIs"),
            ));
        }
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        let path = PathBuf::from(decoded.as_ref());
        Ok(match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        })
    }
}

impl ResourceLoader for FsLoader {
    fn load(&self, uri: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(uri)?)
    }
}

/// Serves resources from memory; unknown URIs are `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(uri, data);
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.resources.insert(uri.into(), data.into());
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, uri: &str) -> io::Result<Vec<u8>> {
        self.resources.get(uri).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no resource {uri:?}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new().with("a.png", b"PNG".to_vec());
        assert_eq!(loader.load("a.png").unwrap(), b"PNG");
        assert_eq!(
            loader.load("b.png").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_fs_loader_relative_and_percent_encoded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blue square.svg"), "<svg/>").unwrap();
        let loader = FsLoader::with_base(dir.path());
        assert_eq!(loader.load("blue%20square.svg").unwrap(), b"<svg/>");
        assert!(loader.load("missing.png").is_err());
    }

    #[test]
    fn test_fs_loader_rejects_remote() {
        let err = FsLoader::new().load("https://example.com/a.png").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
