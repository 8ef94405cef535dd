//! Where mesh bytes come from: the filesystem for the app, memory for tests
//! and embedded demos.

use std::{
    collections::HashMap,
    future::Future,
    io,
    path::{Path, PathBuf},
};

pub trait AssetSource {
    /// Fetch the raw bytes stored under a registry file path.
    fn fetch(&self, path: &str) -> impl Future<Output = io::Result<Vec<u8>>>;
}

/// Reads files relative to an asset root directory.
#[derive(Clone, Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsSource {
    fn fetch(&self, path: &str) -> impl Future<Output = io::Result<Vec<u8>>> {
        let full = self.root.join(path);
        async move {
            log::debug!("Reading {}", full.display());
            std::fs::read(&full)
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> impl Future<Output = io::Result<Vec<u8>>> {
        let found = self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no asset at '{path}'"))
        });
        async move { found }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_serves_inserted_files() {
        let src = MemorySource::new().with("a.obj", b"v 0 0 0".to_vec());
        let bytes = pollster::block_on(src.fetch("a.obj")).unwrap();
        assert_eq!(bytes, b"v 0 0 0");
        let missing = pollster::block_on(src.fetch("b.obj")).unwrap_err();
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn fs_source_reports_missing_files() {
        let src = FsSource::new(std::env::temp_dir().join("no-such-configurator-assets"));
        let err = pollster::block_on(src.fetch("models/audi.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
