//! The document store exports are written to.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::ExportError;

/// A validated path relative to the vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPath(String);

impl VaultPath {
    /// Accepts relative paths that stay inside the vault.
    pub fn parse(path: &str) -> Result<Self, ExportError> {
        let invalid = |reason| ExportError::InvalidOutputPath {
            path: path.to_string(),
            reason,
        };

        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut has_file = false;
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(_) => has_file = true,
                Component::CurDir => {}
                Component::ParentDir => return Err(invalid("path leaves the vault")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("path must be relative to the vault"))
                }
            }
        }
        if !has_file {
            return Err(invalid("path names no file"));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VaultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for exported documents
#[async_trait]
pub trait Vault: Send + Sync {
    async fn exists(&self, path: &VaultPath) -> io::Result<bool>;

    async fn read(&self, path: &VaultPath) -> io::Result<String>;

    /// Create or replace the file at `path`
    async fn write(&self, path: &VaultPath, contents: &str) -> io::Result<()>;
}

/// A vault backed by a directory on disk
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a vault path
    pub fn resolve(&self, path: &VaultPath) -> PathBuf {
        self.root.join(path.as_str())
    }
}

#[async_trait]
impl Vault for FsVault {
    async fn exists(&self, path: &VaultPath) -> io::Result<bool> {
        tokio::fs::try_exists(self.resolve(path)).await
    }

    async fn read(&self, path: &VaultPath) -> io::Result<String> {
        tokio::fs::read_to_string(self.resolve(path)).await
    }

    async fn write(&self, path: &VaultPath, contents: &str) -> io::Result<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, contents).await
    }
}
