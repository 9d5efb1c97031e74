//! Static directory registrations and cache-busted asset URLs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// One registered static directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDir {
    pub prefix: String,
    pub dir: PathBuf,
    pub name: Option<String>,
}

/// Static directories reachable by prefix and, when named, by name
#[derive(Debug, Default, Clone)]
pub struct StaticRoutes {
    entries: HashMap<String, Arc<StaticDir>>,
}

impl StaticRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `dir` under `prefix` and optionally `name`
    ///
    /// Fails if the directory is missing or if the prefix or the name is
    /// already registered.
    pub fn add(&mut self, prefix: &str, dir: impl AsRef<Path>, name: Option<&str>) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::MissingDirectory(dir.to_path_buf()));
        }

        for identifier in std::iter::once(prefix).chain(name) {
            if self.entries.contains_key(identifier) {
                return Err(Error::DuplicateStatic(identifier.to_string()));
            }
        }

        let entry = Arc::new(StaticDir {
            prefix: prefix.to_string(),
            dir: dir.to_path_buf(),
            name: name.map(str::to_string),
        });

        tracing::debug!(prefix, dir = %dir.display(), name, "registered static directory");

        self.entries.insert(prefix.to_string(), Arc::clone(&entry));
        if let Some(name) = name {
            self.entries.insert(name.to_string(), entry);
        }
        Ok(())
    }

    /// Looks up a registration by prefix or name
    pub fn get(&self, identifier: &str) -> Option<&StaticDir> {
        self.entries.get(identifier).map(Arc::as_ref)
    }

    /// Builds the public URL of `file` under a registered directory
    ///
    /// `file` may carry a query string. With `bust`, an existing file gets a
    /// `v=` parameter derived from its contents; missing files never do.
    pub fn url(&self, identifier: &str, file: &str, bust: bool, host: Option<&str>) -> Result<String> {
        let entry = self
            .get(identifier)
            .ok_or_else(|| Error::StaticNotFound(identifier.to_string()))?;

        let file = file.trim_start_matches('/');
        let path = [entry.prefix.trim_matches('/'), file]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let mut url = format!("{}/{}", host.unwrap_or("").trim_end_matches('/'), path);

        if bust {
            let path = file.split_once('?').map_or(file, |(path, _)| path);
            if let Some(version) = content_version(&entry.dir.join(path)) {
                let separator = if url.contains('?') { '&' } else { '?' };
                url.push(separator);
                url.push_str("v=");
                url.push_str(&version);
            }
        }

        Ok(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaticDir> {
        // every entry is indexed by its prefix exactly once
        self.entries
            .iter()
            .filter(|(key, entry)| **key == entry.prefix)
            .map(|(_, entry)| entry.as_ref())
    }
}

/// First four bytes of the file's SHA-256, hex encoded
fn content_version(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let contents = fs::read(path).ok()?;
    let digest = Sha256::digest(&contents);
    Some(hex::encode(&digest[..4]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory() {
        let mut statics = StaticRoutes::new();
        let err = statics
            .add("/static", "/definitely/not/here", None)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_content_version_is_eight_hex_chars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.css");
        fs::write(&path, "body {}").unwrap();

        let version = content_version(&path).unwrap();
        assert_eq!(version.len(), 8);
        assert!(version.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(content_version(&dir.path().join("missing.css")), None);
    }

    #[test]
    fn test_iter_lists_each_directory_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut statics = StaticRoutes::new();
        statics.add("/assets", dir.path(), Some("assets")).unwrap();
        statics.add("/media", dir.path(), None).unwrap();

        let mut prefixes: Vec<&str> = statics.iter().map(|s| s.prefix.as_str()).collect();
        prefixes.sort();
        assert_eq!(prefixes, vec!["/assets", "/media"]);
    }
}
