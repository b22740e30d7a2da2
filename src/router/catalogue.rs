//! Static file catalogue.
//!
//! The document root is scanned once at startup. Every regular file is keyed
//! by `<root>/<relative path>`, the same string a request path maps to, so
//! lookups are exact string matches.

use std::fs;
use std::io;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::collections::{ChainedTable, Keyed};

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("unable to scan {path}: {source}")]
    Scan {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed file path {0:?}: no path separator")]
    MalformedPath(String),
}

/// Content type served for a file extension.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "html" => "text/html; charset=UTF-8",
        "css" => "text/css",
        "js" => "application/javascript",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File name with extension
    pub fullname: String,
    /// File name without extension
    pub name: String,
    /// Text after the last dot of the file name, may be empty
    pub extension: String,
    /// On-disk path, also the catalogue key
    pub path: String,
    pub access_level: u8,
}

impl File {
    /// Splits `path` at its last separator and the last dot after it.
    pub fn from_path(path: impl Into<String>) -> Result<Self, CatalogueError> {
        let path = path.into();
        let Some(slash) = path.rfind(['/', '\\']) else {
            return Err(CatalogueError::MalformedPath(path));
        };

        let fullname = &path[slash + 1..];
        let (name, extension) = match fullname.rfind('.') {
            Some(dot) => (&fullname[..dot], &fullname[dot + 1..]),
            None => (fullname, ""),
        };

        Ok(Self {
            fullname: fullname.to_string(),
            name: name.to_string(),
            extension: extension.to_string(),
            path: path.clone(),
            access_level: 0,
        })
    }

    pub fn content_type(&self) -> &'static str {
        content_type_for(&self.extension)
    }

    pub fn read_content(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

impl Keyed for File {
    fn key(&self) -> &str {
        &self.path
    }
}

#[derive(Debug)]
pub struct Catalogue {
    root: String,
    table: ChainedTable<File>,
}

impl Catalogue {
    /// An empty catalogue rooted at `root`.
    pub fn new(root: &str, buckets: usize) -> Self {
        let trimmed = match root.trim_end_matches('/') {
            "" if root.starts_with('/') => "/",
            t => t,
        };
        Self {
            root: trimmed.to_string(),
            table: ChainedTable::new(buckets),
        }
    }

    /// Recursively scans `root` and catalogues every regular file.
    pub fn load(root: &str, buckets: usize) -> Result<Self, CatalogueError> {
        let mut catalogue = Self::new(root, buckets);
        let dir = catalogue.root.clone();
        let count = catalogue.scan(&dir)?;
        info!(
            root = %catalogue.root(),
            files = count,
            buckets = catalogue.table.bucket_count(),
            "File catalogue built"
        );
        for file in catalogue.files() {
            debug!(path = %file.path, content_type = file.content_type(), "Serving file");
        }
        Ok(catalogue)
    }

    fn scan(&mut self, dir: &str) -> Result<usize, CatalogueError> {
        let entries = fs::read_dir(dir).map_err(|source| CatalogueError::Scan {
            path: dir.to_string(),
            source,
        })?;

        let mut count = 0;
        for entry in entries {
            let entry = entry.map_err(|source| CatalogueError::Scan {
                path: dir.to_string(),
                source,
            })?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!(dir = %dir, "Skipping entry with non UTF-8 name");
                continue;
            };
            let path = format!("{}/{}", dir, name);

            // Follows symlinks, like stat(2).
            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %path, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if metadata.is_dir() {
                count += self.scan(&path)?;
            } else if metadata.is_file() {
                let bucket = self.insert(File::from_path(path.as_str())?);
                trace!(path = %path, bucket, "Catalogued file");
                count += 1;
            }
        }

        Ok(count)
    }

    /// Adds `file` and returns the bucket it landed in.
    pub fn insert(&mut self, file: File) -> usize {
        self.table.insert(file)
    }

    /// Maps a request path onto the on-disk key space.
    pub fn local_path(&self, request_path: &str) -> String {
        format!("{}{}", self.root, request_path)
    }

    pub fn get(&self, local_path: &str) -> Option<&File> {
        self.table.get(local_path)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.table.values()
    }
}
