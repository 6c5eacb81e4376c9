//! Read-only view over the parts of a zip package

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

/// Why a part could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartError {
    /// No entry with that name exists in the archive
    Missing,
    /// The entry is listed but its data could not be decompressed
    Unreadable(String),
}

/// All parts of an OOXML package, decompressed once at open time.
#[derive(Debug, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
    unreadable: BTreeMap<String, String>,
}

impl Package {
    /// Open a package from a file path.
    ///
    /// Fails only when the file itself cannot be opened or is not a zip
    /// archive; damaged entries are kept as unreadable parts.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let archive_open = |source: zip::result::ZipError| Error::ArchiveOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|e| archive_open(e.into()))?;
        let package = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            Error::ArchiveOpen { source, .. } => archive_open(source),
            other => other,
        })?;

        debug!(
            path = %path.display(),
            parts = package.parts.len(),
            unreadable = package.unreadable.len(),
            "opened package"
        );
        Ok(package)
    }

    /// Read a package from any seekable source (e.g. an in-memory buffer).
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).map_err(|source| Error::ArchiveOpen {
            path: Default::default(),
            source,
        })?;

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let mut package = Package::default();

        for name in names {
            if name.ends_with('/') {
                continue;
            }
            let mut data = Vec::new();
            let read = match archive.by_name(&name) {
                Ok(mut entry) => entry.read_to_end(&mut data).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match read {
                Ok(_) => {
                    package.parts.insert(name, data);
                }
                Err(reason) => {
                    warn!(part = %name, %reason, "part data could not be read");
                    package.unreadable.insert(name, reason);
                }
            }
        }

        Ok(package)
    }

    /// Build a package directly from named parts.
    pub fn from_parts<I, N, D>(parts: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: Into<Vec<u8>>,
    {
        Self {
            parts: parts
                .into_iter()
                .map(|(name, data)| (name.into(), data.into()))
                .collect(),
            unreadable: BTreeMap::new(),
        }
    }

    /// Names of every part in the archive, in sorted order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .parts
            .keys()
            .chain(self.unreadable.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.into_iter()
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.contains_key(name) || self.unreadable.contains_key(name)
    }

    pub fn read_part(&self, name: &str) -> std::result::Result<&[u8], PartError> {
        if let Some(data) = self.parts.get(name) {
            return Ok(data);
        }
        match self.unreadable.get(name) {
            Some(reason) => Err(PartError::Unreadable(reason.clone())),
            None => Err(PartError::Missing),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
