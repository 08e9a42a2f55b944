//! Directory snapshot types
//!
//! A [`DirectorySnapshot`] is a point-in-time view of the sync root: a
//! mapping from [`NormalizedPath`] to [`FileRecord`]. Snapshots are ordered by
//! path so that serialization and diffing are deterministic.

use std::collections::btree_map::{self, BTreeMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{deserialize_path_map, NormalizedPath};

// ============================================================================
// FileStatus
// ============================================================================

/// Whether a path currently exists or is a deletion marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The path exists and the record carries its metadata
    Present,
    /// Tombstone: the path existed in the last snapshot and is gone now
    Deleted,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

// ============================================================================
// FileRecord
// ============================================================================

/// One entry of a snapshot
///
/// For tombstones the content metadata is whatever the last snapshot held;
/// it is kept for auditing and is not meaningful for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Root-relative path, identical to the snapshot key
    pub path: NormalizedPath,
    /// Present or tombstone
    pub status: FileStatus,
    /// Whether the path is a directory
    #[serde(default)]
    pub is_directory: bool,
    /// Size in bytes (0 for directories)
    #[serde(default)]
    pub size: u64,
    /// Last modification time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Hex SHA-256 of the file content (None for directories)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl FileRecord {
    /// Creates a present record for a regular file
    pub fn file(
        path: NormalizedPath,
        size: u64,
        modified: Option<DateTime<Utc>>,
        content_hash: Option<String>,
    ) -> Self {
        Self {
            path,
            status: FileStatus::Present,
            is_directory: false,
            size,
            modified,
            content_hash,
        }
    }

    /// Creates a present record for a directory
    pub fn directory(path: NormalizedPath, modified: Option<DateTime<Utc>>) -> Self {
        Self {
            path,
            status: FileStatus::Present,
            is_directory: true,
            size: 0,
            modified,
            content_hash: None,
        }
    }

    /// Turns this record into a tombstone, keeping its metadata
    #[must_use]
    pub fn into_tombstone(mut self) -> Self {
        self.status = FileStatus::Deleted;
        self
    }

    /// Returns true if this record marks a deletion
    pub fn is_tombstone(&self) -> bool {
        self.status == FileStatus::Deleted
    }
}

// ============================================================================
// DirectorySnapshot
// ============================================================================

/// Mapping from normalized path to file record
///
/// Keys are unique: [`from_records`](Self::from_records) and deserialization
/// both reject two entries that normalize to the same path. On the wire the snapshot is
/// `{"files": {"<path>": FileRecord, ...}}`; deserialization rejects
/// entries whose key does not match the record's own `path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRepr")]
pub struct DirectorySnapshot {
    files: BTreeMap<NormalizedPath, FileRecord>,
}

#[derive(Deserialize)]
struct SnapshotRepr {
    #[serde(default, deserialize_with = "deserialize_path_map")]
    files: BTreeMap<NormalizedPath, FileRecord>,
}

impl TryFrom<SnapshotRepr> for DirectorySnapshot {
    type Error = DomainError;

    fn try_from(repr: SnapshotRepr) -> Result<Self, Self::Error> {
        for (key, record) in &repr.files {
            if *key != record.path {
                return Err(DomainError::ValidationFailed(format!(
                    "snapshot key {key} does not match record path {}",
                    record.path
                )));
            }
        }
        Ok(Self { files: repr.files })
    }
}

impl DirectorySnapshot {
    /// Creates an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from records, rejecting duplicate paths
    ///
    /// # Errors
    /// Returns `DomainError::DuplicatePath` if two records share a path
    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Result<Self, DomainError> {
        let mut snapshot = Self::new();
        for record in records {
            if snapshot.files.contains_key(&record.path) {
                return Err(DomainError::DuplicatePath(record.path.to_string()));
            }
            snapshot.files.insert(record.path.clone(), record);
        }
        Ok(snapshot)
    }

    /// Inserts a record keyed by its path, returning the replaced record
    pub fn insert(&mut self, record: FileRecord) -> Option<FileRecord> {
        self.files.insert(record.path.clone(), record)
    }

    /// Looks up the record for a path
    pub fn get(&self, path: &NormalizedPath) -> Option<&FileRecord> {
        self.files.get(path)
    }

    /// Returns true if the snapshot has a record (present or tombstone) for `path`
    pub fn contains(&self, path: &NormalizedPath) -> bool {
        self.files.contains_key(path)
    }

    /// Number of records, tombstones included
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the snapshot has no records
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over records in path order
    pub fn iter(&self) -> btree_map::Iter<'_, NormalizedPath, FileRecord> {
        self.files.iter()
    }

    /// Iterates over paths in order
    pub fn paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.files.keys()
    }

    /// Iterates over tombstone records
    pub fn tombstones(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values().filter(|r| r.is_tombstone())
    }

    /// Number of tombstone records
    pub fn tombstone_count(&self) -> usize {
        self.tombstones().count()
    }
}

impl IntoIterator for DirectorySnapshot {
    type Item = (NormalizedPath, FileRecord);
    type IntoIter = btree_map::IntoIter<NormalizedPath, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a DirectorySnapshot {
    type Item = (&'a NormalizedPath, &'a FileRecord);
    type IntoIter = btree_map::Iter<'a, NormalizedPath, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
