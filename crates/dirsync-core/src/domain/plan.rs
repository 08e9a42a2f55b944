//! Server-issued action plans
//!
//! After a snapshot submission the server answers with a [`SyncActionPlan`]:
//! one [`FileActionDirective`] per path telling the client what to do to
//! converge.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::newtypes::{deserialize_path_map, NormalizedPath};

/// Corrective action for a single path
///
/// Values the client does not understand are kept in [`SyncAction::Unknown`]
/// with their raw text, so they can be reported and skipped instead of
/// failing the whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SyncAction {
    /// Send the local file to the server
    Upload,
    /// Fetch the server's copy into the sync root
    Download,
    /// Create the directory locally
    Mkdir,
    /// Any other value sent by the server
    Unknown(String),
}

impl SyncAction {
    /// Wire representation of the action
    pub fn as_str(&self) -> &str {
        match self {
            Self::Upload => "upload",
            Self::Download => "download",
            Self::Mkdir => "mkdir",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for SyncAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "upload" => Self::Upload,
            "download" => Self::Download,
            "mkdir" => Self::Mkdir,
            _ => Self::Unknown(value),
        }
    }
}

impl From<SyncAction> for String {
    fn from(action: SyncAction) -> Self {
        match action {
            SyncAction::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directive for one path of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileActionDirective {
    pub action: SyncAction,
}

impl FileActionDirective {
    pub fn new(action: SyncAction) -> Self {
        Self { action }
    }
}

/// Mapping from path to directive, as returned by the server
///
/// Wire shape: `{"files": {"<path>": {"action": "upload"}, ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncActionPlan {
    #[serde(default, deserialize_with = "deserialize_path_map")]
    files: BTreeMap<NormalizedPath, FileActionDirective>,
}

impl SyncActionPlan {
    /// Creates an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the directive for `path`
    pub fn insert(&mut self, path: NormalizedPath, action: SyncAction) {
        self.files.insert(path, FileActionDirective::new(action));
    }

    /// Builder-style variant of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, path: NormalizedPath, action: SyncAction) -> Self {
        self.insert(path, action);
        self
    }

    pub fn get(&self, path: &NormalizedPath) -> Option<&FileActionDirective> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over directives in path order
    pub fn iter(&self) -> btree_map::Iter<'_, NormalizedPath, FileActionDirective> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a SyncActionPlan {
    type Item = (&'a NormalizedPath, &'a FileActionDirective);
    type IntoIter = btree_map::Iter<'a, NormalizedPath, FileActionDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
