//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain identifiers and values.
//! Each newtype ensures data validity at construction time.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::DomainError;

// ============================================================================
// ClientId
// ============================================================================

/// Stable identifier of a sync client
///
/// Sent with every snapshot submission and upload so the server can attribute
/// changes. Must be non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Create a new ClientId
    ///
    /// # Errors
    /// Returns `DomainError::InvalidClientId` if the id is empty, contains
    /// whitespace or a path separator, or is `.`/`..`
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidClientId(
                "client ID cannot be empty".to_string(),
            ));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidClientId(format!(
                "client ID cannot contain whitespace: {id:?}"
            )));
        }
        // The id names the per-client state directory.
        if id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(DomainError::InvalidClientId(format!(
                "client ID must be usable as a directory name: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ClientId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

// ============================================================================
// NormalizedPath
// ============================================================================

/// A root-relative, slash-separated path
///
/// This is the wire and storage form of a path: it is used as the key of
/// snapshots and action plans. NormalizedPath ensures the path is:
/// - Relative (never starts with `/`)
/// - Free of empty, `.` and `..` segments
/// - Non-empty
///
/// Two inputs that differ only in redundant separators or `.` segments
/// normalize to the same value, so they collide as map keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedPath(String);

impl NormalizedPath {
    /// Create a NormalizedPath from its textual form
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is absolute, empty,
    /// or tries to escape the root via `..`
    pub fn new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref();

        if raw.starts_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Path must be relative to the sync root: {raw}"
            )));
        }

        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(DomainError::InvalidPath(format!(
                        "Path escapes root via ..: {raw}"
                    )));
                }
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(DomainError::InvalidPath(format!(
                "Path has no components: {raw:?}"
            )));
        }

        Ok(Self(segments.join("/")))
    }

    /// Build a NormalizedPath from a local absolute path under `root`
    ///
    /// # Errors
    /// Returns `DomainError::PathNotInSyncRoot` if `local` is not under `root`,
    /// and `DomainError::InvalidPath` for non-UTF-8 or non-normal components
    pub fn from_local(root: &Path, local: &Path) -> Result<Self, DomainError> {
        let relative = local.strip_prefix(root).map_err(|_| {
            DomainError::PathNotInSyncRoot(format!(
                "{} is not within {}",
                local.display(),
                root.display()
            ))
        })?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(c) => {
                    let s = c.to_str().ok_or_else(|| {
                        DomainError::InvalidPath(format!(
                            "Path is not valid UTF-8: {}",
                            local.display()
                        ))
                    })?;
                    segments.push(s);
                }
                Component::CurDir => {}
                _ => {
                    return Err(DomainError::InvalidPath(format!(
                        "Unexpected component in {}",
                        local.display()
                    )));
                }
            }
        }

        Self::new(segments.join("/"))
    }

    /// Resolve this path to a local absolute path under `root`
    #[must_use]
    pub fn to_local(&self, root: &Path) -> PathBuf {
        self.segments().fold(root.to_path_buf(), |acc, s| acc.join(s))
    }

    /// Get the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the slash-separated segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The last segment (file or directory name)
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The parent path, or None for top-level entries
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| Self(parent.to_string()))
    }
}

impl Display for NormalizedPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NormalizedPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NormalizedPath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NormalizedPath> for String {
    fn from(path: NormalizedPath) -> Self {
        path.0
    }
}

impl AsRef<str> for NormalizedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Path-keyed maps
// ============================================================================

/// Deserializes a `{"<path>": V}` map, normalizing every key
///
/// Two keys that normalize to the same path (`a.txt` and `./a.txt`) are an
/// error rather than a silent overwrite.
pub(crate) fn deserialize_path_map<'de, D, V>(
    deserializer: D,
) -> Result<BTreeMap<NormalizedPath, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct PathMapVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for PathMapVisitor<V> {
        type Value = BTreeMap<NormalizedPath, V>;

        fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str("a map keyed by relative path")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = BTreeMap::new();
            while let Some((raw, value)) = access.next_entry::<String, V>()? {
                let path = NormalizedPath::new(&raw).map_err(de::Error::custom)?;
                if map.contains_key(&path) {
                    return Err(de::Error::custom(DomainError::DuplicatePath(format!(
                        "{raw} (normalizes to {path})"
                    ))));
                }
                map.insert(path, value);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(PathMapVisitor(PhantomData))
}
