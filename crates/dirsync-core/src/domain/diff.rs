//! Diff engine
//!
//! Merges the last persisted snapshot with the freshly observed one into the
//! snapshot that is submitted to the server. Deletions are expressed as
//! tombstones so the server can propagate them explicitly.

use super::snapshot::DirectorySnapshot;

/// Merges `last` and `current` into the snapshot to submit
///
/// - every path in `last` that is missing from `current` becomes a tombstone
///   carrying `last`'s metadata;
/// - every path in `current` is copied verbatim, so a path that was deleted
///   and recreated within one cycle is reported as present.
///
/// The result's path set is the union of both inputs. The function is pure
/// and its output does not depend on iteration order.
pub fn reconcile(last: &DirectorySnapshot, current: &DirectorySnapshot) -> DirectorySnapshot {
    let mut merged = DirectorySnapshot::new();

    for (path, record) in last {
        if !current.contains(path) {
            merged.insert(record.clone().into_tombstone());
        }
    }

    for (_, record) in current {
        merged.insert(record.clone());
    }

    merged
}
