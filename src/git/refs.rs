//! Remote-tracking ref snapshots and before/after diffing

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use super::transport::{to_args, Transport};

const FOR_EACH_REF_ARGS: &[&str] = &[
    "for-each-ref",
    "--format=%(refname) %(objectname)",
    "refs/remotes",
];

/// Suffix of the symbolic pointer every remote publishes; it carries no
/// commit history of its own and is never classified.
const HEAD_SUFFIX: &str = "/HEAD";

/// A point-in-time mapping of remote-tracking ref names to commit ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefSnapshot {
    refs: BTreeMap<String, String>,
}

/// Classification of one ref between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefDelta {
    Added(String),
    Advanced { from: String, to: String },
    Deleted,
    Unchanged,
}

impl RefSnapshot {
    /// Lists the repository's remote-tracking refs.
    ///
    /// Fails soft: a failed listing yields an empty snapshot, since the
    /// fetch step surfaces fatal repository problems on its own.
    pub async fn capture(transport: &dyn Transport, repo: &Path, timeout: Duration) -> RefSnapshot {
        let outcome = transport.run(repo, &to_args(FOR_EACH_REF_ARGS), timeout).await;
        if !outcome.success() {
            return RefSnapshot::default();
        }
        Self::parse(&outcome.output)
    }

    /// Parses a `for-each-ref` listing of `<name> <objectname>` lines.
    #[must_use]
    pub fn parse(listing: &str) -> RefSnapshot {
        let mut refs = BTreeMap::new();
        for line in listing.lines() {
            let mut parts = line.split_whitespace();
            if let (Some(name), Some(oid)) = (parts.next(), parts.next()) {
                if name.ends_with(HEAD_SUFFIX) {
                    continue;
                }
                refs.insert(name.to_string(), oid.to_string());
            }
        }
        RefSnapshot { refs }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    #[must_use]
    pub fn commit_of(&self, name: &str) -> Option<&str> {
        self.refs.get(name).map(String::as_str)
    }
}

/// Classifies every ref present in either snapshot.
///
/// Refs only in `after` are `Added`, moved refs are `Advanced`, refs only
/// in `before` are `Deleted`; ref names are unique keys by construction so
/// no tie-breaking is needed.
#[must_use]
pub fn diff(before: &RefSnapshot, after: &RefSnapshot) -> Vec<(String, RefDelta)> {
    let mut deltas = Vec::with_capacity(after.refs.len());

    for (name, oid) in &after.refs {
        if name.ends_with(HEAD_SUFFIX) {
            continue;
        }
        let delta = match before.refs.get(name) {
            None => RefDelta::Added(oid.clone()),
            Some(old) if old != oid => RefDelta::Advanced {
                from: old.clone(),
                to: oid.clone(),
            },
            Some(_) => RefDelta::Unchanged,
        };
        deltas.push((name.clone(), delta));
    }

    for name in before.refs.keys() {
        if name.ends_with(HEAD_SUFFIX) {
            continue;
        }
        if !after.refs.contains_key(name) {
            deltas.push((name.clone(), RefDelta::Deleted));
        }
    }

    deltas
}

/// Strips the `refs/remotes/` prefix for display.
#[must_use]
pub fn short_ref(name: &str) -> &str {
    name.strip_prefix("refs/remotes/").unwrap_or(name)
}
