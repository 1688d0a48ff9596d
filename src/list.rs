use serde::{Deserialize, Serialize};

/// One saved lead. Opaque to the sync machinery: it carries a display
/// value (a URL in practice) and has no identity beyond its position in
/// the collection it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(pub String);

impl Entry {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The complete state of the remote collection at one point in time.
///
/// A collection that holds no data reports `exists() == false`; the store
/// drops the collection key entirely when it is cleared, so "empty" and
/// "absent" arrive the same way. Entry order is whatever the store
/// reported, consumers must not assume insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    entries: Option<Vec<Entry>>,
}

impl Snapshot {
    /// Snapshot of a collection that does not exist (never written, or
    /// removed in full).
    pub fn absent() -> Self {
        Self { entries: None }
    }

    /// Snapshot of a live collection with the given entries.
    pub fn of<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry>,
    {
        Self {
            entries: Some(entries.into_iter().map(Into::into).collect()),
        }
    }

    /// Rebuild a snapshot from wire form, `None` meaning the collection
    /// does not exist.
    pub fn from_entries(entries: Option<Vec<Entry>>) -> Self {
        Self { entries }
    }

    pub fn into_entries(self) -> Option<Vec<Entry>> {
        self.entries
    }

    pub fn exists(&self) -> bool {
        self.entries.is_some()
    }

    /// Ordered entries; an absent collection yields an empty slice.
    pub fn values(&self) -> &[Entry] {
        self.entries.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}
