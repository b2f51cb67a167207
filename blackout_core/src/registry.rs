//! The transfer registry: which files are in flight on which directed link.

use std::collections::BTreeMap;
use std::fmt;

/// Directed (sender, receiver) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
    pub from: String,
    pub to: String,
}

impl LinkKey {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn involves(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// One file travelling over a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub filename: String,

    /// Source content captured at admission
    pub content: String,

    pub size: usize,

    pub bytes_sent: usize,

    /// Set once the endpoints have been in reach of each other, at admission
    /// or on a later tick. Only linked files can be aborted.
    pub linked: bool,
}

impl InFlight {
    pub fn new(filename: impl Into<String>, content: impl Into<String>, size: usize) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            size,
            bytes_sent: 0,
            linked: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_sent >= self.size
    }
}

/// Files in flight, grouped by link in admission order.
///
/// A link's entry exists only while at least one file is on it.
#[derive(Debug, Default, Clone)]
pub struct TransferRegistry {
    links: BTreeMap<LinkKey, Vec<InFlight>>,
}

impl TransferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file on `key`, creating the link entry if needed.
    pub fn admit(&mut self, key: LinkKey, flight: InFlight) {
        self.links.entry(key).or_default().push(flight);
    }

    /// Files currently on `key`.
    pub fn files(&self, key: &LinkKey) -> &[InFlight] {
        self.links.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_mut(&mut self, key: &LinkKey, filename: &str) -> Option<&mut InFlight> {
        self.links
            .get_mut(key)?
            .iter_mut()
            .find(|f| f.filename == filename)
    }

    /// Takes a file off its link, dropping the link once it is empty.
    pub fn remove(&mut self, key: &LinkKey, filename: &str) -> Option<InFlight> {
        let files = self.links.get_mut(key)?;
        let index = files.iter().position(|f| f.filename == filename)?;
        let flight = files.remove(index);
        if files.is_empty() {
            self.links.remove(key);
        }
        Some(flight)
    }

    /// Point-in-time copy of the active links.
    pub fn links(&self) -> Vec<LinkKey> {
        self.links.keys().cloned().collect()
    }

    /// Removes every link touching `id` and returns what was on them.
    pub fn purge(&mut self, id: &str) -> Vec<(LinkKey, InFlight)> {
        let doomed: Vec<LinkKey> = self.links.keys().filter(|k| k.involves(id)).cloned().collect();
        doomed
            .into_iter()
            .filter_map(|key| self.links.remove(&key).map(|files| (key, files)))
            .flat_map(|(key, files)| files.into_iter().map(move |f| (key.clone(), f)))
            .collect()
    }

    /// Number of files in flight across all links.
    pub fn len(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
