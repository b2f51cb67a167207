//! Files held in an entity's table.
//!
//! A file is either *resident* (`bytes_sent == size`, no destination) or part
//! of a transfer. The receiving end of a transfer holds a *shell*: same name
//! and size as the source, but only the delivered prefix of the content.

use serde::{Deserialize, Serialize};

/// A named piece of content owned by one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    name: String,
    content: String,
    size: usize,
    bytes_sent: usize,
    from: Option<String>,
    to: Option<String>,
}

impl File {
    /// Creates a fully resident file owned by `owner`.
    pub fn resident(name: impl Into<String>, content: impl Into<String>, owner: &str) -> Self {
        let content = content.into();
        let size = char_len(&content);
        Self {
            name: name.into(),
            content,
            size,
            bytes_sent: size,
            from: Some(owner.to_string()),
            to: None,
        }
    }

    /// Creates the empty placeholder a destination holds at admission.
    pub fn shell(name: impl Into<String>, size: usize, from: &str, to: &str) -> Self {
        Self {
            name: name.into(),
            content: String::new(),
            size,
            bytes_sent: 0,
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The content visible at this end (a prefix while a transfer runs).
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_sent == self.size
    }

    /// Marks this (resident) copy as the source of a new transfer.
    pub(crate) fn begin_send(&mut self, from: &str, to: &str) {
        self.bytes_sent = 0;
        self.from = Some(from.to_string());
        self.to = Some(to.to_string());
    }

    pub(crate) fn set_bytes_sent(&mut self, bytes_sent: usize) {
        self.bytes_sent = bytes_sent.min(self.size);
    }

    /// Reveals the first `bytes_sent` characters of `full`.
    pub(crate) fn reveal(&mut self, full: &str, bytes_sent: usize) {
        self.set_bytes_sent(bytes_sent);
        self.content = prefix(full, self.bytes_sent);
    }

    /// Replaces the content and makes the file resident at its new length.
    pub(crate) fn overwrite(&mut self, content: String) {
        self.size = char_len(&content);
        self.bytes_sent = self.size;
        self.content = content;
        self.to = None;
    }

    /// Ends any transfer this copy takes part in.
    pub(crate) fn settle(&mut self) {
        self.bytes_sent = self.size;
        self.to = None;
    }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `n` characters of `s`.
pub(crate) fn prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Characters of `s` from index `start` up to (excluding) `end`.
pub(crate) fn slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

/// Damage a teleport inflicts on content caught mid-flight.
pub fn strip_teleport_noise(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, 't' | 'T')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resident_file_is_complete() {
        let file = File::resident("a.txt", "hello", "dev1");
        assert_eq!(file.size(), 5);
        assert!(file.is_complete());
        assert_eq!(file.from(), Some("dev1"));
        assert_eq!(file.to(), None);
    }

    #[test]
    fn test_shell_reveals_prefix() {
        let mut shell = File::shell("a.txt", 5, "dev1", "sat1");
        assert!(!shell.is_complete());
        assert_eq!(shell.content(), "");

        shell.reveal("hello", 3);
        assert_eq!(shell.content(), "hel");
        assert_eq!(shell.bytes_sent(), 3);

        shell.reveal("hello", 99);
        assert_eq!(shell.content(), "hello");
        assert!(shell.is_complete());
    }

    #[test]
    fn test_strip_teleport_noise() {
        assert_eq!(strip_teleport_noise("The tall tree"), "he all ree");
        assert_eq!(strip_teleport_noise("none"), "none");
    }

    #[test]
    fn test_overwrite_resets_sizes() {
        let mut file = File::resident("a.txt", "treats", "dev1");
        file.begin_send("dev1", "sat1");
        file.overwrite(strip_teleport_noise("treats"));
        assert_eq!(file.content(), "reas");
        assert_eq!(file.size(), 4);
        assert!(file.is_complete());
        assert_eq!(file.to(), None);
    }

    #[test]
    fn test_slice_counts_characters() {
        assert_eq!(slice("abcdef", 2, 5), "cde");
        assert_eq!(slice("abc", 3, 3), "");
    }
}
