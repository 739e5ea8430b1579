//! Most-recently-used directory history kept per connection.

use std::collections::VecDeque;

/// Maximum number of directories remembered per connection
pub const HISTORY_CAPACITY: usize = 10;

/// A bounded, recency-ordered list of directories.
///
/// The most recent entry is the last one. Re-adding an entry moves it to the
/// end; exceeding [`HISTORY_CAPACITY`] evicts the oldest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryHistory {
    items: VecDeque<String>,
}

impl DirectoryHistory {
    /// Creates an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a directory as the most recently used one.
    ///
    /// Empty strings are ignored.
    pub fn add_directory(&mut self, item: impl Into<String>) {
        let item = item.into();
        if item.is_empty() {
            return;
        }
        if let Some(index) = self.search(&item) {
            self.items.remove(index);
        }
        self.items.push_back(item);
        while self.items.len() > HISTORY_CAPACITY {
            self.items.pop_front();
        }
    }

    /// Returns the position of `item`, oldest first
    #[must_use]
    pub fn search(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|existing| existing == item)
    }

    /// Returns the most recently used directory
    #[must_use]
    pub fn most_recent(&self) -> Option<&str> {
        self.items.back().map(String::as_str)
    }

    /// Iterates from oldest to most recent
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Returns the number of remembered directories
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forgets every entry
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for DirectoryHistory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut history = Self::new();
        for item in iter {
            history.add_directory(item);
        }
        history
    }
}
