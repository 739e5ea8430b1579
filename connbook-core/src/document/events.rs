//! Change notifications and the bulk-rebuild guard

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::Document;

/// Change emitted after a committed mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// A folder was created at the given symbolic path
    FolderAdded {
        /// Symbolic path of the new folder
        path: String,
    },
    /// A connection was added
    ConnectionAdded {
        /// Record name
        name: String,
    },
    /// A connection was edited, possibly under a new name
    ConnectionUpdated {
        /// Name before the edit
        old_name: String,
        /// Name after the edit
        name: String,
    },
    /// A folder was renamed
    FolderRenamed {
        /// Previous symbolic path
        old_path: String,
        /// New symbolic path
        path: String,
    },
    /// A node and its subtree were deleted
    NodeDeleted {
        /// Symbolic path the node had
        path: String,
        /// Connection records dropped with it
        connections: Vec<String>,
    },
    /// A node moved to another folder
    NodeMoved {
        /// Previous symbolic path
        from: String,
        /// New symbolic path
        to: String,
    },
    /// Children of a folder were re-sorted
    Sorted {
        /// Symbolic path of the folder
        path: String,
    },
    /// The whole document was repopulated
    Rebuilt,
}

/// Handle returned by [`Document::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&DocumentEvent)>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: usize,
    entries: Vec<(usize, Listener)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        SubscriptionId(id)
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id.0);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &DocumentEvent) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }
}

/// Scope during which a document is repopulated in bulk.
///
/// Notifications are suppressed while the guard lives. Dropping it clears
/// the flag on every exit path and emits a single [`DocumentEvent::Rebuilt`].
/// The guard dereferences to the document being rebuilt.
pub struct RebuildGuard<'a> {
    document: &'a mut Document,
}

impl<'a> RebuildGuard<'a> {
    pub(crate) fn new(document: &'a mut Document) -> Self {
        document.rebuilding = true;
        tracing::debug!("Bulk rebuild started");
        Self { document }
    }
}

impl fmt::Debug for RebuildGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RebuildGuard").finish_non_exhaustive()
    }
}

impl Deref for RebuildGuard<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.document
    }
}

impl DerefMut for RebuildGuard<'_> {
    fn deref_mut(&mut self) -> &mut Document {
        self.document
    }
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.document.rebuilding = false;
        tracing::debug!(
            connections = self.document.registry().count(),
            "Bulk rebuild finished"
        );
        self.document.emit(DocumentEvent::Rebuilt);
    }
}
