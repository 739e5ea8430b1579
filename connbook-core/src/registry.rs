//! Flat, name-ordered store of connection records
//!
//! The registry owns every [`ConnectionRecord`]. Names are unique and both
//! ordering and lookup ignore case. Tree leaves refer to records by name.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::models::{ConnectionRecord, ProtocolCatalog, Warnings};

/// Case-folded form used for every name and host comparison
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Returns true if two names are equal under [`name_key`]
#[must_use]
pub fn same_name(a: &str, b: &str) -> bool {
    a == b || name_key(a) == name_key(b)
}

/// Case-insensitive sorted collection of connection records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    records: Vec<ConnectionRecord>,
}

impl Registry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record before the first one whose name sorts after it.
    ///
    /// The registry takes ownership of the record; callers keep no alias.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateConnection` if the name is already taken.
    pub fn insert_sorted(
        &mut self,
        record: ConnectionRecord,
    ) -> Result<&mut ConnectionRecord, ValidationError> {
        if self.contains(&record.name) {
            return Err(ValidationError::DuplicateConnection);
        }
        let key = name_key(&record.name);
        let index = self
            .records
            .iter()
            .position(|existing| name_key(&existing.name) > key)
            .unwrap_or(self.records.len());
        tracing::debug!(name = %record.name, index, "Inserted connection record");
        self.records.insert(index, record);
        Ok(&mut self.records[index])
    }

    /// Returns true if a record with this name exists (case-insensitive)
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Position of a record in name order
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let key = name_key(name);
        self.records.iter().position(|r| name_key(&r.name) == key)
    }

    /// Looks a record up by name (case-insensitive)
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&ConnectionRecord> {
        self.index_of(name).map(|i| &self.records[i])
    }

    /// Mutable lookup by name.
    ///
    /// Renaming through this reference breaks the ordering; use
    /// [`Self::replace`] to change a name.
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ConnectionRecord> {
        let index = self.index_of(name)?;
        Some(&mut self.records[index])
    }

    /// Returns the record at `index` in name order
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&ConnectionRecord> {
        self.records.get(index)
    }

    /// Removes and returns the record with this name
    pub fn remove_by_name(&mut self, name: &str) -> Option<ConnectionRecord> {
        let index = self.index_of(name)?;
        tracing::debug!(name, "Removed connection record");
        Some(self.records.remove(index))
    }

    /// Finds a record pointing at `host`, optionally ignoring one record
    #[must_use]
    pub fn find_by_host(&self, host: &str, exclude_name: Option<&str>) -> Option<&ConnectionRecord> {
        let host = name_key(host);
        self.records.iter().find(|r| {
            name_key(&r.host) == host && exclude_name.is_none_or(|excluded| !same_name(&r.name, excluded))
        })
    }

    /// Replaces the record named `old_name` with `record`, keeping order.
    ///
    /// On failure the registry is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MissingValue` if `old_name` is unknown and
    /// `DuplicateConnection` if the new name belongs to another record.
    pub fn replace(&mut self, old_name: &str, record: ConnectionRecord) -> Result<(), ValidationError> {
        let old_index = self.index_of(old_name).ok_or(ValidationError::MissingValue)?;
        if let Some(clash) = self.index_of(&record.name)
            && clash != old_index
        {
            return Err(ValidationError::DuplicateConnection);
        }
        let previous = self.records.remove(old_index);
        if let Err(e) = self.insert_sorted(record) {
            self.records.insert(old_index, previous);
            return Err(e);
        }
        Ok(())
    }

    /// Number of records
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the registry holds no record
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates in name order
    pub fn iter(&self) -> impl Iterator<Item = &ConnectionRecord> {
        self.records.iter()
    }

    /// Removes every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Recomputes the derived warnings of every record.
    ///
    /// Records flagged with `ignore_warnings` end up with no warnings.
    pub fn recompute_warnings(&mut self, catalog: &dyn ProtocolCatalog) {
        let mut host_counts: HashMap<String, usize> = HashMap::new();
        for record in &self.records {
            if !record.host.is_empty() {
                *host_counts.entry(record.host.to_lowercase()).or_default() += 1;
            }
        }

        for record in &mut self.records {
            record.warnings = Warnings::empty();
            if record.ignore_warnings {
                continue;
            }
            if host_counts
                .get(&record.host.to_lowercase())
                .is_some_and(|&count| count > 1)
            {
                record.warnings.insert(Warnings::DUPLICATE_HOST);
            }
            match catalog.lookup(&record.protocol) {
                None => record.warnings.insert(Warnings::PROTOCOL_MISSING),
                Some(entry) if !catalog.has_command(&entry.command) => {
                    record.warnings.insert(Warnings::PROTOCOL_COMMAND_MISSING);
                }
                Some(_) => {}
            }
        }

        let flagged = self.records.iter().filter(|r| !r.warnings.is_empty()).count();
        tracing::debug!(flagged, total = self.records.len(), "Recomputed warnings");
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ConnectionRecord;
    type IntoIter = std::slice::Iter<'a, ConnectionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
