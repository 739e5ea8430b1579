//! Symbolic (`"folder/sub"`) and positional (`"2:0"`) addressing.
//!
//! A positional path lists, level by level, the ordinal of a node among the
//! non-empty slots of its parent. Holes left by deletions are not counted, so
//! `positional_path_of` and `resolve_positional` are exact inverses for every
//! live node. The root's positional path is the empty string.

use crate::error::{TreeError, TreeResult};

use super::{GroupTree, NodeId, NodeKind};

/// Separator of symbolic path segments
pub const SYMBOLIC_SEPARATOR: char = '/';

/// Separator of positional path segments
pub const POSITIONAL_SEPARATOR: char = ':';

/// Behaviour of the symbolic resolver on a missing segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Fail with `NotFound`
    Lookup,
    /// Create the missing folder and continue
    Create,
}

impl GroupTree {
    /// Walks `path` from the root one `/`-separated segment at a time.
    ///
    /// Empty segments are ignored, so `""` and `"/"` resolve to the root.
    ///
    /// # Errors
    ///
    /// In [`ResolveMode::Lookup`] a missing segment is `NotFound`. In both
    /// modes descending through a connection leaf is `NotAFolder`.
    /// [`ResolveMode::Create`] reports `CapacityExceeded` from `add_child`, and
    /// `InvalidPath` for a blank segment before anything is created.
    pub fn resolve_symbolic(&mut self, path: &str, mode: ResolveMode) -> TreeResult<NodeId> {
        let segments: Vec<&str> = path
            .split(SYMBOLIC_SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect();
        self.resolve_segments(&segments, mode)
    }

    /// Same walk as [`Self::resolve_symbolic`] over pre-split segments.
    ///
    /// Segments may contain `/`; they are matched as whole names.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_symbolic`].
    pub fn resolve_segments<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        mode: ResolveMode,
    ) -> TreeResult<NodeId> {
        if mode == ResolveMode::Create
            && let Some(index) = segments.iter().position(|s| s.as_ref().trim().is_empty())
        {
            return Err(TreeError::InvalidPath {
                path: segments.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("/"),
                reason: format!("segment {index} is blank"),
            });
        }
        let mut current = self.root();
        for segment in segments.iter().map(AsRef::as_ref) {
            if !self.get(current)?.is_folder() {
                return Err(TreeError::NotAFolder(self.name(current).to_string()));
            }
            current = match self.find_child(current, segment) {
                Some(child) => child,
                None => match mode {
                    ResolveMode::Lookup => {
                        return Err(TreeError::NotFound(format!(
                            "'{segment}' under '{}'",
                            self.name(current)
                        )));
                    }
                    ResolveMode::Create => self.add_child(current, NodeKind::Folder, segment)?,
                },
            };
        }
        Ok(current)
    }

    /// Read-only variant of [`Self::resolve_symbolic`] in lookup mode
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if any segment is missing.
    pub fn lookup_symbolic(&self, path: &str) -> TreeResult<NodeId> {
        let mut current = self.root();
        for segment in path.split(SYMBOLIC_SEPARATOR).filter(|s| !s.is_empty()) {
            current = self
                .find_child(current, segment)
                .ok_or_else(|| TreeError::NotFound(format!("'{segment}' in path '{path}'")))?;
        }
        Ok(current)
    }

    /// Builds the `/`-separated name path of a node; the root yields `""`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a stale handle.
    pub fn symbolic_path_of(&self, node: NodeId) -> TreeResult<String> {
        let mut names = Vec::new();
        let mut current = node;
        while let Some(parent) = self.get(current)?.parent() {
            names.push(self.name(current));
            current = parent;
        }
        names.reverse();
        Ok(names.join("/"))
    }

    /// Resolves a `:`-separated list of ordinals over non-empty slots
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if a segment is not a non-negative integer and
    /// `NotFound` if an ordinal is out of range.
    pub fn resolve_positional(&self, path: &str) -> TreeResult<NodeId> {
        let mut current = self.root();
        if path.is_empty() {
            return Ok(current);
        }
        let ordinals = path
            .split(POSITIONAL_SEPARATOR)
            .map(|segment| {
                segment.trim().parse::<usize>().map_err(|_| TreeError::InvalidPath {
                    path: path.to_string(),
                    reason: format!("'{segment}' is not a non-negative integer"),
                })
            })
            .collect::<TreeResult<Vec<_>>>()?;

        for ordinal in ordinals {
            current = self.children(current).nth(ordinal).ok_or_else(|| {
                TreeError::NotFound(format!(
                    "child {ordinal} of '{}' (path '{path}')",
                    self.name(current)
                ))
            })?;
        }
        Ok(current)
    }

    /// Computes the positional path of a node; the root yields `""`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a stale handle.
    pub fn positional_path_of(&self, node: NodeId) -> TreeResult<String> {
        let mut ordinals = Vec::new();
        let mut current = node;
        while let Some(parent) = self.get(current)?.parent() {
            let ordinal = self
                .slots(parent)
                .iter()
                .take_while(|slot| **slot != Some(current))
                .filter(|slot| slot.is_some())
                .count();
            ordinals.push(ordinal.to_string());
            current = parent;
        }
        ordinals.reverse();
        Ok(ordinals.join(":"))
    }
}
