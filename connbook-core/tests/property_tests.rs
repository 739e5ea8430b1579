//! Property-based tests for `ConnBook` core library
//!
//! Properties cover path addressing, registry ordering, document round
//! trips, directory history and the delete cascade.

#![allow(clippy::redundant_clone)]
#![allow(clippy::too_many_lines)]

mod properties;
