//! Candidate file selection.
//!
//! A [`FileSelector`] turns a target path into a lazy, ordered and
//! deduplicated sequence of files, filtered by a [`NameFilter`].

#![warn(missing_docs)]

mod filter;
mod selector;

pub use filter::NameFilter;
pub use selector::{Candidates, FileSelector};
