//! iq-storage - File-system stores for inline-query
//!
//! Implements every collaborator trait of `iq-core` on top of a directory of
//! JSON and unified diff files.

mod file_store;

pub use file_store::FileSystemStore;
