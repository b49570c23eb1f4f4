//! File system abstractions for Burrow.
//!
//! Value types for listings ([`entry::EntryRef`], [`snapshot::ListingSnapshot`]),
//! the [`service::FileSystemService`] boundary every storage backend
//! implements, and [`local::LocalFileSystem`], the backend for the local disk.

pub mod entry;
pub mod local;
pub mod service;
pub mod snapshot;
