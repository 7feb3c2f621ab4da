#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Package discovery and archiving for apkpack.
//!
//! Layout:
//! - `discover.rs`: recursive scan that applies suffix, keyword, and size filters
//! - `archive.rs`: zip writer with strict archive-then-delete ordering
//! - `model/`: selection criteria, archive requests, and reports
//! - `error.rs`: structured error types

pub mod archive;
pub mod discover;
pub mod error;
pub mod model;

pub use archive::create_archive;
pub use discover::{Discoverer, find_matches};
pub use error::{ArchiveFailure, FsOpsError, FsOpsResult, SourceDeletionWarning};
pub use model::{
    ArchiveReport, ArchiveRequest, BYTES_PER_MB, PACKAGE_SUFFIXES, SelectionCriteria,
    SelectionCriteriaBuilder, is_package_name,
};
