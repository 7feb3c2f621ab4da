#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared test helpers used across the apkpack suites.
//! Layout: fixtures.rs (scratch directories and sized package files), assert.rs (archive and path assertions).

pub mod assert;
pub mod fixtures;
