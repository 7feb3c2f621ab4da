//! Command handlers.

pub(crate) mod pack;
