//! `rescuetime-export` library crate.
//!
//! The binary (`rtx`) is a thin wrapper around this library so that:
//!
//! - the download/merge workflows are testable without spawning processes
//! - the HTTP client sits behind a trait and can be swapped in tests

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod range;
